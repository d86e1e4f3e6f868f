use std::{
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use futures::{StreamExt, stream};
use nanobot_web_core::{ExecOutput, RemoteError, RemotePaths, RemoteShell, Session, TokenCodec};
use nanobot_web_transport::{ChatFrame, run_chat};
use tokio::sync::mpsc;
use tokio_test::assert_ok;

/// Agent double: echoes the command it was given unless told to fail.
#[derive(Clone, Default)]
struct FakeAgent {
    commands: Arc<Mutex<Vec<String>>>,
    closed: Arc<AtomicBool>,
    fail: bool,
}

#[async_trait]
impl RemoteShell for FakeAgent {
    async fn exec(&mut self, command: &str, timeout: Duration) -> Result<ExecOutput, RemoteError> {
        self.commands.lock().unwrap().push(command.to_string());
        if self.fail {
            return Err(RemoteError::Timeout(timeout));
        }
        Ok(ExecOutput::new("Hello from nanobot\n", "", 0))
    }

    async fn close(&mut self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

fn codec() -> TokenCodec {
    TokenCodec::new("chat-secret", Duration::from_secs(600))
}

fn auth_frame() -> String {
    let token = assert_ok!(codec().issue(&Session::new("10.0.0.2", 22, "root", "pw")));
    serde_json::json!({ "token": token }).to_string()
}

async fn drive(frames: Vec<String>, agent: FakeAgent) -> Vec<ChatFrame> {
    let (tx, mut rx) = mpsc::unbounded_channel();
    run_chat(
        stream::iter(frames),
        tx,
        &codec(),
        RemotePaths::default(),
        move |_session| agent,
    )
    .await;

    let mut out = Vec::new();
    while let Some(frame) = rx.recv().await {
        out.push(frame);
    }
    out
}

#[tokio::test]
async fn test_bad_token_gets_one_error_and_nothing_is_read() {
    let agent = FakeAgent::default();
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut inbound = stream::iter(vec![
        r#"{"message": "not a token"}"#.to_string(),
        r#"{"message": "hello"}"#.to_string(),
    ]);

    let opener = agent.clone();
    run_chat(&mut inbound, tx, &codec(), RemotePaths::default(), move |_| opener).await;

    assert_eq!(rx.recv().await, Some(ChatFrame::error("Authentication failed")));
    assert_eq!(rx.recv().await, None);
    assert_eq!(inbound.next().await.as_deref(), Some(r#"{"message": "hello"}"#));
    assert!(agent.commands.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_token_from_other_secret_rejected() {
    let token = TokenCodec::new("other", Duration::from_secs(600))
        .issue(&Session::new("h", 22, "u", "p"))
        .unwrap();
    let frames = drive(
        vec![serde_json::json!({ "token": token }).to_string()],
        FakeAgent::default(),
    )
    .await;
    assert_eq!(frames, vec![ChatFrame::error("Authentication failed")]);
}

#[tokio::test]
async fn test_empty_channel_is_auth_failure() {
    let frames = drive(Vec::new(), FakeAgent::default()).await;
    assert_eq!(frames, vec![ChatFrame::error("Authentication failed")]);
}

#[tokio::test]
async fn test_request_response_sequence() {
    let agent = FakeAgent::default();
    let frames = drive(
        vec![
            auth_frame(),
            r#"{"message": "   "}"#.to_string(),
            r#"{"message": " hi there "}"#.to_string(),
        ],
        agent.clone(),
    )
    .await;

    assert_eq!(
        frames,
        vec![
            ChatFrame::connected(),
            ChatFrame::thinking(),
            ChatFrame::response("Hello from nanobot"),
        ]
    );

    let commands = agent.commands.lock().unwrap();
    assert_eq!(commands.len(), 1);
    assert!(commands[0].contains("nanobot agent --message 'hi there'"));
    assert!(agent.closed.load(Ordering::SeqCst));
}

#[tokio::test]
async fn test_failures_become_error_frames_and_channel_continues() {
    let agent = FakeAgent {
        fail: true,
        ..FakeAgent::default()
    };
    let frames = drive(
        vec![
            auth_frame(),
            "not json".to_string(),
            r#"{"message": "one"}"#.to_string(),
            r#"{"message": "two"}"#.to_string(),
        ],
        agent.clone(),
    )
    .await;

    assert_eq!(frames.len(), 6);
    assert_eq!(frames[0], ChatFrame::connected());
    assert!(matches!(&frames[1], ChatFrame::Error { message } if message.starts_with("Invalid message:")));
    assert_eq!(frames[2], ChatFrame::thinking());
    assert!(matches!(&frames[3], ChatFrame::Error { message } if message.contains("timed out")));
    assert_eq!(frames[4], ChatFrame::thinking());
    assert!(matches!(frames[5], ChatFrame::Error { .. }));
    assert!(agent.closed.load(Ordering::SeqCst));
}
