//! WebSocket transport for the chat channel.

use std::future::ready;

use axum::extract::ws::{Message, WebSocket};
use futures::{SinkExt, StreamExt};
use nanobot_web_core::{RemotePaths, RemoteShell, Session, TokenCodec};
use tokio::sync::mpsc;

use crate::{chat::run_chat, protocol::ChatFrame};

fn is_open(msg: &Result<Message, axum::Error>) -> bool {
    match msg {
        Ok(Message::Close(_)) => false,
        Ok(_) => true,
        Err(e) => {
            tracing::error!("WebSocket error: {e}");
            false
        }
    }
}

fn text(msg: Result<Message, axum::Error>) -> Option<String> {
    match msg {
        Ok(Message::Text(text)) => Some(text.as_str().to_owned()),
        Ok(Message::Binary(data)) => String::from_utf8(data.to_vec()).ok(),
        _ => None,
    }
}

/// Run the chat channel over an upgraded socket.
///
/// Frames are serialized on a separate task; the socket is closed once the
/// channel loop finishes.
pub async fn serve_chat<R, F>(socket: WebSocket, tokens: TokenCodec, paths: RemotePaths, open: F)
where
    R: RemoteShell,
    F: FnOnce(Session) -> R,
{
    let (mut sender, receiver) = socket.split();

    let (tx, mut rx) = mpsc::unbounded_channel::<ChatFrame>();

    let send_task = tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            let json = match serde_json::to_string(&frame) {
                Ok(j) => j,
                Err(e) => {
                    tracing::error!("Failed to serialize frame: {e}");
                    continue;
                }
            };
            if sender.send(Message::Text(json.into())).await.is_err() {
                return;
            }
        }
        let _ = sender.close().await;
    });

    let inbound = receiver
        .take_while(|msg| ready(is_open(msg)))
        .filter_map(|msg| ready(text(msg)));
    let inbound = std::pin::pin!(inbound);

    run_chat(inbound, tx, &tokens, paths, open).await;

    let _ = send_task.await;
}
