//! The chat channel loop.
//!
//! Transport-independent: inbound text frames arrive on a stream and
//! outbound frames leave through a channel, so the loop can be driven by a
//! WebSocket or by a test.

use futures::{Stream, StreamExt};
use nanobot_web_core::{RemotePaths, RemoteShell, Session, TokenCodec};
use nanobot_web_remote::Nanobot;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, error, info, warn};

use crate::protocol::{AuthFrame, ChatFrame, ChatRequest};

/// Sent when the first frame does not carry a valid token.
pub const AUTH_FAILED: &str = "Authentication failed";

fn authenticate(first: Option<String>, tokens: &TokenCodec) -> Result<Session, String> {
    let raw = first.ok_or_else(|| "channel closed before authentication".to_string())?;
    let frame: AuthFrame = serde_json::from_str(&raw).map_err(|e| e.to_string())?;
    tokens.verify(&frame.token).map_err(|e| e.to_string())
}

/// Drive one chat channel to completion.
///
/// The first inbound frame must be `{"token": ...}`. If it is not valid, a
/// single error frame is sent and nothing else is read. Otherwise every
/// non-blank `{"message": ...}` is answered with a `thinking` frame and then
/// a `response` (or `error`) frame, one at a time. The remote connection
/// opened by `open` is closed when the inbound stream ends.
pub async fn run_chat<S, R, F>(
    mut inbound: S,
    outbound: UnboundedSender<ChatFrame>,
    tokens: &TokenCodec,
    paths: RemotePaths,
    open: F,
) where
    S: Stream<Item = String> + Unpin,
    R: RemoteShell,
    F: FnOnce(Session) -> R,
{
    let session = match authenticate(inbound.next().await, tokens) {
        Ok(session) => session,
        Err(reason) => {
            debug!(reason = %reason, "Chat authentication failed");
            let _ = outbound.send(ChatFrame::error(AUTH_FAILED));
            return;
        }
    };

    info!(host = %session.host, user = %session.username, "Chat channel connected");
    let mut bot = Nanobot::new(open(session), paths);

    if outbound.send(ChatFrame::connected()).is_ok() {
        while let Some(raw) = inbound.next().await {
            let request: ChatRequest = match serde_json::from_str(&raw) {
                Ok(request) => request,
                Err(e) => {
                    warn!("Invalid chat message: {e}");
                    if outbound.send(ChatFrame::error(format!("Invalid message: {e}"))).is_err() {
                        break;
                    }
                    continue;
                }
            };

            let message = request.message.trim();
            if message.is_empty() {
                continue;
            }
            if outbound.send(ChatFrame::thinking()).is_err() {
                break;
            }

            let frame = match bot.ask_agent(message).await {
                Ok(reply) => ChatFrame::response(reply),
                Err(e) => {
                    error!("Chat error: {e}");
                    ChatFrame::error(e.to_string())
                }
            };
            if outbound.send(frame).is_err() {
                break;
            }
        }
    }

    bot.close().await;
    info!("Chat channel closed");
}
