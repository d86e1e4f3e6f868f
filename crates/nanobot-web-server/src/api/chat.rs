use axum::{
    extract::{State, WebSocketUpgrade},
    response::Response,
};
use nanobot_web_ssh::SshClient;
use nanobot_web_transport::websocket::serve_chat;

use crate::AppState;

/// `/ws/chat`: authentication happens on the first frame, not the upgrade.
pub async fn chat(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| {
        serve_chat(socket, state.tokens.clone(), state.settings.paths.clone(), SshClient::new)
    })
}
