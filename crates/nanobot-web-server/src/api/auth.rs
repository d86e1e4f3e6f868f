use axum::{Json, extract::State};
use nanobot_web_core::{RemoteError, RemoteShell, SessionInfo};
use nanobot_web_ssh::SshClient;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{ApiError, ApiResult, AppState, auth::Authenticated};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: &'static str,
}

/// Verify the SSH credentials with a throwaway connection, then issue a token.
pub async fn login(State(state): State<AppState>, Json(req): Json<LoginRequest>) -> ApiResult<Json<TokenResponse>> {
    let session = state
        .settings
        .default_target
        .complete(req.host, req.port, req.username, req.password);
    if session.host.trim().is_empty() {
        return Err(ApiError::BadRequest("Host is required".to_string()));
    }

    let mut client = SshClient::new(session.clone());
    let connected = client.connect().await.map(drop);
    client.close().await;

    if let Err(e) = connected {
        warn!("Login to {}@{}:{} failed: {e}", session.username, session.host, session.port);
        let detail = match e {
            RemoteError::Connect(err) => err.with_suggestions(),
            other => other.to_string(),
        };
        return Err(ApiError::Unauthorized(detail));
    }

    let access_token = state
        .tokens
        .issue(&session)
        .map_err(|e| ApiError::Internal(format!("Failed to issue token: {e}")))?;
    info!("Issued token for {}@{}:{}", session.username, session.host, session.port);

    Ok(Json(TokenResponse {
        access_token,
        token_type: "bearer",
    }))
}

pub async fn me(Authenticated(session): Authenticated) -> Json<SessionInfo> {
    Json(session.info())
}
