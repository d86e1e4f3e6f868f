//! Request extractors for the bearer token and the per-request connection.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use futures::future::BoxFuture;
use nanobot_web_core::{RemotePaths, Session};
use nanobot_web_remote::{Nanobot, NanobotError};
use nanobot_web_ssh::SshClient;

use crate::{AppState, ApiError, ApiResult};

/// Session recovered from a valid `Authorization: Bearer` token.
#[derive(Debug, Clone)]
pub struct Authenticated(pub Session);

fn bearer(parts: &Parts) -> Option<&str> {
    let value = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    scheme.eq_ignore_ascii_case("bearer").then(|| token.trim())
}

impl FromRequestParts<AppState> for Authenticated {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer(parts).ok_or_else(|| ApiError::Unauthorized("Not authenticated".to_string()))?;
        Ok(Self(state.tokens.verify(token)?))
    }
}

/// The request's own nanobot connection.
///
/// Nothing is opened until the first command runs.
#[derive(Debug)]
pub struct Remote {
    bot: Nanobot<SshClient>,
}

impl Remote {
    #[must_use]
    pub fn open(session: Session, paths: RemotePaths) -> Self {
        Self {
            bot: Nanobot::new(SshClient::new(session), paths),
        }
    }

    /// Run `f` against the connection, then close it whatever the outcome.
    ///
    /// # Errors
    /// Returns the mapped error of `f`.
    pub async fn scoped<T, F>(mut self, f: F) -> ApiResult<T>
    where
        F: for<'a> FnOnce(&'a mut Nanobot<SshClient>) -> BoxFuture<'a, Result<T, NanobotError>>,
    {
        let result = f(&mut self.bot).await;
        self.bot.close().await;
        result.map_err(ApiError::from)
    }
}

impl FromRequestParts<AppState> for Remote {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Authenticated(session) = Authenticated::from_request_parts(parts, state).await?;
        Ok(Self::open(session, state.settings.paths.clone()))
    }
}
