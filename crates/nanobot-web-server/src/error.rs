//! API error type and its HTTP mapping.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use nanobot_web_core::{ConnectError, RemoteError, TokenError};
use nanobot_web_remote::NanobotError;
use serde_json::json;
use thiserror::Error;

/// Result type of every handler.
pub type ApiResult<T> = Result<T, ApiError>;

/// Error answered as `{"detail": message}`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Request failed: {self}");
        } else {
            tracing::debug!(status = status.as_u16(), "Request rejected: {self}");
        }
        (status, Json(json!({ "detail": self.to_string() }))).into_response()
    }
}

impl From<RemoteError> for ApiError {
    fn from(err: RemoteError) -> Self {
        match err {
            RemoteError::Connect(ConnectError::AuthFailed) => Self::Unauthorized(err.to_string()),
            other => Self::Internal(other.to_string()),
        }
    }
}

impl From<NanobotError> for ApiError {
    fn from(err: NanobotError) -> Self {
        match err {
            NanobotError::Remote(e) => e.into(),
            NanobotError::NotFound(m) => Self::NotFound(m),
            NanobotError::Conflict(m) => Self::Conflict(m),
            NanobotError::InvalidInput(m) => Self::BadRequest(m),
            NanobotError::Failed(m) => Self::Internal(m),
            e @ NanobotError::Encode(_) => Self::Internal(e.to_string()),
        }
    }
}

impl From<TokenError> for ApiError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Payload(_) => Self::Unauthorized("Invalid token payload".to_string()),
            _ => Self::Unauthorized("Invalid or expired token".to_string()),
        }
    }
}
