//! Accessor error type.

use nanobot_web_core::RemoteError;
use thiserror::Error;

/// Error raised by a [`Nanobot`](crate::Nanobot) operation.
#[derive(Debug, Error)]
pub enum NanobotError {
    #[error(transparent)]
    Remote(#[from] RemoteError),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    InvalidInput(String),
    /// The remote command ran but reported failure.
    #[error("{0}")]
    Failed(String),
    #[error("Failed to encode JSON: {0}")]
    Encode(#[from] serde_json::Error),
}
