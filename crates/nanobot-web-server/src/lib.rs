//! HTTP and WebSocket API for managing a remote nanobot over SSH.
//!
//! Every request carries an access token holding the SSH credentials; a
//! fresh SSH connection is opened for the request and closed before the
//! response is sent.

pub mod api;
pub mod app;
pub mod auth;
pub mod error;

pub use app::{AppState, router};
pub use error::{ApiError, ApiResult};
