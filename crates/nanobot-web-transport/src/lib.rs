//! Chat transport for nanobot-web.
//!
//! Provides:
//! - Wire protocol (JSON frames tagged by `type`)
//! - The transport-independent chat channel loop
//! - WebSocket adapter (feature: websocket)

pub mod chat;
pub mod protocol;

#[cfg(feature = "websocket")]
pub mod websocket;

pub use chat::run_chat;
pub use protocol::{AuthFrame, ChatFrame, ChatRequest};
