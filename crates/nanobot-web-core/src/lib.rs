//! Core abstractions for the nanobot remote-management API.
//!
//! This crate provides the building blocks every other crate leans on:
//! - `Session` - SSH credential set carried inside an access token
//! - `Settings` - Environment-sourced, process-wide configuration
//! - `TokenCodec` - Signed, expiring session tokens
//! - `RemoteShell` - Command execution and file helpers against the managed host

pub mod session;
pub mod settings;
pub mod shell;
pub mod token;
pub mod traits;

pub use session::{Session, SessionInfo};
pub use settings::{RemotePaths, Settings, SettingsError};
pub use token::{TokenCodec, TokenError};
pub use traits::{ConnectError, ExecOutput, RemoteError, RemoteShell};
