//! SSH transport for nanobot-web.
//!
//! Provides:
//! - `SshClient` - Lazily connected, per-request SSH shell
//! - Connection failure classification
//! - TCP port probes for the login screen

pub mod client;
pub mod connect;
pub mod probe;

pub use client::SshClient;
pub use probe::{COMMON_SSH_PORTS, PortReport, port_open, probe_ports};
