//! SSH credential set reconstructed from an access token.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Credentials for the managed host.
///
/// Never persisted server-side: a `Session` lives inside a signed token and is
/// rebuilt from it on every request.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Remote hostname or IP.
    pub host: String,
    /// Remote SSH port.
    pub port: u16,
    /// Login user.
    pub username: String,
    /// Login password, used only to re-authenticate the SSH connection.
    pub password: String,
}

impl Session {
    /// Create a new session.
    #[must_use]
    pub fn new(
        host: impl Into<String>,
        port: u16,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            port,
            username: username.into(),
            password: password.into(),
        }
    }

    /// Public view of the session, without the password.
    #[must_use]
    pub fn info(&self) -> SessionInfo {
        SessionInfo {
            host: self.host.clone(),
            port: self.port,
            username: self.username.clone(),
        }
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Session details that are safe to hand back to the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionInfo {
    pub host: String,
    pub port: u16,
    pub username: String,
}
