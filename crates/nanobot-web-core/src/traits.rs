//! Remote shell trait and the remote error taxonomy.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::shell;

/// Default per-command timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Captured result of one remote command.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecOutput {
    /// Everything written to standard output.
    pub stdout: String,
    /// Everything written to standard error.
    pub stderr: String,
    /// Exit status; nonzero means failure.
    pub exit_code: i32,
}

impl ExecOutput {
    /// Create an output record.
    #[must_use]
    pub fn new(stdout: impl Into<String>, stderr: impl Into<String>, exit_code: i32) -> Self {
        Self {
            stdout: stdout.into(),
            stderr: stderr.into(),
            exit_code,
        }
    }

    /// Whether the command exited with status zero.
    #[must_use]
    pub const fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Why an SSH connection could not be established.
///
/// The messages are shown to the user as-is, so each one says what to check.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectError {
    #[error("Authentication failed. Check username/password.")]
    AuthFailed,
    #[error("SSH protocol error: {0}")]
    Protocol(String),
    #[error("Host key verification failed.")]
    HostKey,
    #[error(
        "Cannot connect to {host}:{port}. Server may be down, port may be blocked, or SSH service not running."
    )]
    Unreachable { host: String, port: u16 },
    #[error("{0}")]
    Network(String),
    #[error("Connection failed: {0}")]
    Unknown(String),
}

impl ConnectError {
    /// Remediation hints for the login screen.
    #[must_use]
    pub fn suggestions(&self) -> &'static [&'static str] {
        match self {
            Self::Unreachable { .. } => &[
                "Check if the server is running and accessible",
                "Verify the IP address is correct",
                "Try different SSH ports (22, 2222, 22022, etc.)",
                "Check if SSH service is running on the server",
                "Verify firewall rules allow SSH connections",
            ],
            Self::AuthFailed => &[
                "Verify username and password are correct",
                "Check if SSH key authentication is required instead",
            ],
            Self::Network(_) => &[
                "Check network connectivity",
                "Verify the IP address is reachable from this network",
            ],
            Self::Protocol(_) | Self::HostKey | Self::Unknown(_) => &[],
        }
    }

    /// Error message followed by the suggestion list, if any.
    #[must_use]
    pub fn with_suggestions(&self) -> String {
        let suggestions = self.suggestions();
        if suggestions.is_empty() {
            return self.to_string();
        }
        let bullets: Vec<String> = suggestions.iter().map(|s| format!("• {s}")).collect();
        format!("{self}\n\nSuggestions:\n{}", bullets.join("\n"))
    }
}

/// Remote execution error.
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error(transparent)]
    Connect(#[from] ConnectError),
    #[error("Remote command timed out after {0:?}")]
    Timeout(Duration),
    #[error("SSH channel error: {0}")]
    Channel(String),
    #[error("Remote session is closed")]
    Closed,
    #[error("Invalid shell argument: {0}")]
    Quote(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A shell on the managed host.
///
/// Implementations own at most one live transport. The file helpers are
/// built purely on [`RemoteShell::exec`].
#[async_trait]
pub trait RemoteShell: Send {
    /// Run `command` and capture its output, waiting at most `timeout`.
    async fn exec(&mut self, command: &str, timeout: Duration) -> Result<ExecOutput, RemoteError>;

    /// Release the transport. Calling it again is a no-op.
    async fn close(&mut self) {}

    /// Read a remote file; `None` if `cat` exits nonzero.
    async fn read_file(&mut self, path: &str) -> Result<Option<String>, RemoteError> {
        let command = shell::read_file_command(path)?;
        let output = self.exec(&command, DEFAULT_TIMEOUT).await?;
        Ok(output.success().then_some(output.stdout))
    }

    /// Write a remote file, creating its parent directory.
    ///
    /// Returns whether the remote write succeeded.
    async fn write_file(&mut self, path: &str, content: &str) -> Result<bool, RemoteError> {
        let command = shell::write_file_command(path, content)?;
        let output = self.exec(&command, DEFAULT_TIMEOUT).await?;
        if !output.success() {
            tracing::warn!(path, stderr = %output.stderr.trim(), "Remote write failed");
        }
        Ok(output.success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Recorder {
        commands: Vec<String>,
        reply: ExecOutput,
    }

    #[async_trait]
    impl RemoteShell for Recorder {
        async fn exec(&mut self, command: &str, _timeout: Duration) -> Result<ExecOutput, RemoteError> {
            self.commands.push(command.to_string());
            Ok(self.reply.clone())
        }
    }

    #[tokio::test]
    async fn test_read_file_absent_on_failure() {
        let mut shell = Recorder {
            commands: Vec::new(),
            reply: ExecOutput::new("", "cat: nope: No such file", 1),
        };
        assert_eq!(shell.read_file("/etc/nope").await.unwrap(), None);
        assert_eq!(shell.commands, vec!["cat /etc/nope"]);
    }

    #[tokio::test]
    async fn test_read_file_returns_stdout() {
        let mut shell = Recorder {
            commands: Vec::new(),
            reply: ExecOutput::new("{\"a\": 1}", "", 0),
        };
        assert_eq!(
            shell.read_file("~/.nanobot/config.json").await.unwrap().as_deref(),
            Some("{\"a\": 1}")
        );
        assert_eq!(shell.commands, vec!["cat \"$HOME\"/.nanobot/config.json"]);
    }

    #[tokio::test]
    async fn test_write_file_reports_exit_status() {
        let mut shell = Recorder {
            commands: Vec::new(),
            reply: ExecOutput::new("", "Permission denied", 1),
        };
        assert!(!shell.write_file("/root/x", "data").await.unwrap());
        assert!(shell.commands[0].contains("<< 'NANOBOT_EOF'"));
    }

    #[test]
    fn test_unreachable_has_suggestions() {
        let err = ConnectError::Unreachable {
            host: "10.0.0.9".into(),
            port: 22,
        };
        let text = err.with_suggestions();
        assert!(text.starts_with("Cannot connect to 10.0.0.9:22."));
        assert!(text.contains("Suggestions:\n• Check if the server is running"));
    }

    #[test]
    fn test_unknown_has_no_suggestions() {
        let err = ConnectError::Unknown("boom".into());
        assert_eq!(err.with_suggestions(), "Connection failed: boom");
    }
}
