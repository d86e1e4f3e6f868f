//! The accessor facade over one remote shell.

use std::time::Duration;

use nanobot_web_core::{ExecOutput, RemoteError, RemotePaths, RemoteShell, traits::DEFAULT_TIMEOUT};
use tracing::debug;

use crate::{CliCommand, CliOutcome, NanobotError};

/// Typed view of the nanobot installation reachable through `R`.
///
/// Owns the shell for the duration of one request or chat channel. Every
/// operation is a handful of commands and file reads on that one shell.
#[derive(Debug)]
pub struct Nanobot<R> {
    shell: R,
    paths: RemotePaths,
}

impl<R: RemoteShell> Nanobot<R> {
    /// Wrap a shell.
    #[must_use]
    pub const fn new(shell: R, paths: RemotePaths) -> Self {
        Self { shell, paths }
    }

    /// Remote file locations.
    #[must_use]
    pub const fn paths(&self) -> &RemotePaths {
        &self.paths
    }

    /// The underlying shell.
    pub const fn shell_mut(&mut self) -> &mut R {
        &mut self.shell
    }

    /// Unwrap the shell.
    #[must_use]
    pub fn into_inner(self) -> R {
        self.shell
    }

    /// Release the remote connection.
    pub async fn close(&mut self) {
        self.shell.close().await;
    }

    pub(crate) async fn run(&mut self, command: &str) -> Result<ExecOutput, NanobotError> {
        self.run_with_timeout(command, DEFAULT_TIMEOUT).await
    }

    pub(crate) async fn run_with_timeout(
        &mut self,
        command: &str,
        timeout: Duration,
    ) -> Result<ExecOutput, NanobotError> {
        Ok(self.shell.exec(command, timeout).await?)
    }

    /// Best-effort command: stdout, or `None` when the command could not run.
    ///
    /// Losing the connection is still an error.
    pub(crate) async fn probe(&mut self, command: &str) -> Result<Option<String>, NanobotError> {
        match self.shell.exec(command, DEFAULT_TIMEOUT).await {
            Ok(output) => Ok(Some(output.stdout)),
            Err(err @ (RemoteError::Connect(_) | RemoteError::Closed)) => Err(err.into()),
            Err(err) => {
                debug!(command, error = %err, "Status probe failed");
                Ok(None)
            }
        }
    }

    pub(crate) async fn run_cli(
        &mut self,
        command: &CliCommand,
        timeout: Duration,
    ) -> Result<String, NanobotError> {
        let line = command.build()?;
        let output = self.run_with_timeout(&line, timeout).await?;
        CliOutcome::from_output(&output).into_result()
    }

    pub(crate) async fn read(&mut self, path: &str) -> Result<Option<String>, NanobotError> {
        Ok(self.shell.read_file(path).await?)
    }

    pub(crate) async fn write(
        &mut self,
        path: &str,
        content: &str,
        failure: &str,
    ) -> Result<(), NanobotError> {
        if self.shell.write_file(path, content).await? {
            Ok(())
        } else {
            Err(NanobotError::Failed(failure.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedShell;

    #[tokio::test]
    async fn test_probe_swallows_timeouts_only() {
        let mut bot = Nanobot::new(
            ScriptedShell::new().timeout_on("uptime").closed_on("uname"),
            RemotePaths::default(),
        );
        assert_eq!(bot.probe("uptime -p").await.unwrap(), None);
        assert!(matches!(
            bot.probe("uname -srm").await,
            Err(NanobotError::Remote(RemoteError::Closed))
        ));
    }

    #[tokio::test]
    async fn test_write_failure_carries_message() {
        let mut bot = Nanobot::new(
            ScriptedShell::new().reply("cat >", "", "denied", 1),
            RemotePaths::default(),
        );
        let err = bot.write("/x", "y", "Failed to save thing").await.unwrap_err();
        assert_eq!(err.to_string(), "Failed to save thing");
    }

    #[tokio::test]
    async fn test_close_reaches_shell() {
        let mut bot = Nanobot::new(ScriptedShell::new(), RemotePaths::default());
        bot.close().await;
        assert!(bot.into_inner().closed);
    }
}
