//! Agent logs.

use nanobot_web_core::{RemoteShell, shell};

use crate::{Nanobot, NanobotError};

/// Lines returned when the caller does not ask for a number.
pub const DEFAULT_LOG_LINES: u32 = 100;

impl<R: RemoteShell> Nanobot<R> {
    /// Last `lines` log lines: journald, then the detached log file, then a
    /// fixed notice.
    ///
    /// # Errors
    /// Returns error if the remote command cannot run.
    pub async fn logs(&mut self, lines: u32) -> Result<String, NanobotError> {
        let log = shell::quote_path(&self.paths().log_file)?;
        let output = self
            .run(&format!(
                "journalctl -u nanobot --no-pager -n {lines} 2>/dev/null \
                 || tail -n {lines} {log} 2>/dev/null \
                 || echo 'No logs found'"
            ))
            .await?;
        Ok(output.stdout)
    }
}
