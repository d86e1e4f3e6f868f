//! Workspace `AGENTS.md`.

use nanobot_web_core::RemoteShell;

use crate::{Nanobot, NanobotError};

impl<R: RemoteShell> Nanobot<R> {
    /// Contents of `AGENTS.md`, if present.
    ///
    /// # Errors
    /// Returns error if the remote command cannot run.
    pub async fn agents_md(&mut self) -> Result<Option<String>, NanobotError> {
        let path = self.paths().agents_md();
        self.read(&path).await
    }

    /// Overwrite `AGENTS.md`.
    ///
    /// # Errors
    /// Returns error if the write fails.
    pub async fn save_agents_md(&mut self, content: &str) -> Result<(), NanobotError> {
        let path = self.paths().agents_md();
        self.write(&path, content, "Failed to save AGENTS.md").await
    }
}
