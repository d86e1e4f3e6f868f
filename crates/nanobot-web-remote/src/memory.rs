//! Workspace memory files.

use nanobot_web_core::{RemoteShell, shell};
use serde::Serialize;

use crate::{Nanobot, NanobotError};

/// A file under the workspace `memory/` directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemoryFile {
    /// File name without directories.
    pub name: String,
    /// Remote path as reported by `find`.
    pub path: String,
    /// Whole file content.
    pub content: String,
}

impl<R: RemoteShell> Nanobot<R> {
    /// Every regular file under the memory directory.
    ///
    /// # Errors
    /// Returns error if a remote command cannot run.
    pub async fn memory_files(&mut self) -> Result<Vec<MemoryFile>, NanobotError> {
        let dir = shell::quote_path(&self.paths().memory_dir())?;
        let output = self
            .run(&format!("find {dir} -type f 2>/dev/null || true"))
            .await?;

        let mut files = Vec::new();
        for path in output.stdout.lines().map(str::trim).filter(|l| !l.is_empty()) {
            let content = self.read(path).await?.unwrap_or_default();
            files.push(MemoryFile {
                name: path.rsplit('/').next().unwrap_or(path).to_string(),
                path: path.to_string(),
                content: content.trim().to_string(),
            });
        }
        Ok(files)
    }

    /// Overwrite a memory file by path.
    ///
    /// # Errors
    /// Returns error if the path is blank or the write fails.
    pub async fn update_memory_file(&mut self, path: &str, content: &str) -> Result<(), NanobotError> {
        if path.trim().is_empty() {
            return Err(NanobotError::InvalidInput("Path is required".to_string()));
        }
        self.write(path, content, "Failed to save memory file").await
    }
}
