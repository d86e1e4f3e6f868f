//! Local shell stand-in for the remote host.

#![allow(dead_code)]

use std::{
    fs,
    os::unix::fs::PermissionsExt,
    path::{Path, PathBuf},
    time::Duration,
};

use async_trait::async_trait;
use nanobot_web_core::{ExecOutput, RemoteError, RemotePaths, RemoteShell, shell::with_path_prefix};
use nanobot_web_remote::Nanobot;
use tempfile::TempDir;
use tokio::process::Command;

/// Runs commands with `<program> -c` and `HOME` pointed at a scratch
/// directory. `$HOME/bin` comes first on `PATH`, so tools installed there
/// shadow the host's.
pub struct LocalShell {
    program: &'static str,
    home: TempDir,
    pub closed: bool,
}

impl LocalShell {
    /// POSIX `sh`.
    pub fn new() -> Self {
        Self::with_program("sh")
    }

    /// `bash`, the usual login shell of an SSH account.
    pub fn bash() -> Self {
        Self::with_program("bash")
    }

    fn with_program(program: &'static str) -> Self {
        let home = tempfile::tempdir().unwrap();
        fs::create_dir(home.path().join("bin")).unwrap();
        Self {
            program,
            home,
            closed: false,
        }
    }

    pub fn home(&self) -> &Path {
        self.home.path()
    }

    /// Install an executable shell script as `$HOME/bin/<name>`.
    pub fn install_tool(&self, name: &str, body: &str) -> PathBuf {
        let path = self.home.path().join("bin").join(name);
        fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path
    }
}

#[async_trait]
impl RemoteShell for LocalShell {
    async fn exec(&mut self, command: &str, timeout: Duration) -> Result<ExecOutput, RemoteError> {
        let path = format!(
            "{}:{}",
            self.home.path().join("bin").display(),
            std::env::var("PATH").unwrap_or_default()
        );
        let output = Command::new(self.program)
            .arg("-c")
            .arg(with_path_prefix(command))
            .env("HOME", self.home.path())
            .env("PATH", path)
            .output();
        let output = tokio::time::timeout(timeout, output)
            .await
            .map_err(|_| RemoteError::Timeout(timeout))??;
        Ok(ExecOutput::new(
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr),
            output.status.code().unwrap_or(-1),
        ))
    }

    async fn close(&mut self) {
        self.closed = true;
    }
}

/// Accessors over a fresh scratch home with the default remote layout.
pub fn local_nanobot() -> Nanobot<LocalShell> {
    Nanobot::new(LocalShell::new(), RemotePaths::default())
}

/// Like [`local_nanobot`], with the log file kept inside the scratch home.
pub fn nanobot_on(shell: LocalShell) -> Nanobot<LocalShell> {
    let paths = RemotePaths {
        log_file: shell.home().join("nanobot.log").display().to_string(),
        ..RemotePaths::default()
    };
    Nanobot::new(shell, paths)
}
