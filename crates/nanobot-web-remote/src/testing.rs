//! Scripted shell double for unit tests.

use std::time::Duration;

use async_trait::async_trait;
use nanobot_web_core::{ExecOutput, RemoteError, RemoteShell};

#[derive(Clone)]
enum Reply {
    Output(ExecOutput),
    Timeout,
    Closed,
}

/// Answers each command with the first rule whose needle it contains, and
/// records every command it was given.
///
/// Unmatched commands exit 1 with empty output.
#[derive(Default)]
pub struct ScriptedShell {
    rules: Vec<(String, Reply)>,
    pub commands: Vec<String>,
    pub timeouts: Vec<Duration>,
    pub closed: bool,
}

impl ScriptedShell {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(mut self, needle: &str, stdout: &str, stderr: &str, exit_code: i32) -> Self {
        self.rules.push((
            needle.to_string(),
            Reply::Output(ExecOutput::new(stdout, stderr, exit_code)),
        ));
        self
    }

    pub fn ok(self, needle: &str, stdout: &str) -> Self {
        self.reply(needle, stdout, "", 0)
    }

    pub fn timeout_on(mut self, needle: &str) -> Self {
        self.rules.push((needle.to_string(), Reply::Timeout));
        self
    }

    pub fn closed_on(mut self, needle: &str) -> Self {
        self.rules.push((needle.to_string(), Reply::Closed));
        self
    }

    /// Recorded commands containing `needle`.
    pub fn matching(&self, needle: &str) -> Vec<&str> {
        self.commands
            .iter()
            .filter(|c| c.contains(needle))
            .map(String::as_str)
            .collect()
    }
}

#[async_trait]
impl RemoteShell for ScriptedShell {
    async fn exec(&mut self, command: &str, timeout: Duration) -> Result<ExecOutput, RemoteError> {
        self.commands.push(command.to_string());
        self.timeouts.push(timeout);
        let reply = self
            .rules
            .iter()
            .find(|(needle, _)| command.contains(needle.as_str()))
            .map(|(_, reply)| reply.clone());
        match reply {
            Some(Reply::Output(output)) => Ok(output),
            Some(Reply::Timeout) => Err(RemoteError::Timeout(timeout)),
            Some(Reply::Closed) => Err(RemoteError::Closed),
            None => Ok(ExecOutput::new("", "", 1)),
        }
    }

    async fn close(&mut self) {
        self.closed = true;
    }
}
