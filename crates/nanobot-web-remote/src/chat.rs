//! One-shot agent turns through the CLI.

use std::time::Duration;

use nanobot_web_core::{ExecOutput, RemoteShell, shell};

use crate::{Nanobot, NanobotError};

/// Timeout of the remote `timeout` wrapper, in seconds.
pub const AGENT_TIMEOUT_SECS: u64 = 120;

/// Exec timeout of an agent turn; a little above the remote one.
pub const AGENT_EXEC_TIMEOUT: Duration = Duration::from_secs(130);

/// Shown instead of the raw error when the agent has no provider key.
pub const NO_API_KEY_HINT: &str =
    "Error: No API key configured. Please go to Settings/Config to add your provider API keys.";

/// Command that runs one agent turn, falling back to the Python module.
///
/// # Errors
/// Returns error if the message cannot be quoted.
pub fn agent_command(message: &str) -> Result<String, NanobotError> {
    let message = shell::quote(message)?;
    Ok(format!(
        "timeout {AGENT_TIMEOUT_SECS} nanobot agent --message {message} 2>/dev/null || \
         timeout {AGENT_TIMEOUT_SECS} python3 -m nanobot agent --message {message} 2>/dev/null"
    ))
}

/// Turn the CLI output into the reply shown to the user.
#[must_use]
pub fn agent_reply(output: &ExecOutput) -> String {
    let stdout = output.stdout.trim();
    if !stdout.is_empty() {
        return stdout.to_string();
    }
    let stderr = output.stderr.trim();
    if !output.success() {
        if stderr.contains("No API key configured") {
            return NO_API_KEY_HINT.to_string();
        }
        let detail = if stderr.is_empty() { "Unknown error" } else { stderr };
        return format!("Error ({}): {detail}", output.exit_code);
    }
    if stderr.is_empty() {
        "No response from nanobot.".to_string()
    } else {
        stderr.to_string()
    }
}

impl<R: RemoteShell> Nanobot<R> {
    /// Send one message to the agent and return its reply.
    ///
    /// Agent-side failures are folded into the reply text.
    ///
    /// # Errors
    /// Returns error only if the command cannot run.
    pub async fn ask_agent(&mut self, message: &str) -> Result<String, NanobotError> {
        let command = agent_command(message)?;
        let output = self.run_with_timeout(&command, AGENT_EXEC_TIMEOUT).await?;
        Ok(agent_reply(&output))
    }
}

#[cfg(test)]
mod tests {
    use nanobot_web_core::RemotePaths;

    use super::*;
    use crate::testing::ScriptedShell;

    #[test]
    fn test_agent_command_quotes_message() {
        let command = agent_command("what's up; rm -rf /").unwrap();
        assert!(command.starts_with("timeout 120 nanobot agent --message "));
        assert!(command.contains(" || timeout 120 python3 -m nanobot agent --message "));
        assert!(!command.contains("--message what's"));
    }

    #[test]
    fn test_agent_reply_rules() {
        assert_eq!(agent_reply(&ExecOutput::new(" hello \n", "warn", 1)), "hello");
        assert_eq!(
            agent_reply(&ExecOutput::new("", "Error: No API key configured.", 1)),
            NO_API_KEY_HINT
        );
        assert_eq!(
            agent_reply(&ExecOutput::new("", "boom\n", 124)),
            "Error (124): boom"
        );
        assert_eq!(
            agent_reply(&ExecOutput::new("", "", 2)),
            "Error (2): Unknown error"
        );
        assert_eq!(agent_reply(&ExecOutput::new("", "note", 0)), "note");
        assert_eq!(
            agent_reply(&ExecOutput::new("", "", 0)),
            "No response from nanobot."
        );
    }

    #[tokio::test]
    async fn test_ask_agent_uses_long_timeout() {
        let shell = ScriptedShell::new().ok("nanobot agent", "Hi there!\n");
        let mut bot = Nanobot::new(shell, RemotePaths::default());
        assert_eq!(bot.ask_agent("hello").await.unwrap(), "Hi there!");
        assert_eq!(bot.into_inner().timeouts, vec![AGENT_EXEC_TIMEOUT]);
    }
}
