//! Agent CLI command building.

use nanobot_web_core::{ExecOutput, RemoteError, shell};

use crate::NanobotError;

/// Program name of the agent CLI.
pub const NANOBOT_BIN: &str = "nanobot";

/// Builder for a single agent CLI invocation.
///
/// Every word is quoted when the command line is built.
#[derive(Debug, Clone)]
pub struct CliCommand {
    program: String,
    args: Vec<String>,
}

impl CliCommand {
    /// Start a command for `program`.
    #[must_use]
    pub fn new<S: Into<String>>(program: S) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Start a `nanobot` command.
    #[must_use]
    pub fn nanobot() -> Self {
        Self::new(NANOBOT_BIN)
    }

    /// Append one argument.
    #[must_use]
    pub fn arg<S: Into<String>>(mut self, arg: S) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several arguments.
    #[must_use]
    pub fn args<I>(mut self, args: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Append `flag value` when `value` is present and non-empty.
    #[must_use]
    pub fn option<S: AsRef<str>>(self, flag: &str, value: Option<S>) -> Self {
        match value {
            Some(v) if !v.as_ref().is_empty() => self.args([flag, v.as_ref()]),
            _ => self,
        }
    }

    /// Append `flag` when `enabled` holds.
    #[must_use]
    pub fn flag_if(self, flag: &str, enabled: bool) -> Self {
        if enabled { self.arg(flag) } else { self }
    }

    /// Build the quoted command line.
    ///
    /// # Errors
    /// Returns error if an argument cannot be quoted.
    pub fn build(&self) -> Result<String, RemoteError> {
        shell::join(std::iter::once(self.program.as_str()).chain(self.args.iter().map(String::as_str)))
    }
}

/// Success flag and message of a CLI invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliOutcome {
    pub success: bool,
    pub message: String,
}

impl CliOutcome {
    /// Trimmed stdout on success; stderr, else stdout, on failure.
    #[must_use]
    pub fn from_output(output: &ExecOutput) -> Self {
        if output.success() {
            return Self {
                success: true,
                message: output.stdout.trim().to_string(),
            };
        }
        let stderr = output.stderr.trim();
        let message = if stderr.is_empty() {
            let stdout = output.stdout.trim();
            if stdout.is_empty() {
                format!("Command failed with exit code {}", output.exit_code)
            } else {
                stdout.to_string()
            }
        } else {
            stderr.to_string()
        };
        Self {
            success: false,
            message,
        }
    }

    /// The message, or [`NanobotError::Failed`] carrying it.
    ///
    /// # Errors
    /// Returns error if the invocation failed.
    pub fn into_result(self) -> Result<String, NanobotError> {
        if self.success {
            Ok(self.message)
        } else {
            Err(NanobotError::Failed(self.message))
        }
    }
}
