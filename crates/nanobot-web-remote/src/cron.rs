//! Scheduled jobs.
//!
//! The jobs file is owned by the agent CLI; it is only ever read here, and
//! every mutation is one `nanobot cron` invocation.

use std::time::Duration;

use nanobot_web_core::{RemoteShell, traits::DEFAULT_TIMEOUT};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::{CliCommand, Nanobot, NanobotError};

/// Timeout of a manual job run.
pub const RUN_TIMEOUT: Duration = Duration::from_secs(60);

/// A job as stored in the jobs file.
///
/// Unknown keys are carried through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CronJob {
    /// Id assigned by the CLI.
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    /// Jobs are enabled unless the file says otherwise.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub schedule: CronSchedule,
    #[serde(default)]
    pub payload: CronPayload,
    /// Bookkeeping written by the scheduler.
    #[serde(default)]
    pub state: CronState,
    /// Keys this model does not name.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

const fn default_enabled() -> bool {
    true
}

/// When a stored job fires.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CronSchedule {
    /// `every`, `cron` or `at`, kept as stored.
    #[serde(default)]
    pub kind: String,
    /// One-shot time, Unix milliseconds.
    #[serde(default)]
    pub at_ms: Option<i64>,
    /// Interval in milliseconds.
    #[serde(default)]
    pub every_ms: Option<i64>,
    /// Cron expression.
    #[serde(default)]
    pub expr: Option<String>,
    /// Time zone of `expr`.
    #[serde(default)]
    pub tz: Option<String>,
    /// Keys this model does not name.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// What a job sends to the agent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CronPayload {
    /// Prompt handed to the agent.
    #[serde(default)]
    pub message: String,
    /// Whether the reply is forwarded to a channel.
    #[serde(default)]
    pub deliver: bool,
    /// Recipient on the delivery channel.
    #[serde(default)]
    pub to: Option<String>,
    /// Delivery channel name.
    #[serde(default)]
    pub channel: Option<String>,
    /// Keys this model does not name.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Scheduler bookkeeping; times are Unix milliseconds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CronState {
    #[serde(default)]
    pub next_run_at_ms: Option<i64>,
    #[serde(default)]
    pub last_run_at_ms: Option<i64>,
    /// Outcome of the last run, e.g. `ok` or `error`.
    #[serde(default)]
    pub last_status: Option<String>,
    #[serde(default)]
    pub last_error: Option<String>,
}

/// How a new job is scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScheduleKind {
    /// Fixed interval in seconds.
    Every,
    /// Cron expression, optionally in a time zone.
    Cron,
    /// One-shot at an ISO timestamp.
    At,
}

/// Request to create a job.
#[derive(Debug, Clone, Deserialize)]
pub struct NewCronJob {
    pub name: String,
    /// Prompt handed to the agent on each run.
    pub message: String,
    pub schedule_type: ScheduleKind,
    /// Seconds for `every`, an expression for `cron`, a timestamp for `at`.
    pub schedule_value: Value,
    #[serde(default)]
    pub tz: Option<String>,
    #[serde(default)]
    pub deliver: bool,
    #[serde(default)]
    pub to: Option<String>,
    #[serde(default)]
    pub channel: Option<String>,
}

impl NewCronJob {
    /// The `nanobot cron add` invocation for this job.
    ///
    /// # Errors
    /// Returns `InvalidInput` if the schedule value is empty or not a string
    /// or number.
    pub fn command(&self) -> Result<CliCommand, NanobotError> {
        let value = match &self.schedule_value {
            Value::String(s) => s.trim().to_string(),
            Value::Number(n) => n.to_string(),
            _ => {
                return Err(NanobotError::InvalidInput(
                    "schedule_value must be a string or a number".to_string(),
                ));
            }
        };
        if value.is_empty() {
            return Err(NanobotError::InvalidInput("schedule_value is required".to_string()));
        }

        let mut command = CliCommand::nanobot().args([
            "cron",
            "add",
            "--name",
            self.name.as_str(),
            "--message",
            self.message.as_str(),
        ]);
        command = match self.schedule_type {
            ScheduleKind::Every => command.args(["--every", value.as_str()]),
            ScheduleKind::Cron => command
                .args(["--cron", value.as_str()])
                .option("--tz", self.tz.as_deref()),
            ScheduleKind::At => command.args(["--at", value.as_str()]),
        };
        if self.deliver {
            command = command
                .arg("--deliver")
                .option("--to", self.to.as_deref())
                .option("--channel", self.channel.as_deref());
        }
        Ok(command)
    }
}

/// Decode the jobs file; jobs that do not fit the shape are skipped.
#[must_use]
pub fn parse_jobs(raw: &str) -> Vec<CronJob> {
    #[derive(Deserialize)]
    struct JobsFile {
        #[serde(default)]
        jobs: Vec<Value>,
    }

    let file: JobsFile = match serde_json::from_str(raw) {
        Ok(file) => file,
        Err(e) => {
            warn!(error = %e, "Cron jobs file is not valid JSON");
            return Vec::new();
        }
    };
    file.jobs
        .into_iter()
        .filter_map(|job| match serde_json::from_value(job) {
            Ok(job) => Some(job),
            Err(e) => {
                warn!(error = %e, "Skipping malformed cron job");
                None
            }
        })
        .collect()
}

impl<R: RemoteShell> Nanobot<R> {
    /// Jobs from the jobs file; empty when the file is missing or unreadable.
    ///
    /// # Errors
    /// Returns error if the remote command cannot run.
    pub async fn cron_jobs(&mut self) -> Result<Vec<CronJob>, NanobotError> {
        let path = self.paths().cron_jobs.clone();
        Ok(self
            .read(&path)
            .await?
            .filter(|raw| !raw.trim().is_empty())
            .map(|raw| parse_jobs(&raw))
            .unwrap_or_default())
    }

    /// Add a job through the CLI; returns its output.
    ///
    /// # Errors
    /// Returns `Failed` with the CLI's message if it exits nonzero.
    pub async fn add_cron_job(&mut self, job: &NewCronJob) -> Result<String, NanobotError> {
        let message = self.run_cli(&job.command()?, DEFAULT_TIMEOUT).await?;
        info!(name = %job.name, "Added cron job");
        Ok(message)
    }

    /// Remove a job.
    ///
    /// # Errors
    /// Returns `Failed` with the CLI's message if it exits nonzero.
    pub async fn remove_cron_job(&mut self, id: &str) -> Result<String, NanobotError> {
        let command = CliCommand::nanobot().args(["cron", "remove", id]);
        self.run_cli(&command, DEFAULT_TIMEOUT).await
    }

    /// Enable or disable a job.
    ///
    /// # Errors
    /// Returns `Failed` with the CLI's message if it exits nonzero.
    pub async fn toggle_cron_job(&mut self, id: &str, enabled: bool) -> Result<String, NanobotError> {
        let command = CliCommand::nanobot()
            .args(["cron", "enable", id])
            .flag_if("--disable", !enabled);
        self.run_cli(&command, DEFAULT_TIMEOUT).await
    }

    /// Run a job now, even if disabled.
    ///
    /// # Errors
    /// Returns `Failed` with the CLI's message if it exits nonzero.
    pub async fn run_cron_job(&mut self, id: &str) -> Result<String, NanobotError> {
        let command = CliCommand::nanobot().args(["cron", "run", id, "--force"]);
        self.run_cli(&command, RUN_TIMEOUT).await
    }
}
