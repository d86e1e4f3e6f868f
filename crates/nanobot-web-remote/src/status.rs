//! Process and host status probes.

use nanobot_web_core::RemoteShell;
use serde::Serialize;

use crate::{Nanobot, NanobotError};

/// `pgrep` pattern for the agent process; the bracket keeps `pgrep` from
/// matching the shell that runs it.
pub const PROCESS_PATTERN: &str = "[p]ython.*nanobot";

const PLACEHOLDER: &str = "?";

/// Agent process and host overview.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NanobotStatus {
    /// Whether an agent process was found.
    pub running: bool,
    /// First matching PID.
    pub pid: Option<String>,
    /// Host uptime as `uptime` prints it.
    pub uptime: Option<String>,
    /// Host facts.
    pub system: SystemInfo,
}

/// Host facts; each field is filled independently.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SystemInfo {
    /// Kernel name, release and machine.
    pub os: Option<String>,
    /// RAM usage.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory: Option<MemoryUsage>,
    /// Root filesystem usage.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disk: Option<DiskUsage>,
    /// Python version string.
    pub python: Option<String>,
}

/// The `Mem:` row of `free -h`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemoryUsage {
    pub total: String,
    pub used: String,
    pub free: String,
}

/// The `/` row of `df -h`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiskUsage {
    pub total: String,
    pub used: String,
    /// Percentage used, e.g. `42%`.
    pub usage: String,
}

/// Non-empty trimmed lines of `pgrep` output.
#[must_use]
pub fn parse_pids(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(ToString::to_string)
        .collect()
}

/// First three whitespace-separated fields, `"?"` for the missing ones.
///
/// `None` for blank output.
#[must_use]
pub fn parse_triple(stdout: &str) -> Option<[String; 3]> {
    let mut fields = stdout.split_whitespace();
    let first = fields.next()?;
    let mut next = || fields.next().unwrap_or(PLACEHOLDER).to_string();
    Some([first.to_string(), next(), next()])
}

fn trimmed(stdout: Option<String>) -> Option<String> {
    stdout.map(|s| s.trim().to_string())
}

impl<R: RemoteShell> Nanobot<R> {
    /// Collect process and host status.
    ///
    /// A probe that cannot run leaves its field empty.
    ///
    /// # Errors
    /// Returns error only if the connection itself fails.
    pub async fn status(&mut self) -> Result<NanobotStatus, NanobotError> {
        let mut status = NanobotStatus::default();

        if let Some(stdout) = self
            .probe(&format!("pgrep -f '{PROCESS_PATTERN}' || true"))
            .await?
        {
            let pids = parse_pids(&stdout);
            status.running = !pids.is_empty();
            status.pid = pids.into_iter().next();
        }

        status.uptime = trimmed(self.probe("uptime -p 2>/dev/null || uptime").await?);
        status.system.os = trimmed(self.probe("uname -srm").await?);

        let memory = self
            .probe("free -h 2>/dev/null | grep Mem | awk '{print $2, $3, $4}'")
            .await?;
        status.system.memory = memory
            .as_deref()
            .and_then(parse_triple)
            .map(|[total, used, free]| MemoryUsage { total, used, free });

        let disk = self
            .probe("df -h / | tail -1 | awk '{print $2, $3, $5}'")
            .await?;
        status.system.disk = disk
            .as_deref()
            .and_then(parse_triple)
            .map(|[total, used, usage]| DiskUsage { total, used, usage });

        status.system.python = trimmed(
            self.probe("python3 --version 2>/dev/null || python --version 2>/dev/null")
                .await?,
        );

        Ok(status)
    }
}
