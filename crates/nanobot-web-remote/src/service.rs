//! Agent gateway restart.

use nanobot_web_core::{RemoteShell, shell};
use tracing::{info, warn};

use crate::{Nanobot, NanobotError, status::PROCESS_PATTERN};

impl<R: RemoteShell> Nanobot<R> {
    /// Restart the agent gateway.
    ///
    /// Uses systemd when the unit exists; otherwise kills any running agent
    /// and starts the gateway detached, logging to the configured log file.
    ///
    /// # Errors
    /// Returns `Failed` if the detached start did not report a PID.
    pub async fn restart(&mut self) -> Result<String, NanobotError> {
        if self
            .run("systemctl restart nanobot 2>/dev/null")
            .await?
            .success()
        {
            info!("Restarted nanobot via systemctl");
            return Ok("Restarted via systemctl".to_string());
        }

        self.run("pkill -f '[n]anobot' 2>/dev/null || true").await?;
        self.run(&format!("pkill -f '{PROCESS_PATTERN}' 2>/dev/null || true"))
            .await?;

        let program = if self.run("command -v nanobot").await?.success() {
            "nanobot gateway"
        } else {
            "python3 -m nanobot gateway"
        };

        // Only nohup may go to the background, or the channel's stdout stays open.
        let log = shell::quote_path(&self.paths().log_file)?;
        let output = self
            .run(&format!("{{ nohup {program} > {log} 2>&1 < /dev/null & }}; echo $!"))
            .await?;
        let pid = output.stdout.trim();
        if output.success() && !pid.is_empty() {
            info!(pid, "Started nanobot gateway");
            return Ok(format!("Started with PID {pid}"));
        }

        let stderr = output.stderr.trim();
        warn!(stderr, "Failed to start nanobot gateway");
        Err(NanobotError::Failed(if stderr.is_empty() {
            "Failed to start nanobot".to_string()
        } else {
            stderr.to_string()
        }))
    }
}
