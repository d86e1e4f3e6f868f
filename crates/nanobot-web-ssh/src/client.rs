//! Per-request SSH shell.

use std::{
    fmt,
    io::{self, Read},
    sync::Arc,
    time::{Duration, Instant},
};

use async_trait::async_trait;
use nanobot_web_core::{
    ExecOutput, RemoteError, RemoteShell, Session,
    shell::with_path_prefix,
};
use ssh2::{Channel, Session as SshSession};
use tracing::{debug, info};

use crate::connect::{CONNECT_TIMEOUT, millis, open_session};

/// Timeout of the liveness probe on an already open connection.
const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Pause between output polls when neither stream has data.
const POLL_INTERVAL: Duration = Duration::from_millis(10);

enum ConnState {
    Unconnected,
    Connected(Arc<SshSession>),
    Closed,
}

/// SSH shell bound to one session.
///
/// The connection is opened lazily by the first command, reused while it
/// answers the liveness probe, and released by [`RemoteShell::close`] or on
/// drop. A closed client stays closed.
pub struct SshClient {
    target: Session,
    connect_timeout: Duration,
    state: ConnState,
}

impl fmt::Debug for SshClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match self.state {
            ConnState::Unconnected => "unconnected",
            ConnState::Connected(_) => "connected",
            ConnState::Closed => "closed",
        };
        f.debug_struct("SshClient")
            .field("target", &self.target)
            .field("state", &state)
            .finish_non_exhaustive()
    }
}

impl SshClient {
    /// Create an unconnected client for `target`.
    #[must_use]
    pub const fn new(target: Session) -> Self {
        Self {
            target,
            connect_timeout: CONNECT_TIMEOUT,
            state: ConnState::Unconnected,
        }
    }

    /// Override the connect timeout.
    #[must_use]
    pub const fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// The session this client authenticates with.
    #[must_use]
    pub const fn target(&self) -> &Session {
        &self.target
    }

    /// Whether a connection is currently held.
    #[must_use]
    pub const fn is_connected(&self) -> bool {
        matches!(self.state, ConnState::Connected(_))
    }

    /// Whether the client has been closed.
    #[must_use]
    pub const fn is_closed(&self) -> bool {
        matches!(self.state, ConnState::Closed)
    }

    /// Make sure a live, authenticated connection is held.
    ///
    /// A held connection is probed first; if the probe fails it is dropped
    /// and a new one is opened.
    ///
    /// # Errors
    /// Returns the classified connect error, or `Closed` after [`RemoteShell::close`].
    pub async fn connect(&mut self) -> Result<Arc<SshSession>, RemoteError> {
        match &self.state {
            ConnState::Closed => return Err(RemoteError::Closed),
            ConnState::Connected(ssh) => {
                let ssh = Arc::clone(ssh);
                match run_blocking(Arc::clone(&ssh), "echo ok".to_string(), PROBE_TIMEOUT).await {
                    Ok(output) if output.success() => return Ok(ssh),
                    Ok(_) | Err(_) => {
                        debug!(host = %self.target.host, "SSH connection went stale, reconnecting");
                        self.state = ConnState::Unconnected;
                    }
                }
            }
            ConnState::Unconnected => {}
        }

        let target = self.target.clone();
        let timeout = self.connect_timeout;
        let ssh = tokio::task::spawn_blocking(move || open_session(&target, timeout))
            .await
            .map_err(|e| RemoteError::Channel(format!("SSH connect task failed: {e}")))??;

        info!(
            "Connected to {}@{}:{}",
            self.target.username, self.target.host, self.target.port
        );
        let ssh = Arc::new(ssh);
        self.state = ConnState::Connected(Arc::clone(&ssh));
        Ok(ssh)
    }
}

#[async_trait]
impl RemoteShell for SshClient {
    async fn exec(&mut self, command: &str, timeout: Duration) -> Result<ExecOutput, RemoteError> {
        let ssh = self.connect().await?;
        debug!(
            program = program_of(command),
            bytes = command.len(),
            "Executing remote command"
        );
        run_blocking(ssh, with_path_prefix(command), timeout).await
    }

    async fn close(&mut self) {
        let state = std::mem::replace(&mut self.state, ConnState::Closed);
        if let ConnState::Connected(ssh) = state {
            let _ = tokio::task::spawn_blocking(move || {
                let _ = ssh.disconnect(None, "closing", None);
            })
            .await;
            debug!(host = %self.target.host, "SSH connection closed");
        }
    }
}

impl Drop for SshClient {
    fn drop(&mut self) {
        if matches!(self.state, ConnState::Connected(_)) {
            debug!(host = %self.target.host, "Dropping open SSH connection");
        }
    }
}

async fn run_blocking(
    ssh: Arc<SshSession>,
    command: String,
    timeout: Duration,
) -> Result<ExecOutput, RemoteError> {
    tokio::task::spawn_blocking(move || exec_blocking(&ssh, &command, timeout))
        .await
        .map_err(|e| RemoteError::Channel(format!("SSH exec task failed: {e}")))?
}

/// First word of a command line. Arguments and heredoc bodies can carry
/// credentials, so only this part is logged.
fn program_of(command: &str) -> &str {
    command.split_whitespace().next().unwrap_or_default()
}

fn exec_blocking(ssh: &SshSession, command: &str, timeout: Duration) -> Result<ExecOutput, RemoteError> {
    let deadline = Instant::now() + timeout;
    ssh.set_timeout(millis(timeout));

    let mut channel = ssh.channel_session().map_err(|e| map_ssh_error(e, timeout))?;
    channel.exec(command).map_err(|e| map_ssh_error(e, timeout))?;

    ssh.set_blocking(false);
    let drained = drain(&mut channel, deadline, timeout);
    ssh.set_blocking(true);
    let (stdout, stderr) = drained?;

    channel.wait_close().map_err(|e| map_ssh_error(e, timeout))?;
    let exit_code = channel.exit_status().map_err(|e| map_ssh_error(e, timeout))?;

    Ok(ExecOutput {
        stdout: String::from_utf8_lossy(&stdout).into_owned(),
        stderr: String::from_utf8_lossy(&stderr).into_owned(),
        exit_code,
    })
}

/// Both output streams of a running command, read without blocking.
trait CommandOutput {
    fn read_stdout(&mut self, buf: &mut [u8]) -> io::Result<usize>;
    fn read_stderr(&mut self, buf: &mut [u8]) -> io::Result<usize>;
    fn finished(&self) -> bool;
}

impl CommandOutput for Channel {
    fn read_stdout(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.read(buf)
    }

    fn read_stderr(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.stderr().read(buf)
    }

    fn finished(&self) -> bool {
        self.eof()
    }
}

/// Read one chunk into `sink`; `Ok(true)` if any bytes arrived.
fn pump(
    read: io::Result<usize>,
    buf: &[u8],
    sink: &mut Vec<u8>,
    timeout: Duration,
) -> Result<bool, RemoteError> {
    match read {
        Ok(n) => {
            sink.extend_from_slice(&buf[..n]);
            Ok(n > 0)
        }
        Err(e) if e.kind() == io::ErrorKind::WouldBlock => Ok(false),
        Err(e) => Err(map_io_error(e, timeout)),
    }
}

/// Collect stdout and stderr side by side until the remote end closes.
///
/// The streams are polled in turn so neither can fill the channel window
/// while the other is awaited. `deadline` bounds the whole command.
fn drain<C: CommandOutput>(
    output: &mut C,
    deadline: Instant,
    timeout: Duration,
) -> Result<(Vec<u8>, Vec<u8>), RemoteError> {
    let mut stdout = Vec::new();
    let mut stderr = Vec::new();
    let mut buf = vec![0u8; 32 * 1024];

    loop {
        let finished = output.finished();
        let read = output.read_stdout(&mut buf);
        let mut progressed = pump(read, &buf, &mut stdout, timeout)?;
        let read = output.read_stderr(&mut buf);
        progressed |= pump(read, &buf, &mut stderr, timeout)?;

        if finished && !progressed {
            return Ok((stdout, stderr));
        }
        if Instant::now() >= deadline {
            return Err(RemoteError::Timeout(timeout));
        }
        if !progressed {
            std::thread::sleep(POLL_INTERVAL);
        }
    }
}

fn map_ssh_error(err: ssh2::Error, timeout: Duration) -> RemoteError {
    map_io_error(err.into(), timeout)
}

fn map_io_error(err: std::io::Error, timeout: Duration) -> RemoteError {
    match err.kind() {
        std::io::ErrorKind::TimedOut => RemoteError::Timeout(timeout),
        _ => RemoteError::Channel(err.to_string()),
    }
}
