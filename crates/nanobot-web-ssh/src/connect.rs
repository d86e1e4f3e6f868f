//! Blocking SSH session establishment and failure classification.

use std::{
    io,
    net::{SocketAddr, TcpStream, ToSocketAddrs},
    time::Duration,
};

use nanobot_web_core::{ConnectError, Session};
use ssh2::Session as SshSession;

/// TCP, banner and authentication timeout.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Open and authenticate an SSH session.
///
/// Password authentication only: no agent, no key lookup. Any host key is
/// accepted.
///
/// # Errors
/// Returns the classified connection failure.
pub fn open_session(target: &Session, timeout: Duration) -> Result<SshSession, ConnectError> {
    let tcp = connect_tcp(target, timeout)?;
    tcp.set_read_timeout(Some(timeout)).ok();
    tcp.set_write_timeout(Some(timeout)).ok();

    let mut session = SshSession::new().map_err(|e| ConnectError::Unknown(e.to_string()))?;
    session.set_timeout(millis(timeout));
    session.set_tcp_stream(tcp);
    session
        .handshake()
        .map_err(|e| classify_handshake(target, e))?;

    if session.host_key().is_none() {
        return Err(ConnectError::HostKey);
    }

    session
        .userauth_password(&target.username, &target.password)
        .map_err(|_| ConnectError::AuthFailed)?;
    if !session.authenticated() {
        return Err(ConnectError::AuthFailed);
    }

    Ok(session)
}

fn connect_tcp(target: &Session, timeout: Duration) -> Result<TcpStream, ConnectError> {
    let addrs: Vec<SocketAddr> = (target.host.as_str(), target.port)
        .to_socket_addrs()
        .map_err(|e| classify_io(target, &e))?
        .collect();

    let mut last_err = io::Error::new(io::ErrorKind::NotFound, "host resolved to no addresses");
    for addr in addrs {
        match TcpStream::connect_timeout(&addr, timeout) {
            Ok(stream) => return Ok(stream),
            Err(e) => last_err = e,
        }
    }
    Err(classify_io(target, &last_err))
}

/// Map a socket-level failure onto the user-facing taxonomy.
#[must_use]
pub fn classify_io(target: &Session, err: &io::Error) -> ConnectError {
    match err.kind() {
        io::ErrorKind::TimedOut | io::ErrorKind::ConnectionRefused => unreachable(target),
        io::ErrorKind::HostUnreachable => no_route(target),
        io::ErrorKind::NetworkUnreachable => network_down(),
        _ => classify_message(target, &err.to_string()),
    }
}

fn classify_handshake(target: &Session, err: ssh2::Error) -> ConnectError {
    let message = err.message().to_string();
    let io_err: io::Error = err.into();
    match io_err.kind() {
        io::ErrorKind::TimedOut => unreachable(target),
        _ => ConnectError::Protocol(message),
    }
}

fn classify_message(target: &Session, message: &str) -> ConnectError {
    let lower = message.to_lowercase();
    if lower.contains("timed out") || lower.contains("timeout") || lower.contains("connection refused") {
        unreachable(target)
    } else if lower.contains("no route to host") {
        no_route(target)
    } else if lower.contains("network is unreachable") {
        network_down()
    } else {
        ConnectError::Unknown(message.to_string())
    }
}

fn unreachable(target: &Session) -> ConnectError {
    ConnectError::Unreachable {
        host: target.host.clone(),
        port: target.port,
    }
}

fn no_route(target: &Session) -> ConnectError {
    ConnectError::Network(format!(
        "No route to host {}. Check the IP address and network connectivity.",
        target.host
    ))
}

fn network_down() -> ConnectError {
    ConnectError::Network("Network unreachable. Check your internet connection.".to_string())
}

pub(crate) fn millis(duration: Duration) -> u32 {
    u32::try_from(duration.as_millis()).unwrap_or(u32::MAX)
}
