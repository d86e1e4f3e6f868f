//! TCP reachability probes for common SSH ports.

use std::{collections::BTreeMap, time::Duration};

use futures::future::join_all;
use serde::Serialize;
use tokio::net::TcpStream;
use tracing::debug;

/// Ports tried by the connectivity check.
pub const COMMON_SSH_PORTS: [u16; 9] = [22, 2222, 222, 22022, 8022, 1022, 22222, 21098, 2288];

/// Per-port timeout of the connectivity check.
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Outcome of probing one host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PortReport {
    pub host: String,
    pub results: BTreeMap<u16, bool>,
    pub open_ports: Vec<u16>,
    pub suggestion: String,
}

impl PortReport {
    fn new(host: &str, results: BTreeMap<u16, bool>) -> Self {
        let open_ports: Vec<u16> = results
            .iter()
            .filter_map(|(port, open)| open.then_some(*port))
            .collect();
        let suggestion = if open_ports.is_empty() {
            "No open SSH ports found. Server may be down or firewalled.".to_string()
        } else {
            let ports: Vec<String> = open_ports.iter().map(u16::to_string).collect();
            format!("Try ports: {}", ports.join(", "))
        };
        Self {
            host: host.to_string(),
            results,
            open_ports,
            suggestion,
        }
    }
}

/// Whether a TCP connection to `host:port` succeeds within `timeout`.
pub async fn port_open(host: &str, port: u16, timeout: Duration) -> bool {
    match tokio::time::timeout(timeout, TcpStream::connect((host, port))).await {
        Ok(Ok(_)) => true,
        Ok(Err(e)) => {
            debug!(host, port, error = %e, "Port closed");
            false
        }
        Err(_) => {
            debug!(host, port, "Port probe timed out");
            false
        }
    }
}

/// Probe every port in `ports` concurrently.
pub async fn probe_ports(host: &str, ports: &[u16], timeout: Duration) -> PortReport {
    let probes = ports.iter().map(|&port| async move {
        (port, port_open(host, port, timeout).await)
    });
    let results = join_all(probes).await.into_iter().collect();
    PortReport::new(host, results)
}
