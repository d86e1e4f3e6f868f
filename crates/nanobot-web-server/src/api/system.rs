use axum::Json;
use nanobot_web_ssh::{COMMON_SSH_PORTS, PortReport, probe::PROBE_TIMEOUT, probe_ports};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::{ApiError, ApiResult};

#[derive(Debug, Deserialize)]
pub struct ConnectivityRequest {
    #[serde(default)]
    pub host: String,
}

/// Which of the usual SSH ports answer on `host`.
pub async fn test_connectivity(Json(req): Json<ConnectivityRequest>) -> ApiResult<Json<PortReport>> {
    let host = req.host.trim();
    if host.is_empty() {
        return Err(ApiError::BadRequest("Host is required".to_string()));
    }
    Ok(Json(probe_ports(host, &COMMON_SSH_PORTS, PROBE_TIMEOUT).await))
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok", "version": env!("CARGO_PKG_VERSION") }))
}
