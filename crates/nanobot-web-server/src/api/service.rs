use axum::{Json, extract::Query};
use nanobot_web_remote::logs::DEFAULT_LOG_LINES;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::ok_message;
use crate::{ApiResult, auth::Remote};

#[derive(Debug, Deserialize)]
pub struct LogsQuery {
    #[serde(default = "default_lines")]
    pub lines: u32,
}

const fn default_lines() -> u32 {
    DEFAULT_LOG_LINES
}

#[derive(Debug, Serialize)]
pub struct LogsView {
    pub logs: String,
}

pub async fn logs(remote: Remote, Query(query): Query<LogsQuery>) -> ApiResult<Json<LogsView>> {
    let lines = query.lines;
    let logs = remote.scoped(move |bot| Box::pin(bot.logs(lines))).await?;
    Ok(Json(LogsView { logs }))
}

pub async fn restart(remote: Remote) -> ApiResult<Json<Value>> {
    let message = remote.scoped(|bot| Box::pin(bot.restart())).await?;
    Ok(ok_message(message))
}
