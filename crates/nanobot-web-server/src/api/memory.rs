use axum::Json;
use nanobot_web_remote::MemoryFile;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::ok;
use crate::{ApiResult, auth::Remote};

#[derive(Debug, Serialize)]
pub struct MemoryList {
    pub files: Vec<MemoryFile>,
}

#[derive(Debug, Deserialize)]
pub struct MemoryUpdate {
    pub path: String,
    pub content: String,
}

pub async fn list(remote: Remote) -> ApiResult<Json<MemoryList>> {
    let files = remote.scoped(|bot| Box::pin(bot.memory_files())).await?;
    Ok(Json(MemoryList { files }))
}

pub async fn update(remote: Remote, Json(body): Json<MemoryUpdate>) -> ApiResult<Json<Value>> {
    remote
        .scoped(move |bot| Box::pin(async move { bot.update_memory_file(&body.path, &body.content).await }))
        .await?;
    Ok(ok())
}
