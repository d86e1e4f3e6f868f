//! Scheduled jobs, driven through the nanobot CLI.

use axum::{Json, extract::Path};
use nanobot_web_remote::{CronJob, NewCronJob};
use serde::Deserialize;
use serde_json::Value;

use super::ok_message;
use crate::{ApiResult, auth::Remote};

#[derive(Debug, Deserialize)]
pub struct ToggleBody {
    pub enabled: bool,
}

pub async fn list(remote: Remote) -> ApiResult<Json<Vec<CronJob>>> {
    remote.scoped(|bot| Box::pin(bot.cron_jobs())).await.map(Json)
}

pub async fn add(remote: Remote, Json(job): Json<NewCronJob>) -> ApiResult<Json<Value>> {
    let message = remote
        .scoped(move |bot| Box::pin(async move { bot.add_cron_job(&job).await }))
        .await?;
    Ok(ok_message(message))
}

pub async fn remove(remote: Remote, Path(id): Path<String>) -> ApiResult<Json<Value>> {
    let message = remote
        .scoped(move |bot| Box::pin(async move { bot.remove_cron_job(&id).await }))
        .await?;
    Ok(ok_message(message))
}

pub async fn toggle(remote: Remote, Path(id): Path<String>, Json(body): Json<ToggleBody>) -> ApiResult<Json<Value>> {
    let message = remote
        .scoped(move |bot| Box::pin(async move { bot.toggle_cron_job(&id, body.enabled).await }))
        .await?;
    Ok(ok_message(message))
}

pub async fn run(remote: Remote, Path(id): Path<String>) -> ApiResult<Json<Value>> {
    let message = remote
        .scoped(move |bot| Box::pin(async move { bot.run_cron_job(&id).await }))
        .await?;
    Ok(ok_message(message))
}
