//! Config document and its named sections.

use axum::{Json, extract::Path};
use nanobot_web_remote::config::ConfigDocument;
use serde::Deserialize;
use serde_json::Value;

use super::{DataBody, ok};
use crate::{ApiError, ApiResult, auth::Remote};

#[derive(Debug, Deserialize)]
pub struct ConfigBody {
    pub config: ConfigDocument,
}

pub async fn get_config(remote: Remote) -> ApiResult<Json<ConfigDocument>> {
    remote
        .scoped(|bot| Box::pin(bot.config()))
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Config file not found on server".to_string()))
}

pub async fn put_config(remote: Remote, Json(body): Json<ConfigBody>) -> ApiResult<Json<Value>> {
    remote
        .scoped(move |bot| Box::pin(async move { bot.save_config(&body.config).await }))
        .await?;
    Ok(ok())
}

pub async fn get_section(remote: Remote, Path(section): Path<String>) -> ApiResult<Json<Value>> {
    remote
        .scoped(move |bot| Box::pin(async move { bot.section(&section).await }))
        .await
        .map(Json)
}

pub async fn put_section(
    remote: Remote,
    Path(section): Path<String>,
    Json(body): Json<DataBody>,
) -> ApiResult<Json<Value>> {
    replace_section(remote, section, body).await
}

async fn section_or_default(remote: Remote, name: &'static str) -> ApiResult<Json<Value>> {
    remote
        .scoped(move |bot| Box::pin(bot.section_or_default(name)))
        .await
        .map(Json)
}

async fn replace_section(remote: Remote, name: String, body: DataBody) -> ApiResult<Json<Value>> {
    remote
        .scoped(move |bot| Box::pin(async move { bot.replace_section(&name, Value::Object(body.data)).await }))
        .await?;
    Ok(ok())
}

async fn replace_entry(remote: Remote, section: &'static str, key: String, body: DataBody) -> ApiResult<Json<Value>> {
    remote
        .scoped(move |bot| Box::pin(async move { bot.replace_entry(section, &key, Value::Object(body.data)).await }))
        .await?;
    Ok(ok())
}

pub async fn channels(remote: Remote) -> ApiResult<Json<Value>> {
    section_or_default(remote, "channels").await
}

pub async fn put_channel(
    remote: Remote,
    Path(channel): Path<String>,
    Json(body): Json<DataBody>,
) -> ApiResult<Json<Value>> {
    replace_entry(remote, "channels", channel, body).await
}

pub async fn providers(remote: Remote) -> ApiResult<Json<Value>> {
    section_or_default(remote, "providers").await
}

pub async fn put_provider(
    remote: Remote,
    Path(provider): Path<String>,
    Json(body): Json<DataBody>,
) -> ApiResult<Json<Value>> {
    replace_entry(remote, "providers", provider, body).await
}

pub async fn tools(remote: Remote) -> ApiResult<Json<Value>> {
    section_or_default(remote, "tools").await
}

pub async fn put_tools(remote: Remote, Json(body): Json<DataBody>) -> ApiResult<Json<Value>> {
    replace_section(remote, "tools".to_string(), body).await
}
