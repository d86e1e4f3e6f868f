use axum::Json;
use serde::Serialize;
use serde_json::Value;

use super::{ContentBody, DataBody, ok};
use crate::{ApiResult, auth::Remote};

#[derive(Debug, Serialize)]
pub struct AgentsView {
    pub config: Value,
    pub agents_md: Option<String>,
}

pub async fn agents(remote: Remote) -> ApiResult<Json<AgentsView>> {
    remote
        .scoped(|bot| {
            Box::pin(async move {
                let config = bot.section_or_default("agents").await?;
                let agents_md = bot.agents_md().await?;
                Ok(AgentsView { config, agents_md })
            })
        })
        .await
        .map(Json)
}

pub async fn put_config(remote: Remote, Json(body): Json<DataBody>) -> ApiResult<Json<Value>> {
    remote
        .scoped(move |bot| Box::pin(async move { bot.replace_section("agents", Value::Object(body.data)).await }))
        .await?;
    Ok(ok())
}

pub async fn put_md(remote: Remote, Json(body): Json<ContentBody>) -> ApiResult<Json<Value>> {
    remote
        .scoped(move |bot| Box::pin(async move { bot.save_agents_md(&body.content).await }))
        .await?;
    Ok(ok())
}
