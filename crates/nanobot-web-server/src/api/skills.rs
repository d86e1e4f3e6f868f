use axum::{Json, extract::Path};
use nanobot_web_remote::Skill;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use super::{ContentBody, ok};
use crate::{ApiResult, auth::Remote};

#[derive(Debug, Serialize)]
pub struct SkillList {
    pub skills: Vec<Skill>,
}

#[derive(Debug, Deserialize)]
pub struct NewSkill {
    pub name: String,
    pub content: String,
}

pub async fn list(remote: Remote) -> ApiResult<Json<SkillList>> {
    let skills = remote.scoped(|bot| Box::pin(bot.skills())).await?;
    Ok(Json(SkillList { skills }))
}

pub async fn get_skill(remote: Remote, Path(name): Path<String>) -> ApiResult<Json<Skill>> {
    remote
        .scoped(move |bot| Box::pin(async move { bot.skill(&name).await }))
        .await
        .map(Json)
}

pub async fn create(remote: Remote, Json(body): Json<NewSkill>) -> ApiResult<Json<Value>> {
    let NewSkill { name, content } = body;
    let created = name.clone();
    remote
        .scoped(move |bot| Box::pin(async move { bot.create_skill(&created, &content).await }))
        .await?;
    Ok(Json(json!({ "status": "ok", "name": name })))
}

pub async fn update(remote: Remote, Path(name): Path<String>, Json(body): Json<ContentBody>) -> ApiResult<Json<Value>> {
    remote
        .scoped(move |bot| Box::pin(async move { bot.update_skill(&name, &body.content).await }))
        .await?;
    Ok(ok())
}
