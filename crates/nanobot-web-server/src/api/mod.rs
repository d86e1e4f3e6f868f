//! HTTP routes.

mod agents;
mod auth;
mod chat;
mod config;
mod cron;
mod dashboard;
mod memory;
mod service;
mod skills;
mod system;

use axum::{
    Json, Router,
    routing::{delete, get, post, put},
};
use serde::Deserialize;
use serde_json::{Map, Value, json};

use crate::AppState;

/// Body of a section or entry replacement.
#[derive(Debug, Deserialize)]
pub struct DataBody {
    pub data: Map<String, Value>,
}

/// Body carrying a whole text file.
#[derive(Debug, Deserialize)]
pub struct ContentBody {
    pub content: String,
}

fn ok() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

fn ok_message(message: impl Into<String>) -> Json<Value> {
    Json(json!({ "status": "ok", "message": message.into() }))
}

/// All routes, without state.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/me", get(auth::me))
        .route("/api/dashboard", get(dashboard::dashboard))
        .route("/api/config", get(config::get_config).put(config::put_config))
        .route("/api/config/{section}", get(config::get_section).put(config::put_section))
        .route("/api/channels", get(config::channels))
        .route("/api/channels/{channel}", put(config::put_channel))
        .route("/api/providers", get(config::providers))
        .route("/api/providers/{provider}", put(config::put_provider))
        .route("/api/tools", get(config::tools).put(config::put_tools))
        .route("/api/agents", get(agents::agents))
        .route("/api/agents/config", put(agents::put_config))
        .route("/api/agents/md", put(agents::put_md))
        .route("/api/skills", get(skills::list).post(skills::create))
        .route("/api/skills/{name}", get(skills::get_skill).put(skills::update))
        .route("/api/memory", get(memory::list).put(memory::update))
        .route("/api/logs", get(service::logs))
        .route("/api/cron", get(cron::list).post(cron::add))
        .route("/api/cron/{id}", delete(cron::remove))
        .route("/api/cron/{id}/toggle", put(cron::toggle))
        .route("/api/cron/{id}/run", post(cron::run))
        .route("/api/service/restart", post(service::restart))
        .route("/api/test-connectivity", post(system::test_connectivity))
        .route("/api/health", get(system::health))
        .route("/ws/chat", get(chat::chat))
}
