//! Shared state and the router.

use std::sync::Arc;

use axum::Router;
use nanobot_web_core::{Settings, TokenCodec};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::api;

/// Application state shared across handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub tokens: TokenCodec,
}

impl AppState {
    #[must_use]
    pub fn new(settings: Settings) -> Self {
        let tokens = TokenCodec::from_settings(&settings);
        Self {
            settings: Arc::new(settings),
            tokens,
        }
    }
}

/// Full application router.
pub fn router(state: AppState) -> Router {
    api::routes()
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
