use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{any, get},
    Router,
};
use shared::protocol::CERTIDAO_ROUTE;
use tower_http::trace::TraceLayer;

pub mod config;
mod relay;

use config::Settings;

#[derive(Clone)]
pub struct AppState {
    pub http: reqwest::Client,
    pub downstream_url: String,
}

impl AppState {
    pub fn new(downstream_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            downstream_url: downstream_url.into(),
        }
    }
}

/// The body cap is enforced when the relay handler reads the payload, so method checks come first
/// and oversized bodies still get a JSON envelope.
pub fn build_router(state: Arc<AppState>, max_body_bytes: usize) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route(CERTIDAO_ROUTE, any(relay::relay_certidao))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub fn router_from_settings(settings: &Settings) -> Router {
    build_router(
        Arc::new(AppState::new(settings.downstream_url.clone())),
        settings.max_body_bytes,
    )
}

async fn healthz() -> &'static str {
    "ok"
}
