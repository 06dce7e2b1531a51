//! Liveness and status endpoints.

use axum::{Json, Router, extract::State, routing::get};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/api/health", get(status))
}

async fn health() -> &'static str {
    "ok"
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthStatus {
    pub status: &'static str,
    pub timestamp: DateTime<Utc>,
    pub version: &'static str,
    pub store: String,
    pub shopify_configured: bool,
    pub oauth_enabled: bool,
}

async fn status(State(state): State<AppState>) -> Json<HealthStatus> {
    let config = state.config();
    Json(HealthStatus {
        status: "ok",
        timestamp: Utc::now(),
        version: env!("CARGO_PKG_VERSION"),
        store: config.shopify.store.clone(),
        shopify_configured: !config.shopify.store.is_empty(),
        oauth_enabled: config.oauth().is_some(),
    })
}
