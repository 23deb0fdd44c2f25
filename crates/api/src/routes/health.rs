use axum::{extract::State, routing::get, Json, Router};
use serde_json::{json, Value};

use crate::state::AppState;

/// Health check routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/v1/ping", get(ping))
}

/// Full health check, including store status.
async fn health_check(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "stored": !state.store().is_empty().await,
        "persistent": state.config().site_data_path.is_some(),
        "subscribers": state.event_bus().subscriber_count(),
    }))
}

/// Lightweight ping.
async fn ping() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
