use axum::{
    extract::{rejection::JsonRejection, State},
    routing::get,
    Json, Router,
};
use serde_json::Value;
use site_builder_core::Document;

use crate::error::ApiResult;
use crate::state::{announce_write, AppState};

/// The storage endpoint the editor's autosave writes to.
pub fn routes() -> Router<AppState> {
    Router::new().route("/v1/site", get(get_site).put(put_site))
}

/// The stored document, or `null` when nothing has been saved yet.
async fn get_site(State(state): State<AppState>) -> Json<Option<Document>> {
    Json(state.store().get().await)
}

async fn put_site(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<Document>> {
    let Json(raw) = body?;
    let (document, write) = state.store().put(raw).await?;
    tracing::info!(
        write,
        pages = document.pages.len(),
        updated_at = %document.updated_at,
        "Site document stored"
    );
    announce_write(state.event_bus(), &document, write);
    Ok(Json(document))
}
