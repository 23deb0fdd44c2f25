pub mod health;
pub mod site;
pub mod templates;

use axum::Router;

use crate::state::AppState;

/// Assemble the full router with all route groups.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(health::routes())
        .merge(site::routes())
        .merge(templates::routes())
        .with_state(state)
}
