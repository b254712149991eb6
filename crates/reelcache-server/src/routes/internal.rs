//! Internal admin routes. Not meant to be exposed past the private network.

use crate::{response::ApiResponse, state::AppState};
use axum::{extract::State, routing::post, Json, Router};
use serde_json::{json, Value};
use tracing::info;

/// Create the internal routes router.
pub fn router() -> Router<AppState> {
    Router::new().nest("/admin", admin_routes())
}

fn admin_routes() -> Router<AppState> {
    Router::new().route("/cache/clear", post(clear_cache))
}

async fn clear_cache(State(state): State<AppState>) -> Json<ApiResponse<Value>> {
    state.cache.clear().await;

    let stats = state.cache.stats();
    info!(backend = %stats.backend, "Cache cleared via admin route");

    Json(ApiResponse::success(json!({
        "message": "Cache cleared",
        "backend": stats.backend,
    })))
}
