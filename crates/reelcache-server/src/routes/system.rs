//! Health and cache introspection.

use crate::{response::ApiResponse, state::AppState};
use axum::{extract::State, response::IntoResponse, routing::get, Json, Router};
use reelcache_cache::CacheStats;
use serde_json::json;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/cache/stats", get(cache_stats))
}

async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION"),
        "cache": state.cache.stats(),
    }))
}

async fn cache_stats(State(state): State<AppState>) -> Json<ApiResponse<CacheStats>> {
    Json(ApiResponse::success(state.cache.stats()))
}
