//! Route configuration for the Reelcache API server.

mod internal;
mod movies;
mod system;

use crate::{config::ServerConfig, error::ApiError, state::AppState};
use axum::{
    http::{HeaderName, HeaderValue, Method},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    catch_panic::CatchPanicLayer,
    compression::CompressionLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
};
use tracing::warn;

const REQUEST_ID: &str = "x-request-id";

/// Create the main application router.
pub fn create_router(state: AppState, config: &ServerConfig) -> Router {
    let common_middleware = ServiceBuilder::new()
        .layer(SetRequestIdLayer::new(
            HeaderName::from_static(REQUEST_ID),
            MakeRequestUuid,
        ))
        .layer(PropagateRequestIdLayer::new(HeaderName::from_static(REQUEST_ID)))
        .layer(CatchPanicLayer::new())
        .layer(TimeoutLayer::new(config.request_timeout))
        .layer(CompressionLayer::new())
        .layer(cors_layer(config.cors_origin.as_deref()));

    Router::new()
        .nest("/api", api_routes())
        .nest("/internal", internal::router())
        .fallback(fallback_handler)
        .layer(common_middleware)
        .with_state(state)
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/movies", movies::router())
        .merge(system::router())
}

fn cors_layer(origin: Option<&str>) -> CorsLayer {
    let allow_origin = match origin.map(HeaderValue::from_str) {
        Some(Ok(origin)) => AllowOrigin::exact(origin),
        Some(Err(e)) => {
            warn!(error = %e, "Invalid CORS_ORIGIN, allowing any origin");
            AllowOrigin::from(Any)
        }
        None => AllowOrigin::from(Any),
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any)
}

async fn fallback_handler() -> ApiError {
    ApiError::NotFound("Route not found".into())
}
