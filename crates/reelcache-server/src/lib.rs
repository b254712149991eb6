//! Reelcache API Server
//!
//! HTTP front for OMDb. Every movie lookup goes through the process-wide
//! [`Cache`](reelcache_cache::Cache) before reaching the upstream API, so
//! repeated queries are answered without another network round trip.
//!
//! # Routes
//!
//! - `GET /api/movies/search` - title search
//! - `GET /api/movies/:id` - details by IMDb id
//! - `GET /api/movies/title/:title` - details by exact title
//! - `GET /api/health`, `GET /api/cache/stats`
//! - `POST /internal/admin/cache/clear`

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod response;
pub mod routes;
pub mod state;

pub use config::ServerConfig;
pub use error::{ApiError, ApiResult};
pub use state::AppState;

use axum::Router;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

/// Server builder for constructing and running the API server.
pub struct Server {
    config: ServerConfig,
    state: AppState,
}

impl Server {
    /// Create a new server, connecting the cache and building the OMDb client.
    pub async fn new(config: ServerConfig) -> Result<Self, anyhow::Error> {
        let state = AppState::new(&config).await?;
        Ok(Self { config, state })
    }

    /// Create a server around existing state.
    pub fn with_state(config: ServerConfig, state: AppState) -> Self {
        Self { config, state }
    }

    /// Build the router with all routes and middleware.
    pub fn router(&self) -> Router {
        routes::create_router(self.state.clone(), &self.config).layer(TraceLayer::new_for_http())
    }

    /// Run the server until Ctrl-C or SIGTERM.
    pub async fn run(self) -> Result<(), anyhow::Error> {
        let addr = self.addr()?;
        let listener = TcpListener::bind(addr).await?;

        let stats = self.state.cache.stats();
        info!(
            addr = %addr,
            cache_backend = %stats.backend,
            cache_health = %stats.health,
            "Server listening"
        );

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        let stats = self.state.cache.stats();
        info!(hits = stats.hits, misses = stats.misses, "Server stopped");

        Ok(())
    }

    /// Get the server's socket address.
    pub fn addr(&self) -> Result<SocketAddr, anyhow::Error> {
        Ok(self.config.socket_addr()?)
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown");
}
