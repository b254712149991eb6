//! Reelcache Server Binary

use anyhow::Result;
use reelcache_common_config::Environment;
use reelcache_common_log::LogConfig;
use reelcache_server::{Server, ServerConfig};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // .env files first so they can configure logging
    Environment::init()?;
    reelcache_common_log::init(LogConfig::from_env())?;

    let config = ServerConfig::from_env();

    info!(version = env!("CARGO_PKG_VERSION"), "Starting Reelcache server");

    let server = Server::new(config).await?;
    server.run().await?;

    info!("Server shutdown complete");
    Ok(())
}
