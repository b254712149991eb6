//! Shared application state.

use crate::config::ServerConfig;
use reelcache_cache::Cache;
use reelcache_omdb::OmdbClient;
use std::sync::Arc;

/// State handed to every handler.
#[derive(Clone)]
pub struct AppState {
    /// The process-wide cache.
    pub cache: Arc<Cache>,
    /// Upstream client.
    pub omdb: Arc<OmdbClient>,
}

impl AppState {
    /// Connect the cache and build the OMDb client.
    pub async fn new(config: &ServerConfig) -> Result<Self, anyhow::Error> {
        let cache = Cache::connect(config.cache.clone()).await;
        let omdb = OmdbClient::new(config.omdb.clone())?;
        Ok(Self::from_parts(cache, omdb))
    }

    /// Assemble state from already built parts.
    pub fn from_parts(cache: Cache, omdb: OmdbClient) -> Self {
        Self {
            cache: Arc::new(cache),
            omdb: Arc::new(omdb),
        }
    }
}
