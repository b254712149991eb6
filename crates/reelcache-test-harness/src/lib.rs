//! Reelcache Test Harness
//!
//! Shared fixtures and mocks for the workspace's integration tests: a
//! wiremock stand-in for the OMDb API, a scriptable [`CacheBackend`]
//! double, and canned OMDb payloads.
//!
//! [`CacheBackend`]: reelcache_cache::CacheBackend

pub mod fixtures;
pub mod mocks;

use once_cell::sync::Lazy;
use tracing_subscriber::EnvFilter;

/// A Redis URL nothing listens on; connecting is refused immediately.
pub const UNREACHABLE_REDIS_URL: &str = "redis://127.0.0.1:1";

/// Initialize tracing for tests. Safe to call from every test.
pub fn init() {
    static INIT: Lazy<()> = Lazy::new(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("warn,reelcache=debug"));

        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init()
            .ok();
    });

    Lazy::force(&INIT);
}
