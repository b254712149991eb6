//! OMDb client configuration.

use crate::client::HttpConfig;
use reelcache_common_config::{vars, Environment};
use std::time::Duration;
use tracing::warn;

/// Public OMDb endpoint.
pub const DEFAULT_API_URL: &str = "https://www.omdbapi.com/";
/// Default per-request timeout.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// OMDb client configuration.
#[derive(Debug, Clone)]
pub struct OmdbConfig {
    /// Base URL every request is sent to.
    pub api_url: String,
    /// API key sent as `apikey`. OMDb rejects keyless requests, but a
    /// missing key is not fatal at startup.
    pub api_key: Option<String>,
    /// Transport settings.
    pub http: HttpConfig,
}

impl Default for OmdbConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_key: None,
            http: HttpConfig::default(),
        }
    }
}

impl OmdbConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let timeout = match Environment::get_int::<u64>(vars::OMDB_TIMEOUT_SECS) {
            Ok(Some(secs)) if secs > 0 => secs,
            Ok(_) => DEFAULT_TIMEOUT_SECS,
            Err(e) => {
                warn!(error = %e, "Invalid OMDb timeout, using default");
                DEFAULT_TIMEOUT_SECS
            }
        };

        Self {
            api_url: Environment::get_or(vars::OMDB_API_URL, DEFAULT_API_URL),
            api_key: Environment::get(vars::OMDB_API_KEY),
            http: HttpConfig {
                request_timeout: Duration::from_secs(timeout),
                ..HttpConfig::default()
            },
        }
    }

    /// Point the client at another base URL.
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    /// Set the API key.
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.http.request_timeout = timeout;
        self
    }
}
