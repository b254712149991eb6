//! Server configuration.

use reelcache_cache::CacheConfig;
use reelcache_common_config::{vars, Environment};
use reelcache_omdb::OmdbConfig;
use std::net::{AddrParseError, SocketAddr};
use std::time::Duration;
use tracing::warn;

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_request_timeout() -> u64 {
    30
}

/// Main server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host to bind to.
    pub host: String,
    /// Port to bind to.
    pub port: u16,
    /// Allowed CORS origin. `None` allows any origin.
    pub cors_origin: Option<String>,
    /// Whole-request timeout.
    pub request_timeout: Duration,
    /// Cache configuration.
    pub cache: CacheConfig,
    /// OMDb client configuration.
    pub omdb: OmdbConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origin: None,
            request_timeout: Duration::from_secs(default_request_timeout()),
            cache: CacheConfig::default(),
            omdb: OmdbConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let port = match Environment::get_int::<u16>(vars::PORT) {
            Ok(Some(port)) if port > 0 => port,
            Ok(_) => default_port(),
            Err(e) => {
                warn!(error = %e, "Invalid port, using default");
                default_port()
            }
        };

        let request_timeout = match Environment::get_int::<u64>(vars::REQUEST_TIMEOUT_SECS) {
            Ok(Some(secs)) if secs > 0 => secs,
            Ok(_) => default_request_timeout(),
            Err(e) => {
                warn!(error = %e, "Invalid request timeout, using default");
                default_request_timeout()
            }
        };

        Self {
            host: Environment::get_or(vars::HOST, &default_host()),
            port,
            cors_origin: Environment::get(vars::CORS_ORIGIN),
            request_timeout: Duration::from_secs(request_timeout),
            cache: CacheConfig::from_env(),
            omdb: OmdbConfig::from_env(),
        }
    }

    /// Address to bind to.
    pub fn socket_addr(&self) -> Result<SocketAddr, AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }
}
