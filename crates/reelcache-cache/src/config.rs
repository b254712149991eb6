//! Cache configuration.

use reelcache_common_config::{vars, Environment};
use std::time::Duration;
use tracing::warn;

/// Default TTL when `CACHE_TTL` is unset (one hour).
pub const DEFAULT_TTL_SECS: u64 = 3600;
/// Default local capacity when `CACHE_MAX_SIZE` is unset.
pub const DEFAULT_MAX_SIZE: usize = 1000;
/// Default Redis address.
pub const DEFAULT_REDIS_URL: &str = "redis://localhost:6379";
/// Default bound on a single Redis round trip, well inside the upstream
/// client's own 10 second budget.
pub const DEFAULT_REDIS_TIMEOUT_MS: u64 = 2000;
/// Default period of the in-memory expiry sweep.
pub const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 30;

/// Cache configuration.
///
/// Fixed at construction; the facade never mutates it.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// TTL applied when a caller does not pass one.
    pub default_ttl: Duration,
    /// Capacity of the in-memory backend. Irrelevant to Redis.
    pub max_size: usize,
    /// Whether Redis should be attempted at all.
    pub use_redis: bool,
    /// Redis connection URL.
    pub redis_url: String,
    /// Bound on connecting to Redis and on every Redis operation.
    pub redis_timeout: Duration,
    /// Optional namespace for Redis keys.
    pub key_prefix: Option<String>,
    /// How often expired in-memory entries are swept.
    pub sweep_interval: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            default_ttl: Duration::from_secs(DEFAULT_TTL_SECS),
            max_size: DEFAULT_MAX_SIZE,
            use_redis: false,
            redis_url: DEFAULT_REDIS_URL.to_string(),
            redis_timeout: Duration::from_millis(DEFAULT_REDIS_TIMEOUT_MS),
            key_prefix: None,
            sweep_interval: Duration::from_secs(DEFAULT_SWEEP_INTERVAL_SECS),
        }
    }
}

/// Read a positive integer, falling back to `default` when the variable is
/// unset, unparsable or zero.
fn positive_or<T>(var: &str, default: T) -> T
where
    T: std::str::FromStr + PartialOrd + Default + Copy + std::fmt::Display,
{
    match Environment::get_int::<T>(var) {
        Ok(Some(value)) if value > T::default() => value,
        Ok(Some(value)) => {
            warn!(var = var, value = %value, default = %default, "Non-positive value, using default");
            default
        }
        Ok(None) => default,
        Err(e) => {
            warn!(error = %e, default = %default, "Invalid cache setting, using default");
            default
        }
    }
}

impl CacheConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            default_ttl: Duration::from_secs(positive_or(vars::CACHE_TTL, DEFAULT_TTL_SECS)),
            max_size: positive_or(vars::CACHE_MAX_SIZE, DEFAULT_MAX_SIZE),
            use_redis: Environment::get_bool(vars::USE_REDIS).unwrap_or(false),
            redis_url: Environment::get_or(vars::REDIS_URL, DEFAULT_REDIS_URL),
            redis_timeout: Duration::from_millis(positive_or(
                vars::REDIS_TIMEOUT_MS,
                DEFAULT_REDIS_TIMEOUT_MS,
            )),
            key_prefix: Environment::get(vars::REDIS_KEY_PREFIX),
            sweep_interval: Duration::from_secs(positive_or(
                vars::CACHE_SWEEP_INTERVAL,
                DEFAULT_SWEEP_INTERVAL_SECS,
            )),
        }
    }

    /// Set the default TTL.
    pub fn with_default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = ttl;
        self
    }

    /// Set the in-memory capacity.
    pub fn with_max_size(mut self, max_size: usize) -> Self {
        self.max_size = max_size;
        self
    }

    /// Request Redis at the given URL.
    pub fn with_redis(mut self, url: impl Into<String>) -> Self {
        self.use_redis = true;
        self.redis_url = url.into();
        self
    }

    /// Set the Redis timeout.
    pub fn with_redis_timeout(mut self, timeout: Duration) -> Self {
        self.redis_timeout = timeout;
        self
    }

    /// Namespace Redis keys under `prefix`.
    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = Some(prefix.into());
        self
    }
}
