//! The cache facade.
//!
//! [`Cache`] picks its storage strategy once at construction and downgrades
//! to the in-memory backend the first time Redis fails. Its public operations
//! never return errors: a fault is logged and becomes a miss or a no-op.

use super::backend::{BackendKind, CacheBackend, CacheError, CacheResult};
use super::config::CacheConfig;
use super::memory::MemoryCache;
use super::redis::RedisCache;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Health of the persistent backend, as seen by the facade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendHealth {
    /// Redis was never requested. Terminal.
    Unconfigured,
    /// Redis is connected and every operation goes to it.
    Healthy,
    /// Redis failed to connect or failed an operation. Sticky for the
    /// lifetime of the facade.
    Unreachable,
}

impl BackendHealth {
    fn to_u8(self) -> u8 {
        match self {
            Self::Unconfigured => 0,
            Self::Healthy => 1,
            Self::Unreachable => 2,
        }
    }

    fn from_u8(raw: u8) -> Self {
        match raw {
            0 => Self::Unconfigured,
            1 => Self::Healthy,
            _ => Self::Unreachable,
        }
    }
}

impl fmt::Display for BackendHealth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unconfigured => f.write_str("unconfigured"),
            Self::Healthy => f.write_str("healthy"),
            Self::Unreachable => f.write_str("unreachable"),
        }
    }
}

/// Cache statistics.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    /// Backend the next operation will be routed to.
    pub backend: BackendKind,
    /// Persistent backend health.
    pub health: BackendHealth,
    /// Live entries in the in-memory backend.
    pub size: usize,
    /// In-memory capacity.
    pub capacity: usize,
    /// Default TTL in seconds.
    pub default_ttl_secs: u64,
    /// Reads that returned a usable value, across both backends.
    pub hits: u64,
    /// Reads that returned nothing: absent, expired, undecodable or failed.
    pub misses: u64,
    /// Entries the in-memory backend dropped to stay within capacity.
    /// Expiry does not count.
    pub evictions: u64,
}

impl CacheStats {
    /// Fraction of reads that were hits, `0.0` before any read.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Result of [`Cache::get_or_fetch`].
#[derive(Debug, Clone, PartialEq)]
pub struct Lookup<T> {
    /// The cached or freshly fetched value.
    pub value: T,
    /// Whether the value came from the cache.
    pub cached: bool,
}

struct Counters {
    hits: AtomicU64,
    misses: AtomicU64,
}

/// Fail-open cache over Redis with an in-memory fallback.
///
/// Construct one per process and share it behind an `Arc`.
pub struct Cache {
    config: CacheConfig,
    local: Arc<MemoryCache>,
    persistent: Option<Arc<dyn CacheBackend>>,
    health: AtomicU8,
    counters: Counters,
    sweeper: Option<JoinHandle<()>>,
}

impl Cache {
    /// Build the cache described by `config`.
    ///
    /// When Redis is requested, one connection attempt is made, bounded by
    /// `config.redis_timeout`. Failure leaves the cache on the in-memory
    /// backend with [`BackendHealth::Unreachable`]; it is never an error.
    pub async fn connect(config: CacheConfig) -> Self {
        if !config.use_redis {
            info!(capacity = config.max_size, "Using in-memory cache");
            return Self::in_memory(config);
        }

        let attempt = tokio::time::timeout(
            config.redis_timeout,
            RedisCache::connect(&config.redis_url, config.key_prefix.clone()),
        )
        .await
        .unwrap_or(Err(CacheError::Timeout(config.redis_timeout)));

        match attempt {
            Ok(redis) => {
                info!(url = %config.redis_url, "Redis connected successfully");
                Self::with_persistent(config, Arc::new(redis))
            }
            Err(e) => {
                warn!(
                    url = %config.redis_url,
                    error = %e,
                    "Failed to connect to Redis, using in-memory cache"
                );
                Self::build(config, None, BackendHealth::Unreachable)
            }
        }
    }

    /// A cache that only ever uses the in-memory backend.
    pub fn in_memory(config: CacheConfig) -> Self {
        Self::build(config, None, BackendHealth::Unconfigured)
    }

    /// A cache routed to an already connected persistent backend.
    pub fn with_persistent(config: CacheConfig, backend: Arc<dyn CacheBackend>) -> Self {
        Self::build(config, Some(backend), BackendHealth::Healthy)
    }

    fn build(
        config: CacheConfig,
        persistent: Option<Arc<dyn CacheBackend>>,
        health: BackendHealth,
    ) -> Self {
        let local = Arc::new(MemoryCache::new(config.max_size));

        // Sweeping is an optimisation; outside a runtime, expiry on read suffices.
        let sweeper = tokio::runtime::Handle::try_current()
            .ok()
            .map(|_| local.spawn_sweeper(config.sweep_interval));

        Self {
            config,
            local,
            persistent,
            health: AtomicU8::new(health.to_u8()),
            counters: Counters {
                hits: AtomicU64::new(0),
                misses: AtomicU64::new(0),
            },
            sweeper,
        }
    }

    /// Current persistent backend health.
    pub fn health(&self) -> BackendHealth {
        BackendHealth::from_u8(self.health.load(Ordering::Acquire))
    }

    /// Configuration the cache was built with.
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// The persistent backend, if the next operation should use it.
    fn persistent(&self) -> Option<Arc<dyn CacheBackend>> {
        match self.health() {
            BackendHealth::Healthy => self.persistent.clone(),
            _ => None,
        }
    }

    fn mark_unreachable(&self, error: &CacheError) {
        let flipped = self
            .health
            .compare_exchange(
                BackendHealth::Healthy.to_u8(),
                BackendHealth::Unreachable.to_u8(),
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok();

        if flipped {
            warn!(error = %error, "Redis unreachable, falling back to in-memory cache");
        }
    }

    /// Run a persistent-backend operation under the configured timeout,
    /// downgrading health on any operational failure.
    async fn guarded<T, F>(&self, op: F) -> CacheResult<T>
    where
        F: Future<Output = CacheResult<T>>,
    {
        let result = tokio::time::timeout(self.config.redis_timeout, op)
            .await
            .unwrap_or(Err(CacheError::Timeout(self.config.redis_timeout)));

        if let Err(e) = &result {
            if e.is_operational() {
                self.mark_unreachable(e);
            }
        }
        result
    }

    async fn read(&self, key: &str) -> Option<Value> {
        let result = match self.persistent() {
            Some(backend) => self.guarded(backend.get(key)).await,
            None => Ok(self.local.get_value(key)),
        };

        result.unwrap_or_else(|e| {
            warn!(key = key, error = %e, "Cache get error, treating as miss");
            None
        })
    }

    fn record(&self, key: &str, hit: bool) {
        if hit {
            self.counters.hits.fetch_add(1, Ordering::Relaxed);
            debug!(key = key, "Cache hit");
        } else {
            self.counters.misses.fetch_add(1, Ordering::Relaxed);
            debug!(key = key, "Cache miss");
        }
    }

    /// Get a raw JSON value.
    pub async fn get_value(&self, key: &str) -> Option<Value> {
        let value = self.read(key).await;
        self.record(key, value.is_some());
        value
    }

    /// Get a value, decoding it as `T`. A value that does not decode is a miss.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let decoded = match self.read(key).await {
            Some(value) => match serde_json::from_value(value) {
                Ok(decoded) => Some(decoded),
                Err(e) => {
                    warn!(key = key, error = %e, "Cached value has unexpected shape, treating as miss");
                    None
                }
            },
            None => None,
        };
        self.record(key, decoded.is_some());
        decoded
    }

    /// Store a raw JSON value with an explicit TTL.
    pub async fn set_value(&self, key: &str, value: Value, ttl: Duration) {
        let result = match self.persistent() {
            Some(backend) => self.guarded(backend.set(key, &value, ttl)).await,
            None => {
                self.local.insert(key, value, ttl);
                Ok(())
            }
        };

        match result {
            Ok(()) => debug!(key = key, ttl_secs = ttl.as_secs(), "Cache set"),
            Err(e) => warn!(key = key, error = %e, "Cache set error"),
        }
    }

    /// Store a value with the default TTL.
    pub async fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) {
        self.set_with_ttl(key, value, self.config.default_ttl).await;
    }

    /// Store a value with an explicit TTL.
    pub async fn set_with_ttl<T: Serialize + ?Sized>(&self, key: &str, value: &T, ttl: Duration) {
        match serde_json::to_value(value) {
            Ok(value) => self.set_value(key, value, ttl).await,
            Err(e) => warn!(key = key, error = %e, "Cache value not serializable, skipping set"),
        }
    }

    /// Delete a key. Deleting an absent key is a no-op.
    pub async fn delete(&self, key: &str) {
        let result = match self.persistent() {
            Some(backend) => self.guarded(backend.delete(key)).await,
            None => {
                self.local.remove(key);
                Ok(())
            }
        };

        match result {
            Ok(()) => debug!(key = key, "Cache delete"),
            Err(e) => warn!(key = key, error = %e, "Cache delete error"),
        }
    }

    /// Remove every entry from the active backend.
    pub async fn clear(&self) {
        let result = match self.persistent() {
            Some(backend) => self.guarded(backend.clear()).await,
            None => {
                self.local.clear_all();
                Ok(())
            }
        };

        match result {
            Ok(()) => info!("Cache cleared"),
            Err(e) => warn!(error = %e, "Cache clear error"),
        }
    }

    /// Cache-aside: return the cached value for `key`, or run `fetch`, cache
    /// its successful result with the default TTL and return it.
    ///
    /// Fetch errors are returned unchanged and never cached.
    pub async fn get_or_fetch<T, E, F, Fut>(&self, key: &str, fetch: F) -> Result<Lookup<T>, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if let Some(value) = self.get::<T>(key).await {
            return Ok(Lookup { value, cached: true });
        }

        let value = fetch().await?;
        self.set(key, &value).await;

        Ok(Lookup { value, cached: false })
    }

    /// Snapshot of the cache's configuration and counters.
    pub fn stats(&self) -> CacheStats {
        let backend = match self.persistent() {
            Some(backend) => backend.kind(),
            None => BackendKind::Memory,
        };

        CacheStats {
            backend,
            health: self.health(),
            size: self.local.len(),
            capacity: self.local.capacity(),
            default_ttl_secs: self.config.default_ttl.as_secs(),
            hits: self.counters.hits.load(Ordering::Relaxed),
            misses: self.counters.misses.load(Ordering::Relaxed),
            evictions: self.local.evictions(),
        }
    }
}

impl Drop for Cache {
    fn drop(&mut self) {
        if let Some(sweeper) = self.sweeper.take() {
            sweeper.abort();
        }
    }
}
