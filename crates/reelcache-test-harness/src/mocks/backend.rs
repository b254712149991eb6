//! Scriptable persistent cache backend.

use async_trait::async_trait;
use parking_lot::Mutex;
use reelcache_cache::{BackendKind, CacheBackend, CacheError, CacheResult};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// How the mock backend misbehaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureMode {
    /// Behave like a healthy Redis.
    None,
    /// Fail every call with a connection error.
    Connection,
    /// Fail every call with a serialization error.
    Serialization,
    /// Never answer.
    Hang,
}

/// In-memory stand-in for Redis with switchable failure modes.
///
/// Reports itself as [`BackendKind::Redis`] so facade routing can be
/// observed through `stats()`.
pub struct MockBackend {
    entries: Mutex<HashMap<String, (Value, Duration)>>,
    mode: Mutex<FailureMode>,
    calls: AtomicUsize,
}

impl MockBackend {
    /// A healthy mock backend.
    pub fn new() -> Self {
        Self::failing(FailureMode::None)
    }

    /// A mock backend starting in the given failure mode.
    pub fn failing(mode: FailureMode) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            mode: Mutex::new(mode),
            calls: AtomicUsize::new(0),
        }
    }

    /// Switch failure mode.
    pub fn set_mode(&self, mode: FailureMode) {
        *self.mode.lock() = mode;
    }

    /// Number of operations the backend received.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Whether the backend stores `key`.
    pub fn contains(&self, key: &str) -> bool {
        self.entries.lock().contains_key(key)
    }

    /// TTL the backend was asked to apply to `key`.
    pub fn ttl_of(&self, key: &str) -> Option<Duration> {
        self.entries.lock().get(key).map(|(_, ttl)| *ttl)
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Whether the backend stores nothing.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    async fn enter(&self) -> CacheResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mode = *self.mode.lock();
        match mode {
            FailureMode::None => Ok(()),
            FailureMode::Connection => Err(CacheError::Connection("connection refused".into())),
            FailureMode::Serialization => Err(CacheError::Serialization("invalid JSON".into())),
            FailureMode::Hang => {
                std::future::pending::<()>().await;
                Ok(())
            }
        }
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheBackend for MockBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Redis
    }

    async fn get(&self, key: &str) -> CacheResult<Option<Value>> {
        self.enter().await?;
        Ok(self.entries.lock().get(key).map(|(value, _)| value.clone()))
    }

    async fn set(&self, key: &str, value: &Value, ttl: Duration) -> CacheResult<()> {
        self.enter().await?;
        self.entries
            .lock()
            .insert(key.to_string(), (value.clone(), ttl));
        Ok(())
    }

    async fn delete(&self, key: &str) -> CacheResult<()> {
        self.enter().await?;
        self.entries.lock().remove(key);
        Ok(())
    }

    async fn clear(&self) -> CacheResult<()> {
        self.enter().await?;
        self.entries.lock().clear();
        Ok(())
    }
}
