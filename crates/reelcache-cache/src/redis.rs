//! Redis cache implementation.

use super::backend::{BackendKind, CacheBackend, CacheError, CacheResult};
use ::redis::aio::MultiplexedConnection;
use ::redis::{AsyncCommands, RedisError};
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// Keys deleted per `DEL` when clearing a prefixed keyspace.
const SCAN_BATCH: usize = 500;

/// Redis cache implementation.
///
/// Values are stored as JSON text with Redis' native per-key expiry, so
/// entries disappear on their own once their TTL elapses.
pub struct RedisCache {
    conn: MultiplexedConnection,
    prefix: Option<String>,
}

fn connection_error(err: RedisError) -> CacheError {
    CacheError::Connection(err.to_string())
}

fn backend_error(err: RedisError) -> CacheError {
    if err.is_io_error() || err.is_connection_dropped() || err.is_connection_refusal() {
        CacheError::Connection(err.to_string())
    } else if err.is_timeout() {
        CacheError::Backend(format!("timed out: {}", err))
    } else {
        CacheError::Backend(err.to_string())
    }
}

impl RedisCache {
    /// Connect to Redis at `url` and verify the connection with `PING`.
    ///
    /// With a `prefix`, every key is stored as `<prefix>:<key>` and
    /// [`clear`](CacheBackend::clear) only removes keys under that prefix.
    /// Without one the whole logical database belongs to this cache.
    pub async fn connect(url: &str, prefix: Option<String>) -> CacheResult<Self> {
        let client = ::redis::Client::open(url).map_err(connection_error)?;
        let mut conn = client
            .get_multiplexed_tokio_connection()
            .await
            .map_err(connection_error)?;

        let _: String = ::redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(connection_error)?;

        Ok(Self {
            conn,
            prefix: prefix.filter(|p| !p.is_empty()),
        })
    }

    fn key(&self, key: &str) -> String {
        prefixed_key(self.prefix.as_deref(), key)
    }

    async fn delete_prefixed(&self, prefix: &str) -> CacheResult<u64> {
        let mut conn = self.conn.clone();
        let pattern = format!("{}:*", prefix);
        let mut cursor: u64 = 0;
        let mut deleted: u64 = 0;

        loop {
            let (next, keys): (u64, Vec<String>) = ::redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(&pattern)
                .arg("COUNT")
                .arg(SCAN_BATCH)
                .query_async(&mut conn)
                .await
                .map_err(backend_error)?;

            if !keys.is_empty() {
                let removed: u64 = conn.del(keys).await.map_err(backend_error)?;
                deleted += removed;
            }

            if next == 0 {
                break;
            }
            cursor = next;
        }

        Ok(deleted)
    }
}

/// Key as stored in Redis: `<prefix>:<key>`, or `key` unchanged without a prefix.
pub fn prefixed_key(prefix: Option<&str>, key: &str) -> String {
    match prefix {
        Some(prefix) => format!("{}:{}", prefix, key),
        None => key.to_string(),
    }
}

/// Redis `PX` argument for a TTL; sub-millisecond TTLs round up to 1ms.
fn ttl_millis(ttl: Duration) -> u64 {
    u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX).max(1)
}

#[async_trait]
impl CacheBackend for RedisCache {
    fn kind(&self) -> BackendKind {
        BackendKind::Redis
    }

    async fn get(&self, key: &str) -> CacheResult<Option<Value>> {
        let mut conn = self.conn.clone();
        let full_key = self.key(key);

        let result: Option<String> = conn.get(&full_key).await.map_err(backend_error)?;

        match result {
            Some(data) => {
                let value: Value = serde_json::from_str(&data)?;
                debug!(key = key, "Redis cache hit");
                Ok(Some(value))
            }
            None => {
                debug!(key = key, "Redis cache miss");
                Ok(None)
            }
        }
    }

    async fn set(&self, key: &str, value: &Value, ttl: Duration) -> CacheResult<()> {
        let mut conn = self.conn.clone();
        let full_key = self.key(key);
        let serialized = serde_json::to_string(value)?;

        let _: () = ::redis::cmd("SET")
            .arg(&full_key)
            .arg(serialized)
            .arg("PX")
            .arg(ttl_millis(ttl))
            .query_async(&mut conn)
            .await
            .map_err(backend_error)?;

        debug!(key = key, ttl_ms = ttl_millis(ttl), "Redis cache set");
        Ok(())
    }

    async fn delete(&self, key: &str) -> CacheResult<()> {
        let mut conn = self.conn.clone();
        let full_key = self.key(key);

        let _: () = conn.del(&full_key).await.map_err(backend_error)?;

        debug!(key = key, "Redis cache delete");
        Ok(())
    }

    async fn clear(&self) -> CacheResult<()> {
        match &self.prefix {
            Some(prefix) => {
                let deleted = self.delete_prefixed(prefix).await?;
                debug!(prefix = %prefix, deleted = deleted, "Redis cache cleared prefix");
            }
            None => {
                let mut conn = self.conn.clone();
                let _: () = ::redis::cmd("FLUSHDB")
                    .query_async(&mut conn)
                    .await
                    .map_err(backend_error)?;
                debug!("Redis cache flushed");
            }
        }
        Ok(())
    }
}
