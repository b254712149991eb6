//! Cache backend trait definition.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::time::Duration;

/// Cache operation result.
///
/// `Ok(Some(_))` is a hit, `Ok(None)` a miss and `Err(_)` an internal fault
/// that the [`Cache`](crate::Cache) facade never lets reach its callers.
pub type CacheResult<T> = Result<T, CacheError>;

/// Cache errors.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("Backend error: {0}")]
    Backend(String),
    #[error("Connection error: {0}")]
    Connection(String),
    #[error("Operation timed out after {0:?}")]
    Timeout(Duration),
}

impl CacheError {
    /// Whether the error means the backend itself is failing, as opposed to a
    /// single value that could not be encoded or decoded.
    pub fn is_operational(&self) -> bool {
        !matches!(self, Self::Serialization(_))
    }
}

impl From<serde_json::Error> for CacheError {
    fn from(err: serde_json::Error) -> Self {
        CacheError::Serialization(err.to_string())
    }
}

/// Storage strategy behind the facade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Network-attached Redis instance.
    Redis,
    /// Bounded in-process table.
    Memory,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Redis => f.write_str("redis"),
            Self::Memory => f.write_str("memory"),
        }
    }
}

/// Cache backend trait.
///
/// Keys are opaque strings and values opaque JSON documents; backends must
/// not inspect or rewrite either.
#[async_trait]
pub trait CacheBackend: Send + Sync {
    /// Which storage strategy this backend implements.
    fn kind(&self) -> BackendKind;

    /// Get a value from cache.
    async fn get(&self, key: &str) -> CacheResult<Option<Value>>;

    /// Set a value in cache with TTL, fully replacing any previous entry.
    async fn set(&self, key: &str, value: &Value, ttl: Duration) -> CacheResult<()>;

    /// Delete a value from cache. Deleting an absent key is not an error.
    async fn delete(&self, key: &str) -> CacheResult<()>;

    /// Clear all cache entries.
    async fn clear(&self) -> CacheResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operational_errors() {
        assert!(CacheError::Connection("refused".into()).is_operational());
        assert!(CacheError::Backend("WRONGTYPE".into()).is_operational());
        assert!(CacheError::Timeout(Duration::from_millis(5)).is_operational());
        assert!(!CacheError::Serialization("bad json".into()).is_operational());
    }

    #[test]
    fn test_serde_error_conversion() {
        let err = serde_json::from_str::<Value>("{not json").unwrap_err();
        assert!(matches!(CacheError::from(err), CacheError::Serialization(_)));
    }

    #[test]
    fn test_backend_kind_display() {
        assert_eq!(BackendKind::Redis.to_string(), "redis");
        assert_eq!(BackendKind::Memory.to_string(), "memory");
        assert_eq!(serde_json::to_string(&BackendKind::Memory).unwrap(), "\"memory\"");
    }
}
