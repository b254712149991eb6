//! Success envelope.

use reelcache_cache::Lookup;
use serde::Serialize;

/// Standard API response envelope.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    /// Always `true`; failures are rendered by [`ApiError`](crate::ApiError).
    pub success: bool,
    /// Response data.
    pub data: T,
    /// Whether `data` was served from the cache. Only present on routes
    /// that go through the cache.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cached: Option<bool>,
}

impl<T> ApiResponse<T> {
    /// Create a successful response.
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data,
            cached: None,
        }
    }
}

impl<T> From<Lookup<T>> for ApiResponse<T> {
    fn from(lookup: Lookup<T>) -> Self {
        Self {
            success: true,
            data: lookup.value,
            cached: Some(lookup.cached),
        }
    }
}
