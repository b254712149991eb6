//! Caching layer for Reelcache.
//!
//! The [`Cache`] facade is the only entry point callers see. It routes every
//! operation either to a shared Redis instance ([`RedisCache`]) or to a
//! bounded, TTL-expiring in-process table ([`MemoryCache`]), and it fails
//! open: backend faults degrade hit rate, never the caller's response.
//!
//! ```text
//! caller ──► Cache ──► RedisCache   (configured and healthy)
//!                 └──► MemoryCache  (default, or after Redis became unreachable)
//! ```

pub mod backend;
pub mod config;
pub mod facade;
pub mod keys;
pub mod memory;
pub mod redis;

pub use backend::{BackendKind, CacheBackend, CacheError, CacheResult};
pub use config::CacheConfig;
pub use facade::{BackendHealth, Cache, CacheStats, Lookup};
pub use keys::CacheKeyBuilder;
pub use memory::MemoryCache;
pub use self::redis::RedisCache;
