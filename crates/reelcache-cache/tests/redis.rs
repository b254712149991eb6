//! Live Redis tests. Ignored by default; run against a scratch server with
//!
//! ```text
//! REDIS_URL=redis://127.0.0.1:6379/15 cargo test -p reelcache-cache --test redis -- --ignored
//! ```
//!
//! `clear_without_prefix_flushes_the_database` runs `FLUSHDB`, so point
//! `REDIS_URL` at a database nothing else uses.

use reelcache_cache::redis::prefixed_key;
use reelcache_cache::{BackendHealth, BackendKind, Cache, CacheBackend, CacheConfig, RedisCache};
use serde_json::json;
use std::time::Duration;

fn redis_url() -> String {
    std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string())
}

/// A prefix no other test run shares.
fn unique_prefix(test: &str) -> String {
    format!("reelcache-test:{}:{}", std::process::id(), test)
}

async fn prefixed(test: &str) -> (RedisCache, String) {
    reelcache_test_harness::init();
    let prefix = unique_prefix(test);
    let cache = RedisCache::connect(&redis_url(), Some(prefix.clone()))
        .await
        .expect("Redis reachable at REDIS_URL");
    (cache, prefix)
}

async fn unprefixed() -> RedisCache {
    RedisCache::connect(&redis_url(), None)
        .await
        .expect("Redis reachable at REDIS_URL")
}

#[tokio::test]
#[ignore = "needs a running Redis (REDIS_URL)"]
async fn set_then_get_round_trips_json() {
    let (cache, _) = prefixed("round_trip").await;
    let value = json!({"title": "Heat", "year": "1995", "ratings": [{"source": "IMDb"}]});

    cache.set("movie:tt0113277:full", &value, Duration::from_secs(60)).await.unwrap();

    assert_eq!(cache.get("movie:tt0113277:full").await.unwrap(), Some(value));
    assert_eq!(cache.get("movie:missing:full").await.unwrap(), None);

    cache.clear().await.unwrap();
}

#[tokio::test]
#[ignore = "needs a running Redis (REDIS_URL)"]
async fn entries_expire_natively() {
    let (cache, _) = prefixed("expiry").await;

    cache.set("short", &json!(1), Duration::from_millis(50)).await.unwrap();
    cache.set("long", &json!(2), Duration::from_secs(60)).await.unwrap();

    // Redis owns the clock here, so this has to be a real sleep.
    tokio::time::sleep(Duration::from_millis(200)).await;

    assert_eq!(cache.get("short").await.unwrap(), None);
    assert_eq!(cache.get("long").await.unwrap(), Some(json!(2)));

    cache.clear().await.unwrap();
}

#[tokio::test]
#[ignore = "needs a running Redis (REDIS_URL)"]
async fn delete_removes_only_that_key() {
    let (cache, _) = prefixed("delete").await;

    cache.set("a", &json!("a"), Duration::from_secs(60)).await.unwrap();
    cache.set("b", &json!("b"), Duration::from_secs(60)).await.unwrap();
    cache.delete("a").await.unwrap();
    cache.delete("never-set").await.unwrap();

    assert_eq!(cache.get("a").await.unwrap(), None);
    assert_eq!(cache.get("b").await.unwrap(), Some(json!("b")));

    cache.clear().await.unwrap();
}

#[tokio::test]
#[ignore = "needs a running Redis (REDIS_URL)"]
async fn keys_are_stored_under_the_prefix() {
    let (cache, prefix) = prefixed("layout").await;
    let raw = unprefixed().await;

    cache.set("search:Heat:1::", &json!([1, 2]), Duration::from_secs(60)).await.unwrap();

    let stored = prefixed_key(Some(&prefix), "search:Heat:1::");
    assert_eq!(raw.get(&stored).await.unwrap(), Some(json!([1, 2])));
    assert_eq!(raw.get("search:Heat:1::").await.unwrap(), None);

    cache.clear().await.unwrap();
}

#[tokio::test]
#[ignore = "needs a running Redis (REDIS_URL)"]
async fn prefixed_clear_leaves_other_keys_alone() {
    let (cache, prefix) = prefixed("scoped_clear").await;
    let (neighbour, _) = prefixed("scoped_clear_neighbour").await;

    // Enough keys to take more than one SCAN round.
    for i in 0..1200 {
        cache.set(&format!("k{}", i), &json!(i), Duration::from_secs(60)).await.unwrap();
    }
    neighbour.set("kept", &json!("kept"), Duration::from_secs(60)).await.unwrap();

    cache.clear().await.unwrap();

    assert_eq!(cache.get("k0").await.unwrap(), None);
    assert_eq!(cache.get("k1199").await.unwrap(), None);
    assert_eq!(neighbour.get("kept").await.unwrap(), Some(json!("kept")));

    let raw = unprefixed().await;
    assert_eq!(raw.get(&prefixed_key(Some(&prefix), "k42")).await.unwrap(), None);

    neighbour.clear().await.unwrap();
}

#[tokio::test]
#[ignore = "needs a dedicated Redis database (REDIS_URL); runs FLUSHDB"]
async fn clear_without_prefix_flushes_the_database() {
    reelcache_test_harness::init();
    let raw = unprefixed().await;
    let key = prefixed_key(Some(&unique_prefix("flush")), "k");

    raw.set(&key, &json!(true), Duration::from_secs(60)).await.unwrap();
    raw.clear().await.unwrap();

    assert_eq!(raw.get(&key).await.unwrap(), None);
}

#[tokio::test]
#[ignore = "needs a running Redis (REDIS_URL)"]
async fn facade_routes_to_live_redis() {
    reelcache_test_harness::init();
    let prefix = unique_prefix("facade");
    let cache = Cache::connect(
        CacheConfig::default()
            .with_redis(redis_url())
            .with_key_prefix(prefix.clone()),
    )
    .await;

    assert_eq!(cache.health(), BackendHealth::Healthy);
    assert_eq!(cache.stats().backend, BackendKind::Redis);

    cache.set("movie:tt1375666:full", &json!({"title": "Inception"})).await;
    assert_eq!(
        cache.get_value("movie:tt1375666:full").await,
        Some(json!({"title": "Inception"}))
    );
    // Persistent writes never land in memory.
    assert_eq!(cache.stats().size, 0);

    cache.clear().await;
    assert_eq!(cache.get_value("movie:tt1375666:full").await, None);
    assert_eq!(cache.health(), BackendHealth::Healthy);
}
