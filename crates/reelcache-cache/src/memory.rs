//! In-memory cache implementation.
//!
//! A capacity-bounded table with FIFO eviction: when full, the entry that
//! was *inserted* earliest is dropped, regardless of how often it is read.
//! Expiry is lazy (an expired entry reads as absent and is removed on the
//! spot) plus a periodic sweep, see [`MemoryCache::spawn_sweeper`].

use super::backend::{BackendKind, CacheBackend, CacheResult};
use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval, Instant, MissedTickBehavior};
use tracing::{debug, error};

/// Upper bound for expiry deadlines, so huge TTLs cannot overflow `Instant`.
const MAX_TTL: Duration = Duration::from_secs(60 * 60 * 24 * 365 * 30);

/// In-memory cache entry.
struct CacheEntry {
    value: Value,
    expires_at: Instant,
    /// Position in the insertion order.
    seq: u64,
}

impl CacheEntry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at <= now
    }
}

/// Mapping plus insertion order, always mutated together under one lock.
///
/// `order` holds exactly the keys of `entries`, each once, keyed by the
/// entry's `seq`; its first element is the oldest insertion.
#[derive(Default)]
struct Store {
    entries: HashMap<String, CacheEntry>,
    order: BTreeMap<u64, String>,
    next_seq: u64,
}

impl Store {
    fn remove(&mut self, key: &str) -> Option<CacheEntry> {
        let entry = self.entries.remove(key)?;
        self.order.remove(&entry.seq);
        Some(entry)
    }

    fn insert(&mut self, key: String, value: Value, expires_at: Instant) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.order.insert(seq, key.clone());
        self.entries.insert(key, CacheEntry { value, expires_at, seq });
    }

    fn pop_oldest(&mut self) -> Option<String> {
        let (_, key) = self.order.pop_first()?;
        self.entries.remove(&key);
        Some(key)
    }

    fn purge_expired(&mut self, now: Instant) -> usize {
        let expired: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired(now))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired {
            self.remove(key);
        }
        expired.len()
    }

    fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }

    /// Drift between the mapping and the order cannot be repaired piecemeal;
    /// the whole table is dropped instead.
    fn ensure_consistent(&mut self) {
        if self.entries.len() != self.order.len() {
            error!(
                entries = self.entries.len(),
                order = self.order.len(),
                "In-memory cache ordering drifted from its entries, clearing"
            );
            self.clear();
        }
    }
}

/// In-memory cache implementation.
pub struct MemoryCache {
    store: Mutex<Store>,
    capacity: usize,
    evictions: AtomicU64,
    expirations: AtomicU64,
}

impl MemoryCache {
    /// Create a new in-memory cache holding at most `capacity` entries.
    ///
    /// A capacity of zero is treated as one.
    pub fn new(capacity: usize) -> Self {
        Self {
            store: Mutex::new(Store::default()),
            capacity: capacity.max(1),
            evictions: AtomicU64::new(0),
            expirations: AtomicU64::new(0),
        }
    }

    /// Maximum number of entries.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of live (unexpired) entries.
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.store
            .lock()
            .entries
            .values()
            .filter(|entry| !entry.is_expired(now))
            .count()
    }

    /// Whether the cache holds no live entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total entries evicted for capacity.
    pub fn evictions(&self) -> u64 {
        self.evictions.load(Ordering::Relaxed)
    }

    /// Total entries removed because their TTL elapsed.
    pub fn expirations(&self) -> u64 {
        self.expirations.load(Ordering::Relaxed)
    }

    /// Keys currently stored, oldest insertion first.
    pub fn keys(&self) -> Vec<String> {
        self.store.lock().order.values().cloned().collect()
    }

    /// Look up a key, expiring it on read if its TTL has elapsed.
    pub fn get_value(&self, key: &str) -> Option<Value> {
        let now = Instant::now();
        let mut store = self.store.lock();

        match store.entries.get(key) {
            Some(entry) if !entry.is_expired(now) => Some(entry.value.clone()),
            Some(_) => {
                store.remove(key);
                self.expirations.fetch_add(1, Ordering::Relaxed);
                debug!(key = key, "Cache entry expired on read");
                None
            }
            None => None,
        }
    }

    /// Insert or replace a key.
    ///
    /// Replacing a key counts as a fresh insertion: it moves to the back of
    /// the eviction order and never causes another key to be evicted.
    pub fn insert(&self, key: &str, value: Value, ttl: Duration) {
        let now = Instant::now();
        let expires_at = now + ttl.min(MAX_TTL);
        let mut store = self.store.lock();

        if store.remove(key).is_none() && store.entries.len() >= self.capacity {
            let purged = store.purge_expired(now);
            if purged > 0 {
                self.expirations.fetch_add(purged as u64, Ordering::Relaxed);
            }
            if store.entries.len() >= self.capacity {
                if let Some(evicted) = store.pop_oldest() {
                    self.evictions.fetch_add(1, Ordering::Relaxed);
                    debug!(key = %evicted, "Evicted oldest cache entry");
                }
            }
        }

        store.insert(key.to_string(), value, expires_at);
        store.ensure_consistent();
    }

    /// Remove a key. Returns whether it was present.
    pub fn remove(&self, key: &str) -> bool {
        self.store.lock().remove(key).is_some()
    }

    /// Remove every entry.
    pub fn clear_all(&self) {
        self.store.lock().clear();
    }

    /// Remove every expired entry, returning how many were dropped.
    pub fn purge_expired(&self) -> usize {
        let purged = self.store.lock().purge_expired(Instant::now());
        if purged > 0 {
            self.expirations.fetch_add(purged as u64, Ordering::Relaxed);
        }
        purged
    }

    /// Start a background task that purges expired entries every `every`.
    ///
    /// The task holds only a weak reference and exits once the cache is dropped.
    pub fn spawn_sweeper(self: &Arc<Self>, every: Duration) -> JoinHandle<()> {
        let cache = Arc::downgrade(self);
        tokio::spawn(async move {
            let mut ticker = interval(every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately.
            ticker.tick().await;

            loop {
                ticker.tick().await;
                let Some(cache) = cache.upgrade() else {
                    break;
                };
                let purged = cache.purge_expired();
                if purged > 0 {
                    debug!(purged = purged, "Swept expired cache entries");
                }
            }
        })
    }
}

#[async_trait]
impl CacheBackend for MemoryCache {
    fn kind(&self) -> BackendKind {
        BackendKind::Memory
    }

    async fn get(&self, key: &str) -> CacheResult<Option<Value>> {
        Ok(self.get_value(key))
    }

    async fn set(&self, key: &str, value: &Value, ttl: Duration) -> CacheResult<()> {
        self.insert(key, value.clone(), ttl);
        Ok(())
    }

    async fn delete(&self, key: &str) -> CacheResult<()> {
        self.remove(key);
        Ok(())
    }

    async fn clear(&self) -> CacheResult<()> {
        self.clear_all();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;
    use std::collections::VecDeque;

    const HOUR: Duration = Duration::from_secs(3600);

    #[test]
    fn test_insert_and_get() {
        let cache = MemoryCache::new(10);
        cache.insert("movie:tt1375666:full", json!({"title": "Inception"}), HOUR);

        assert_eq!(
            cache.get_value("movie:tt1375666:full"),
            Some(json!({"title": "Inception"}))
        );
        assert_eq!(cache.get_value("movie:unknown:full"), None);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_fifo_eviction_ignores_reads() {
        let cache = MemoryCache::new(3);
        cache.insert("k1", json!(1), HOUR);
        cache.insert("k2", json!(2), HOUR);
        cache.insert("k3", json!(3), HOUR);

        // Reading k1 must not protect it from eviction.
        assert_eq!(cache.get_value("k1"), Some(json!(1)));

        cache.insert("k4", json!(4), HOUR);
        assert_eq!(cache.get_value("k1"), None);
        assert_eq!(cache.keys(), vec!["k2", "k3", "k4"]);
        assert_eq!(cache.evictions(), 1);
    }

    #[test]
    fn test_overwrite_moves_key_to_back_without_evicting() {
        let cache = MemoryCache::new(2);
        cache.insert("a", json!("old"), HOUR);
        cache.insert("b", json!("b"), HOUR);
        cache.insert("a", json!("new"), HOUR);

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.evictions(), 0);
        assert_eq!(cache.keys(), vec!["b", "a"]);
        assert_eq!(cache.get_value("a"), Some(json!("new")));

        cache.insert("c", json!("c"), HOUR);
        assert_eq!(cache.keys(), vec!["a", "c"]);
    }

    #[test]
    fn test_remove_and_clear() {
        let cache = MemoryCache::new(5);
        cache.insert("a", json!(1), HOUR);
        cache.insert("b", json!(2), HOUR);

        assert!(cache.remove("a"));
        assert!(!cache.remove("a"));
        assert_eq!(cache.keys(), vec!["b"]);

        cache.clear_all();
        assert!(cache.is_empty());
        assert!(cache.keys().is_empty());
        assert_eq!(cache.get_value("b"), None);
    }

    #[test]
    fn test_zero_capacity_holds_one_entry() {
        let cache = MemoryCache::new(0);
        assert_eq!(cache.capacity(), 1);
        cache.insert("a", json!(1), HOUR);
        cache.insert("b", json!(2), HOUR);
        assert_eq!(cache.keys(), vec!["b"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_entry_expires_after_ttl() {
        let cache = MemoryCache::new(10);
        cache.insert("short", json!("v"), Duration::from_secs(1));
        assert_eq!(cache.get_value("short"), Some(json!("v")));

        tokio::time::advance(Duration::from_millis(1001)).await;

        assert_eq!(cache.get_value("short"), None);
        assert!(cache.keys().is_empty());
        assert_eq!(cache.expirations(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_len_excludes_expired_entries() {
        let cache = MemoryCache::new(10);
        cache.insert("short", json!(1), Duration::from_secs(1));
        cache.insert("long", json!(2), HOUR);

        tokio::time::advance(Duration::from_secs(2)).await;

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.purge_expired(), 1);
        assert_eq!(cache.keys(), vec!["long"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_full_cache_drops_expired_before_evicting() {
        let cache = MemoryCache::new(2);
        cache.insert("live", json!(1), HOUR);
        cache.insert("stale", json!(2), Duration::from_secs(1));

        tokio::time::advance(Duration::from_secs(2)).await;
        cache.insert("fresh", json!(3), HOUR);

        assert_eq!(cache.keys(), vec!["live", "fresh"]);
        assert_eq!(cache.evictions(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_clear_is_not_undone_by_old_ttl() {
        let cache = MemoryCache::new(10);
        cache.insert("k", json!("before"), Duration::from_secs(1));
        cache.clear_all();
        cache.insert("k", json!("after"), HOUR);

        tokio::time::advance(Duration::from_secs(2)).await;

        assert_eq!(cache.get_value("k"), Some(json!("after")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweeper_purges_and_stops_with_cache() {
        let cache = Arc::new(MemoryCache::new(10));
        cache.insert("short", json!(1), Duration::from_secs(1));
        let sweeper = cache.spawn_sweeper(Duration::from_secs(5));

        tokio::time::sleep(Duration::from_secs(6)).await;
        assert!(cache.keys().is_empty());
        assert_eq!(cache.expirations(), 1);

        drop(cache);
        tokio::time::sleep(Duration::from_secs(6)).await;
        assert!(sweeper.is_finished());
    }

    #[derive(Debug, Clone)]
    enum Op {
        Insert(u8),
        Remove(u8),
        Get(u8),
        Clear,
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            6 => (0u8..12).prop_map(Op::Insert),
            2 => (0u8..12).prop_map(Op::Remove),
            2 => (0u8..12).prop_map(Op::Get),
            1 => Just(Op::Clear),
        ]
    }

    proptest! {
        #[test]
        fn test_order_tracks_entries_like_a_fifo_queue(
            capacity in 1usize..6,
            ops in prop::collection::vec(op_strategy(), 0..64)
        ) {
            let cache = MemoryCache::new(capacity);
            let mut model: VecDeque<String> = VecDeque::new();

            for op in ops {
                match op {
                    Op::Insert(k) => {
                        let key = format!("k{}", k);
                        cache.insert(&key, json!(k), HOUR);
                        if let Some(pos) = model.iter().position(|m| *m == key) {
                            model.remove(pos);
                        } else if model.len() >= capacity {
                            model.pop_front();
                        }
                        model.push_back(key);
                    }
                    Op::Remove(k) => {
                        let key = format!("k{}", k);
                        cache.remove(&key);
                        model.retain(|m| *m != key);
                    }
                    Op::Get(k) => {
                        let key = format!("k{}", k);
                        let expected = model.contains(&key).then(|| json!(k));
                        prop_assert_eq!(cache.get_value(&key), expected);
                    }
                    Op::Clear => {
                        cache.clear_all();
                        model.clear();
                    }
                }

                let keys = cache.keys();
                prop_assert!(keys.len() <= capacity);
                prop_assert_eq!(keys.len(), cache.len());
                prop_assert_eq!(keys, model.iter().cloned().collect::<Vec<_>>());
            }
        }
    }
}
