use crate::core::clock::Clock;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

struct CacheEntry<V> {
    data: V,
    /// Insertion time, epoch millis.
    timestamp: i64,
}

/// Snapshot of the cache contents. Keys are sorted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheSnapshot {
    pub size: usize,
    pub keys: Vec<String>,
}

/// In-memory cache whose entries are valid while `now - timestamp < ttl`.
///
/// Expiry is lazy: stale entries are never returned but stay in the map
/// until [`TtlCache::evict_expired`] sweeps them.
#[derive(Clone)]
pub struct TtlCache<V>
where
    V: Clone + Send + Sync,
{
    inner: Arc<Mutex<HashMap<String, CacheEntry<V>>>>,
    ttl_millis: i64,
    clock: Arc<dyn Clock>,
}

impl<V> TtlCache<V>
where
    V: Clone + Send + Sync,
{
    pub fn new(ttl_millis: i64, clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(HashMap::new())),
            ttl_millis,
            clock,
        }
    }

    pub fn ttl_millis(&self) -> i64 {
        self.ttl_millis
    }

    fn is_valid(&self, entry: &CacheEntry<V>, now: i64) -> bool {
        now - entry.timestamp < self.ttl_millis
    }

    pub async fn get(&self, key: &str) -> Option<V> {
        let now = self.clock.now_millis();
        let cache = self.inner.lock().await;
        match cache.get(key) {
            Some(entry) if self.is_valid(entry, now) => {
                debug!("Cache HIT for key: {}", key);
                Some(entry.data.clone())
            }
            Some(_) => {
                debug!("Cache entry expired for key: {}", key);
                None
            }
            None => {
                debug!("Cache MISS for key: {}", key);
                None
            }
        }
    }

    pub async fn put(&self, key: impl Into<String>, data: V) {
        let key = key.into();
        let timestamp = self.clock.now_millis();
        let mut cache = self.inner.lock().await;
        debug!("Cache PUT for key: {}", key);
        cache.insert(key, CacheEntry { data, timestamp });
    }

    /// Removes every entry that fails the TTL check and returns how many
    /// were dropped.
    pub async fn evict_expired(&self) -> usize {
        let now = self.clock.now_millis();
        let mut cache = self.inner.lock().await;
        let before = cache.len();
        cache.retain(|_, entry| now - entry.timestamp < self.ttl_millis);
        let evicted = before - cache.len();
        if evicted > 0 {
            debug!(evicted, remaining = cache.len(), "Cache EVICT");
        }
        evicted
    }

    pub async fn snapshot(&self) -> CacheSnapshot {
        let cache = self.inner.lock().await;
        let mut keys: Vec<String> = cache.keys().cloned().collect();
        keys.sort();
        CacheSnapshot {
            size: cache.len(),
            keys,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::clock::ManualClock;

    fn cache_with_clock(ttl: i64) -> (TtlCache<i32>, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(0));
        (TtlCache::new(ttl, clock.clone()), clock)
    }

    #[tokio::test]
    async fn test_cache_get_put() {
        let (cache, _) = cache_with_clock(60_000);

        // Initially, cache is empty
        assert!(cache.get("key1").await.is_none());

        cache.put("key1", 123).await;
        assert_eq!(cache.get("key1").await, Some(123));

        // Get a non-existent key
        assert!(cache.get("key2").await.is_none());
    }

    #[tokio::test]
    async fn test_entry_stale_at_exactly_ttl() {
        let (cache, clock) = cache_with_clock(60_000);
        cache.put("key1", 1).await;

        clock.advance(59_999);
        assert_eq!(cache.get("key1").await, Some(1));

        clock.advance(1);
        assert!(cache.get("key1").await.is_none());
    }

    #[tokio::test]
    async fn test_stale_entries_kept_until_swept() {
        let (cache, clock) = cache_with_clock(100);
        cache.put("old", 1).await;
        clock.advance(150);
        cache.put("new", 2).await;

        // Lazy expiry: stale entry is hidden but still occupies a slot
        assert!(cache.get("old").await.is_none());
        assert_eq!(cache.snapshot().await.size, 2);

        assert_eq!(cache.evict_expired().await, 1);
        let snapshot = cache.snapshot().await;
        assert_eq!(snapshot.size, 1);
        assert_eq!(snapshot.keys, vec!["new".to_string()]);
    }

    #[tokio::test]
    async fn test_put_refreshes_timestamp() {
        let (cache, clock) = cache_with_clock(100);
        cache.put("key1", 1).await;
        clock.advance(80);
        cache.put("key1", 2).await;
        clock.advance(80);
        assert_eq!(cache.get("key1").await, Some(2));
        assert_eq!(cache.evict_expired().await, 0);
    }
}
