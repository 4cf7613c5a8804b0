use std::{
    collections::HashMap,
    sync::Mutex,
    time::{Duration, Instant},
};

use async_trait::async_trait;

use crate::{Cache, CacheError};

struct Entry<V> {
    value: V,
    expire_at: Option<Instant>,
}

impl<V> Entry<V> {
    fn is_expired(&self, now: Instant) -> bool {
        self.expire_at.map(|at| at <= now).unwrap_or(false)
    }
}

struct Inner<V> {
    entries: HashMap<String, Entry<V>>,
    /// keys ordered least- to most-recently used
    recency: Vec<String>,
}

/// Fixed-capacity in-memory cache with a uniform TTL and least-recently-used
/// eviction. A TTL of zero means entries never expire. Shared across workers,
/// so the map and recency list sit behind one mutex; every operation takes
/// the lock exactly once.
pub struct MemoryCache<V> {
    capacity: usize,
    ttl: Duration,
    inner: Mutex<Inner<V>>,
}

impl<V: Clone> MemoryCache<V> {
    pub fn new(capacity: usize, ttl: Duration) -> Result<Self, CacheError> {
        if capacity == 0 {
            return Err(CacheError::InvalidConfig(
                "memory cache capacity must be positive".to_owned(),
            ));
        }
        Ok(Self {
            capacity,
            ttl,
            inner: Mutex::new(Inner {
                entries: HashMap::new(),
                recency: Vec::new(),
            }),
        })
    }

    fn expire_at(&self, now: Instant) -> Option<Instant> {
        if self.ttl.is_zero() {
            None
        } else {
            Some(now + self.ttl)
        }
    }

    fn lookup(&self, key: &str) -> Option<V> {
        let now = Instant::now();
        let mut inner = self.inner.lock().unwrap_or_else(|poison| poison.into_inner());

        let expired = match inner.entries.get(key) {
            None => return None,
            Some(entry) => entry.is_expired(now),
        };
        if expired {
            inner.entries.remove(key);
            inner.recency.retain(|k| k != key);
            return None;
        }

        let value = inner.entries.get(key).map(|entry| entry.value.clone());
        // move to the most-recently-used end
        inner.recency.retain(|k| k != key);
        inner.recency.push(key.to_owned());
        value
    }

    fn store(&self, key: &str, value: V) {
        let now = Instant::now();
        let mut inner = self.inner.lock().unwrap_or_else(|poison| poison.into_inner());

        if inner.entries.remove(key).is_some() {
            inner.recency.retain(|k| k != key);
        } else if inner.entries.len() >= self.capacity {
            // prefer reclaiming an expired slot over evicting live data
            let victim = inner
                .recency
                .iter()
                .find(|k| {
                    inner
                        .entries
                        .get(*k)
                        .map(|entry| entry.is_expired(now))
                        .unwrap_or(false)
                })
                .cloned()
                .unwrap_or_else(|| inner.recency[0].clone());
            inner.entries.remove(&victim);
            inner.recency.retain(|k| *k != victim);
        }

        inner.entries.insert(
            key.to_owned(),
            Entry {
                value,
                expire_at: self.expire_at(now),
            },
        );
        inner.recency.push(key.to_owned());
    }

    /// Drops every expired entry.
    pub fn clean_expired(&self) {
        let now = Instant::now();
        let mut inner = self.inner.lock().unwrap_or_else(|poison| poison.into_inner());
        inner.entries.retain(|_, entry| !entry.is_expired(now));
        let entries = &inner.entries;
        let retained: Vec<String> = inner
            .recency
            .iter()
            .filter(|k| entries.contains_key(*k))
            .cloned()
            .collect();
        inner.recency = retained;
    }

    /// Current live entries in least- to most-recently-used order.
    pub fn entries(&self) -> Vec<(String, V)> {
        let now = Instant::now();
        let inner = self.inner.lock().unwrap_or_else(|poison| poison.into_inner());
        inner
            .recency
            .iter()
            .filter_map(|key| {
                inner
                    .entries
                    .get(key)
                    .filter(|entry| !entry.is_expired(now))
                    .map(|entry| (key.clone(), entry.value.clone()))
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        let inner = self.inner.lock().unwrap_or_else(|poison| poison.into_inner());
        inner.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl<V> Cache<V> for MemoryCache<V>
where
    V: Clone + Send + Sync,
{
    async fn get(&self, key: &str) -> Option<V> {
        self.lookup(key)
    }

    async fn put(&self, key: &str, value: V) {
        self.store(key, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cache(capacity: usize, ttl: Duration) -> MemoryCache<i32> {
        MemoryCache::new(capacity, ttl).unwrap()
    }

    #[tokio::test]
    async fn put_then_get_returns_the_value() {
        let cache = cache(4, Duration::ZERO);
        cache.put("a|b", 7).await;
        assert_eq!(cache.get("a|b").await, Some(7));
        assert_eq!(cache.get("b|a").await, None);
    }

    #[tokio::test]
    async fn capacity_overflow_evicts_least_recently_used() {
        let cache = cache(3, Duration::ZERO);
        cache.put("one", 1).await;
        cache.put("two", 2).await;
        cache.put("three", 3).await;
        cache.put("four", 4).await;

        assert_eq!(cache.get("one").await, None);
        assert_eq!(cache.get("two").await, Some(2));
        assert_eq!(cache.len(), 3);
    }

    #[tokio::test]
    async fn a_read_refreshes_recency() {
        let cache = cache(2, Duration::ZERO);
        cache.put("one", 1).await;
        cache.put("two", 2).await;
        assert_eq!(cache.get("one").await, Some(1));

        cache.put("three", 3).await;
        assert_eq!(cache.get("one").await, Some(1));
        assert_eq!(cache.get("two").await, None);
    }

    #[tokio::test]
    async fn rewriting_a_key_does_not_evict_others() {
        let cache = cache(2, Duration::ZERO);
        cache.put("one", 1).await;
        cache.put("two", 2).await;
        cache.put("two", 20).await;

        assert_eq!(cache.get("one").await, Some(1));
        assert_eq!(cache.get("two").await, Some(20));
    }

    #[tokio::test]
    async fn expired_entries_read_as_absent() {
        let cache = cache(4, Duration::from_millis(1));
        cache.put("gone", 1).await;
        std::thread::sleep(Duration::from_millis(5));
        assert_eq!(cache.get("gone").await, None);
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn expired_slots_are_reclaimed_before_live_ones() {
        let cache = cache(2, Duration::from_millis(1));
        cache.put("stale", 1).await;
        std::thread::sleep(Duration::from_millis(5));
        // "fresh" would be the LRU victim, but "stale" is expired
        cache.put("fresh", 2).await;
        cache.put("newer", 3).await;

        assert_eq!(cache.get("fresh").await, Some(2));
        assert_eq!(cache.get("newer").await, Some(3));
    }

    #[tokio::test]
    async fn zero_ttl_means_never_expire() {
        let cache = cache(2, Duration::ZERO);
        cache.put("keep", 1).await;
        std::thread::sleep(Duration::from_millis(5));
        assert_eq!(cache.get("keep").await, Some(1));
    }

    #[tokio::test]
    async fn clean_expired_and_enumeration_filter_stale_entries() {
        let cache = cache(4, Duration::from_millis(1));
        cache.put("a", 1).await;
        cache.put("b", 2).await;
        std::thread::sleep(Duration::from_millis(5));
        assert!(cache.entries().is_empty());

        cache.clean_expired();
        assert!(cache.is_empty());
    }

    #[test]
    fn zero_capacity_is_rejected() {
        assert!(MemoryCache::<i32>::new(0, Duration::ZERO).is_err());
    }
}
