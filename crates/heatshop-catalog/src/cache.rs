//! In-memory TTL cache shared by the catalog service.

use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, RwLock};
use tokio::time::Instant;

#[derive(Debug)]
pub struct CacheEntry<V> {
    pub data: Arc<V>,
    pub inserted_at: Instant,
}

impl<V> CacheEntry<V> {
    fn is_fresh(&self, ttl: Duration) -> bool {
        self.inserted_at.elapsed() < ttl
    }
}

/// Key/value map whose entries stop being returned by [`TtlCache::get`]
/// once older than the TTL. Expired entries stay readable through
/// [`TtlCache::get_stale`] until replaced or purged by a later insert.
///
/// A cache built with [`TtlCache::with_max_entries`] evicts its oldest entry
/// when an insert of a new key would exceed the limit.
#[derive(Debug)]
pub struct TtlCache<K, V> {
    ttl: Duration,
    max_entries: Option<usize>,
    entries: RwLock<HashMap<K, CacheEntry<V>>>,
    loads: Mutex<HashMap<K, Arc<Mutex<()>>>>,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Clone,
{
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            max_entries: None,
            entries: RwLock::new(HashMap::new()),
            loads: Mutex::new(HashMap::new()),
        }
    }

    /// Like [`TtlCache::new`], holding at most `max_entries` entries (at least 1).
    #[must_use]
    pub fn with_max_entries(ttl: Duration, max_entries: usize) -> Self {
        Self {
            max_entries: Some(max_entries.max(1)),
            ..Self::new(ttl)
        }
    }

    #[must_use]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns the cached value if it was inserted within the TTL.
    pub async fn get(&self, key: &K) -> Option<Arc<V>> {
        let entries = self.entries.read().await;
        entries
            .get(key)
            .filter(|entry| entry.is_fresh(self.ttl))
            .map(|entry| Arc::clone(&entry.data))
    }

    /// Returns the cached value regardless of age.
    pub async fn get_stale(&self, key: &K) -> Option<Arc<V>> {
        let entries = self.entries.read().await;
        entries.get(key).map(|entry| Arc::clone(&entry.data))
    }

    /// Stores `value` under `key` and purges every other expired entry. When
    /// the cache is full the oldest entry makes room.
    pub async fn insert(&self, key: K, value: V) -> Arc<V> {
        let data = Arc::new(value);
        let mut entries = self.entries.write().await;
        let ttl = self.ttl;
        entries.retain(|_, entry| entry.is_fresh(ttl));

        if let Some(max) = self.max_entries {
            while entries.len() >= max && !entries.contains_key(&key) {
                let Some(oldest) = entries
                    .iter()
                    .min_by_key(|(_, entry)| entry.inserted_at)
                    .map(|(k, _)| k.clone())
                else {
                    break;
                };
                entries.remove(&oldest);
            }
        }

        entries.insert(
            key,
            CacheEntry {
                data: Arc::clone(&data),
                inserted_at: Instant::now(),
            },
        );
        data
    }

    /// Returns the fresh cached value, or computes, stores and returns a new
    /// one. Errors from `compute` are returned without touching the cache.
    ///
    /// Concurrent misses for the same key wait on a single `compute`; when it
    /// fails, the next waiter runs its own.
    ///
    /// # Errors
    ///
    /// Propagates the error returned by `compute`.
    pub async fn get_or_try_insert_with<F, Fut, E>(&self, key: K, compute: F) -> Result<Arc<V>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(hit) = self.get(&key).await {
            return Ok(hit);
        }

        let load = {
            let mut loads = self.loads.lock().await;
            Arc::clone(loads.entry(key.clone()).or_default())
        };
        let result = {
            let _guard = load.lock().await;
            match self.get(&key).await {
                Some(hit) => Ok(hit),
                None => match compute().await {
                    Ok(value) => Ok(self.insert(key.clone(), value).await),
                    Err(e) => Err(e),
                },
            }
        };

        let mut loads = self.loads.lock().await;
        let idle = Arc::strong_count(&load) == 2;
        if idle && loads.get(&key).is_some_and(|l| Arc::ptr_eq(l, &load)) {
            loads.remove(&key);
        }
        result
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const TTL: Duration = Duration::from_secs(60);

    #[tokio::test(start_paused = true)]
    async fn get_returns_value_within_ttl() {
        let cache = TtlCache::new(TTL);
        cache.insert("terea", vec![1, 2, 3]).await;

        tokio::time::advance(Duration::from_secs(59)).await;
        assert_eq!(cache.get(&"terea").await.as_deref(), Some(&vec![1, 2, 3]));
    }

    #[tokio::test(start_paused = true)]
    async fn expired_entry_is_only_available_stale() {
        let cache = TtlCache::new(TTL);
        cache.insert("best-sellers", 7).await;

        tokio::time::advance(Duration::from_secs(61)).await;
        assert!(cache.get(&"best-sellers").await.is_none());
        assert_eq!(cache.get_stale(&"best-sellers").await.as_deref(), Some(&7));
    }

    #[tokio::test(start_paused = true)]
    async fn insert_purges_other_expired_entries() {
        let cache = TtlCache::new(TTL);
        cache.insert("old", 1).await;
        tokio::time::advance(Duration::from_secs(61)).await;
        cache.insert("new", 2).await;

        assert_eq!(cache.len().await, 1);
        assert!(cache.get_stale(&"old").await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn get_or_try_insert_with_computes_once_within_ttl() {
        let cache = TtlCache::new(TTL);
        let counter = AtomicUsize::new(0);
        let calls = &counter;
        let compute = move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok::<_, String>("fresh")
        };

        let first = cache.get_or_try_insert_with("k", compute).await.unwrap();
        let second = cache.get_or_try_insert_with("k", compute).await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        tokio::time::advance(Duration::from_secs(61)).await;
        cache.get_or_try_insert_with("k", compute).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_misses_share_one_compute() {
        let cache = TtlCache::new(TTL);
        let counter = AtomicUsize::new(0);
        let calls = &counter;
        let compute = move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_secs(1)).await;
            Ok::<_, String>(vec![1, 2])
        };

        let (a, b, c) = tokio::join!(
            cache.get_or_try_insert_with("terea", compute),
            cache.get_or_try_insert_with("terea", compute),
            cache.get_or_try_insert_with("terea", compute),
        );
        let (a, b, c) = (a.unwrap(), b.unwrap(), c.unwrap());
        assert!(Arc::ptr_eq(&a, &b) && Arc::ptr_eq(&b, &c));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(cache.loads.lock().await.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn waiter_recomputes_after_failed_load() {
        let cache: TtlCache<&str, u32> = TtlCache::new(TTL);
        let failing = || async {
            tokio::time::sleep(Duration::from_secs(1)).await;
            Err::<u32, _>("boom")
        };
        let succeeding = || async { Ok::<_, &str>(9) };

        let (first, second) = tokio::join!(
            cache.get_or_try_insert_with("k", failing),
            cache.get_or_try_insert_with("k", succeeding),
        );
        assert_eq!(first.unwrap_err(), "boom");
        assert_eq!(*second.unwrap(), 9);
    }

    #[tokio::test(start_paused = true)]
    async fn full_cache_evicts_oldest_entry() {
        let cache = TtlCache::with_max_entries(TTL, 2);
        cache.insert("a", 1).await;
        tokio::time::advance(Duration::from_secs(1)).await;
        cache.insert("b", 2).await;
        tokio::time::advance(Duration::from_secs(1)).await;
        cache.insert("c", 3).await;

        assert_eq!(cache.len().await, 2);
        assert!(cache.get_stale(&"a").await.is_none());
        assert_eq!(cache.get(&"b").await.as_deref(), Some(&2));
        assert_eq!(cache.get(&"c").await.as_deref(), Some(&3));
    }

    #[tokio::test(start_paused = true)]
    async fn replacing_a_key_in_a_full_cache_keeps_the_others() {
        let cache = TtlCache::with_max_entries(TTL, 2);
        cache.insert("a", 1).await;
        cache.insert("b", 2).await;
        cache.insert("a", 10).await;

        assert_eq!(cache.len().await, 2);
        assert_eq!(cache.get(&"a").await.as_deref(), Some(&10));
        assert_eq!(cache.get(&"b").await.as_deref(), Some(&2));
    }

    #[tokio::test(start_paused = true)]
    async fn errors_are_not_cached() {
        let cache: TtlCache<&str, u32> = TtlCache::new(TTL);

        let err = cache
            .get_or_try_insert_with("k", || async { Err::<u32, _>("boom") })
            .await
            .unwrap_err();
        assert_eq!(err, "boom");
        assert!(cache.is_empty().await);

        let ok = cache
            .get_or_try_insert_with("k", || async { Ok::<_, &str>(5) })
            .await
            .unwrap();
        assert_eq!(*ok, 5);
    }
}
