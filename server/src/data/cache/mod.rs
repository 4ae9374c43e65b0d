//! Cache module
//!
//! In-memory caches built on moka:
//! - the catalog snapshot, keyed by the catalog query text
//! - filtered results, keyed by catalog generation plus compiled query
//!
//! Entries expire after a configurable time-to-live and can be dropped
//! all at once for a manual refresh.

mod key;

use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;

pub use key::CacheKey;

/// Named, bounded cache with an optional time-to-live
pub struct TtlCache<K, V> {
    name: &'static str,
    inner: Cache<K, V>,
}

impl<K, V> std::fmt::Debug for TtlCache<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TtlCache")
            .field("name", &self.name)
            .finish()
    }
}

impl<K, V> TtlCache<K, V>
where
    K: Hash + Eq + Send + Sync + std::fmt::Debug + 'static,
    V: Clone + Send + Sync + 'static,
{
    /// Create a cache holding at most `max_entries`.
    ///
    /// `ttl` of `None` keeps entries until evicted or invalidated.
    pub fn new(name: &'static str, max_entries: u64, ttl: Option<Duration>) -> Self {
        let mut builder = Cache::builder()
            .name(name)
            .max_capacity(max_entries)
            .initial_capacity((max_entries as usize / 4).min(1_000));
        if let Some(ttl) = ttl {
            builder = builder.time_to_live(ttl);
        }

        tracing::debug!(cache = name, max_entries, ttl = ?ttl, "Initializing cache");
        Self {
            name,
            inner: builder.build(),
        }
    }

    /// Return the cached value or run `init` to produce it.
    ///
    /// Concurrent callers for the same key share a single `init` run. A
    /// failed `init` caches nothing and every waiter receives the error.
    pub async fn get_or_try_insert_with<F, E>(&self, key: K, init: F) -> Result<V, Arc<E>>
    where
        F: Future<Output = Result<V, E>>,
        E: Send + Sync + 'static,
    {
        if self.inner.contains_key(&key) {
            tracing::debug!(cache = self.name, key = ?key, "Cache hit");
        } else {
            tracing::debug!(cache = self.name, key = ?key, "Cache miss");
        }
        self.inner.try_get_with(key, init).await
    }

    /// Drop every entry
    pub fn invalidate_all(&self) {
        tracing::debug!(cache = self.name, "Invalidating all entries");
        self.inner.invalidate_all();
    }

    /// Approximate number of live entries
    pub async fn entry_count(&self) -> u64 {
        self.inner.run_pending_tasks().await;
        self.inner.entry_count()
    }
}

/// Convert a TTL in seconds to a cache TTL; 0 disables expiry
pub fn ttl_from_secs(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn load(cache: &TtlCache<String, u32>, key: &str, value: u32) -> u32 {
        cache
            .get_or_try_insert_with(key.to_string(), async { Ok::<_, String>(value) })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_keys_are_independent() {
        let cache: TtlCache<String, u32> = TtlCache::new("test", 16, None);

        assert_eq!(load(&cache, "a", 1).await, 1);
        assert_eq!(load(&cache, "b", 2).await, 2);
        assert_eq!(load(&cache, "a", 9).await, 1);
        assert_eq!(cache.entry_count().await, 2);
    }

    #[tokio::test]
    async fn test_ttl_expiry() {
        let cache: TtlCache<String, u32> =
            TtlCache::new("test", 16, Some(Duration::from_millis(50)));

        assert_eq!(load(&cache, "a", 1).await, 1);
        assert_eq!(load(&cache, "a", 2).await, 1);

        tokio::time::sleep(Duration::from_millis(150)).await;
        assert_eq!(load(&cache, "a", 3).await, 3);
    }

    #[tokio::test]
    async fn test_invalidate_all() {
        let cache: TtlCache<String, u32> = TtlCache::new("test", 16, None);
        load(&cache, "a", 1).await;
        load(&cache, "b", 2).await;

        cache.invalidate_all();

        assert_eq!(cache.entry_count().await, 0);
        assert_eq!(load(&cache, "a", 5).await, 5);
    }

    #[tokio::test]
    async fn test_try_insert_runs_init_once() {
        let cache: TtlCache<String, u32> = TtlCache::new("test", 16, None);

        let first: Result<u32, Arc<String>> = cache
            .get_or_try_insert_with("k".to_string(), async { Ok(7) })
            .await;
        let second: Result<u32, Arc<String>> = cache
            .get_or_try_insert_with("k".to_string(), async {
                Err("init should not run again".to_string())
            })
            .await;

        assert_eq!(first.unwrap(), 7);
        assert_eq!(second.unwrap(), 7);
    }

    #[tokio::test]
    async fn test_try_insert_error_is_not_cached() {
        let cache: TtlCache<String, u32> = TtlCache::new("test", 16, None);

        let failed: Result<u32, Arc<String>> = cache
            .get_or_try_insert_with("k".to_string(), async { Err("down".to_string()) })
            .await;
        assert_eq!(failed.unwrap_err().as_str(), "down");

        let retried: Result<u32, Arc<String>> = cache
            .get_or_try_insert_with("k".to_string(), async { Ok(3) })
            .await;
        assert_eq!(retried.unwrap(), 3);
    }

    #[test]
    fn test_ttl_from_secs() {
        assert_eq!(ttl_from_secs(0), None);
        assert_eq!(ttl_from_secs(30), Some(Duration::from_secs(30)));
    }
}
