//! LRU cache for serialized cuboid payloads
//!
//! Sits in front of the block store so hot blocks (cutout assembly re-reads
//! the same cuboids constantly) skip the backend round trip. Committed
//! cuboids are immutable, so entries only need invalidation when a block is
//! rewritten by a merge.
//!
//! Key properties:
//! - Concurrent access without a global lock (sharded internally by moka)
//! - Size-based eviction counting payload bytes, not entry count
//! - Hit/miss metrics

use bytes::Bytes;
use metrics::{counter, gauge};
use moka::future::Cache;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use crate::index::ObjectKey;

/// Configuration for the cuboid cache
#[derive(Debug, Clone)]
pub struct CuboidCacheConfig {
    /// Maximum cache size in bytes (default: 512MB)
    pub max_size_bytes: u64,
    /// Time-to-live for cache entries (default: 1 hour)
    pub ttl: Duration,
    /// Evict entries not accessed for this duration (default: 30 min)
    pub tti: Duration,
}

impl Default for CuboidCacheConfig {
    fn default() -> Self {
        Self {
            max_size_bytes: 512 * 1024 * 1024,
            ttl: Duration::from_secs(3600),
            tti: Duration::from_secs(1800),
        }
    }
}

/// Thread-safe byte-weighed cache of block payloads keyed by object key
pub struct CuboidCache {
    cache: Cache<ObjectKey, Bytes>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl CuboidCache {
    pub fn new(config: CuboidCacheConfig) -> Self {
        let cache = Cache::builder()
            // Each entry weighs its payload size
            .weigher(|_key: &ObjectKey, value: &Bytes| -> u32 {
                value.len().min(u32::MAX as usize) as u32
            })
            .max_capacity(config.max_size_bytes)
            .time_to_live(config.ttl)
            .time_to_idle(config.tti)
            .build();

        Self {
            cache,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn with_default_config() -> Self {
        Self::new(CuboidCacheConfig::default())
    }

    /// Get a cached payload if present
    pub async fn get(&self, key: &ObjectKey) -> Option<Bytes> {
        let result = self.cache.get(key).await;

        if result.is_some() {
            let hits = self.hits.fetch_add(1, Ordering::Relaxed) + 1;
            counter!("voxelstore_cuboid_cache_hits_total").increment(1);
            if hits % 100 == 0 {
                self.update_gauges();
            }
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
            counter!("voxelstore_cuboid_cache_misses_total").increment(1);
        }

        result
    }

    /// Insert a payload
    pub async fn insert(&self, key: ObjectKey, payload: Bytes) {
        counter!("voxelstore_cuboid_cache_bytes_inserted_total").increment(payload.len() as u64);
        self.cache.insert(key, payload).await;
    }

    /// Get or load through the provided fallible async function.
    ///
    /// Concurrent misses for the same key are coalesced by moka: exactly one
    /// caller runs `init` while the rest wait for its result, so a cold block
    /// is fetched from the backend once. Load errors are shared with the
    /// waiters and never cached.
    pub async fn get_or_try_insert_with<F, Fut, E>(
        &self,
        key: ObjectKey,
        init: F,
    ) -> Result<Bytes, Arc<E>>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = Result<Bytes, E>>,
        E: Send + Sync + 'static,
    {
        let loaded = AtomicBool::new(false);
        let result = self
            .cache
            .try_get_with(key, async {
                loaded.store(true, Ordering::Relaxed);
                let payload = init().await?;
                counter!("voxelstore_cuboid_cache_bytes_inserted_total")
                    .increment(payload.len() as u64);
                Ok(payload)
            })
            .await;

        // A caller whose loader never ran was served from cache or from
        // another caller's in-flight load
        if loaded.load(Ordering::Relaxed) {
            self.misses.fetch_add(1, Ordering::Relaxed);
            counter!("voxelstore_cuboid_cache_misses_total").increment(1);
        } else if result.is_ok() {
            let hits = self.hits.fetch_add(1, Ordering::Relaxed) + 1;
            counter!("voxelstore_cuboid_cache_hits_total").increment(1);
            if hits % 100 == 0 {
                self.update_gauges();
            }
        }

        result
    }

    /// Drop a block, called when a merge rewrites it
    pub async fn invalidate(&self, key: &ObjectKey) {
        tracing::debug!(key = %key, "invalidating cached block");
        self.cache.invalidate(key).await;
    }

    /// Current hit rate (0.0 to 1.0)
    pub fn hit_rate(&self) -> f64 {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let total = hits + misses;
        if total == 0 {
            0.0
        } else {
            hits as f64 / total as f64
        }
    }

    /// Cache statistics snapshot
    pub fn stats(&self) -> CuboidCacheStats {
        CuboidCacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entry_count: self.cache.entry_count(),
            weighted_size: self.cache.weighted_size(),
        }
    }

    fn update_gauges(&self) {
        gauge!("voxelstore_cuboid_cache_hit_rate").set(self.hit_rate());
        gauge!("voxelstore_cuboid_cache_entry_count").set(self.cache.entry_count() as f64);
        gauge!("voxelstore_cuboid_cache_size_bytes").set(self.cache.weighted_size() as f64);
    }
}

/// Cache statistics
#[derive(Debug, Clone)]
pub struct CuboidCacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entry_count: u64,
    /// Total payload bytes held (approximate)
    pub weighted_size: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cuboid::MortonId;
    use crate::index::LookupKey;

    fn key(morton: u64) -> ObjectKey {
        ObjectKey::new(
            LookupKey {
                collection: 1,
                experiment: 2,
                channel: 3,
                resolution: 0,
            },
            0,
            MortonId(morton),
        )
    }

    #[tokio::test]
    async fn test_basic_insert_get() {
        let cache = CuboidCache::with_default_config();
        assert!(cache.get(&key(1)).await.is_none());

        let payload = Bytes::from(vec![0u8; 1024]);
        cache.insert(key(1), payload.clone()).await;
        assert_eq!(cache.get(&key(1)).await.unwrap(), payload);
    }

    #[tokio::test]
    async fn test_hit_rate() {
        let cache = CuboidCache::with_default_config();
        cache.get(&key(1)).await; // miss
        assert_eq!(cache.hit_rate(), 0.0);

        cache.insert(key(1), Bytes::from_static(b"abc")).await;
        cache.get(&key(1)).await; // hit
        assert_eq!(cache.hit_rate(), 0.5);
    }

    #[tokio::test]
    async fn test_get_or_try_insert_loads_once() {
        let cache = CuboidCache::with_default_config();

        let loaded = AtomicBool::new(false);
        let first: Result<Bytes, Arc<StoreFailure>> = cache
            .get_or_try_insert_with(key(5), || {
                loaded.store(true, Ordering::SeqCst);
                async { Ok(Bytes::from(vec![42u8; 64])) }
            })
            .await;
        assert!(loaded.load(Ordering::SeqCst));
        assert_eq!(first.unwrap().len(), 64);

        loaded.store(false, Ordering::SeqCst);
        let second: Result<Bytes, Arc<StoreFailure>> = cache
            .get_or_try_insert_with(key(5), || {
                loaded.store(true, Ordering::SeqCst);
                async { Ok(Bytes::from(vec![7u8; 64])) }
            })
            .await;
        assert!(!loaded.load(Ordering::SeqCst));
        assert_eq!(second.unwrap(), Bytes::from(vec![42u8; 64]));
    }

    #[tokio::test]
    async fn test_concurrent_misses_load_once() {
        let cache = CuboidCache::with_default_config();
        let loads = AtomicU64::new(0);
        let load = || async {
            loads.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(50)).await;
            Ok::<_, StoreFailure>(Bytes::from_static(b"block"))
        };

        // All four start before the first loader finishes; only one runs it
        let (a, b, c, d) = tokio::join!(
            cache.get_or_try_insert_with(key(7), load),
            cache.get_or_try_insert_with(key(7), load),
            cache.get_or_try_insert_with(key(7), load),
            cache.get_or_try_insert_with(key(7), load),
        );
        assert_eq!(loads.load(Ordering::SeqCst), 1);
        for result in [a, b, c, d] {
            assert_eq!(result.unwrap(), Bytes::from_static(b"block"));
        }
        assert_eq!(cache.stats().misses, 1);
    }

    #[tokio::test]
    async fn test_load_error_not_cached() {
        let cache = CuboidCache::with_default_config();
        let failed: Result<Bytes, Arc<StoreFailure>> = cache
            .get_or_try_insert_with(key(9), || async { Err(StoreFailure) })
            .await;
        assert!(failed.is_err());
        assert!(cache.get(&key(9)).await.is_none());
    }

    #[tokio::test]
    async fn test_invalidate() {
        let cache = CuboidCache::with_default_config();
        cache.insert(key(2), Bytes::from_static(b"old")).await;
        cache.invalidate(&key(2)).await;
        assert!(cache.get(&key(2)).await.is_none());
    }

    #[derive(Debug)]
    struct StoreFailure;
}
