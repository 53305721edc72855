//! Best-effort typed cache in front of the stores.
//!
//! Values are JSON-encoded into a byte [`Cache`]. Every cache failure is
//! logged and swallowed: reads fall through to the loader, writes and
//! evictions are skipped. The stores stay the source of truth.

use std::future::Future;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use forum_core::cache::{decode, encode, Cache, CacheError, CacheNamespace, CacheTtls};

/// Namespaced cache-aside access with per-namespace TTLs.
#[derive(Clone)]
pub struct SideCache {
    cache: Arc<dyn Cache>,
    ttls: CacheTtls,
}

fn log_failure(err: &CacheError, key: &str, action: &'static str) {
    if err.is_unavailable() {
        tracing::warn!(error = %err, key = %key, action, "Cache unavailable, using store");
    } else {
        tracing::warn!(error = %err, key = %key, action, "Cache operation failed");
    }
}

impl SideCache {
    pub fn new(cache: Arc<dyn Cache>, ttls: CacheTtls) -> Self {
        Self { cache, ttls }
    }

    /// Cached value under `key`; errors and undecodable bytes read as a miss.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        match self.cache.get(key).await {
            Ok(Some(bytes)) => match decode(&bytes) {
                Ok(value) => {
                    tracing::trace!(key = %key, "Cache hit");
                    Some(value)
                }
                Err(err) => {
                    tracing::warn!(error = %err, key = %key, "Cached value could not be decoded");
                    None
                }
            },
            Ok(None) => {
                tracing::trace!(key = %key, "Cache miss");
                None
            }
            Err(err) => {
                log_failure(&err, key, "get");
                None
            }
        }
    }

    /// Stores `value` under `key` with the namespace's TTL.
    pub async fn put<T: Serialize + ?Sized>(&self, namespace: CacheNamespace, key: &str, value: &T) {
        let bytes = match encode(value) {
            Ok(bytes) => bytes,
            Err(err) => {
                tracing::warn!(error = %err, key = %key, "Value could not be encoded for caching");
                return;
            }
        };

        let ttl = self.ttls.for_namespace(namespace);
        if let Err(err) = self.cache.set(key, &bytes, Some(ttl)).await {
            log_failure(&err, key, "set");
        }
    }

    pub async fn evict(&self, key: &str) {
        match self.cache.delete(key).await {
            Ok(()) => tracing::trace!(key = %key, "Evicted cache entry"),
            Err(err) => log_failure(&err, key, "delete"),
        }
    }

    /// Drops every entry of `namespace`.
    pub async fn evict_all(&self, namespace: CacheNamespace) {
        let pattern = namespace.pattern();
        match self.cache.delete_pattern(&pattern).await {
            Ok(()) => tracing::trace!(%namespace, "Evicted cache namespace"),
            Err(err) => log_failure(&err, &pattern, "delete_pattern"),
        }
    }

    /// Returns the cached value for `key`, or runs `loader` and caches its
    /// result when `should_cache` approves it.
    ///
    /// Loader errors are returned as-is and never cached.
    pub async fn read_through<T, E, F, Fut>(
        &self,
        namespace: CacheNamespace,
        key: &str,
        loader: F,
        should_cache: impl FnOnce(&T) -> bool,
    ) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if let Some(value) = self.get(key).await {
            return Ok(value);
        }

        let value = loader().await?;
        if should_cache(&value) {
            self.put(namespace, key, &value).await;
        }
        Ok(value)
    }

    /// Round-trips a probe key. `false` when the cache cannot be used.
    pub async fn probe(&self) -> bool {
        const PROBE_KEY: &str = "readyz:probe";

        let round_trip = async {
            self.cache
                .set(PROBE_KEY, b"1", Some(std::time::Duration::from_secs(5)))
                .await?;
            let found = self.cache.get(PROBE_KEY).await?;
            self.cache.delete(PROBE_KEY).await?;
            Ok::<_, CacheError>(found.is_some())
        };

        match round_trip.await {
            Ok(found) => found,
            Err(err) => {
                log_failure(&err, PROBE_KEY, "probe");
                false
            }
        }
    }
}
