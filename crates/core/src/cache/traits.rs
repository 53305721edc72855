use std::time::Duration;

use async_trait::async_trait;

use super::Result;

/// Byte-oriented key/value cache with per-entry TTL.
///
/// Namespaces are key prefixes (see [`super::CacheNamespace`]); clearing a
/// namespace is a `delete_pattern` on its prefix.
#[async_trait]
pub trait Cache: Send + Sync {
    /// Gets a value from the cache by key. Expired entries read as `None`.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Sets a value in the cache with an optional TTL.
    async fn set(&self, key: &str, value: &[u8], ttl: Option<Duration>) -> Result<()>;

    /// Deletes a value from the cache by key. Missing keys are not an error.
    async fn delete(&self, key: &str) -> Result<()>;

    /// Deletes all values matching a glob pattern (e.g. `"post_page:*"`).
    async fn delete_pattern(&self, pattern: &str) -> Result<()>;
}
