//! Redis cache implementation.
//!
//! Values are plain strings set with `SET EX`. Pattern deletion walks the
//! keyspace with `SCAN MATCH` and deletes each batch as it arrives, so it
//! never blocks the server the way `KEYS` would.
//!
//! The connection is opened by the first command, not at construction, so
//! the server can start while Redis is down. Until a connection succeeds every
//! command fails with `CacheError::Unavailable`, which callers treat as a miss.

use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use tokio::sync::OnceCell;

use forum_core::cache::{Cache, CacheError, Result};

use super::error::map_redis_error;

/// Keys requested per `SCAN` round trip.
const SCAN_BATCH: usize = 200;

/// Upper bound on one connection attempt, retries included.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(2);

/// Redis cache backend using connection manager for reconnects.
pub struct RedisCache {
    client: redis::Client,
    conn: OnceCell<ConnectionManager>,
}

impl RedisCache {
    /// Creates a Redis cache for `url` without connecting.
    ///
    /// # Errors
    ///
    /// Returns `CacheError::OperationFailed` if the URL is malformed.
    pub fn new(url: &str) -> Result<Self> {
        let client = redis::Client::open(url).map_err(map_redis_error)?;
        Ok(Self {
            client,
            conn: OnceCell::new(),
        })
    }

    /// The shared connection, opened on first use. A failed attempt is not
    /// kept; the next command tries again.
    async fn connection(&self) -> Result<ConnectionManager> {
        let conn = self
            .conn
            .get_or_try_init(|| async {
                let connect = ConnectionManager::new(self.client.clone());
                let conn = tokio::time::timeout(CONNECT_TIMEOUT, connect)
                    .await
                    .map_err(|_| CacheError::Unavailable("timed out connecting to Redis".into()))?
                    .map_err(map_redis_error)?;
                tracing::info!("Connected to Redis");
                Ok::<_, CacheError>(conn)
            })
            .await?;
        Ok(conn.clone())
    }
}

#[async_trait]
impl Cache for RedisCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let mut conn = self.connection().await?;
        let result: Option<Vec<u8>> = conn.get(key).await.map_err(map_redis_error)?;
        Ok(result)
    }

    async fn set(&self, key: &str, value: &[u8], ttl: Option<Duration>) -> Result<()> {
        let mut conn = self.connection().await?;

        match ttl {
            Some(duration) => {
                let seconds = duration.as_secs().max(1);
                conn.set_ex::<_, _, ()>(key, value, seconds)
                    .await
                    .map_err(map_redis_error)?;
            }
            None => {
                conn.set::<_, _, ()>(key, value)
                    .await
                    .map_err(map_redis_error)?;
            }
        }

        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let mut conn = self.connection().await?;
        conn.del::<_, ()>(key).await.map_err(map_redis_error)?;
        Ok(())
    }

    async fn delete_pattern(&self, pattern: &str) -> Result<()> {
        let mut conn = self.connection().await?;
        let mut cursor: u64 = 0;
        let mut deleted = 0usize;

        loop {
            let (next, keys): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(pattern)
                .arg("COUNT")
                .arg(SCAN_BATCH)
                .query_async(&mut conn)
                .await
                .map_err(map_redis_error)?;

            if !keys.is_empty() {
                conn.del::<_, ()>(&keys).await.map_err(map_redis_error)?;
                deleted += keys.len();
            }

            if next == 0 {
                break;
            }
            cursor = next;
        }

        tracing::trace!(pattern = %pattern, deleted, "Deleted cache keys");
        Ok(())
    }
}
