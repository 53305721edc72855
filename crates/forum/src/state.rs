//! Application state shared by every handler.
//!
//! The storage and cache backends are picked at compile time via feature
//! flags; each supported combination gets its own `AppState::new`.

use std::sync::Arc;

use forum_auth::{AuthConfig, AuthService, AuthState, TokenIssuer};
use forum_core::cache::Cache;
use forum_core::storage::{CommentStore, PostStore, UserDirectory};

use crate::config::Config;
use crate::services::{CommentService, PostService, SideCache};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub posts: Arc<PostService>,
    pub comments: Arc<CommentService>,
    pub auth: AuthState,
    /// Cache access for readiness probes.
    pub cache: SideCache,
}

impl AsRef<AuthState> for AppState {
    fn as_ref(&self) -> &AuthState {
        &self.auth
    }
}

impl AppState {
    /// Wires the services over one store and one cache backend.
    fn build<S>(
        store: Arc<S>,
        cache: Arc<dyn Cache>,
        config: &Config,
        auth_config: &AuthConfig,
    ) -> Self
    where
        S: PostStore + CommentStore + UserDirectory + 'static,
    {
        let side_cache = SideCache::new(cache.clone(), config.cache_ttls);

        let posts = PostService::new(store.clone(), store.clone(), side_cache.clone());
        let comments =
            CommentService::new(store.clone(), store.clone(), store.clone(), side_cache.clone());
        let auth = AuthService::new(
            store,
            cache,
            TokenIssuer::new(auth_config),
            config.cache_ttls.token,
        );

        Self {
            posts: Arc::new(posts),
            comments: Arc::new(comments),
            auth: AuthState::new(auth),
            cache: side_cache,
        }
    }
}

// ============================================================================
// Factory functions for different backend combinations
// ============================================================================

#[cfg(all(feature = "inmemory", feature = "memory"))]
mod inmemory_memory {
    use super::*;
    use crate::cache::MemoryCache;
    use crate::storage::InMemoryRepository;

    impl AppState {
        /// Creates AppState with in-memory storage and cache.
        /// Useful for local runs without any external dependencies.
        pub async fn new(config: &Config, auth_config: &AuthConfig) -> Result<Self, anyhow::Error> {
            let store = Arc::new(InMemoryRepository::new());
            let cache = Arc::new(MemoryCache::new(config.cache_max_entries));

            Ok(Self::build(store, cache, config, auth_config))
        }
    }
}

#[cfg(all(feature = "inmemory", feature = "redis"))]
mod inmemory_redis {
    use super::*;
    use crate::cache::RedisCache;
    use crate::storage::InMemoryRepository;

    impl AppState {
        /// Creates AppState with in-memory storage and Redis cache.
        ///
        /// Redis is connected lazily; only a malformed URL fails here.
        pub async fn new(config: &Config, auth_config: &AuthConfig) -> Result<Self, anyhow::Error> {
            let store = Arc::new(InMemoryRepository::new());
            let cache = Arc::new(RedisCache::new(&config.redis_url)?);

            Ok(Self::build(store, cache, config, auth_config))
        }
    }

}

#[cfg(all(feature = "sqlite", feature = "memory"))]
mod sqlite_memory {
    use super::*;
    use crate::cache::MemoryCache;
    use crate::storage::SqliteRepository;

    impl AppState {
        /// Creates AppState with SQLite storage and in-memory cache.
        pub async fn new(config: &Config, auth_config: &AuthConfig) -> Result<Self, anyhow::Error> {
            let store = Arc::new(SqliteRepository::new(&config.sqlite_path).await?);
            let cache = Arc::new(MemoryCache::new(config.cache_max_entries));

            Ok(Self::build(store, cache, config, auth_config))
        }
    }
}

#[cfg(all(feature = "sqlite", feature = "redis"))]
mod sqlite_redis {
    use super::*;
    use crate::cache::RedisCache;
    use crate::storage::SqliteRepository;

    impl AppState {
        /// Creates AppState with SQLite storage and Redis cache.
        ///
        /// Redis is connected lazily; only a malformed URL fails here.
        pub async fn new(config: &Config, auth_config: &AuthConfig) -> Result<Self, anyhow::Error> {
            let store = Arc::new(SqliteRepository::new(&config.sqlite_path).await?);
            let cache = Arc::new(RedisCache::new(&config.redis_url)?);

            Ok(Self::build(store, cache, config, auth_config))
        }
    }
}

// ============================================================================
// Test support
// ============================================================================
