use std::{env, str::FromStr, time::Duration};

use forum_core::cache::CacheTtls;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Maximum number of entries held by the memory cache (default: 10,000)
    #[cfg_attr(not(feature = "memory"), allow(dead_code))]
    pub cache_max_entries: usize,
    /// Lifetimes of the cache namespaces
    pub cache_ttls: CacheTtls,
    /// Path to SQLite database file (default: "forum.db")
    #[cfg_attr(not(feature = "sqlite"), allow(dead_code))]
    pub sqlite_path: String,
    /// Redis connection URL (default: "redis://localhost:6379")
    #[cfg_attr(not(feature = "redis"), allow(dead_code))]
    pub redis_url: String,
}

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_seconds(name: &str, default: Duration) -> Duration {
    env::var(name)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .map(Duration::from_secs)
        .unwrap_or(default)
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `CACHE_MAX_ENTRIES` - Maximum memory cache entries (default: 10,000)
    /// - `HOT_POST_TTL_SECONDS` - Hot post lifetime (default: 3600)
    /// - `POST_PAGE_TTL_SECONDS` - Post listing page lifetime (default: 1800)
    /// - `COMMENT_TREE_TTL_SECONDS` - Comment tree lifetime (default: 900)
    /// - `TOKEN_TTL_SECONDS` - Cached token lifetime (default: 86400)
    /// - `SQLITE_PATH` - SQLite database path (default: "forum.db")
    /// - `REDIS_URL` - Redis connection URL (default: "redis://localhost:6379")
    pub fn from_env() -> Self {
        let defaults = CacheTtls::default();

        Self {
            cache_max_entries: env_or("CACHE_MAX_ENTRIES", 10_000),
            cache_ttls: CacheTtls {
                hot_post: env_seconds("HOT_POST_TTL_SECONDS", defaults.hot_post),
                post_page: env_seconds("POST_PAGE_TTL_SECONDS", defaults.post_page),
                comment_tree: env_seconds("COMMENT_TREE_TTL_SECONDS", defaults.comment_tree),
                token: env_seconds("TOKEN_TTL_SECONDS", defaults.token),
            },
            sqlite_path: env::var("SQLITE_PATH").unwrap_or_else(|_| "forum.db".to_string()),
            redis_url: env::var("REDIS_URL")
                .unwrap_or_else(|_| "redis://localhost:6379".to_string()),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        for name in [
            "CACHE_MAX_ENTRIES",
            "HOT_POST_TTL_SECONDS",
            "POST_PAGE_TTL_SECONDS",
            "COMMENT_TREE_TTL_SECONDS",
            "TOKEN_TTL_SECONDS",
            "SQLITE_PATH",
            "REDIS_URL",
        ] {
            env::remove_var(name);
        }

        let config = Config::from_env();

        assert_eq!(config.cache_max_entries, 10_000);
        assert_eq!(config.cache_ttls, CacheTtls::default());
        assert_eq!(config.cache_ttls.hot_post, Duration::from_secs(3600));
        assert_eq!(config.sqlite_path, "forum.db");
        assert_eq!(config.redis_url, "redis://localhost:6379");
    }

    #[test]
    fn test_unparseable_value_falls_back() {
        assert_eq!(env_or("FORUM_TEST_UNSET_VARIABLE", 7usize), 7);

        env::set_var("FORUM_TEST_BAD_SECONDS", "soon");
        assert_eq!(
            env_seconds("FORUM_TEST_BAD_SECONDS", Duration::from_secs(5)),
            Duration::from_secs(5)
        );
        env::remove_var("FORUM_TEST_BAD_SECONDS");
    }
}
