//! Cache namespaces, their keys and default lifetimes.

use std::fmt;
use std::time::Duration;

use crate::forum::PostId;
use crate::storage::PageRequest;

/// A logical region of the cache. Every key starts with `"<prefix>:"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheNamespace {
    /// Post views that crossed the hot-post view threshold, by post id.
    HotPost,
    /// Pages of the published post listing.
    PostPage,
    /// Comment rows of a post, by post id. Trees are rebuilt on read.
    CommentTree,
    /// Issued access tokens, by username.
    Token,
}

impl CacheNamespace {
    pub fn prefix(self) -> &'static str {
        match self {
            CacheNamespace::HotPost => "hot_post",
            CacheNamespace::PostPage => "post_page",
            CacheNamespace::CommentTree => "comment_tree",
            CacheNamespace::Token => "token",
        }
    }

    pub fn default_ttl(self) -> Duration {
        match self {
            CacheNamespace::HotPost => Duration::from_secs(60 * 60),
            CacheNamespace::PostPage => Duration::from_secs(30 * 60),
            CacheNamespace::CommentTree => Duration::from_secs(15 * 60),
            CacheNamespace::Token => Duration::from_secs(24 * 60 * 60),
        }
    }

    /// Glob matching every key of this namespace.
    pub fn pattern(self) -> String {
        format!("{}:*", self.prefix())
    }
}

impl fmt::Display for CacheNamespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

/// Per-namespace TTLs, defaulting to [`CacheNamespace::default_ttl`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheTtls {
    pub hot_post: Duration,
    pub post_page: Duration,
    pub comment_tree: Duration,
    pub token: Duration,
}

impl CacheTtls {
    pub fn for_namespace(&self, namespace: CacheNamespace) -> Duration {
        match namespace {
            CacheNamespace::HotPost => self.hot_post,
            CacheNamespace::PostPage => self.post_page,
            CacheNamespace::CommentTree => self.comment_tree,
            CacheNamespace::Token => self.token,
        }
    }
}

impl Default for CacheTtls {
    fn default() -> Self {
        Self {
            hot_post: CacheNamespace::HotPost.default_ttl(),
            post_page: CacheNamespace::PostPage.default_ttl(),
            comment_tree: CacheNamespace::CommentTree.default_ttl(),
            token: CacheNamespace::Token.default_ttl(),
        }
    }
}

/// Returns the cache key for a hot post.
pub fn hot_post_key(post_id: PostId) -> String {
    format!("{}:{}", CacheNamespace::HotPost.prefix(), post_id)
}

/// Returns the cache key for one page of the published listing.
pub fn post_page_key(page: PageRequest) -> String {
    format!(
        "{}:{}:{}",
        CacheNamespace::PostPage.prefix(),
        page.page,
        page.size
    )
}

/// Returns the cache key for the comment rows of a post.
pub fn comment_tree_key(post_id: PostId) -> String {
    format!("{}:{}", CacheNamespace::CommentTree.prefix(), post_id)
}

/// Returns the cache key for a user's issued token.
pub fn token_key(username: &str) -> String {
    format!("{}:{}", CacheNamespace::Token.prefix(), username)
}
