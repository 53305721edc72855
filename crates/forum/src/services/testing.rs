//! Test doubles for the service tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use forum_core::cache::{Cache, CacheError, CacheTtls};
use forum_core::forum::{
    Comment, CommentId, NewComment, NewPost, NewUser, Post, PostId, User, UserId,
};
use forum_core::storage::{
    CommentStore, Page, PageRequest, PostStore, Result, UserDirectory,
};

use super::{CommentService, PostService, SideCache};
use crate::cache::MemoryCache;
use crate::storage::InMemoryRepository;

/// A cache that fails every call as if the server were unreachable.
pub struct DownCache;

#[async_trait]
impl Cache for DownCache {
    async fn get(&self, _key: &str) -> forum_core::cache::Result<Option<Vec<u8>>> {
        Err(CacheError::Unavailable("connection refused".to_string()))
    }

    async fn set(
        &self,
        _key: &str,
        _value: &[u8],
        _ttl: Option<Duration>,
    ) -> forum_core::cache::Result<()> {
        Err(CacheError::Unavailable("connection refused".to_string()))
    }

    async fn delete(&self, _key: &str) -> forum_core::cache::Result<()> {
        Err(CacheError::Unavailable("connection refused".to_string()))
    }

    async fn delete_pattern(&self, _pattern: &str) -> forum_core::cache::Result<()> {
        Err(CacheError::Unavailable("connection refused".to_string()))
    }
}

/// In-memory store that counts the reads the caches are meant to absorb.
#[derive(Default)]
pub struct CountingStore {
    pub inner: InMemoryRepository,
    pub post_fetches: AtomicUsize,
    pub page_fetches: AtomicUsize,
    pub comment_fetches: AtomicUsize,
}

impl CountingStore {
    pub fn post_fetches(&self) -> usize {
        self.post_fetches.load(Ordering::SeqCst)
    }

    pub fn page_fetches(&self) -> usize {
        self.page_fetches.load(Ordering::SeqCst)
    }

    pub fn comment_fetches(&self) -> usize {
        self.comment_fetches.load(Ordering::SeqCst)
    }

    pub async fn user(&self, username: &str) -> User {
        self.inner
            .create_user(&NewUser::new(
                username,
                format!("{username}@example.com"),
                "$argon2id$test",
            ))
            .await
            .unwrap()
    }

    pub async fn post(&self, author: &User, title: &str) -> Post {
        self.inner
            .create_post(&NewPost::new(author.id, title, "body"))
            .await
            .unwrap()
    }

    /// Bumps the stored view count to `views`.
    pub async fn set_views(&self, post: &Post, views: u32) {
        for _ in 0..views {
            self.inner.increment_view_count(post.id).await.unwrap();
        }
    }

    pub async fn comment(
        &self,
        post: &Post,
        author: &User,
        parent: Option<CommentId>,
        content: &str,
    ) -> Comment {
        let mut new_comment = NewComment::new(post.id, author.id, content);
        if let Some(parent_id) = parent {
            new_comment = new_comment.reply_to(parent_id);
        }
        self.inner.create_comment(&new_comment).await.unwrap()
    }
}

#[async_trait]
impl PostStore for CountingStore {
    async fn get_post(&self, id: PostId) -> Result<Option<Post>> {
        self.inner.get_post(id).await
    }

    async fn get_post_with_author(&self, id: PostId) -> Result<Option<(Post, String)>> {
        self.post_fetches.fetch_add(1, Ordering::SeqCst);
        self.inner.get_post_with_author(id).await
    }

    async fn create_post(&self, post: &NewPost) -> Result<Post> {
        self.inner.create_post(post).await
    }

    async fn update_post(&self, post: &Post) -> Result<()> {
        self.inner.update_post(post).await
    }

    async fn delete_post(&self, id: PostId) -> Result<()> {
        self.inner.delete_post(id).await
    }

    async fn increment_view_count(&self, id: PostId) -> Result<u64> {
        self.inner.increment_view_count(id).await
    }

    async fn find_published(&self, page: PageRequest) -> Result<Page<(Post, String)>> {
        self.page_fetches.fetch_add(1, Ordering::SeqCst);
        self.inner.find_published(page).await
    }

    async fn find_by_author(
        &self,
        author_id: UserId,
        page: PageRequest,
    ) -> Result<Page<(Post, String)>> {
        self.inner.find_by_author(author_id, page).await
    }
}

#[async_trait]
impl CommentStore for CountingStore {
    async fn get_comment(&self, id: CommentId) -> Result<Option<Comment>> {
        self.inner.get_comment(id).await
    }

    async fn find_by_post(&self, post_id: PostId) -> Result<Vec<(Comment, String)>> {
        self.comment_fetches.fetch_add(1, Ordering::SeqCst);
        self.inner.find_by_post(post_id).await
    }

    async fn create_comment(&self, comment: &NewComment) -> Result<Comment> {
        self.inner.create_comment(comment).await
    }

    async fn update_comment(&self, comment: &Comment) -> Result<()> {
        self.inner.update_comment(comment).await
    }

    async fn delete_comment(&self, id: CommentId) -> Result<()> {
        self.inner.delete_comment(id).await
    }
}

#[async_trait]
impl UserDirectory for CountingStore {
    async fn get_user(&self, id: UserId) -> Result<Option<User>> {
        self.inner.get_user(id).await
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        self.inner.get_user_by_username(username).await
    }

    async fn username_exists(&self, username: &str) -> Result<bool> {
        self.inner.username_exists(username).await
    }

    async fn email_exists(&self, email: &str) -> Result<bool> {
        self.inner.email_exists(email).await
    }

    async fn create_user(&self, user: &NewUser) -> Result<User> {
        self.inner.create_user(user).await
    }

    async fn record_login(&self, id: UserId, at: DateTime<Utc>) -> Result<()> {
        self.inner.record_login(id, at).await
    }
}

pub struct Fixture {
    pub store: Arc<CountingStore>,
    pub cache: Arc<MemoryCache>,
    pub posts: PostService,
    pub comments: CommentService,
}

impl Fixture {
    pub fn new() -> Self {
        let store = Arc::new(CountingStore::default());
        let cache = Arc::new(MemoryCache::new(1000));
        Self::with_cache(store, cache.clone(), cache)
    }

    /// Services over a cache that is always down.
    pub fn without_cache() -> Self {
        let store = Arc::new(CountingStore::default());
        let unused = Arc::new(MemoryCache::new(1));
        Self::with_cache(store, unused, Arc::new(DownCache))
    }

    fn with_cache(
        store: Arc<CountingStore>,
        cache: Arc<MemoryCache>,
        backend: Arc<dyn Cache>,
    ) -> Self {
        let side_cache = SideCache::new(backend, CacheTtls::default());
        Self {
            posts: PostService::new(store.clone(), store.clone(), side_cache.clone()),
            comments: CommentService::new(store.clone(), store.clone(), store.clone(), side_cache),
            store,
            cache,
        }
    }

    pub async fn cached(&self, key: &str) -> bool {
        self.cache.get(key).await.unwrap().is_some()
    }
}
