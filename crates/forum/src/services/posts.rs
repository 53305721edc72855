//! Post reads with view counting and the hot-post cache, plus post CRUD.

use std::sync::Arc;

use forum_core::cache::{comment_tree_key, hot_post_key, post_page_key, CacheNamespace};
use forum_core::forum::{
    ensure_post_author, is_hot_post, validate_post, CreatePostRequest, PostId, PostView,
    UpdatePostRequest, UserId,
};
use forum_core::storage::{Page, PageRequest, PostStore, UserDirectory};

use super::{ServiceError, SideCache};

pub struct PostService {
    posts: Arc<dyn PostStore>,
    users: Arc<dyn UserDirectory>,
    cache: SideCache,
}

impl PostService {
    pub fn new(posts: Arc<dyn PostStore>, users: Arc<dyn UserDirectory>, cache: SideCache) -> Self {
        Self {
            posts,
            users,
            cache,
        }
    }

    /// Counts one view, then serves the post from the hot-post cache or the
    /// store.
    ///
    /// The increment is committed before the read and stands even if the read
    /// fails. A cached view is returned as stored, so its `view_count` can lag
    /// the store until the entry expires or is evicted. Only posts above
    /// [`forum_core::forum::HOT_POST_VIEW_THRESHOLD`] views are cached.
    pub async fn get_post(&self, id: PostId) -> Result<PostView, ServiceError> {
        if self.posts.increment_view_count(id).await? == 0 {
            return Err(ServiceError::post_not_found(id));
        }

        let posts = &self.posts;
        self.cache
            .read_through(
                CacheNamespace::HotPost,
                &hot_post_key(id),
                || async move {
                    tracing::debug!(post_id = id, "Loading post from store");
                    posts
                        .get_post_with_author(id)
                        .await?
                        .map(PostView::from)
                        .ok_or_else(|| ServiceError::post_not_found(id))
                },
                is_hot_post,
            )
            .await
    }

    pub async fn create_post(
        &self,
        user_id: UserId,
        request: CreatePostRequest,
    ) -> Result<PostView, ServiceError> {
        validate_post(&request.title, &request.content)?;

        let author = self
            .users
            .get_user(user_id)
            .await?
            .ok_or_else(|| ServiceError::user_not_found(user_id))?;

        let post = self.posts.create_post(&request.into_new_post(user_id)).await?;
        tracing::debug!(post_id = post.id, author_id = user_id, "Created post");

        self.cache.evict_all(CacheNamespace::PostPage).await;
        Ok(PostView::new(post, author.username))
    }

    /// Applies the fields present in `request`. Only the author may update.
    pub async fn update_post(
        &self,
        id: PostId,
        user_id: UserId,
        request: UpdatePostRequest,
    ) -> Result<PostView, ServiceError> {
        let (mut post, username) = self
            .posts
            .get_post_with_author(id)
            .await?
            .ok_or_else(|| ServiceError::post_not_found(id))?;
        ensure_post_author(&post, user_id)?;

        request.apply_to(&mut post);
        validate_post(&post.title, &post.content)?;

        self.posts.update_post(&post).await?;
        tracing::debug!(post_id = id, "Updated post");

        self.cache.evict(&hot_post_key(id)).await;
        self.cache.evict_all(CacheNamespace::PostPage).await;
        Ok(PostView::new(post, username))
    }

    /// Deletes the post with all of its comments. Only the author may delete.
    pub async fn delete_post(&self, id: PostId, user_id: UserId) -> Result<(), ServiceError> {
        let post = self
            .posts
            .get_post(id)
            .await?
            .ok_or_else(|| ServiceError::post_not_found(id))?;
        ensure_post_author(&post, user_id)?;

        self.posts.delete_post(id).await?;
        tracing::debug!(post_id = id, "Deleted post and its comments");

        self.cache.evict(&hot_post_key(id)).await;
        self.cache.evict(&comment_tree_key(id)).await;
        self.cache.evict_all(CacheNamespace::PostPage).await;
        Ok(())
    }

    /// Published posts, newest first. Whole pages are cached.
    pub async fn list_published(&self, page: PageRequest) -> Result<Page<PostView>, ServiceError> {
        let posts = &self.posts;
        self.cache
            .read_through(
                CacheNamespace::PostPage,
                &post_page_key(page),
                || async move {
                    let rows = posts.find_published(page).await?;
                    Ok::<_, ServiceError>(rows.map(PostView::from))
                },
                |_| true,
            )
            .await
    }

    pub async fn list_by_author(
        &self,
        author_id: UserId,
        page: PageRequest,
    ) -> Result<Page<PostView>, ServiceError> {
        let rows = self.posts.find_by_author(author_id, page).await?;
        Ok(rows.map(PostView::from))
    }
}

#[cfg(test)]
mod tests {
    use forum_core::forum::HOT_POST_VIEW_THRESHOLD;
    use forum_core::storage::CommentStore;

    use super::*;
    use crate::services::testing::Fixture;

    #[tokio::test]
    async fn test_get_post_counts_the_view() {
        let fx = Fixture::new();
        let alice = fx.store.user("alice").await;
        let post = fx.store.post(&alice, "hello").await;

        let view = fx.posts.get_post(post.id).await.unwrap();

        assert_eq!(view.view_count, 1);
        assert_eq!(view.author_username, "alice");
        assert_eq!(view.title, "hello");
    }

    #[tokio::test]
    async fn test_missing_post_is_not_found_and_not_created() {
        let fx = Fixture::new();

        let result = fx.posts.get_post(404).await;

        assert_eq!(
            result,
            Err(ServiceError::NotFound("Post not found with id: 404".to_string()))
        );
        assert!(fx.store.inner.get_post(404).await.unwrap().is_none());
        assert_eq!(fx.store.post_fetches(), 0);
    }

    #[tokio::test]
    async fn test_cold_post_is_fetched_every_time() {
        let fx = Fixture::new();
        let alice = fx.store.user("alice").await;
        let post = fx.store.post(&alice, "quiet").await;
        fx.store.set_views(&post, 4).await;

        let first = fx.posts.get_post(post.id).await.unwrap();
        let second = fx.posts.get_post(post.id).await.unwrap();

        assert_eq!(first.view_count, 5);
        assert_eq!(second.view_count, 6);
        assert_eq!(fx.store.post_fetches(), 2);
        assert!(!fx.cached(&hot_post_key(post.id)).await);
    }

    #[tokio::test]
    async fn test_hot_post_is_served_from_cache() {
        let fx = Fixture::new();
        let alice = fx.store.user("alice").await;
        let post = fx.store.post(&alice, "popular").await;
        fx.store
            .set_views(&post, HOT_POST_VIEW_THRESHOLD as u32)
            .await;

        let first = fx.posts.get_post(post.id).await.unwrap();
        let second = fx.posts.get_post(post.id).await.unwrap();

        assert_eq!(first.view_count, HOT_POST_VIEW_THRESHOLD + 1);
        assert_eq!(second, first);
        assert_eq!(fx.store.post_fetches(), 1);

        let stored = fx.store.inner.get_post(post.id).await.unwrap().unwrap();
        assert_eq!(stored.view_count, HOT_POST_VIEW_THRESHOLD + 2);
    }

    #[tokio::test]
    async fn test_exactly_threshold_views_is_not_cached() {
        let fx = Fixture::new();
        let alice = fx.store.user("alice").await;
        let post = fx.store.post(&alice, "borderline").await;
        fx.store
            .set_views(&post, HOT_POST_VIEW_THRESHOLD as u32 - 1)
            .await;

        let view = fx.posts.get_post(post.id).await.unwrap();

        assert_eq!(view.view_count, HOT_POST_VIEW_THRESHOLD);
        assert!(!fx.cached(&hot_post_key(post.id)).await);
    }

    #[tokio::test]
    async fn test_reads_work_without_cache() {
        let fx = Fixture::without_cache();
        let alice = fx.store.user("alice").await;
        let post = fx.store.post(&alice, "popular").await;
        fx.store.set_views(&post, 20).await;

        fx.posts.get_post(post.id).await.unwrap();
        let view = fx.posts.get_post(post.id).await.unwrap();

        assert_eq!(view.view_count, 22);
        assert_eq!(fx.store.post_fetches(), 2);
    }

    #[tokio::test]
    async fn test_concurrent_reads_count_every_view() {
        let fx = Arc::new(Fixture::new());
        let alice = fx.store.user("alice").await;
        let post = fx.store.post(&alice, "busy").await;

        let tasks: Vec<_> = (0..25)
            .map(|_| {
                let fx = fx.clone();
                tokio::spawn(async move { fx.posts.get_post(post.id).await })
            })
            .collect();
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        let stored = fx.store.inner.get_post(post.id).await.unwrap().unwrap();
        assert_eq!(stored.view_count, 25);
    }

    #[tokio::test]
    async fn test_update_evicts_hot_post() {
        let fx = Fixture::new();
        let alice = fx.store.user("alice").await;
        let post = fx.store.post(&alice, "before").await;
        fx.store.set_views(&post, 20).await;
        fx.posts.get_post(post.id).await.unwrap();
        assert!(fx.cached(&hot_post_key(post.id)).await);

        let updated = fx
            .posts
            .update_post(post.id, alice.id, UpdatePostRequest::new().with_title("after"))
            .await
            .unwrap();

        assert_eq!(updated.title, "after");
        assert_eq!(updated.content, "body");
        assert!(!fx.cached(&hot_post_key(post.id)).await);
        assert_eq!(fx.posts.get_post(post.id).await.unwrap().title, "after");
    }

    #[tokio::test]
    async fn test_update_by_other_user_is_rejected() {
        let fx = Fixture::new();
        let alice = fx.store.user("alice").await;
        let mallory = fx.store.user("mallory").await;
        let post = fx.store.post(&alice, "mine").await;

        let result = fx
            .posts
            .update_post(post.id, mallory.id, UpdatePostRequest::new().with_title("pwned"))
            .await;

        assert!(matches!(result, Err(ServiceError::BadRequest(_))));
        let stored = fx.store.inner.get_post(post.id).await.unwrap().unwrap();
        assert_eq!(stored.title, "mine");
    }

    #[tokio::test]
    async fn test_update_validates_merged_post() {
        let fx = Fixture::new();
        let alice = fx.store.user("alice").await;
        let post = fx.store.post(&alice, "title").await;

        let result = fx
            .posts
            .update_post(post.id, alice.id, UpdatePostRequest::new().with_title("   "))
            .await;

        assert!(matches!(result, Err(ServiceError::Validation(_))));
    }

    #[tokio::test]
    async fn test_create_post() {
        let fx = Fixture::new();
        let alice = fx.store.user("alice").await;

        let view = fx
            .posts
            .create_post(alice.id, CreatePostRequest::new("First", "Hello"))
            .await
            .unwrap();

        assert_eq!(view.author_username, "alice");
        assert_eq!(view.view_count, 0);
        assert!(view.published);
    }

    #[tokio::test]
    async fn test_create_post_for_unknown_user() {
        let fx = Fixture::new();

        let result = fx
            .posts
            .create_post(77, CreatePostRequest::new("First", "Hello"))
            .await;

        assert_eq!(
            result,
            Err(ServiceError::NotFound("User not found with id: 77".to_string()))
        );
    }

    #[tokio::test]
    async fn test_create_post_rejects_empty_title() {
        let fx = Fixture::new();
        let alice = fx.store.user("alice").await;

        let result = fx
            .posts
            .create_post(alice.id, CreatePostRequest::new("", "Hello"))
            .await;

        assert!(matches!(result, Err(ServiceError::Validation(_))));
    }

    #[tokio::test]
    async fn test_delete_post_evicts_everything_about_it() {
        let fx = Fixture::new();
        let alice = fx.store.user("alice").await;
        let post = fx.store.post(&alice, "doomed").await;
        fx.store.comment(&post, &alice, None, "first!").await;
        fx.store.set_views(&post, 20).await;

        fx.posts.get_post(post.id).await.unwrap();
        fx.comments.get_comments(post.id).await.unwrap();
        fx.posts.list_published(PageRequest::default()).await.unwrap();
        assert!(fx.cached(&hot_post_key(post.id)).await);
        assert!(fx.cached(&comment_tree_key(post.id)).await);

        fx.posts.delete_post(post.id, alice.id).await.unwrap();

        assert!(!fx.cached(&hot_post_key(post.id)).await);
        assert!(!fx.cached(&comment_tree_key(post.id)).await);
        assert!(!fx.cached(&post_page_key(PageRequest::default())).await);
        assert!(fx.store.inner.find_by_post(post.id).await.unwrap().is_empty());
        assert!(matches!(
            fx.posts.get_post(post.id).await,
            Err(ServiceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_post_by_other_user_is_rejected() {
        let fx = Fixture::new();
        let alice = fx.store.user("alice").await;
        let bob = fx.store.user("bob").await;
        let post = fx.store.post(&alice, "keep").await;

        let result = fx.posts.delete_post(post.id, bob.id).await;

        assert!(matches!(result, Err(ServiceError::BadRequest(_))));
        assert!(fx.store.inner.get_post(post.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_list_published_is_cached_until_a_post_changes() {
        let fx = Fixture::new();
        let alice = fx.store.user("alice").await;
        fx.store.post(&alice, "one").await;

        let first = fx.posts.list_published(PageRequest::default()).await.unwrap();
        fx.posts.list_published(PageRequest::default()).await.unwrap();
        assert_eq!(first.total_elements, 1);
        assert_eq!(fx.store.page_fetches(), 1);

        fx.posts
            .create_post(alice.id, CreatePostRequest::new("two", "body"))
            .await
            .unwrap();
        let refreshed = fx.posts.list_published(PageRequest::default()).await.unwrap();

        assert_eq!(refreshed.total_elements, 2);
        assert_eq!(refreshed.content[0].title, "two");
        assert_eq!(fx.store.page_fetches(), 2);
    }

    #[tokio::test]
    async fn test_list_by_author() {
        let fx = Fixture::new();
        let alice = fx.store.user("alice").await;
        let bob = fx.store.user("bob").await;
        fx.store.post(&alice, "a").await;
        fx.store.post(&bob, "b").await;

        let page = fx
            .posts
            .list_by_author(bob.id, PageRequest::default())
            .await
            .unwrap();

        assert_eq!(page.total_elements, 1);
        assert_eq!(page.content[0].author_username, "bob");
    }
}
