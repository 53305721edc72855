use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::forum::{Comment, CommentId, NewComment, NewPost, NewUser, Post, PostId, User, UserId};

use super::{Page, PageRequest, Result};

/// Store for posts.
#[async_trait]
pub trait PostStore: Send + Sync {
    /// Gets a post by its ID.
    async fn get_post(&self, id: PostId) -> Result<Option<Post>>;

    /// Gets a post together with its author's username.
    async fn get_post_with_author(&self, id: PostId) -> Result<Option<(Post, String)>>;

    /// Inserts a post and returns it with its assigned ID.
    async fn create_post(&self, post: &NewPost) -> Result<Post>;

    /// Replaces the title, content, published flag and `updated_at` of a post.
    /// The view count is owned by [`PostStore::increment_view_count`] and is
    /// left untouched.
    async fn update_post(&self, post: &Post) -> Result<()>;

    /// Deletes a post and all of its comments in one unit of work.
    async fn delete_post(&self, id: PostId) -> Result<()>;

    /// Atomically adds one to the post's view count.
    ///
    /// Returns the number of rows affected: `0` when no post has this ID, in
    /// which case nothing is created.
    async fn increment_view_count(&self, id: PostId) -> Result<u64>;

    /// Published posts with author usernames, newest first.
    async fn find_published(&self, page: PageRequest) -> Result<Page<(Post, String)>>;

    /// Posts by one author, newest first.
    async fn find_by_author(
        &self,
        author_id: UserId,
        page: PageRequest,
    ) -> Result<Page<(Post, String)>>;
}

/// Store for comments.
#[async_trait]
pub trait CommentStore: Send + Sync {
    /// Gets a comment by its ID.
    async fn get_comment(&self, id: CommentId) -> Result<Option<Comment>>;

    /// All comments of a post with author usernames, oldest first.
    async fn find_by_post(&self, post_id: PostId) -> Result<Vec<(Comment, String)>>;

    /// Inserts a comment and returns it with its assigned ID.
    async fn create_comment(&self, comment: &NewComment) -> Result<Comment>;

    /// Replaces the content and `updated_at` of a comment.
    async fn update_comment(&self, comment: &Comment) -> Result<()>;

    /// Deletes a comment together with every reply beneath it.
    async fn delete_comment(&self, id: CommentId) -> Result<()>;
}

/// Lookup and registration of users.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Gets a user by their ID.
    async fn get_user(&self, id: UserId) -> Result<Option<User>>;

    /// Gets a user by their username.
    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>>;

    async fn username_exists(&self, username: &str) -> Result<bool>;

    async fn email_exists(&self, email: &str) -> Result<bool>;

    /// Inserts a user and returns it with its assigned ID.
    async fn create_user(&self, user: &NewUser) -> Result<User>;

    /// Records a successful login.
    async fn record_login(&self, id: UserId, at: DateTime<Utc>) -> Result<()>;
}
