//! In-memory repository implementation.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use forum_core::forum::{
    Comment, CommentId, NewComment, NewPost, NewUser, Post, PostId, User, UserId,
};
use forum_core::storage::{
    CommentStore, Page, PageRequest, PostStore, RepositoryError, Result, UserDirectory,
};

/// In-memory storage backend for development and tests.
///
/// Each table is a `HashMap` behind its own `RwLock`. Operations that touch
/// several tables always lock in the order posts, comments, users so that
/// the post cascade cannot deadlock against a comment write.
#[derive(Debug, Clone)]
pub struct InMemoryRepository {
    posts: Arc<RwLock<HashMap<PostId, Post>>>,
    comments: Arc<RwLock<HashMap<CommentId, Comment>>>,
    users: Arc<RwLock<HashMap<UserId, User>>>,
    next_post_id: Arc<AtomicI64>,
    next_comment_id: Arc<AtomicI64>,
    next_user_id: Arc<AtomicI64>,
}

impl Default for InMemoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryRepository {
    /// Creates a new empty in-memory repository.
    pub fn new() -> Self {
        Self {
            posts: Arc::new(RwLock::new(HashMap::new())),
            comments: Arc::new(RwLock::new(HashMap::new())),
            users: Arc::new(RwLock::new(HashMap::new())),
            next_post_id: Arc::new(AtomicI64::new(1)),
            next_comment_id: Arc::new(AtomicI64::new(1)),
            next_user_id: Arc::new(AtomicI64::new(1)),
        }
    }

    async fn page_of_posts(
        &self,
        page: PageRequest,
        filter: impl Fn(&Post) -> bool,
    ) -> Result<Page<(Post, String)>> {
        let posts = self.posts.read().await;
        let users = self.users.read().await;

        let mut rows: Vec<(Post, String)> = posts
            .values()
            .filter(|post| filter(post))
            .filter_map(|post| {
                let author = users.get(&post.author_id)?;
                Some((post.clone(), author.username.clone()))
            })
            .collect();

        rows.sort_by(|(a, _), (b, _)| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });

        Ok(Page::from_all(rows, page))
    }
}

/// Ids of `root` and every comment beneath it.
fn subtree_ids(comments: &HashMap<CommentId, Comment>, root: CommentId) -> HashSet<CommentId> {
    let mut children: HashMap<CommentId, Vec<CommentId>> = HashMap::new();
    for comment in comments.values() {
        if let Some(parent_id) = comment.parent_id {
            children.entry(parent_id).or_default().push(comment.id);
        }
    }

    let mut ids = HashSet::new();
    let mut stack = vec![root];
    while let Some(id) = stack.pop() {
        if ids.insert(id) {
            if let Some(kids) = children.get(&id) {
                stack.extend(kids);
            }
        }
    }
    ids
}

#[async_trait]
impl PostStore for InMemoryRepository {
    async fn get_post(&self, id: PostId) -> Result<Option<Post>> {
        let posts = self.posts.read().await;
        Ok(posts.get(&id).cloned())
    }

    async fn get_post_with_author(&self, id: PostId) -> Result<Option<(Post, String)>> {
        let posts = self.posts.read().await;
        let users = self.users.read().await;

        Ok(posts.get(&id).and_then(|post| {
            users
                .get(&post.author_id)
                .map(|author| (post.clone(), author.username.clone()))
        }))
    }

    async fn create_post(&self, post: &NewPost) -> Result<Post> {
        let mut posts = self.posts.write().await;
        let id = self.next_post_id.fetch_add(1, Ordering::SeqCst);
        let post = post.clone().into_post(id);
        posts.insert(id, post.clone());
        Ok(post)
    }

    async fn update_post(&self, post: &Post) -> Result<()> {
        let mut posts = self.posts.write().await;
        let Some(stored) = posts.get_mut(&post.id) else {
            return Err(RepositoryError::not_found("Post", post.id));
        };
        stored.title = post.title.clone();
        stored.content = post.content.clone();
        stored.published = post.published;
        stored.updated_at = post.updated_at;
        Ok(())
    }

    async fn delete_post(&self, id: PostId) -> Result<()> {
        let mut posts = self.posts.write().await;
        let mut comments = self.comments.write().await;

        if posts.remove(&id).is_none() {
            return Err(RepositoryError::not_found("Post", id));
        }
        comments.retain(|_, comment| comment.post_id != id);
        Ok(())
    }

    async fn increment_view_count(&self, id: PostId) -> Result<u64> {
        let mut posts = self.posts.write().await;
        match posts.get_mut(&id) {
            Some(post) => {
                post.view_count += 1;
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn find_published(&self, page: PageRequest) -> Result<Page<(Post, String)>> {
        self.page_of_posts(page, |post| post.published).await
    }

    async fn find_by_author(
        &self,
        author_id: UserId,
        page: PageRequest,
    ) -> Result<Page<(Post, String)>> {
        self.page_of_posts(page, |post| post.author_id == author_id)
            .await
    }
}

#[async_trait]
impl CommentStore for InMemoryRepository {
    async fn get_comment(&self, id: CommentId) -> Result<Option<Comment>> {
        let comments = self.comments.read().await;
        Ok(comments.get(&id).cloned())
    }

    async fn find_by_post(&self, post_id: PostId) -> Result<Vec<(Comment, String)>> {
        let comments = self.comments.read().await;
        let users = self.users.read().await;

        let mut rows: Vec<(Comment, String)> = comments
            .values()
            .filter(|comment| comment.post_id == post_id)
            .filter_map(|comment| {
                let author = users.get(&comment.user_id)?;
                Some((comment.clone(), author.username.clone()))
            })
            .collect();

        rows.sort_by(|(a, _), (b, _)| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(rows)
    }

    async fn create_comment(&self, comment: &NewComment) -> Result<Comment> {
        let posts = self.posts.read().await;
        let mut comments = self.comments.write().await;

        if !posts.contains_key(&comment.post_id) {
            return Err(RepositoryError::not_found("Post", comment.post_id));
        }
        if let Some(parent_id) = comment.parent_id {
            if !comments.contains_key(&parent_id) {
                return Err(RepositoryError::not_found("Comment", parent_id));
            }
        }

        let id = self.next_comment_id.fetch_add(1, Ordering::SeqCst);
        let comment = comment.clone().into_comment(id);
        comments.insert(id, comment.clone());
        Ok(comment)
    }

    async fn update_comment(&self, comment: &Comment) -> Result<()> {
        let mut comments = self.comments.write().await;
        let Some(stored) = comments.get_mut(&comment.id) else {
            return Err(RepositoryError::not_found("Comment", comment.id));
        };
        stored.content = comment.content.clone();
        stored.updated_at = comment.updated_at;
        Ok(())
    }

    async fn delete_comment(&self, id: CommentId) -> Result<()> {
        let mut comments = self.comments.write().await;
        if !comments.contains_key(&id) {
            return Err(RepositoryError::not_found("Comment", id));
        }

        let doomed = subtree_ids(&comments, id);
        comments.retain(|comment_id, _| !doomed.contains(comment_id));
        Ok(())
    }
}

#[async_trait]
impl UserDirectory for InMemoryRepository {
    async fn get_user(&self, id: UserId) -> Result<Option<User>> {
        let users = self.users.read().await;
        Ok(users.get(&id).cloned())
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let users = self.users.read().await;
        Ok(users.values().find(|user| user.username == username).cloned())
    }

    async fn username_exists(&self, username: &str) -> Result<bool> {
        let users = self.users.read().await;
        Ok(users.values().any(|user| user.username == username))
    }

    async fn email_exists(&self, email: &str) -> Result<bool> {
        let users = self.users.read().await;
        Ok(users.values().any(|user| user.email == email))
    }

    async fn create_user(&self, user: &NewUser) -> Result<User> {
        let mut users = self.users.write().await;

        if let Some(existing) = users
            .values()
            .find(|u| u.username == user.username || u.email == user.email)
        {
            let id = if existing.username == user.username {
                &user.username
            } else {
                &user.email
            };
            return Err(RepositoryError::AlreadyExists {
                entity_type: "User",
                id: id.clone(),
            });
        }

        let id = self.next_user_id.fetch_add(1, Ordering::SeqCst);
        let user = user.clone().into_user(id);
        users.insert(id, user.clone());
        Ok(user)
    }

    async fn record_login(&self, id: UserId, at: DateTime<Utc>) -> Result<()> {
        let mut users = self.users.write().await;
        let Some(user) = users.get_mut(&id) else {
            return Err(RepositoryError::not_found("User", id));
        };
        user.last_login_at = Some(at);
        user.updated_at = at;
        Ok(())
    }
}
