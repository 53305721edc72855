use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type PostId = i64;
pub type CommentId = i64;
pub type UserId = i64;

/// A registered forum account.
///
/// The password hash never leaves the server, so the type is not serializable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    /// Argon2id hash in PHC string format.
    pub password_hash: String,
    pub full_name: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
}

/// Data needed to insert a user. The store assigns the id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub full_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl NewUser {
    pub fn new(
        username: impl Into<String>,
        email: impl Into<String>,
        password_hash: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            email: email.into(),
            password_hash: password_hash.into(),
            full_name: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_full_name(mut self, full_name: impl Into<String>) -> Self {
        self.full_name = Some(full_name.into());
        self
    }

    /// Materializes the user once the store has assigned an id.
    pub fn into_user(self, id: UserId) -> User {
        User {
            id,
            username: self.username,
            email: self.email,
            password_hash: self.password_hash,
            full_name: self.full_name,
            active: true,
            created_at: self.created_at,
            updated_at: self.created_at,
            last_login_at: None,
        }
    }
}

/// A forum post as persisted by the post store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: PostId,
    pub title: String,
    pub content: String,
    pub author_id: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Only ever grows, one store-level increment per read.
    pub view_count: i64,
    pub published: bool,
}

/// Data needed to insert a post. The store assigns the id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPost {
    pub title: String,
    pub content: String,
    pub author_id: UserId,
    pub published: bool,
    pub created_at: DateTime<Utc>,
}

impl NewPost {
    /// A published post with the current timestamp.
    pub fn new(author_id: UserId, title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            author_id,
            published: true,
            created_at: Utc::now(),
        }
    }

    pub fn unpublished(mut self) -> Self {
        self.published = false;
        self
    }

    /// Sets a fixed creation time (useful for testing ordering).
    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    pub fn into_post(self, id: PostId) -> Post {
        Post {
            id,
            title: self.title,
            content: self.content,
            author_id: self.author_id,
            created_at: self.created_at,
            updated_at: self.created_at,
            view_count: 0,
            published: self.published,
        }
    }
}

/// A post joined with its author's username, as returned to clients and
/// stored in the hot-post cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostView {
    pub id: PostId,
    pub title: String,
    pub content: String,
    pub author_id: UserId,
    pub author_username: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub view_count: i64,
    pub published: bool,
}

impl PostView {
    pub fn new(post: Post, author_username: impl Into<String>) -> Self {
        Self {
            id: post.id,
            title: post.title,
            content: post.content,
            author_id: post.author_id,
            author_username: author_username.into(),
            created_at: post.created_at,
            updated_at: post.updated_at,
            view_count: post.view_count,
            published: post.published,
        }
    }
}

impl From<(Post, String)> for PostView {
    fn from((post, author_username): (Post, String)) -> Self {
        PostView::new(post, author_username)
    }
}

/// A comment as persisted by the comment store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: CommentId,
    pub post_id: PostId,
    pub user_id: UserId,
    pub content: String,
    /// `None` for root comments.
    pub parent_id: Option<CommentId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Data needed to insert a comment. The store assigns the id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewComment {
    pub post_id: PostId,
    pub user_id: UserId,
    pub content: String,
    pub parent_id: Option<CommentId>,
    pub created_at: DateTime<Utc>,
}

impl NewComment {
    pub fn new(post_id: PostId, user_id: UserId, content: impl Into<String>) -> Self {
        Self {
            post_id,
            user_id,
            content: content.into(),
            parent_id: None,
            created_at: Utc::now(),
        }
    }

    pub fn reply_to(mut self, parent_id: CommentId) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    pub fn into_comment(self, id: CommentId) -> Comment {
        Comment {
            id,
            post_id: self.post_id,
            user_id: self.user_id,
            content: self.content,
            parent_id: self.parent_id,
            created_at: self.created_at,
            updated_at: self.created_at,
        }
    }
}

/// A comment with its author's username and nested replies.
///
/// Forests of these are what the comment-tree cache stores, so the type
/// round-trips through JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentView {
    pub id: CommentId,
    pub post_id: PostId,
    pub user_id: UserId,
    pub username: String,
    pub content: String,
    pub parent_id: Option<CommentId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub replies: Vec<CommentView>,
}

impl CommentView {
    /// Creates a view with no replies attached yet.
    pub fn new(comment: Comment, username: impl Into<String>) -> Self {
        Self {
            id: comment.id,
            post_id: comment.post_id,
            user_id: comment.user_id,
            username: username.into(),
            content: comment.content,
            parent_id: comment.parent_id,
            created_at: comment.created_at,
            updated_at: comment.updated_at,
            replies: Vec::new(),
        }
    }

    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

// The derived drop recurses once per level; a long reply chain would
// exhaust the stack. Flatten the subtree first.
impl Drop for CommentView {
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.replies);
        while let Some(mut node) = pending.pop() {
            pending.append(&mut node.replies);
        }
    }
}
