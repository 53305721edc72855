//! API request types for post, comment and account operations.
//!
//! Pure data types shared by the HTTP layer and the services.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::types::{Comment, CommentId, NewComment, NewPost, Post, PostId, UserId};
use crate::storage::PageRequest;

/// Request payload for creating a post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePostRequest {
    pub title: String,
    pub content: String,
}

impl CreatePostRequest {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
        }
    }

    pub fn into_new_post(self, author_id: UserId) -> NewPost {
        NewPost::new(author_id, self.title, self.content)
    }
}

/// Request payload for updating a post. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdatePostRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl UpdatePostRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    /// Applies the update and bumps `updated_at`.
    pub fn apply_to(self, post: &mut Post) {
        if let Some(title) = self.title {
            post.title = title;
        }
        if let Some(content) = self.content {
            post.content = content;
        }
        post.updated_at = Utc::now();
    }
}

/// Request payload for creating a comment or a reply.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentRequest {
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<CommentId>,
}

impl CreateCommentRequest {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            parent_id: None,
        }
    }

    pub fn reply_to(mut self, parent_id: CommentId) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    pub fn into_new_comment(self, post_id: PostId, user_id: UserId) -> NewComment {
        let comment = NewComment::new(post_id, user_id, self.content);
        match self.parent_id {
            Some(parent_id) => comment.reply_to(parent_id),
            None => comment,
        }
    }
}

/// Request payload for editing a comment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateCommentRequest {
    pub content: String,
}

impl UpdateCommentRequest {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }

    /// Replaces the content and bumps `updated_at`.
    pub fn apply_to(self, comment: &mut Comment) {
        comment.content = self.content;
        comment.updated_at = Utc::now();
    }
}

/// Request payload for account registration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
}

/// Request payload for logging in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Query parameters for paged post listings.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ListPostsQuery {
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub size: Option<u32>,
}

impl ListPostsQuery {
    /// Fills in defaults and clamps the page size.
    pub fn page_request(&self) -> PageRequest {
        let defaults = PageRequest::default();
        PageRequest::new(
            self.page.unwrap_or(defaults.page),
            self.size.unwrap_or(defaults.size),
        )
    }
}
