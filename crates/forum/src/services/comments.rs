//! Comment forests with the per-post comment-tree cache.

use std::sync::Arc;

use forum_core::cache::{comment_tree_key, CacheNamespace};
use forum_core::forum::{
    build_comment_tree, ensure_comment_access, ensure_parent_in_post, ensure_reply_depth,
    should_cache_comment_tree, validate_comment, Comment, CommentId, CommentView,
    CreateCommentRequest, PostId, UpdateCommentRequest, UserId, MAX_REPLY_DEPTH,
};
use forum_core::storage::{CommentStore, PostStore, UserDirectory};

use super::{ServiceError, SideCache};

/// Reads and writes comments. Every write evicts the comment tree of its
/// post and nothing else.
pub struct CommentService {
    posts: Arc<dyn PostStore>,
    comments: Arc<dyn CommentStore>,
    users: Arc<dyn UserDirectory>,
    cache: SideCache,
}

impl CommentService {
    pub fn new(
        posts: Arc<dyn PostStore>,
        comments: Arc<dyn CommentStore>,
        users: Arc<dyn UserDirectory>,
        cache: SideCache,
    ) -> Self {
        Self {
            posts,
            comments,
            users,
            cache,
        }
    }

    async fn ensure_post_exists(&self, post_id: PostId) -> Result<(), ServiceError> {
        match self.posts.get_post(post_id).await? {
            Some(_) => Ok(()),
            None => Err(ServiceError::post_not_found(post_id)),
        }
    }

    /// Loads a comment addressed as `post_id/comment_id` on behalf of its
    /// author.
    async fn owned_comment(
        &self,
        post_id: PostId,
        comment_id: CommentId,
        user_id: UserId,
    ) -> Result<Comment, ServiceError> {
        let comment = self
            .comments
            .get_comment(comment_id)
            .await?
            .ok_or_else(|| ServiceError::comment_not_found(comment_id))?;
        ensure_comment_access(&comment, post_id, user_id)?;
        Ok(comment)
    }

    /// Nesting level of `comment`: 0 for a root, one more per ancestor.
    /// Counting stops once the reply limit is passed.
    async fn depth_of(&self, comment: &Comment) -> Result<usize, ServiceError> {
        let mut depth = 0;
        let mut parent_id = comment.parent_id;

        while let Some(id) = parent_id {
            depth += 1;
            if depth > MAX_REPLY_DEPTH {
                break;
            }
            parent_id = self
                .comments
                .get_comment(id)
                .await?
                .and_then(|parent| parent.parent_id);
        }

        Ok(depth)
    }

    /// The comment forest of a post, roots and replies oldest first.
    ///
    /// The cache holds the flat rows and the forest is rebuilt on every
    /// read. Empty forests are not cached.
    pub async fn get_comments(&self, post_id: PostId) -> Result<Vec<CommentView>, ServiceError> {
        self.ensure_post_exists(post_id).await?;

        let key = comment_tree_key(post_id);
        if let Some(rows) = self.cache.get::<Vec<(Comment, String)>>(&key).await {
            return Ok(build_comment_tree(rows));
        }

        let rows = self.comments.find_by_post(post_id).await?;
        tracing::debug!(post_id, rows = rows.len(), "Building comment tree");

        let forest = build_comment_tree(rows.iter().cloned());
        if should_cache_comment_tree(&forest) {
            self.cache
                .put(CacheNamespace::CommentTree, &key, &rows)
                .await;
        }
        Ok(forest)
    }

    pub async fn create_comment(
        &self,
        post_id: PostId,
        user_id: UserId,
        request: CreateCommentRequest,
    ) -> Result<CommentView, ServiceError> {
        validate_comment(&request.content)?;
        self.ensure_post_exists(post_id).await?;

        let author = self
            .users
            .get_user(user_id)
            .await?
            .ok_or_else(|| ServiceError::user_not_found(user_id))?;

        if let Some(parent_id) = request.parent_id {
            let parent = self
                .comments
                .get_comment(parent_id)
                .await?
                .ok_or_else(|| ServiceError::NotFound("Parent comment not found".to_string()))?;
            ensure_parent_in_post(&parent, post_id)?;
            ensure_reply_depth(self.depth_of(&parent).await? + 1)?;
        }

        let comment = self
            .comments
            .create_comment(&request.into_new_comment(post_id, user_id))
            .await?;
        tracing::debug!(
            comment_id = comment.id,
            post_id,
            parent_id = ?comment.parent_id,
            "Created comment"
        );

        self.cache.evict(&comment_tree_key(post_id)).await;
        Ok(CommentView::new(comment, author.username))
    }

    pub async fn update_comment(
        &self,
        post_id: PostId,
        comment_id: CommentId,
        user_id: UserId,
        request: UpdateCommentRequest,
    ) -> Result<CommentView, ServiceError> {
        validate_comment(&request.content)?;
        let mut comment = self.owned_comment(post_id, comment_id, user_id).await?;

        let author = self
            .users
            .get_user(user_id)
            .await?
            .ok_or_else(|| ServiceError::user_not_found(user_id))?;

        request.apply_to(&mut comment);
        self.comments.update_comment(&comment).await?;
        tracing::debug!(comment_id, post_id, "Updated comment");

        self.cache.evict(&comment_tree_key(post_id)).await;
        Ok(CommentView::new(comment, author.username))
    }

    /// Deletes the comment together with every reply beneath it.
    pub async fn delete_comment(
        &self,
        post_id: PostId,
        comment_id: CommentId,
        user_id: UserId,
    ) -> Result<(), ServiceError> {
        self.owned_comment(post_id, comment_id, user_id).await?;

        self.comments.delete_comment(comment_id).await?;
        tracing::debug!(comment_id, post_id, "Deleted comment subtree");

        self.cache.evict(&comment_tree_key(post_id)).await;
        Ok(())
    }
}
