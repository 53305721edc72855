//! Comment handlers, nested under a post.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use forum_auth::CurrentUser;
use forum_core::forum::{
    CommentId, CommentView, CreateCommentRequest, PostId, UpdateCommentRequest,
};

use crate::handlers::AppError;
use crate::state::AppState;

/// GET /api/posts/{post_id}/comments - The comment forest of a post.
#[axum::debug_handler]
pub async fn list_comments(
    State(state): State<AppState>,
    Path(post_id): Path<PostId>,
) -> Result<Json<Vec<CommentView>>, AppError> {
    Ok(Json(state.comments.get_comments(post_id).await?))
}

/// POST /api/posts/{post_id}/comments - A root comment, or a reply when
/// `parentId` is set.
pub async fn create_comment(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Path(post_id): Path<PostId>,
    Json(request): Json<CreateCommentRequest>,
) -> Result<(StatusCode, Json<CommentView>), AppError> {
    let comment = state
        .comments
        .create_comment(post_id, user.id, request)
        .await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

/// PUT /api/posts/{post_id}/comments/{comment_id} - Author-only edit.
pub async fn update_comment(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Path((post_id, comment_id)): Path<(PostId, CommentId)>,
    Json(request): Json<UpdateCommentRequest>,
) -> Result<Json<CommentView>, AppError> {
    let comment = state
        .comments
        .update_comment(post_id, comment_id, user.id, request)
        .await?;
    Ok(Json(comment))
}

/// DELETE /api/posts/{post_id}/comments/{comment_id} - Removes the comment
/// and its replies.
pub async fn delete_comment(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Path((post_id, comment_id)): Path<(PostId, CommentId)>,
) -> Result<StatusCode, AppError> {
    state
        .comments
        .delete_comment(post_id, comment_id, user.id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
