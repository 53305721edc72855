//! Post handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use forum_auth::CurrentUser;
use forum_core::forum::{
    CreatePostRequest, ListPostsQuery, PostId, PostView, UpdatePostRequest, UserId,
};
use forum_core::storage::Page;

use crate::handlers::AppError;
use crate::state::AppState;

/// GET /api/posts - Published posts, newest first.
#[axum::debug_handler]
pub async fn list_posts(
    State(state): State<AppState>,
    Query(query): Query<ListPostsQuery>,
) -> Result<Json<Page<PostView>>, AppError> {
    let page = state.posts.list_published(query.page_request()).await?;
    Ok(Json(page))
}

/// GET /api/posts/author/{author_id} - Posts by one author, newest first.
pub async fn list_posts_by_author(
    State(state): State<AppState>,
    Path(author_id): Path<UserId>,
    Query(query): Query<ListPostsQuery>,
) -> Result<Json<Page<PostView>>, AppError> {
    let page = state
        .posts
        .list_by_author(author_id, query.page_request())
        .await?;
    Ok(Json(page))
}

/// GET /api/posts/{id} - Counts a view and returns the post.
#[axum::debug_handler]
pub async fn get_post(
    State(state): State<AppState>,
    Path(id): Path<PostId>,
) -> Result<Json<PostView>, AppError> {
    Ok(Json(state.posts.get_post(id).await?))
}

/// POST /api/posts
pub async fn create_post(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Json(request): Json<CreatePostRequest>,
) -> Result<(StatusCode, Json<PostView>), AppError> {
    let post = state.posts.create_post(user.id, request).await?;
    tracing::info!(post_id = post.id, author = %user.username, "Post created");
    Ok((StatusCode::CREATED, Json(post)))
}

/// PUT /api/posts/{id}
pub async fn update_post(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<PostId>,
    Json(request): Json<UpdatePostRequest>,
) -> Result<Json<PostView>, AppError> {
    Ok(Json(state.posts.update_post(id, user.id, request).await?))
}

/// DELETE /api/posts/{id}
pub async fn delete_post(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<PostId>,
) -> Result<StatusCode, AppError> {
    state.posts.delete_post(id, user.id).await?;
    tracing::info!(post_id = id, "Post deleted");
    Ok(StatusCode::NO_CONTENT)
}
