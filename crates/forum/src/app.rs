use std::time::Duration;

use axum::{
    http::{header, Method, StatusCode},
    routing::{get, put},
    Router,
};
use forum_auth::auth_routes;
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::{
    handlers::{
        comments::{create_comment, delete_comment, list_comments, update_comment},
        health::{livez, readyz},
        posts::{
            create_post, delete_post, get_post, list_posts, list_posts_by_author, update_post,
        },
    },
    state::AppState,
};

/// Create the application router with all routes and middleware.
pub fn create_app(state: AppState) -> Router {
    // CORS configuration for API endpoints
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    // API routes with CORS
    let api_routes = Router::new()
        // Post routes
        .route("/posts", get(list_posts).post(create_post))
        .route("/posts/author/{author_id}", get(list_posts_by_author))
        .route(
            "/posts/{id}",
            get(get_post).put(update_post).delete(delete_post),
        )
        // Comment routes
        .route(
            "/posts/{post_id}/comments",
            get(list_comments).post(create_comment),
        )
        .route(
            "/posts/{post_id}/comments/{comment_id}",
            put(update_comment).delete(delete_comment),
        )
        // Account routes
        .merge(auth_routes().with_state(state.auth.clone()))
        .layer(cors);

    // Main application router
    Router::new()
        .route("/livez", get(livez))
        .route("/readyz", get(readyz))
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(10),
        ))
        .with_state(state)
}
