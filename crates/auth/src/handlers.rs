//! HTTP handlers for auth routes.

use axum::{extract::State, http::StatusCode, routing::get, routing::post, Json, Router};
use forum_core::forum::{LoginRequest, RegisterRequest, UserId};
use serde::{Deserialize, Serialize};

use crate::error::AuthError;
use crate::extractors::CurrentUser;
use crate::service::TokenResponse;
use crate::AuthState;

/// Public view of the authenticated account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub full_name: Option<String>,
}

/// Creates the auth router.
///
/// Routes:
/// - `POST /auth/register` - Create an account and return a token
/// - `POST /auth/login` - Exchange credentials for a token
/// - `GET /auth/me` - Profile of the bearer of the token
pub fn auth_routes() -> Router<AuthState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/me", get(me))
}

async fn register(
    State(state): State<AuthState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<TokenResponse>), AuthError> {
    let response = state.service.register(request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn login(
    State(state): State<AuthState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, AuthError> {
    Ok(Json(state.service.login(request).await?))
}

async fn me(CurrentUser(user): CurrentUser) -> Json<UserProfile> {
    Json(UserProfile {
        id: user.id,
        username: user.username,
        email: user.email,
        full_name: user.full_name,
    })
}
