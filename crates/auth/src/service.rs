//! Registration, login and token authentication.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use forum_core::cache::{decode, encode, token_key, Cache};
use forum_core::forum::{validate_account, LoginRequest, NewUser, RegisterRequest, User, UserId};
use forum_core::storage::UserDirectory;
use serde::{Deserialize, Serialize};

use crate::error::AuthError;
use crate::password::{hash_password, verify_password};
use crate::token::TokenIssuer;

/// Returned by register and login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
    #[serde(rename = "type")]
    pub token_type: String,
    pub id: UserId,
    pub username: String,
    pub email: String,
}

impl TokenResponse {
    fn bearer(token: String, user: &User) -> Self {
        Self {
            token,
            token_type: "Bearer".to_string(),
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
        }
    }
}

/// Account operations over a user directory, with issued tokens cached per
/// username.
pub struct AuthService {
    users: Arc<dyn UserDirectory>,
    cache: Arc<dyn Cache>,
    issuer: TokenIssuer,
    token_cache_ttl: Duration,
}

impl AuthService {
    /// A cached token never outlives the token itself, so the cache TTL is
    /// capped at the issuer's lifetime.
    pub fn new(
        users: Arc<dyn UserDirectory>,
        cache: Arc<dyn Cache>,
        issuer: TokenIssuer,
        token_cache_ttl: Duration,
    ) -> Self {
        let token_cache_ttl = token_cache_ttl.min(issuer.ttl());
        Self {
            users,
            cache,
            issuer,
            token_cache_ttl,
        }
    }

    pub async fn register(&self, request: RegisterRequest) -> Result<TokenResponse, AuthError> {
        validate_account(&request.username, &request.email, &request.password)?;

        let username = request.username.trim().to_string();
        let email = request.email.trim().to_string();

        if self.users.username_exists(&username).await? {
            return Err(AuthError::UsernameTaken);
        }
        if self.users.email_exists(&email).await? {
            return Err(AuthError::EmailInUse);
        }

        let password_hash = hash_password(request.password).await?;
        let mut new_user = NewUser::new(username, email, password_hash);
        if let Some(full_name) = request.full_name.filter(|n| !n.trim().is_empty()) {
            new_user = new_user.with_full_name(full_name);
        }

        let user = self.users.create_user(&new_user).await?;
        tracing::info!(user_id = user.id, username = %user.username, "Registered user");

        let token = self.token_for(&user.username).await?;
        Ok(TokenResponse::bearer(token, &user))
    }

    /// Verifies the credentials, records the login and returns a token.
    ///
    /// The token cache is only consulted after the password has been checked.
    pub async fn login(&self, request: LoginRequest) -> Result<TokenResponse, AuthError> {
        let user = self
            .users
            .get_user_by_username(request.username.trim())
            .await?
            .filter(|user| user.active)
            .ok_or(AuthError::InvalidCredentials)?;

        if !verify_password(request.password, user.password_hash.clone()).await? {
            tracing::debug!(username = %user.username, "Rejected login");
            return Err(AuthError::InvalidCredentials);
        }

        self.users.record_login(user.id, Utc::now()).await?;
        tracing::debug!(user_id = user.id, "User logged in");

        let token = self.token_for(&user.username).await?;
        Ok(TokenResponse::bearer(token, &user))
    }

    /// Resolves a bearer token to an active user.
    pub async fn authenticate(&self, token: &str) -> Result<User, AuthError> {
        let claims = self.issuer.verify(token)?;

        self.users
            .get_user_by_username(&claims.sub)
            .await?
            .filter(|user| user.active)
            .ok_or_else(|| AuthError::InvalidToken("unknown subject".to_string()))
    }

    /// Returns the cached token for `username` if it still verifies, otherwise
    /// issues and caches a new one. Cache failures only cost a fresh token.
    async fn token_for(&self, username: &str) -> Result<String, AuthError> {
        let key = token_key(username);

        match self.cache.get(&key).await {
            Ok(Some(bytes)) => match decode::<String>(&bytes) {
                Ok(token) if self.issuer.verify(&token).is_ok() => {
                    tracing::trace!(key = %key, "Token cache hit");
                    return Ok(token);
                }
                _ => tracing::trace!(key = %key, "Discarding stale cached token"),
            },
            Ok(None) => tracing::trace!(key = %key, "Token cache miss"),
            Err(err) => tracing::warn!(error = %err, key = %key, "Token cache read failed"),
        }

        let token = self.issuer.issue(username)?;

        match encode(&token) {
            Ok(bytes) => {
                if let Err(err) = self
                    .cache
                    .set(&key, &bytes, Some(self.token_cache_ttl))
                    .await
                {
                    tracing::warn!(error = %err, key = %key, "Failed to cache token");
                }
            }
            Err(err) => tracing::warn!(error = %err, key = %key, "Failed to encode token"),
        }

        Ok(token)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;

    use super::*;
    use crate::testing::{service_with, MockCache, MockUsers};

    fn register_request(username: &str, email: &str) -> RegisterRequest {
        RegisterRequest {
            username: username.to_string(),
            email: email.to_string(),
            password: "secret-password".to_string(),
            full_name: Some("Test User".to_string()),
        }
    }

    fn login_request(username: &str, password: &str) -> LoginRequest {
        LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn test_register_returns_bearer_token() {
        let (service, users, _) = service_with(MockCache::new());

        let response = service
            .register(register_request("alice", "alice@example.com"))
            .await
            .unwrap();

        assert_eq!(response.token_type, "Bearer");
        assert_eq!(response.username, "alice");
        assert_eq!(response.email, "alice@example.com");

        let stored = users.by_username("alice").unwrap();
        assert!(stored.password_hash.starts_with("$argon2id$"));
        assert_eq!(stored.full_name.as_deref(), Some("Test User"));
    }

    #[tokio::test]
    async fn test_register_duplicate_username() {
        let (service, _, _) = service_with(MockCache::new());
        service
            .register(register_request("alice", "alice@example.com"))
            .await
            .unwrap();

        let result = service
            .register(register_request("alice", "other@example.com"))
            .await;
        assert!(matches!(result, Err(AuthError::UsernameTaken)));
    }

    #[tokio::test]
    async fn test_register_duplicate_email() {
        let (service, _, _) = service_with(MockCache::new());
        service
            .register(register_request("alice", "alice@example.com"))
            .await
            .unwrap();

        let result = service
            .register(register_request("alicia", "alice@example.com"))
            .await;
        assert!(matches!(result, Err(AuthError::EmailInUse)));
    }

    #[tokio::test]
    async fn test_register_validates_before_touching_store() {
        let (service, users, _) = service_with(MockCache::new());

        let mut request = register_request("alice", "alice@example.com");
        request.password = "123".to_string();

        let result = service.register(request).await;
        assert!(matches!(result, Err(AuthError::Validation(_))));
        assert_eq!(users.lookups.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_login_records_last_login() {
        let (service, users, _) = service_with(MockCache::new());
        service
            .register(register_request("bob", "bob@example.com"))
            .await
            .unwrap();

        let response = service
            .login(login_request("bob", "secret-password"))
            .await
            .unwrap();

        assert_eq!(response.username, "bob");
        assert!(users.by_username("bob").unwrap().last_login_at.is_some());
    }

    #[tokio::test]
    async fn test_login_wrong_password_never_reads_token_cache() {
        let (service, _, cache) = service_with(MockCache::new());
        service
            .register(register_request("bob", "bob@example.com"))
            .await
            .unwrap();
        let gets_after_register = cache.get_count.load(Ordering::SeqCst);

        let result = service.login(login_request("bob", "wrong-password")).await;

        assert!(matches!(result, Err(AuthError::InvalidCredentials)));
        assert_eq!(cache.get_count.load(Ordering::SeqCst), gets_after_register);
    }

    #[tokio::test]
    async fn test_login_unknown_user() {
        let (service, _, _) = service_with(MockCache::new());
        let result = service.login(login_request("nobody", "whatever")).await;
        assert!(matches!(result, Err(AuthError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_login_reuses_cached_token() {
        let (service, _, cache) = service_with(MockCache::new());
        let registered = service
            .register(register_request("carol", "carol@example.com"))
            .await
            .unwrap();

        let first = service
            .login(login_request("carol", "secret-password"))
            .await
            .unwrap();
        let second = service
            .login(login_request("carol", "secret-password"))
            .await
            .unwrap();

        assert_eq!(first.token, registered.token);
        assert_eq!(second.token, registered.token);
        assert_eq!(cache.set_count.load(Ordering::SeqCst), 1);
        assert!(cache.contains(&token_key("carol")));
    }

    #[tokio::test]
    async fn test_login_replaces_invalid_cached_token() {
        let (service, _, cache) = service_with(MockCache::new());
        service
            .register(register_request("dave", "dave@example.com"))
            .await
            .unwrap();
        cache.insert(&token_key("dave"), &encode("garbage").unwrap());

        let response = service
            .login(login_request("dave", "secret-password"))
            .await
            .unwrap();

        assert_ne!(response.token, "garbage");
        assert_eq!(
            service.authenticate(&response.token).await.unwrap().username,
            "dave"
        );
    }

    #[tokio::test]
    async fn test_login_succeeds_when_cache_is_down() {
        let (service, _, _) = service_with(MockCache::unavailable());
        service
            .register(register_request("erin", "erin@example.com"))
            .await
            .unwrap();

        let response = service
            .login(login_request("erin", "secret-password"))
            .await
            .unwrap();
        assert!(service.authenticate(&response.token).await.is_ok());
    }

    #[tokio::test]
    async fn test_authenticate_rejects_garbage() {
        let (service, _, _) = service_with(MockCache::new());
        let result = service.authenticate("abc.def.ghi").await;
        assert!(matches!(result, Err(AuthError::InvalidToken(_))));
    }

    #[tokio::test]
    async fn test_authenticate_rejects_token_for_missing_user() {
        let (service, users, _) = service_with(MockCache::new());
        let response = service
            .register(register_request("frank", "frank@example.com"))
            .await
            .unwrap();
        users.remove("frank");

        let result = service.authenticate(&response.token).await;
        assert!(matches!(result, Err(AuthError::InvalidToken(_))));
    }
}
