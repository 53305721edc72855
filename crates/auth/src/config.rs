use std::time::Duration;

use crate::error::AuthError;

/// Minimum length of the HMAC secret used to sign tokens.
pub const MIN_SECRET_LENGTH: usize = 32;

/// Secret used by debug builds when `JWT_SECRET` is unset.
const DEV_SECRET: &str = "forum-development-secret-do-not-deploy!!";

/// Auth configuration.
#[derive(Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    /// Lifetime of issued tokens (`exp - iat`).
    pub token_ttl: Duration,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"<redacted>")
            .field("token_ttl", &self.token_ttl)
            .finish()
    }
}

impl AuthConfig {
    pub fn new(jwt_secret: impl Into<String>, token_ttl: Duration) -> Result<Self, AuthError> {
        let jwt_secret = jwt_secret.into();
        if jwt_secret.len() < MIN_SECRET_LENGTH {
            return Err(AuthError::Config(format!(
                "JWT secret must be at least {MIN_SECRET_LENGTH} bytes"
            )));
        }
        Ok(Self {
            jwt_secret,
            token_ttl,
        })
    }

    /// Load from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `JWT_SECRET`: HMAC secret, at least 32 bytes. Required in release
    ///   builds; debug builds fall back to a fixed development secret.
    /// - `JWT_EXPIRATION_SECONDS`: Token lifetime (default: 86400)
    pub fn from_env() -> Result<Self, AuthError> {
        let jwt_secret = match std::env::var("JWT_SECRET") {
            Ok(secret) => secret,
            Err(_) if cfg!(debug_assertions) => {
                tracing::warn!("JWT_SECRET not set, using the development secret");
                DEV_SECRET.to_string()
            }
            Err(_) => return Err(AuthError::Config("JWT_SECRET must be set".to_string())),
        };

        let token_ttl = std::env::var("JWT_EXPIRATION_SECONDS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(24 * 60 * 60));

        Self::new(jwt_secret, token_ttl)
    }
}
