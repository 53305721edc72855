//! Password accounts and bearer tokens for the forum.
//!
//! This crate provides:
//! - Argon2id password hashing
//! - HS256 access tokens, cached per username
//! - Register/login routes and the [`CurrentUser`] extractor

mod config;
mod error;
mod extractors;
mod handlers;
mod password;
mod service;
mod state;
mod token;

#[cfg(test)]
mod testing;

pub use config::AuthConfig;
pub use error::{AuthError, ErrorResponse};
pub use extractors::CurrentUser;
pub use handlers::{auth_routes, UserProfile};
pub use service::{AuthService, TokenResponse};
pub use state::AuthState;
pub use token::{Claims, TokenIssuer};
