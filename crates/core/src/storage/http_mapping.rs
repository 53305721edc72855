//! Pure functions for mapping repository errors to HTTP status codes.
//!
//! Kept in the core so every HTTP surface (posts, comments, auth) agrees on
//! the status for a given store failure.

use super::RepositoryError;

/// Maps a [`RepositoryError`] to an HTTP status code.
///
/// A store that cannot be reached is a 503 so clients may retry; a duplicate
/// username or email is a 409.
///
/// # Examples
///
/// ```
/// use forum_core::storage::{RepositoryError, repository_error_to_status_code};
///
/// let error = RepositoryError::not_found("Post", 17);
/// assert_eq!(repository_error_to_status_code(&error), 404);
/// ```
pub fn repository_error_to_status_code(error: &RepositoryError) -> u16 {
    match error {
        RepositoryError::NotFound { .. } => 404,
        RepositoryError::AlreadyExists { .. } => 409,
        RepositoryError::ConnectionFailed(_) => 503,
        RepositoryError::QueryFailed(_) => 500,
        RepositoryError::InvalidData(_) => 400,
    }
}
