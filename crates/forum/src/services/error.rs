use forum_core::forum::{CommentError, PostError};
use forum_core::storage::RepositoryError;
use thiserror::Error;

/// Errors returned by the post and comment services.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ServiceError {
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl ServiceError {
    pub fn post_not_found(id: impl std::fmt::Display) -> Self {
        ServiceError::NotFound(format!("Post not found with id: {id}"))
    }

    pub fn user_not_found(id: impl std::fmt::Display) -> Self {
        ServiceError::NotFound(format!("User not found with id: {id}"))
    }

    pub fn comment_not_found(id: impl std::fmt::Display) -> Self {
        ServiceError::NotFound(format!("Comment not found with id: {id}"))
    }
}

impl From<PostError> for ServiceError {
    fn from(err: PostError) -> Self {
        match err {
            PostError::NotAuthor => ServiceError::BadRequest(err.to_string()),
            _ => ServiceError::Validation(err.to_string()),
        }
    }
}

impl From<CommentError> for ServiceError {
    fn from(err: CommentError) -> Self {
        match err {
            CommentError::EmptyContent | CommentError::ContentTooLong => {
                ServiceError::Validation(err.to_string())
            }
            CommentError::NotInPost
            | CommentError::ParentNotInPost
            | CommentError::NotAuthor
            | CommentError::TooDeep => ServiceError::BadRequest(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ownership_errors_are_bad_requests() {
        assert_eq!(
            ServiceError::from(CommentError::NotInPost),
            ServiceError::BadRequest("comment does not belong to post".to_string())
        );
        assert!(matches!(
            ServiceError::from(PostError::NotAuthor),
            ServiceError::BadRequest(_)
        ));
    }

    #[test]
    fn test_content_errors_are_validation_errors() {
        assert!(matches!(
            ServiceError::from(PostError::EmptyTitle),
            ServiceError::Validation(_)
        ));
        assert!(matches!(
            ServiceError::from(CommentError::ContentTooLong),
            ServiceError::Validation(_)
        ));
    }

    #[test]
    fn test_not_found_messages() {
        assert_eq!(
            ServiceError::post_not_found(7).to_string(),
            "Post not found with id: 7"
        );
        assert_eq!(
            ServiceError::comment_not_found(3).to_string(),
            "Comment not found with id: 3"
        );
    }
}
