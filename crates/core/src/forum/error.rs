use thiserror::Error;

/// Errors that can occur when validating or modifying posts.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PostError {
    #[error("Post title cannot be empty")]
    EmptyTitle,
    #[error("Post title too long (max 200 characters)")]
    TitleTooLong,
    #[error("Post content cannot be empty")]
    EmptyContent,
    #[error("You are not authorized to modify this post")]
    NotAuthor,
}

/// Errors that can occur when validating or modifying comments.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CommentError {
    #[error("Comment content cannot be empty")]
    EmptyContent,
    #[error("Comment content too long (max 1000 characters)")]
    ContentTooLong,
    #[error("comment does not belong to post")]
    NotInPost,
    #[error("parent comment does not belong to post")]
    ParentNotInPost,
    #[error("Replies cannot be nested more than 32 levels deep")]
    TooDeep,
    #[error("You are not authorized to modify this comment")]
    NotAuthor,
}

/// Errors that can occur when validating registration data.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AccountError {
    #[error("Username must be between 3 and 50 characters")]
    InvalidUsername,
    #[error("Email address is not valid")]
    InvalidEmail,
    #[error("Password must be at least 6 characters")]
    PasswordTooShort,
}
