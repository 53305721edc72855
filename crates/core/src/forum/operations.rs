use super::error::{AccountError, CommentError, PostError};
use super::types::{Comment, CommentView, Post, PostId, PostView, UserId};

/// A post is cached in the hot-post namespace only once its view count
/// passes this value.
pub const HOT_POST_VIEW_THRESHOLD: i64 = 10;

pub const MAX_TITLE_LENGTH: usize = 200;
pub const MAX_COMMENT_LENGTH: usize = 1000;
/// Deepest nesting a reply may have. Root comments are at depth 0.
pub const MAX_REPLY_DEPTH: usize = 32;
pub const MIN_USERNAME_LENGTH: usize = 3;
pub const MAX_USERNAME_LENGTH: usize = 50;
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Returns true if the post view should be stored in the hot-post cache.
pub fn is_hot_post(post: &PostView) -> bool {
    post.view_count > HOT_POST_VIEW_THRESHOLD
}

/// Empty forests are never cached, so the next read goes back to the store.
pub fn should_cache_comment_tree(forest: &[CommentView]) -> bool {
    !forest.is_empty()
}

/// Validates the title and content of a post before creation or update.
pub fn validate_post(title: &str, content: &str) -> Result<(), PostError> {
    if title.trim().is_empty() {
        return Err(PostError::EmptyTitle);
    }
    if title.chars().count() > MAX_TITLE_LENGTH {
        return Err(PostError::TitleTooLong);
    }
    if content.trim().is_empty() {
        return Err(PostError::EmptyContent);
    }
    Ok(())
}

/// Validates comment content before creation or update.
pub fn validate_comment(content: &str) -> Result<(), CommentError> {
    if content.trim().is_empty() {
        return Err(CommentError::EmptyContent);
    }
    if content.chars().count() > MAX_COMMENT_LENGTH {
        return Err(CommentError::ContentTooLong);
    }
    Ok(())
}

/// Validates registration data.
pub fn validate_account(username: &str, email: &str, password: &str) -> Result<(), AccountError> {
    let username_len = username.trim().chars().count();
    if !(MIN_USERNAME_LENGTH..=MAX_USERNAME_LENGTH).contains(&username_len) {
        return Err(AccountError::InvalidUsername);
    }
    if !is_plausible_email(email) {
        return Err(AccountError::InvalidEmail);
    }
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AccountError::PasswordTooShort);
    }
    Ok(())
}

/// Something before and after a single `@`, no whitespace.
fn is_plausible_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && !domain.is_empty() && !domain.contains('@'),
        None => false,
    }
}

/// Ensures the user is the author of the post.
pub fn ensure_post_author(post: &Post, user_id: UserId) -> Result<(), PostError> {
    if post.author_id != user_id {
        return Err(PostError::NotAuthor);
    }
    Ok(())
}

/// Ensures a comment addressed under `post_id` really belongs to that post and
/// was written by `user_id`. Post membership is checked first.
pub fn ensure_comment_access(
    comment: &Comment,
    post_id: PostId,
    user_id: UserId,
) -> Result<(), CommentError> {
    if comment.post_id != post_id {
        return Err(CommentError::NotInPost);
    }
    if comment.user_id != user_id {
        return Err(CommentError::NotAuthor);
    }
    Ok(())
}

/// Rejects a comment that would sit deeper than [`MAX_REPLY_DEPTH`].
pub fn ensure_reply_depth(depth: usize) -> Result<(), CommentError> {
    if depth > MAX_REPLY_DEPTH {
        return Err(CommentError::TooDeep);
    }
    Ok(())
}

/// Ensures a reply's parent lives on the same post.
pub fn ensure_parent_in_post(parent: &Comment, post_id: PostId) -> Result<(), CommentError> {
    if parent.post_id != post_id {
        return Err(CommentError::ParentNotInPost);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forum::types::{NewComment, NewPost};

    fn view_with_count(view_count: i64) -> PostView {
        let mut post = NewPost::new(1, "T", "C").into_post(1);
        post.view_count = view_count;
        PostView::new(post, "alice")
    }

    #[test]
    fn test_hot_post_threshold_is_exclusive() {
        assert!(!is_hot_post(&view_with_count(5)));
        assert!(!is_hot_post(&view_with_count(HOT_POST_VIEW_THRESHOLD)));
        assert!(is_hot_post(&view_with_count(HOT_POST_VIEW_THRESHOLD + 1)));
    }

    #[test]
    fn test_empty_forest_is_not_cached() {
        assert!(!should_cache_comment_tree(&[]));

        let view = CommentView::new(NewComment::new(1, 1, "x").into_comment(1), "a");
        assert!(should_cache_comment_tree(&[view]));
    }

    #[test]
    fn test_validate_post() {
        assert!(validate_post("Title", "Body").is_ok());
        assert_eq!(validate_post("   ", "Body"), Err(PostError::EmptyTitle));
        assert_eq!(validate_post("Title", ""), Err(PostError::EmptyContent));
        assert_eq!(
            validate_post(&"x".repeat(201), "Body"),
            Err(PostError::TitleTooLong)
        );
        assert!(validate_post(&"x".repeat(200), "Body").is_ok());
    }

    #[test]
    fn test_validate_comment() {
        assert!(validate_comment("Nice post").is_ok());
        assert_eq!(validate_comment(" \n"), Err(CommentError::EmptyContent));
        assert_eq!(
            validate_comment(&"y".repeat(1001)),
            Err(CommentError::ContentTooLong)
        );
        assert!(validate_comment(&"é".repeat(1000)).is_ok());
    }

    #[test]
    fn test_validate_account() {
        assert!(validate_account("alice", "alice@example.com", "secret").is_ok());
        assert_eq!(
            validate_account("al", "alice@example.com", "secret"),
            Err(AccountError::InvalidUsername)
        );
        assert_eq!(
            validate_account(&"a".repeat(51), "alice@example.com", "secret"),
            Err(AccountError::InvalidUsername)
        );
        assert_eq!(
            validate_account("alice", "alice.example.com", "secret"),
            Err(AccountError::InvalidEmail)
        );
        assert_eq!(
            validate_account("alice", "a@b@c", "secret"),
            Err(AccountError::InvalidEmail)
        );
        assert_eq!(
            validate_account("alice", "alice@example.com", "12345"),
            Err(AccountError::PasswordTooShort)
        );
    }

    #[test]
    fn test_ensure_post_author() {
        let post = NewPost::new(7, "T", "C").into_post(1);
        assert!(ensure_post_author(&post, 7).is_ok());
        assert_eq!(ensure_post_author(&post, 8), Err(PostError::NotAuthor));
    }

    #[test]
    fn test_comment_on_other_post_is_rejected_before_author_check() {
        let comment = NewComment::new(6, 2, "hello").into_comment(10);

        assert_eq!(
            ensure_comment_access(&comment, 5, 3),
            Err(CommentError::NotInPost)
        );
        assert_eq!(
            ensure_comment_access(&comment, 6, 3),
            Err(CommentError::NotAuthor)
        );
        assert!(ensure_comment_access(&comment, 6, 2).is_ok());
    }

    #[test]
    fn test_reply_depth_limit() {
        assert!(ensure_reply_depth(0).is_ok());
        assert!(ensure_reply_depth(MAX_REPLY_DEPTH).is_ok());
        assert_eq!(
            ensure_reply_depth(MAX_REPLY_DEPTH + 1),
            Err(CommentError::TooDeep)
        );
    }

    #[test]
    fn test_parent_must_share_post() {
        let parent = NewComment::new(6, 2, "parent").into_comment(1);
        assert!(ensure_parent_in_post(&parent, 6).is_ok());
        assert_eq!(
            ensure_parent_in_post(&parent, 5),
            Err(CommentError::ParentNotInPost)
        );
    }
}
