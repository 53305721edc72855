mod error;
mod operations;
mod requests;
mod tree;
mod types;

pub use error::{AccountError, CommentError, PostError};
pub use operations::{
    ensure_comment_access, ensure_parent_in_post, ensure_post_author, ensure_reply_depth,
    is_hot_post, should_cache_comment_tree, validate_account, validate_comment, validate_post,
    HOT_POST_VIEW_THRESHOLD, MAX_COMMENT_LENGTH, MAX_REPLY_DEPTH, MAX_TITLE_LENGTH,
};
pub use requests::{
    CreateCommentRequest, CreatePostRequest, ListPostsQuery, LoginRequest, RegisterRequest,
    UpdateCommentRequest, UpdatePostRequest,
};
pub use tree::{build_comment_tree, count_comments};
pub use types::{
    Comment, CommentId, CommentView, NewComment, NewPost, NewUser, Post, PostId, PostView, User,
    UserId,
};
