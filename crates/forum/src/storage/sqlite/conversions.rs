//! SQLite row conversion functions.
//!
//! Pure functions for converting between SQLite rows and domain types.
//! These are testable in isolation without database access.

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use rusqlite::Row;

use forum_core::forum::{Comment, Post, User};

/// Convert a SQLite row to a User.
///
/// Expected columns: id, username, email, password_hash, full_name, active,
/// created_at, updated_at, last_login_at
pub fn row_to_user(row: &Row) -> rusqlite::Result<User> {
    let created_at: String = row.get(6)?;
    let updated_at: String = row.get(7)?;
    let last_login_at: Option<String> = row.get(8)?;

    Ok(User {
        id: row.get(0)?,
        username: row.get(1)?,
        email: row.get(2)?,
        password_hash: row.get(3)?,
        full_name: row.get(4)?,
        active: row.get(5)?,
        created_at: parse_datetime(&created_at)?,
        updated_at: parse_datetime(&updated_at)?,
        last_login_at: last_login_at.as_deref().map(parse_datetime).transpose()?,
    })
}

/// Convert a SQLite row to a Post.
///
/// Expected columns: id, title, content, author_id, created_at, updated_at,
/// view_count, published
pub fn row_to_post(row: &Row) -> rusqlite::Result<Post> {
    let created_at: String = row.get(4)?;
    let updated_at: String = row.get(5)?;

    Ok(Post {
        id: row.get(0)?,
        title: row.get(1)?,
        content: row.get(2)?,
        author_id: row.get(3)?,
        created_at: parse_datetime(&created_at)?,
        updated_at: parse_datetime(&updated_at)?,
        view_count: row.get(6)?,
        published: row.get(7)?,
    })
}

/// Convert a joined row to a Post and its author's username.
///
/// Expected columns: the [`row_to_post`] columns followed by username.
pub fn row_to_post_with_author(row: &Row) -> rusqlite::Result<(Post, String)> {
    Ok((row_to_post(row)?, row.get(8)?))
}

/// Convert a SQLite row to a Comment.
///
/// Expected columns: id, post_id, user_id, parent_id, content, created_at,
/// updated_at
pub fn row_to_comment(row: &Row) -> rusqlite::Result<Comment> {
    let created_at: String = row.get(5)?;
    let updated_at: String = row.get(6)?;

    Ok(Comment {
        id: row.get(0)?,
        post_id: row.get(1)?,
        user_id: row.get(2)?,
        parent_id: row.get(3)?,
        content: row.get(4)?,
        created_at: parse_datetime(&created_at)?,
        updated_at: parse_datetime(&updated_at)?,
    })
}

/// Convert a joined row to a Comment and its author's username.
pub fn row_to_comment_with_author(row: &Row) -> rusqlite::Result<(Comment, String)> {
    Ok((row_to_comment(row)?, row.get(7)?))
}

/// Parse a datetime from RFC 3339 string.
fn parse_datetime(s: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
        })
}

/// Format a DateTime<Utc> for SQLite storage.
///
/// Always microsecond precision with a `Z` suffix, so text order matches time
/// order.
pub fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Drops the sub-microsecond digits that [`format_datetime`] cannot keep.
pub fn stored_precision(dt: DateTime<Utc>) -> DateTime<Utc> {
    dt.trunc_subsecs(6)
}
