//! SQLite repository implementation.
//!
//! Implements the store traits from `forum_core::storage` using SQLite.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::OptionalExtension;
use tokio_rusqlite::Connection;

use forum_core::forum::{
    Comment, CommentId, NewComment, NewPost, NewUser, Post, PostId, User, UserId,
};
use forum_core::storage::{
    CommentStore, Page, PageRequest, PostStore, RepositoryError, Result, UserDirectory,
};

use super::conversions::{
    format_datetime, row_to_comment, row_to_comment_with_author, row_to_post,
    row_to_post_with_author, row_to_user, stored_precision,
};
use super::error::{map_tokio_rusqlite_error, map_tokio_rusqlite_error_with_id};
use super::schema;

/// Helper to wrap rusqlite errors for tokio_rusqlite closures.
fn wrap_err(e: rusqlite::Error) -> tokio_rusqlite::Error {
    tokio_rusqlite::Error::Rusqlite(e)
}

/// Fails with `QueryReturnedNoRows` when a write touched nothing.
fn expect_rows(rows: usize) -> std::result::Result<(), tokio_rusqlite::Error> {
    if rows == 0 {
        Err(wrap_err(rusqlite::Error::QueryReturnedNoRows))
    } else {
        Ok(())
    }
}

/// SQLite-based repository implementation.
///
/// Provides async access to SQLite storage for posts, comments and users.
pub struct SqliteRepository {
    conn: Connection,
}

impl SqliteRepository {
    /// Opens (or creates) the database file at `path` and ensures the schema.
    pub async fn new(path: &str) -> Result<Self> {
        let conn = Connection::open(path)
            .await
            .map_err(|e| RepositoryError::ConnectionFailed(e.to_string()))?;

        Self::init_schema(&conn).await?;

        Ok(Self { conn })
    }

    /// Creates a repository over an in-memory database.
    ///
    /// Data is lost when the connection is dropped.
    pub async fn new_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .await
            .map_err(|e| RepositoryError::ConnectionFailed(e.to_string()))?;

        Self::init_schema(&conn).await?;

        Ok(Self { conn })
    }

    async fn init_schema(conn: &Connection) -> Result<()> {
        conn.call(|conn| {
            conn.execute_batch(schema::CREATE_TABLES)
                .map_err(wrap_err)?;
            Ok(())
        })
        .await
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))
    }

    async fn user_where(&self, condition: &'static str, value: String) -> Result<Option<User>> {
        let sql = schema::select_user_where(condition);
        let subject = value.clone();

        self.conn
            .call(move |conn| {
                conn.query_row(&sql, [&value], row_to_user)
                    .optional()
                    .map_err(wrap_err)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error_with_id(e, "User", subject))
    }

    async fn exists(&self, sql: &'static str, value: &str) -> Result<bool> {
        let value = value.to_string();

        self.conn
            .call(move |conn| {
                conn.query_row(sql, [&value], |row| row.get(0))
                    .map_err(wrap_err)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "User"))
    }
}

#[async_trait]
impl PostStore for SqliteRepository {
    async fn get_post(&self, id: PostId) -> Result<Option<Post>> {
        self.conn
            .call(move |conn| {
                conn.query_row(schema::SELECT_POST_BY_ID, [id], row_to_post)
                    .optional()
                    .map_err(wrap_err)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error_with_id(e, "Post", id))
    }

    async fn get_post_with_author(&self, id: PostId) -> Result<Option<(Post, String)>> {
        self.conn
            .call(move |conn| {
                conn.query_row(schema::SELECT_POST_WITH_AUTHOR, [id], row_to_post_with_author)
                    .optional()
                    .map_err(wrap_err)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error_with_id(e, "Post", id))
    }

    async fn create_post(&self, post: &NewPost) -> Result<Post> {
        let mut new_post = post.clone();
        new_post.created_at = stored_precision(post.created_at);
        let created_at = format_datetime(&new_post.created_at);
        let inserted = new_post.clone();

        let id = self
            .conn
            .call(move |conn| {
                conn.execute(
                    schema::INSERT_POST,
                    rusqlite::params![
                        new_post.title,
                        new_post.content,
                        new_post.author_id,
                        created_at,
                        new_post.published
                    ],
                )
                .map_err(wrap_err)?;
                Ok(conn.last_insert_rowid())
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "Post"))?;

        Ok(inserted.into_post(id))
    }

    async fn update_post(&self, post: &Post) -> Result<()> {
        let id = post.id;
        let title = post.title.clone();
        let content = post.content.clone();
        let published = post.published;
        let updated_at = format_datetime(&post.updated_at);

        self.conn
            .call(move |conn| {
                let rows = conn
                    .execute(
                        schema::UPDATE_POST,
                        rusqlite::params![id, title, content, published, updated_at],
                    )
                    .map_err(wrap_err)?;
                expect_rows(rows)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error_with_id(e, "Post", id))
    }

    async fn delete_post(&self, id: PostId) -> Result<()> {
        self.conn
            .call(move |conn| {
                let tx = conn.transaction().map_err(wrap_err)?;
                tx.execute(schema::DELETE_COMMENTS_FOR_POST, [id])
                    .map_err(wrap_err)?;
                let rows = tx.execute(schema::DELETE_POST, [id]).map_err(wrap_err)?;
                expect_rows(rows)?;
                tx.commit().map_err(wrap_err)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error_with_id(e, "Post", id))
    }

    async fn increment_view_count(&self, id: PostId) -> Result<u64> {
        let rows = self
            .conn
            .call(move |conn| {
                conn.execute(schema::INCREMENT_VIEW_COUNT, [id])
                    .map_err(wrap_err)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error_with_id(e, "Post", id))?;

        Ok(rows as u64)
    }

    async fn find_published(&self, page: PageRequest) -> Result<Page<(Post, String)>> {
        let limit = i64::from(page.size);
        let offset = page.offset() as i64;

        let (rows, total) = self
            .conn
            .call(move |conn| {
                let mut stmt = conn
                    .prepare(schema::SELECT_PUBLISHED_PAGE)
                    .map_err(wrap_err)?;
                let rows = stmt
                    .query_map([limit, offset], row_to_post_with_author)
                    .map_err(wrap_err)?
                    .collect::<rusqlite::Result<Vec<_>>>()
                    .map_err(wrap_err)?;
                let total: i64 = conn
                    .query_row(schema::COUNT_PUBLISHED, [], |row| row.get(0))
                    .map_err(wrap_err)?;
                Ok((rows, total))
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "Post"))?;

        Ok(Page::new(rows, page, total as u64))
    }

    async fn find_by_author(
        &self,
        author_id: UserId,
        page: PageRequest,
    ) -> Result<Page<(Post, String)>> {
        let limit = i64::from(page.size);
        let offset = page.offset() as i64;

        let (rows, total) = self
            .conn
            .call(move |conn| {
                let mut stmt = conn.prepare(schema::SELECT_AUTHOR_PAGE).map_err(wrap_err)?;
                let rows = stmt
                    .query_map([author_id, limit, offset], row_to_post_with_author)
                    .map_err(wrap_err)?
                    .collect::<rusqlite::Result<Vec<_>>>()
                    .map_err(wrap_err)?;
                let total: i64 = conn
                    .query_row(schema::COUNT_BY_AUTHOR, [author_id], |row| row.get(0))
                    .map_err(wrap_err)?;
                Ok((rows, total))
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "Post"))?;

        Ok(Page::new(rows, page, total as u64))
    }
}

#[async_trait]
impl CommentStore for SqliteRepository {
    async fn get_comment(&self, id: CommentId) -> Result<Option<Comment>> {
        self.conn
            .call(move |conn| {
                conn.query_row(schema::SELECT_COMMENT_BY_ID, [id], row_to_comment)
                    .optional()
                    .map_err(wrap_err)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error_with_id(e, "Comment", id))
    }

    async fn find_by_post(&self, post_id: PostId) -> Result<Vec<(Comment, String)>> {
        self.conn
            .call(move |conn| {
                let mut stmt = conn
                    .prepare(schema::SELECT_COMMENTS_FOR_POST)
                    .map_err(wrap_err)?;
                let rows = stmt
                    .query_map([post_id], row_to_comment_with_author)
                    .map_err(wrap_err)?;

                let mut comments = Vec::new();
                for row_result in rows {
                    comments.push(row_result.map_err(wrap_err)?);
                }
                Ok(comments)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "Comment"))
    }

    async fn create_comment(&self, comment: &NewComment) -> Result<Comment> {
        let mut new_comment = comment.clone();
        new_comment.created_at = stored_precision(comment.created_at);
        let created_at = format_datetime(&new_comment.created_at);
        let inserted = new_comment.clone();

        let id = self
            .conn
            .call(move |conn| {
                conn.execute(
                    schema::INSERT_COMMENT,
                    rusqlite::params![
                        new_comment.post_id,
                        new_comment.user_id,
                        new_comment.parent_id,
                        new_comment.content,
                        created_at
                    ],
                )
                .map_err(wrap_err)?;
                Ok(conn.last_insert_rowid())
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "Comment"))?;

        Ok(inserted.into_comment(id))
    }

    async fn update_comment(&self, comment: &Comment) -> Result<()> {
        let id = comment.id;
        let content = comment.content.clone();
        let updated_at = format_datetime(&comment.updated_at);

        self.conn
            .call(move |conn| {
                let rows = conn
                    .execute(
                        schema::UPDATE_COMMENT,
                        rusqlite::params![id, content, updated_at],
                    )
                    .map_err(wrap_err)?;
                expect_rows(rows)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error_with_id(e, "Comment", id))
    }

    async fn delete_comment(&self, id: CommentId) -> Result<()> {
        self.conn
            .call(move |conn| {
                let rows = conn
                    .execute(schema::DELETE_COMMENT_SUBTREE, [id])
                    .map_err(wrap_err)?;
                expect_rows(rows)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error_with_id(e, "Comment", id))
    }
}

#[async_trait]
impl UserDirectory for SqliteRepository {
    async fn get_user(&self, id: UserId) -> Result<Option<User>> {
        self.conn
            .call(move |conn| {
                conn.query_row(&schema::select_user_where("id = ?1"), [id], row_to_user)
                    .optional()
                    .map_err(wrap_err)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error_with_id(e, "User", id))
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        self.user_where("username = ?1", username.to_string()).await
    }

    async fn username_exists(&self, username: &str) -> Result<bool> {
        self.exists(schema::USERNAME_EXISTS, username).await
    }

    async fn email_exists(&self, email: &str) -> Result<bool> {
        self.exists(schema::EMAIL_EXISTS, email).await
    }

    async fn create_user(&self, user: &NewUser) -> Result<User> {
        let mut new_user = user.clone();
        new_user.created_at = stored_precision(user.created_at);
        let created_at = format_datetime(&new_user.created_at);
        let inserted = new_user.clone();

        let id = self
            .conn
            .call(move |conn| {
                conn.execute(
                    schema::INSERT_USER,
                    rusqlite::params![
                        new_user.username,
                        new_user.email,
                        new_user.password_hash,
                        new_user.full_name,
                        created_at
                    ],
                )
                .map_err(wrap_err)?;
                Ok(conn.last_insert_rowid())
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error_with_id(e, "User", &user.username))?;

        Ok(inserted.into_user(id))
    }

    async fn record_login(&self, id: UserId, at: DateTime<Utc>) -> Result<()> {
        let at = format_datetime(&at);

        self.conn
            .call(move |conn| {
                let rows = conn
                    .execute(schema::UPDATE_LAST_LOGIN, rusqlite::params![id, at])
                    .map_err(wrap_err)?;
                expect_rows(rows)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error_with_id(e, "User", id))
    }
}
