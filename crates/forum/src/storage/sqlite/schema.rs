//! SQLite schema definitions and SQL query constants.
//!
//! Pure data, no I/O. Timestamps are stored as fixed-width RFC 3339 text so
//! that ordering by the column orders chronologically.

/// Enables foreign keys and creates all tables.
///
/// `comments.parent_id` has no delete action: subtree deletes remove a whole
/// reply chain in one statement, and the constraint is checked when it ends.
pub const CREATE_TABLES: &str = r#"
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    username TEXT NOT NULL UNIQUE,
    email TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    full_name TEXT,
    active INTEGER NOT NULL DEFAULT 1,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    last_login_at TEXT
);

CREATE TABLE IF NOT EXISTS posts (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    content TEXT NOT NULL,
    author_id INTEGER NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    view_count INTEGER NOT NULL DEFAULT 0,
    published INTEGER NOT NULL DEFAULT 1,
    FOREIGN KEY (author_id) REFERENCES users(id) ON DELETE CASCADE
);

CREATE TABLE IF NOT EXISTS comments (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    post_id INTEGER NOT NULL,
    user_id INTEGER NOT NULL,
    parent_id INTEGER,
    content TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    FOREIGN KEY (post_id) REFERENCES posts(id) ON DELETE CASCADE,
    FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE,
    FOREIGN KEY (parent_id) REFERENCES comments(id)
);

CREATE INDEX IF NOT EXISTS idx_posts_published_created ON posts(published, created_at);
CREATE INDEX IF NOT EXISTS idx_posts_author_id ON posts(author_id);
CREATE INDEX IF NOT EXISTS idx_comments_post_id ON comments(post_id);
CREATE INDEX IF NOT EXISTS idx_comments_parent_id ON comments(parent_id);
"#;

// User queries
const USER_COLUMNS: &str =
    "id, username, email, password_hash, full_name, active, created_at, updated_at, last_login_at";

pub const INSERT_USER: &str = r#"
INSERT INTO users (username, email, password_hash, full_name, active, created_at, updated_at)
VALUES (?1, ?2, ?3, ?4, 1, ?5, ?5)
"#;

pub fn select_user_where(condition: &str) -> String {
    format!("SELECT {USER_COLUMNS} FROM users WHERE {condition}")
}

pub const USERNAME_EXISTS: &str = "SELECT EXISTS(SELECT 1 FROM users WHERE username = ?1)";

pub const EMAIL_EXISTS: &str = "SELECT EXISTS(SELECT 1 FROM users WHERE email = ?1)";

pub const UPDATE_LAST_LOGIN: &str = r#"
UPDATE users
SET last_login_at = ?2, updated_at = ?2
WHERE id = ?1
"#;

// Post queries
pub const INSERT_POST: &str = r#"
INSERT INTO posts (title, content, author_id, created_at, updated_at, view_count, published)
VALUES (?1, ?2, ?3, ?4, ?4, 0, ?5)
"#;

pub const SELECT_POST_BY_ID: &str = r#"
SELECT id, title, content, author_id, created_at, updated_at, view_count, published
FROM posts
WHERE id = ?1
"#;

pub const SELECT_POST_WITH_AUTHOR: &str = r#"
SELECT p.id, p.title, p.content, p.author_id, p.created_at, p.updated_at, p.view_count, p.published, u.username
FROM posts p
INNER JOIN users u ON u.id = p.author_id
WHERE p.id = ?1
"#;

pub const SELECT_PUBLISHED_PAGE: &str = r#"
SELECT p.id, p.title, p.content, p.author_id, p.created_at, p.updated_at, p.view_count, p.published, u.username
FROM posts p
INNER JOIN users u ON u.id = p.author_id
WHERE p.published = 1
ORDER BY p.created_at DESC, p.id DESC
LIMIT ?1 OFFSET ?2
"#;

pub const COUNT_PUBLISHED: &str = "SELECT COUNT(*) FROM posts WHERE published = 1";

pub const SELECT_AUTHOR_PAGE: &str = r#"
SELECT p.id, p.title, p.content, p.author_id, p.created_at, p.updated_at, p.view_count, p.published, u.username
FROM posts p
INNER JOIN users u ON u.id = p.author_id
WHERE p.author_id = ?1
ORDER BY p.created_at DESC, p.id DESC
LIMIT ?2 OFFSET ?3
"#;

pub const COUNT_BY_AUTHOR: &str = "SELECT COUNT(*) FROM posts WHERE author_id = ?1";

/// Leaves `view_count` alone: only [`INCREMENT_VIEW_COUNT`] moves it.
pub const UPDATE_POST: &str = r#"
UPDATE posts
SET title = ?2, content = ?3, published = ?4, updated_at = ?5
WHERE id = ?1
"#;

pub const INCREMENT_VIEW_COUNT: &str = r#"
UPDATE posts
SET view_count = view_count + 1
WHERE id = ?1
"#;

pub const DELETE_COMMENTS_FOR_POST: &str = "DELETE FROM comments WHERE post_id = ?1";

pub const DELETE_POST: &str = "DELETE FROM posts WHERE id = ?1";

// Comment queries
pub const INSERT_COMMENT: &str = r#"
INSERT INTO comments (post_id, user_id, parent_id, content, created_at, updated_at)
VALUES (?1, ?2, ?3, ?4, ?5, ?5)
"#;

pub const SELECT_COMMENT_BY_ID: &str = r#"
SELECT id, post_id, user_id, parent_id, content, created_at, updated_at
FROM comments
WHERE id = ?1
"#;

pub const SELECT_COMMENTS_FOR_POST: &str = r#"
SELECT c.id, c.post_id, c.user_id, c.parent_id, c.content, c.created_at, c.updated_at, u.username
FROM comments c
INNER JOIN users u ON u.id = c.user_id
WHERE c.post_id = ?1
ORDER BY c.created_at ASC, c.id ASC
"#;

pub const UPDATE_COMMENT: &str = r#"
UPDATE comments
SET content = ?2, updated_at = ?3
WHERE id = ?1
"#;

pub const DELETE_COMMENT_SUBTREE: &str = r#"
WITH RECURSIVE subtree(id) AS (
    SELECT id FROM comments WHERE id = ?1
    UNION
    SELECT c.id FROM comments c INNER JOIN subtree s ON c.parent_id = s.id
)
DELETE FROM comments
WHERE id IN (SELECT id FROM subtree)
"#;
