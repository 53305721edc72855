//! SQLite storage backend implementation.
//!
//! Implements the store traits over `rusqlite` for synchronous operations,
//! with `tokio-rusqlite` moving them onto a dedicated connection thread.

mod conversions;
mod error;
mod repository;
mod schema;

pub use repository::SqliteRepository;
