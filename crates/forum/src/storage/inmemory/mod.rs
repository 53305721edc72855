//! In-memory storage backend.
//!
//! Posts, comments and users live in HashMaps wrapped in `Arc<RwLock<_>>`.
//! Useful for development and tests where persistence is not required.

mod repository;

pub use repository::InMemoryRepository;
