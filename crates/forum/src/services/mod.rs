//! Application services: the cached read paths and the write paths that
//! keep those caches honest.

mod comments;
mod error;
mod posts;
mod side_cache;

#[cfg(test)]
mod testing;

pub use comments::CommentService;
pub use error::ServiceError;
pub use posts::PostService;
pub use side_cache::SideCache;
