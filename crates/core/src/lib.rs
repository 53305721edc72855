//! Functional core of the forum backend.
//!
//! Pure domain types, the comment tree builder, cache key/namespace policy and
//! the trait contracts implemented by storage and cache backends. Nothing in
//! this crate performs I/O.

pub mod cache;
pub mod forum;
pub mod storage;
