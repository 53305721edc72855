mod error;
mod keys;
mod patterns;
mod serialization;
mod traits;

pub use error::{CacheError, Result};
pub use keys::{
    comment_tree_key, hot_post_key, post_page_key, token_key, CacheNamespace, CacheTtls,
};
pub use patterns::pattern_matches;
pub use serialization::{decode, encode, SerializationError};
pub use traits::Cache;
