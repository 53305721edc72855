//! Glob matching for cache keys, used by backends without native pattern
//! support to implement `delete_pattern`.
//!
//! Supports the subset of Redis glob syntax the forum emits: `*` matches any
//! run of bytes (including none) and `?` matches exactly one byte.

/// Checks if a cache key matches a glob pattern.
///
/// # Examples
///
/// ```
/// use forum_core::cache::pattern_matches;
///
/// assert!(pattern_matches("hot_post:*", "hot_post:42"));
/// assert!(pattern_matches("post_page:?:*", "post_page:0:10"));
/// assert!(!pattern_matches("hot_post:*", "comment_tree:42"));
/// ```
pub fn pattern_matches(pattern: &str, key: &str) -> bool {
    let pattern = pattern.as_bytes();
    let key = key.as_bytes();

    let (mut p, mut k) = (0, 0);
    // Position of the last `*` seen and the key position it is currently
    // standing in for; on mismatch the star absorbs one more byte.
    let mut backtrack: Option<(usize, usize)> = None;

    while k < key.len() {
        match pattern.get(p) {
            Some(b'*') => {
                backtrack = Some((p, k));
                p += 1;
            }
            Some(b'?') => {
                p += 1;
                k += 1;
            }
            Some(&c) if c == key[k] => {
                p += 1;
                k += 1;
            }
            _ => match backtrack {
                Some((star, star_k)) => {
                    p = star + 1;
                    k = star_k + 1;
                    backtrack = Some((star, star_k + 1));
                }
                None => return false,
            },
        }
    }

    pattern[p..].iter().all(|&c| c == b'*')
}
