//! Cache key definitions.
//!
//! The rendered key strings are shared with any other process using the same cache
//! instance, so their format must not change.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheKey {
    /// A bare user.
    User(i64),
    /// A post aggregated with its owning user.
    PostWithUser(i64),
}

impl CacheKey {
    /// Entity label used for metrics and log fields.
    pub fn entity(&self) -> &'static str {
        match self {
            CacheKey::User(_) => "user",
            CacheKey::PostWithUser(_) => "post_with_user",
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheKey::User(id) => write!(f, "user_{id}"),
            CacheKey::PostWithUser(id) => write!(f, "post_with_user_{id}"),
        }
    }
}
