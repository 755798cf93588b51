//! Postgate Cache System
//!
//! Entries are keyed per entity (`user_<id>`, `post_with_user_<id>`) and all share one fixed
//! lifetime. Writes invalidate by deletion; there is no update-in-place.
//!
//! ## Configuration
//!
//! Operational knobs live in `postgate.toml` and resolve to
//! [`CacheSettings`](crate::config::CacheSettings):
//!
//! ```toml
//! [cache]
//! operation_timeout_ms = 250
//! sweep_interval_ms = 30000
//! ```
//!
//! The entry lifetime itself is [`ENTRY_TTL`] and cannot be configured.

use std::time::Duration;

mod keys;
mod store;

pub use keys::CacheKey;
pub use store::MemoryCache;

/// Lifetime of every cache entry, applied at write time.
pub const ENTRY_TTL: Duration = Duration::from_millis(60_000);
