//! Metadata caching layer
//!
//! Caches provider metadata keyed by canonical path so the filesystem
//! adapter can answer existence, stat, and listing queries without a remote
//! round trip. One store instance per storage backend.

pub mod errors;
pub mod metadata;
pub mod null;
pub mod temp;

pub use errors::CacheError;
pub use metadata::MetadataCache;
pub use null::NullCache;
pub use temp::TempCache;

use std::time::Duration;

/// Time-to-live applied by `put` when the caller passes none
///
/// The in-memory stores accept a TTL for interface compatibility but do not
/// enforce it; only [`TempCache`] expires entries.
pub const DEFAULT_TTL: Duration = Duration::from_secs(3600);

/// Depth selector for [`PathCache::query`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryMatch {
    /// Immediate children only (the `*` form)
    Children,
    /// Entries within `n` levels below the queried path; `n <= 0` matches nothing
    Depth(i64),
    /// Unrecognized selector, matches nothing
    None,
}

impl QueryMatch {
    /// Maximum segment-count difference a matching entry may have, or zero
    /// when nothing can match
    pub(crate) fn depth_limit(self) -> i64 {
        match self {
            QueryMatch::Children => 1,
            QueryMatch::Depth(n) => n,
            QueryMatch::None => 0,
        }
    }
}

impl Default for QueryMatch {
    fn default() -> Self {
        QueryMatch::Children
    }
}

impl From<&str> for QueryMatch {
    /// Parse the wire form: `*` for children, a decimal integer for a depth
    /// limit, anything else matches nothing
    fn from(raw: &str) -> Self {
        if raw == "*" {
            QueryMatch::Children
        } else if let Ok(n) = raw.parse::<i64>() {
            QueryMatch::Depth(n)
        } else {
            QueryMatch::None
        }
    }
}

/// Basic key-value cache capability
///
/// Lookups signal absence with `None`, never an error; `forget` of a missing
/// key is a no-op.
pub trait Cache<V> {
    /// Store `value` under `key`, replacing any existing entry
    fn put(&mut self, key: &str, value: V, ttl: Option<Duration>) -> Result<(), CacheError>;

    /// Fetch the value stored under `key`, if any
    fn get(&self, key: &str) -> Result<Option<V>, CacheError>;

    /// Whether an entry exists under `key`
    fn has(&self, key: &str) -> Result<bool, CacheError>;

    /// Remove the entry under `key`
    fn forget(&mut self, key: &str) -> Result<(), CacheError>;

    /// Store `value` under `key` with no expiry
    fn forever(&mut self, key: &str, value: V) -> Result<(), CacheError>;

    /// Drop all entries
    fn flush(&mut self) -> Result<(), CacheError>;
}

/// Path-aware cache capability for hierarchical keys
pub trait PathCache<V>: Cache<V> {
    /// Move the subtree under `source` to `destination`, or tombstone it
    /// when `destination` is `None`
    fn rename(&mut self, source: &str, destination: Option<&str>) -> Result<(), CacheError>;

    /// List cached entries below `path`, restricted by `matcher`
    ///
    /// Answers from cached data only; the queried path itself and tombstoned
    /// entries are excluded.
    fn query(&self, path: &str, matcher: QueryMatch) -> Result<Vec<(String, V)>, CacheError>;

    /// Record whether a full child listing for `path` is cached
    fn complete(&mut self, path: &str, is_completed: bool) -> Result<(), CacheError>;

    /// Whether a full child listing for `path` is known to be cached
    fn completed(&self, path: &str) -> Result<bool, CacheError>;
}
