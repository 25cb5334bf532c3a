//! drive-cache - path-keyed metadata caching for cloud drive adapters
//!
//! A filesystem-abstraction layer sitting on top of a remote storage provider
//! asks the same questions over and over: does this path exist, what are its
//! attributes, what is in this directory. This crate answers those questions
//! from memory so the adapter only round-trips to the provider on a miss.
//!
//! The pieces:
//! - [`path`] normalizes arbitrary path strings into canonical cache keys.
//! - [`MetadataCache`] is the real store: path-keyed entries with subtree
//!   rename, depth-limited listing queries, and per-directory completion
//!   flags.
//! - [`NullCache`] disables caching without changing call sites.
//! - [`TempCache`] is a separate, expiry-aware store for short-lived tokens,
//!   persisted to the system temp directory.
//!
//! Adapters program against the [`Cache`] and [`PathCache`] traits, so the
//! variants are interchangeable.

pub mod cache;
pub mod path;

pub use cache::{
    Cache, CacheError, MetadataCache, NullCache, PathCache, QueryMatch, TempCache, DEFAULT_TTL,
};
pub use path::PathError;
