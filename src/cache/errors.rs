//! Cache Error Types
//!
//! A single error enum for every cache variant: path normalization failures
//! from the in-memory stores, I/O and payload failures from the file-backed
//! one.

use crate::path::PathError;

/// Errors surfaced by cache operations
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// Key failed path normalization (e.g. escaped the root)
    #[error(transparent)]
    Path(#[from] PathError),

    /// Filesystem failure in a file-backed cache
    #[error("cache I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Persisted payload could not be encoded or decoded
    #[error("invalid cache payload: {0}")]
    Payload(#[from] serde_json::Error),
}
