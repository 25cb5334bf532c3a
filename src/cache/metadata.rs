//! Metadata Cache Implementation
//!
//! In-memory map from canonical path to opaque provider metadata, plus a
//! per-directory "listing complete" flag. The store performs no locking and
//! no remote I/O; one instance per storage backend, serialized by the caller.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tracing::{debug, trace};

use crate::cache::{Cache, CacheError, PathCache, QueryMatch};
use crate::path;

/// Declared entry limit, kept for configuration compatibility
///
/// No eviction policy enforces it; the store grows unbounded.
pub const DEFAULT_MAX_ENTRIES: usize = 500;

/// Storage slot for a cached path
///
/// Tombstoned keys stay in the map so prefix scans iterate over a stable key
/// set; they read as absent through `get` and `query`, but `has` still
/// reports them (see `has`).
#[derive(Clone, Debug)]
enum Slot<V> {
    Present(V),
    Tombstone,
}

/// Path-keyed metadata cache
///
/// Keys are normalized before every operation, so `a/b`, `/a//b/`, and
/// `\a\b` all address the same entry. Values are opaque to the store.
pub struct MetadataCache<V> {
    /// Map from canonical path to cached metadata
    files: HashMap<String, Slot<V>>,
    /// Directories whose full child listing is known to be cached
    completed: HashMap<String, bool>,
    /// Declared capacity limit (unenforced)
    max_entries: usize,
    /// Cache hit counter
    hits: AtomicU64,
    /// Cache miss counter
    misses: AtomicU64,
}

impl<V> MetadataCache<V> {
    /// Create an empty cache with the default declared capacity
    pub fn new() -> Self {
        Self::with_max_entries(DEFAULT_MAX_ENTRIES)
    }

    /// Create an empty cache with a custom declared capacity
    ///
    /// The limit is recorded but not enforced.
    pub fn with_max_entries(max_entries: usize) -> Self {
        Self {
            files: HashMap::new(),
            completed: HashMap::new(),
            max_entries,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Number of keys in the store, tombstones included
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Whether the store holds no keys at all
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Declared capacity limit
    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    /// Get cache statistics
    ///
    /// Returns (hits, misses, hit_rate)
    pub fn stats(&self) -> (u64, u64, f64) {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let total = hits + misses;
        let hit_rate = if total > 0 {
            (hits as f64 / total as f64) * 100.0
        } else {
            0.0
        };
        (hits, misses, hit_rate)
    }

    /// Log current cache metrics
    pub fn log_metrics(&self) {
        let (hits, misses, hit_rate) = self.stats();
        debug!(
            hits = hits,
            misses = misses,
            hit_rate = format!("{:.1}%", hit_rate),
            entries = self.files.len(),
            completed_dirs = self.completed.len(),
            "Cache metrics"
        );
    }
}

impl<V> Default for MetadataCache<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Clone> Cache<V> for MetadataCache<V> {
    /// Insert or overwrite the entry for `key`
    ///
    /// The TTL is accepted for interface compatibility and ignored; entries
    /// live until forgotten, renamed away, or flushed.
    fn put(&mut self, key: &str, value: V, _ttl: Option<Duration>) -> Result<(), CacheError> {
        let key = path::clean(key)?;
        debug!(key = %key, "Cached metadata");
        self.files.insert(key, Slot::Present(value));
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<V>, CacheError> {
        let key = path::clean(key)?;
        match self.files.get(&key) {
            Some(Slot::Present(value)) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                trace!(key = %key, "Cache HIT");
                Ok(Some(value.clone()))
            }
            Some(Slot::Tombstone) => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                trace!(key = %key, "Cache MISS (tombstoned)");
                Ok(None)
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                trace!(key = %key, "Cache MISS");
                Ok(None)
            }
        }
    }

    /// Whether any slot exists under `key`
    ///
    /// Tombstoned keys report `true` even though `get` returns nothing for
    /// them. Callers historically rely on this to distinguish "known
    /// deleted" from "never seen".
    fn has(&self, key: &str) -> Result<bool, CacheError> {
        let key = path::clean(key)?;
        Ok(self.files.contains_key(&key))
    }

    fn forget(&mut self, key: &str) -> Result<(), CacheError> {
        let key = path::clean(key)?;
        debug!(key = %key, "Forgot metadata");
        self.files.remove(&key);
        Ok(())
    }

    fn forever(&mut self, key: &str, value: V) -> Result<(), CacheError> {
        self.put(key, value, None)
    }

    /// Clear every entry and completion flag, preserving the root slot
    ///
    /// The root's metadata survives a full invalidation so the backend's
    /// identity does not have to be re-fetched.
    fn flush(&mut self) -> Result<(), CacheError> {
        let root = self.files.remove("/");
        self.files.clear();
        self.completed.clear();
        if let Some(slot) = root {
            self.files.insert("/".to_string(), slot);
        }
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
        debug!("Flushed metadata cache");
        Ok(())
    }
}

impl<V: Clone> PathCache<V> for MetadataCache<V> {
    /// Move or invalidate the subtree rooted at `source`
    ///
    /// With a destination, every key under `source` is re-inserted under the
    /// corresponding key below `destination` and the old key is tombstoned;
    /// completion flags migrate with their directories. Without one, every
    /// key under `source` is tombstoned in place and its completion flags
    /// are dropped. Old keys are tombstoned rather than removed so the key
    /// set stays stable for concurrent-looking prefix scans.
    fn rename(&mut self, source: &str, destination: Option<&str>) -> Result<(), CacheError> {
        let from = path::clean(source)?;
        let Some(destination) = destination else {
            debug!(source = %from, "Tombstoning subtree");
            for (key, slot) in self.files.iter_mut() {
                if subtree_suffix(key, &from).is_some() {
                    *slot = Slot::Tombstone;
                }
            }
            self.completed
                .retain(|key, _| subtree_suffix(key, &from).is_none());
            return Ok(());
        };

        let to = path::clean(destination)?;
        debug!(source = %from, destination = %to, "Renaming subtree");
        let moves: Vec<(String, String)> = self
            .files
            .keys()
            .filter_map(|key| {
                subtree_suffix(key, &from).map(|suffix| (key.clone(), rejoin(&to, suffix)))
            })
            .filter(|(old, new)| old != new)
            .collect();
        // tombstone every source key before inserting the moved values, so a
        // destination inside the source subtree cannot clobber a moved entry
        let mut moved: Vec<(String, Slot<V>)> = Vec::with_capacity(moves.len());
        for (old, new) in moves {
            if let Some(slot) = self.files.insert(old, Slot::Tombstone) {
                moved.push((new, slot));
            }
        }
        for (new, slot) in moved {
            self.files.insert(new, slot);
        }

        let flag_moves: Vec<(String, String)> = self
            .completed
            .keys()
            .filter_map(|key| {
                subtree_suffix(key, &from).map(|suffix| (key.clone(), rejoin(&to, suffix)))
            })
            .filter(|(old, new)| old != new)
            .collect();
        for (old, new) in flag_moves {
            if let Some(flag) = self.completed.remove(&old) {
                self.completed.insert(new, flag);
            }
        }
        Ok(())
    }

    /// List cached entries below `path` from cached data only
    ///
    /// Tombstoned entries and the queried path itself never appear. The
    /// result order is unspecified.
    fn query(&self, path: &str, matcher: QueryMatch) -> Result<Vec<(String, V)>, CacheError> {
        let directory = path::clean(path)?;
        let limit = matcher.depth_limit();
        if limit <= 0 {
            return Ok(Vec::new());
        }
        let mut results = Vec::new();
        for (key, slot) in &self.files {
            let Slot::Present(value) = slot else {
                continue;
            };
            let Some(suffix) = subtree_suffix(key, &directory) else {
                continue;
            };
            if suffix.is_empty() {
                // the queried path itself
                continue;
            }
            let depth = suffix.split('/').count() as i64;
            if depth <= limit {
                results.push((key.clone(), value.clone()));
            }
        }
        trace!(
            directory = %directory,
            matches = results.len(),
            "Queried cached listing"
        );
        Ok(results)
    }

    fn complete(&mut self, path: &str, is_completed: bool) -> Result<(), CacheError> {
        let path = path::clean(path)?;
        debug!(path = %path, completed = is_completed, "Marked listing completion");
        self.completed.insert(path, is_completed);
        Ok(())
    }

    fn completed(&self, path: &str) -> Result<bool, CacheError> {
        let path = path::clean(path)?;
        Ok(self.completed.get(&path).copied().unwrap_or(false))
    }
}

/// Segment-aware subtree test on two canonical paths
///
/// Returns the remainder of `key` below `prefix` (empty when they are
/// equal), or `None` when `key` is outside the subtree. Matching is per
/// segment, so `/ab` is not below `/a`.
fn subtree_suffix<'a>(key: &'a str, prefix: &str) -> Option<&'a str> {
    if prefix == "/" {
        // canonical keys always start with '/'
        return key.strip_prefix('/');
    }
    let rest = key.strip_prefix(prefix)?;
    if rest.is_empty() {
        Some(rest)
    } else {
        rest.strip_prefix('/')
    }
}

/// Re-root a subtree suffix under a new canonical base path
fn rejoin(base: &str, suffix: &str) -> String {
    if suffix.is_empty() {
        base.to_string()
    } else if base == "/" {
        format!("/{}", suffix)
    } else {
        format!("{}/{}", base, suffix)
    }
}
