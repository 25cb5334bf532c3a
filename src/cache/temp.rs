//! File-backed cache for short-lived credentials
//!
//! Persists entries as JSON files under the system temp directory so a
//! freshly started process can reuse a still-valid OAuth token instead of
//! requesting a new one. Unlike the in-memory stores this cache enforces
//! per-entry expiry; keys are opaque strings, not paths.

use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};
use tracing::{debug, warn};

use crate::cache::{Cache, CacheError, DEFAULT_TTL};

/// On-disk entry envelope
#[derive(Serialize, Deserialize)]
struct Payload<V> {
    data: V,
    /// Lifetime in seconds from `created_unix`; 0 means no expiry
    expires_secs: u64,
    /// Unix timestamp at write time
    created_unix: u64,
}

/// Expiry-aware key-value cache persisted to the system temp directory
pub struct TempCache {
    cache_dir: PathBuf,
}

impl TempCache {
    /// Create a cache scoped to `identity` (e.g. serialized client credentials)
    ///
    /// Distinct identities get distinct directories, so two backends never
    /// read each other's tokens.
    pub fn new(identity: &str) -> Self {
        let dir = std::env::temp_dir().join(format!("drive-cache-{}", hash(identity)));
        Self { cache_dir: dir }
    }

    /// Create a cache rooted at an explicit directory
    pub fn with_dir(cache_dir: PathBuf) -> Self {
        Self { cache_dir }
    }

    /// Directory holding this cache's entry files
    pub fn cache_dir(&self) -> &std::path::Path {
        &self.cache_dir
    }

    fn ensure_cache_dir(&self) -> Result<(), CacheError> {
        if self.cache_dir.is_dir() {
            return Ok(());
        }
        if self.cache_dir.exists() {
            // a stray file may occupy the path
            fs::remove_file(&self.cache_dir)?;
        }
        fs::create_dir_all(&self.cache_dir)?;
        Ok(())
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.cache_dir.join(hash(key))
    }

    /// Read and validate the payload for `key`
    ///
    /// Missing files, unreadable JSON, and expired entries all read as
    /// absent; a corrupt file is never an error at lookup time.
    fn read_payload<V: DeserializeOwned>(&self, key: &str) -> Option<Payload<V>> {
        let path = self.entry_path(key);
        let content = fs::read(&path).ok()?;
        let payload: Payload<V> = match serde_json::from_slice(&content) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Discarding unreadable cache payload");
                return None;
            }
        };
        if payload.expires_secs > 0
            && payload.created_unix + payload.expires_secs < unix_now()
        {
            debug!(path = %path.display(), "Cache entry expired");
            return None;
        }
        Some(payload)
    }
}

impl<V: Serialize + DeserializeOwned> Cache<V> for TempCache {
    /// Store `value` with the given lifetime, atomically
    ///
    /// A zero TTL means the entry never expires.
    fn put(&mut self, key: &str, value: V, ttl: Option<Duration>) -> Result<(), CacheError> {
        self.ensure_cache_dir()?;
        let payload = Payload {
            data: value,
            expires_secs: ttl.unwrap_or(DEFAULT_TTL).as_secs(),
            created_unix: unix_now(),
        };
        let encoded = serde_json::to_vec(&payload)?;
        let mut tmp = tempfile::NamedTempFile::new_in(&self.cache_dir)?;
        tmp.write_all(&encoded)?;
        tmp.persist(self.entry_path(key)).map_err(|e| e.error)?;
        debug!(key = key, "Persisted cache entry");
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<V>, CacheError> {
        Ok(self.read_payload(key).map(|p: Payload<V>| p.data))
    }

    fn has(&self, key: &str) -> Result<bool, CacheError> {
        Ok(self.read_payload::<V>(key).is_some())
    }

    fn forget(&mut self, key: &str) -> Result<(), CacheError> {
        match fs::remove_file(self.entry_path(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn forever(&mut self, key: &str, value: V) -> Result<(), CacheError> {
        self.put(key, value, Some(Duration::ZERO))
    }

    fn flush(&mut self) -> Result<(), CacheError> {
        if !self.cache_dir.is_dir() {
            return Ok(());
        }
        for entry in fs::read_dir(&self.cache_dir)? {
            let path = entry?.path();
            if path.is_file() {
                fs::remove_file(&path)?;
            }
        }
        debug!(dir = %self.cache_dir.display(), "Flushed temp cache");
        Ok(())
    }
}

/// Seconds since the Unix epoch
fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Hex SHA-1 of a cache key, used as the on-disk file name
fn hash(input: &str) -> String {
    let digest = Sha1::digest(input.as_bytes());
    digest.iter().map(|b| format!("{:02x}", b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch() -> (tempfile::TempDir, TempCache) {
        let dir = tempfile::tempdir().unwrap();
        let cache = TempCache::with_dir(dir.path().join("tokens"));
        (dir, cache)
    }

    #[test]
    fn test_round_trip() {
        let (_dir, mut cache) = scratch();
        cache.put("token", "abc123".to_string(), None).unwrap();
        assert_eq!(cache.get("token").unwrap(), Some("abc123".to_string()));
        assert!(Cache::<String>::has(&cache, "token").unwrap());
        assert_eq!(Cache::<String>::get(&cache, "other").unwrap(), None);
    }

    #[test]
    fn test_forget_and_flush() {
        let (_dir, mut cache) = scratch();
        cache.put("a", 1u64, None).unwrap();
        cache.put("b", 2u64, None).unwrap();
        Cache::<u64>::forget(&mut cache, "a").unwrap();
        assert_eq!(Cache::<u64>::get(&cache, "a").unwrap(), None);
        Cache::<u64>::flush(&mut cache).unwrap();
        assert_eq!(Cache::<u64>::get(&cache, "b").unwrap(), None);
        // forgetting a never-written key is fine
        Cache::<u64>::forget(&mut cache, "ghost").unwrap();
    }

    #[test]
    fn test_expired_entry_reads_as_absent() {
        let (_dir, mut cache) = scratch();
        cache.put("token", "stale".to_string(), None).unwrap();
        // rewrite the payload as created an hour ago with a 1s lifetime
        let payload = Payload {
            data: "stale".to_string(),
            expires_secs: 1,
            created_unix: unix_now() - 3600,
        };
        fs::write(
            cache.entry_path("token"),
            serde_json::to_vec(&payload).unwrap(),
        )
        .unwrap();
        assert_eq!(Cache::<String>::get(&cache, "token").unwrap(), None);
        assert!(!Cache::<String>::has(&cache, "token").unwrap());
    }

    #[test]
    fn test_forever_never_expires() {
        let (_dir, mut cache) = scratch();
        cache.forever("token", "keep".to_string()).unwrap();
        // zero expiry even with an ancient creation time stays valid
        let payload = Payload {
            data: "keep".to_string(),
            expires_secs: 0,
            created_unix: 1,
        };
        fs::write(
            cache.entry_path("token"),
            serde_json::to_vec(&payload).unwrap(),
        )
        .unwrap();
        assert_eq!(
            Cache::<String>::get(&cache, "token").unwrap(),
            Some("keep".to_string())
        );
    }

    #[test]
    fn test_corrupt_payload_reads_as_absent() {
        let (_dir, mut cache) = scratch();
        cache.put("token", "ok".to_string(), None).unwrap();
        fs::write(cache.entry_path("token"), b"not json").unwrap();
        assert_eq!(Cache::<String>::get(&cache, "token").unwrap(), None);
    }

    #[test]
    fn test_identity_scopes_directory() {
        let a = TempCache::new("client-a");
        let b = TempCache::new("client-b");
        assert_ne!(a.cache_dir(), b.cache_dir());
        assert_eq!(a.cache_dir(), TempCache::new("client-a").cache_dir());
    }
}
