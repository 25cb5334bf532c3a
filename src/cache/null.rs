//! No-op cache variant
//!
//! Drop-in replacement used when caching is disabled. Only the root entry is
//! retained so the backend's identity stays answerable; every other path
//! reads as absent and every other mutation is ignored.

use std::time::Duration;

use tracing::trace;

use crate::cache::{Cache, CacheError, PathCache, QueryMatch};
use crate::path;

/// Cache variant that retains only the root entry
#[derive(Debug, Default)]
pub struct NullCache<V> {
    root: Option<V>,
}

impl<V> NullCache<V> {
    pub fn new() -> Self {
        Self { root: None }
    }
}

impl<V: Clone> Cache<V> for NullCache<V> {
    fn put(&mut self, key: &str, value: V, _ttl: Option<Duration>) -> Result<(), CacheError> {
        let key = path::clean(key)?;
        if key == "/" {
            self.root = Some(value);
        } else {
            trace!(key = %key, "Caching disabled, dropped metadata");
        }
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<V>, CacheError> {
        let key = path::clean(key)?;
        if key == "/" {
            Ok(self.root.clone())
        } else {
            Ok(None)
        }
    }

    /// The root always reports present, whether or not it holds a value
    fn has(&self, key: &str) -> Result<bool, CacheError> {
        let key = path::clean(key)?;
        Ok(key == "/")
    }

    fn forget(&mut self, _key: &str) -> Result<(), CacheError> {
        Ok(())
    }

    fn forever(&mut self, key: &str, value: V) -> Result<(), CacheError> {
        self.put(key, value, None)
    }

    fn flush(&mut self) -> Result<(), CacheError> {
        Ok(())
    }
}

impl<V: Clone> PathCache<V> for NullCache<V> {
    fn rename(&mut self, _source: &str, _destination: Option<&str>) -> Result<(), CacheError> {
        Ok(())
    }

    fn query(&self, _path: &str, _matcher: QueryMatch) -> Result<Vec<(String, V)>, CacheError> {
        Ok(Vec::new())
    }

    fn complete(&mut self, _path: &str, _is_completed: bool) -> Result<(), CacheError> {
        Ok(())
    }

    fn completed(&self, _path: &str) -> Result<bool, CacheError> {
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_round_trip() {
        let mut cache = NullCache::new();
        cache.put("/", "root-id".to_string(), None).unwrap();
        assert_eq!(cache.get("/").unwrap(), Some("root-id".to_string()));
        assert_eq!(cache.get("").unwrap(), Some("root-id".to_string()));
    }

    #[test]
    fn test_non_root_puts_are_dropped() {
        let mut cache = NullCache::new();
        cache.put("/a/x", 1u8, None).unwrap();
        assert_eq!(cache.get("/a/x").unwrap(), None);
        assert!(!cache.has("/a/x").unwrap());
    }

    #[test]
    fn test_root_always_reports_present() {
        let cache: NullCache<u8> = NullCache::new();
        assert!(cache.has("/").unwrap());
        assert_eq!(cache.get("/").unwrap(), None);
    }

    #[test]
    fn test_path_cache_operations_are_noops() {
        let mut cache = NullCache::new();
        cache.put("/", 1u8, None).unwrap();
        cache.rename("/a", Some("/b")).unwrap();
        cache.complete("/a", true).unwrap();
        assert!(!cache.completed("/a").unwrap());
        assert!(cache.query("/", QueryMatch::Children).unwrap().is_empty());
        cache.flush().unwrap();
        // flush does not clear the retained root
        assert_eq!(cache.get("/").unwrap(), Some(1));
    }

    #[test]
    fn test_escaping_key_still_errors() {
        let cache: NullCache<u8> = NullCache::new();
        assert!(cache.get("/..").is_err());
    }
}
