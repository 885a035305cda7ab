//! Persistent lookup cache for discography fetches.
//!
//! Fetching a whole discography with lyrics takes hundreds of requests, so
//! every expensive lookup goes through a [`LookupCache`]. The cache is
//! injected into the aggregator rather than living in a global, which lets
//! tests swap in a [`MemoryCache`].
//!
//! ## Cache keys
//!
//! Keys are content-addressed: [`cache_key`] hashes the canonical JSON form
//! of the logical identity being cached (`{"album": "302127"}`,
//! `{"artist": "27", "kind": "songs"}`, ...). `serde_json` objects keep
//! their keys sorted, so the same identity always produces the same key
//! regardless of the order the fields were written in.
//!
//! ## Storage
//!
//! [`DiskCache`] writes one `<key>.json` file per entry. Values read or
//! written during a run are memoized, so repeated reads of a key within one
//! run always agree even if the directory is touched externally.

use md5::{Digest, Md5};
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use tracing::{debug, warn};

use crate::error::Result;

/// Default on-disk cache location, relative to the working directory.
pub const DEFAULT_CACHE_DIR: &str = "artist_cache";

/// Derive the cache key for a logical identity.
pub fn cache_key(identity: &Value) -> String {
    md5_hex(&identity.to_string())
}

/// Compute MD5 hash of a string and return as hex string.
pub fn md5_hex(data: &str) -> String {
    let mut hasher = Md5::new();
    hasher.update(data.as_bytes());
    let result = hasher.finalize();
    hex::encode(result)
}

/// A key/value store for JSON documents.
pub trait LookupCache: Send + Sync {
    /// Look a key up, returning `None` on a miss.
    fn get(&self, key: &str) -> Result<Option<Value>>;

    /// Store a value under a key, replacing any previous value.
    fn put(&self, key: &str, value: &Value) -> Result<()>;
}

/// In-process cache that forgets everything when dropped.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: RwLock<HashMap<String, Value>>,
}

impl MemoryCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    /// Whether the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl LookupCache for MemoryCache {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self
            .entries
            .read()
            .ok()
            .and_then(|entries| entries.get(key).cloned()))
    }

    fn put(&self, key: &str, value: &Value) -> Result<()> {
        if let Ok(mut entries) = self.entries.write() {
            entries.insert(key.to_string(), value.clone());
        }
        Ok(())
    }
}

/// Directory-backed cache, one JSON file per key.
#[derive(Debug)]
pub struct DiskCache {
    dir: PathBuf,
    memo: MemoryCache,
}

impl DiskCache {
    /// Open (and create if needed) a cache directory.
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        debug!("Opened disk cache at {}", dir.display());
        Ok(Self {
            dir,
            memo: MemoryCache::new(),
        })
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl LookupCache for DiskCache {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        if let Some(value) = self.memo.get(key)? {
            return Ok(Some(value));
        }

        let path = self.entry_path(key);
        let content = match fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        // A corrupt entry is treated as a miss and overwritten later.
        let value: Value = match serde_json::from_str(&content) {
            Ok(v) => v,
            Err(e) => {
                warn!("Ignoring unreadable cache entry {}: {}", path.display(), e);
                return Ok(None);
            }
        };

        self.memo.put(key, &value)?;
        Ok(Some(value))
    }

    fn put(&self, key: &str, value: &Value) -> Result<()> {
        let path = self.entry_path(key);
        fs::write(&path, serde_json::to_vec(value)?)?;
        debug!("Cached {}", path.display());
        self.memo.put(key, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_md5_hex() {
        let result = md5_hex("test");
        assert_eq!(result, "098f6bcd4621d373cade4e832627b4f6");
    }

    #[test]
    fn test_cache_key_is_order_independent() {
        let a: Value = serde_json::from_str(r#"{"artist": "Queen", "kind": "songs"}"#).unwrap();
        let b: Value = serde_json::from_str(r#"{"kind": "songs", "artist": "Queen"}"#).unwrap();
        assert_eq!(cache_key(&a), cache_key(&b));
        assert_eq!(cache_key(&a).len(), 32);
    }

    #[test]
    fn test_cache_key_distinguishes_identities() {
        assert_ne!(
            cache_key(&json!({ "album": "1" })),
            cache_key(&json!({ "album": "2" }))
        );
    }

    #[test]
    fn test_memory_cache_roundtrip() {
        let cache = MemoryCache::new();
        assert!(cache.is_empty());
        assert_eq!(cache.get("k").unwrap(), None);
        cache.put("k", &json!([1, 2, 3])).unwrap();
        assert_eq!(cache.get("k").unwrap(), Some(json!([1, 2, 3])));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_disk_cache_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let key = cache_key(&json!({ "artist": "Queen" }));

        let cache = DiskCache::open(dir.path()).unwrap();
        assert_eq!(cache.get(&key).unwrap(), None);
        cache.put(&key, &json!({ "songs": ["Bohemian Rhapsody"] })).unwrap();

        let reopened = DiskCache::open(dir.path()).unwrap();
        assert_eq!(
            reopened.get(&key).unwrap(),
            Some(json!({ "songs": ["Bohemian Rhapsody"] }))
        );
    }

    #[test]
    fn test_disk_cache_reads_are_stable_within_a_run() {
        let dir = tempfile::tempdir().unwrap();
        let cache = DiskCache::open(dir.path()).unwrap();
        cache.put("k", &json!("first")).unwrap();

        fs::write(dir.path().join("k.json"), "\"changed\"").unwrap();
        assert_eq!(cache.get("k").unwrap(), Some(json!("first")));
    }

    #[test]
    fn test_disk_cache_ignores_corrupt_entries() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("bad.json"), "{not json").unwrap();
        let cache = DiskCache::open(dir.path()).unwrap();
        assert_eq!(cache.get("bad").unwrap(), None);
    }
}
