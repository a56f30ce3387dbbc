//! Response cache persisted to a single JSON file
//!
//! Provides a `CacheStore` that maps request keys (page URLs or postal codes)
//! to cached response bodies. Every insert rewrites the whole file so the
//! on-disk copy never lags a completed fetch.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default location of the cache file, relative to the working directory
pub const DEFAULT_CACHE_FILE: &str = "nps_cache.json";

/// A cached response body
///
/// Serialized untagged so the file stays a plain `key -> value` object:
/// strings come back as `RawText`, anything else as `Json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CachedValue {
    /// Raw HTML of a fetched page
    RawText(String),
    /// Decoded JSON from the places API
    Json(serde_json::Value),
}

impl CachedValue {
    /// Returns the text if this is a `RawText` entry
    pub fn as_text(&self) -> Option<&str> {
        match self {
            CachedValue::RawText(text) => Some(text),
            CachedValue::Json(_) => None,
        }
    }

    /// Returns the JSON value if this is a `Json` entry
    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            CachedValue::Json(value) => Some(value),
            CachedValue::RawText(_) => None,
        }
    }
}

/// Errors that can occur when persisting the cache
#[derive(Debug, Error)]
pub enum CacheError {
    /// Writing the cache file failed
    #[error("Failed to write cache file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Serializing the cache mapping failed
    #[error("Failed to serialize cache: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// In-memory response cache mirrored to a JSON file on disk
///
/// There is no locking: two processes sharing the same file will race and the
/// last writer wins. Entries never expire.
#[derive(Debug, Clone)]
pub struct CacheStore {
    /// File the cache is persisted to
    path: PathBuf,
    /// Cached entries keyed by request key
    entries: BTreeMap<String, CachedValue>,
}

impl CacheStore {
    /// Opens the cache at `path`, starting empty if the file is missing or corrupt
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = Self::load(&path);
        tracing::debug!(path = %path.display(), entries = entries.len(), "cache opened");
        Self { path, entries }
    }

    /// Creates an empty cache that will persist to `path` without reading it
    pub fn empty(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            entries: BTreeMap::new(),
        }
    }

    /// Reads the persisted mapping
    ///
    /// Never fails: a missing, unreadable or malformed file yields an empty
    /// mapping. A corrupt cache is treated as no cache.
    pub fn load(path: &Path) -> BTreeMap<String, CachedValue> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "no readable cache file, starting empty");
                return BTreeMap::new();
            }
        };

        match serde_json::from_str(&content) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "cache file is corrupt, starting empty");
                BTreeMap::new()
            }
        }
    }

    /// Ensures the directory holding the cache file exists
    fn ensure_dir(&self) -> std::io::Result<()> {
        match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => fs::create_dir_all(dir),
            _ => Ok(()),
        }
    }

    /// Serializes the whole mapping and overwrites the cache file
    pub fn save(&self) -> Result<(), CacheError> {
        let io_error = |source| CacheError::Io {
            path: self.path.clone(),
            source,
        };

        self.ensure_dir().map_err(io_error)?;
        let json = serde_json::to_string(&self.entries)?;
        fs::write(&self.path, json).map_err(io_error)
    }

    /// Looks up an entry by exact key
    pub fn get(&self, key: &str) -> Option<&CachedValue> {
        self.entries.get(key)
    }

    /// Stores an entry, replacing any previous value, and persists immediately
    pub fn insert(&mut self, key: impl Into<String>, value: CachedValue) -> Result<(), CacheError> {
        self.entries.insert(key.into(), value);
        self.save()
    }

    /// Number of cached entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache holds no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read-only view of every entry
    pub fn entries(&self) -> &BTreeMap<String, CachedValue> {
        &self.entries
    }
}
