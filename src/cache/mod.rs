//! Cache module for storing fetched pages and API responses on disk
//!
//! All responses live in one flat JSON object keyed by request URL or postal
//! code. Entries never expire; a missing or corrupt file is an empty cache.

mod store;

pub use store::{CacheError, CacheStore, CachedValue, DEFAULT_CACHE_FILE};
