//! Expiring cache for instrument universes (symbol lists keyed by name).
//!
//! Callers read before fetching and write after a successful fetch; an
//! expired or unreadable entry behaves like a miss.

pub mod file;
pub mod memory;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub use file::FileCache;
pub use memory::MemoryCache;

pub const DEFAULT_EXPIRY_HOURS: i64 = 24;

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Invalid cache key: {0:?}")]
    InvalidKey(String),

    #[error("Cache I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cache serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("No cache directory available on this platform")]
    NoCacheDir,
}

/// Cached value with the time it was stored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry<T> {
    #[serde(rename = "timestamp")]
    pub cached_at: DateTime<Utc>,
    pub value: T,
}

impl<T> CacheEntry<T> {
    pub fn new(value: T) -> Self {
        Self {
            cached_at: Utc::now(),
            value,
        }
    }

    pub fn is_fresh(&self, expiry: Duration, now: DateTime<Utc>) -> bool {
        now - self.cached_at < expiry
    }
}

pub trait UniverseCache: Send + Sync {
    /// Fresh symbols for `key`, or `None` on a miss or an expired entry
    fn get(&self, key: &str) -> Result<Option<Vec<String>>, CacheError>;

    fn put(&self, key: &str, symbols: &[String]) -> Result<(), CacheError>;

    /// Drop one entry; true when something was removed
    fn invalidate(&self, key: &str) -> Result<bool, CacheError>;

    /// Drop every entry, returning how many were removed
    fn clear(&self) -> Result<usize, CacheError>;
}

/// Cache key for a market's universe (`universe_US`, `universe_ALL`, ...)
pub fn universe_key(market: &str) -> String {
    format!("universe_{}", market.trim().to_ascii_uppercase())
}

/// Read-before-fetch, write-after-fetch.
///
/// Cache failures are logged and never stop the fetch. Empty fetch results
/// are returned but not cached.
pub fn load_or_fetch<F>(cache: &dyn UniverseCache, key: &str, fetch: F) -> Vec<String>
where
    F: FnOnce() -> Vec<String>,
{
    match cache.get(key) {
        Ok(Some(symbols)) => {
            debug!(key, count = symbols.len(), "Universe cache hit");
            return symbols;
        }
        Ok(None) => debug!(key, "Universe cache miss"),
        Err(e) => warn!(key, error = %e, "Universe cache read failed"),
    }

    let symbols = fetch();
    if !symbols.is_empty() {
        if let Err(e) = cache.put(key, &symbols) {
            warn!(key, error = %e, "Universe cache write failed");
        }
    }
    symbols
}

pub(crate) fn validate_key(key: &str) -> Result<(), CacheError> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
        && !key.starts_with('.');
    if valid {
        Ok(())
    } else {
        Err(CacheError::InvalidKey(key.to_string()))
    }
}
