use crate::{validate_key, CacheEntry, CacheError, UniverseCache, DEFAULT_EXPIRY_HOURS};
use chrono::{Duration, Utc};
use dashmap::DashMap;

/// In-process cache, lost on exit
pub struct MemoryCache {
    entries: DashMap<String, CacheEntry<Vec<String>>>,
    expiry: Duration,
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::with_expiry(Duration::hours(DEFAULT_EXPIRY_HOURS))
    }

    pub fn with_expiry(expiry: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            expiry,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl UniverseCache for MemoryCache {
    fn get(&self, key: &str) -> Result<Option<Vec<String>>, CacheError> {
        validate_key(key)?;
        let now = Utc::now();
        Ok(self
            .entries
            .get(key)
            .filter(|entry| entry.is_fresh(self.expiry, now))
            .map(|entry| entry.value.clone()))
    }

    fn put(&self, key: &str, symbols: &[String]) -> Result<(), CacheError> {
        validate_key(key)?;
        self.entries.insert(key.to_string(), CacheEntry::new(symbols.to_vec()));
        Ok(())
    }

    fn invalidate(&self, key: &str) -> Result<bool, CacheError> {
        validate_key(key)?;
        Ok(self.entries.remove(key).is_some())
    }

    fn clear(&self) -> Result<usize, CacheError> {
        let removed = self.entries.len();
        self.entries.clear();
        Ok(removed)
    }
}
