use crate::{validate_key, CacheEntry, CacheError, UniverseCache, DEFAULT_EXPIRY_HOURS};
use chrono::{Duration, Utc};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

const APP_DIR: &str = "stock-screener";

/// One JSON document per key: `<dir>/<key>.json` holding `{timestamp, value}`
pub struct FileCache {
    dir: PathBuf,
    expiry: Duration,
}

impl FileCache {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, CacheError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            expiry: Duration::hours(DEFAULT_EXPIRY_HOURS),
        })
    }

    /// Cache under the platform cache directory
    pub fn in_default_dir() -> Result<Self, CacheError> {
        Self::new(Self::default_dir().ok_or(CacheError::NoCacheDir)?)
    }

    pub fn default_dir() -> Option<PathBuf> {
        dirs::cache_dir().map(|dir| dir.join(APP_DIR))
    }

    pub fn with_expiry(mut self, expiry: Duration) -> Self {
        self.expiry = expiry;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, CacheError> {
        validate_key(key)?;
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

impl UniverseCache for FileCache {
    fn get(&self, key: &str) -> Result<Option<Vec<String>>, CacheError> {
        let path = self.path_for(key)?;
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let entry: CacheEntry<Vec<String>> = match serde_json::from_str(&text) {
            Ok(entry) => entry,
            Err(e) => {
                warn!(key, error = %e, "Discarding unreadable cache file");
                return Ok(None);
            }
        };

        if entry.is_fresh(self.expiry, Utc::now()) {
            debug!(key, count = entry.value.len(), cached_at = %entry.cached_at, "Using cached universe");
            Ok(Some(entry.value))
        } else {
            debug!(key, "Cached universe expired");
            Ok(None)
        }
    }

    fn put(&self, key: &str, symbols: &[String]) -> Result<(), CacheError> {
        let path = self.path_for(key)?;
        let json = serde_json::to_string_pretty(&CacheEntry::new(symbols))?;
        fs::write(&path, json)?;
        info!(key, count = symbols.len(), "Cached universe");
        Ok(())
    }

    fn invalidate(&self, key: &str) -> Result<bool, CacheError> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn clear(&self) -> Result<usize, CacheError> {
        let mut removed = 0;
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                fs::remove_file(&path)?;
                removed += 1;
            }
        }
        info!(removed, dir = %self.dir.display(), "Universe cache cleared");
        Ok(removed)
    }
}
