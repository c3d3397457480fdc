use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Cache key under which the last synced sheet id is kept
pub const SHEET_ID_CACHE_KEY: &str = "estateflow_sheet_id";

/// Errors that can occur with cache operations
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Cache file error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Cache file is not valid TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Cache serialization error: {0}")]
    SerializationError(#[from] toml::ser::Error),
}

/// Two-tier local cache
///
/// L1 is an in-process moka cache, L2 is a small TOML file of string entries
/// that survives restarts. Reads fall through to the file and warm L1.
pub struct LocalCache {
    path: PathBuf,
    l1_cache: moka::future::Cache<String, String>,
    // Serializes read-modify-write of the backing file
    file_lock: tokio::sync::Mutex<()>,
}

impl LocalCache {
    pub fn new(path: impl Into<PathBuf>, l1_capacity: u64) -> Self {
        Self {
            path: path.into(),
            l1_cache: moka::future::CacheBuilder::new(l1_capacity).build(),
            file_lock: tokio::sync::Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_file(&self) -> Result<BTreeMap<String, String>, CacheError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(text) => Ok(toml::from_str(&text)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    async fn write_file(&self, entries: &BTreeMap<String, String>) -> Result<(), CacheError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&self.path, toml::to_string(entries)?).await?;
        Ok(())
    }

    /// Get a value (L1 first, then the file)
    pub async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        if let Some(value) = self.l1_cache.get(key).await {
            tracing::trace!("L1 cache hit: {}", key);
            return Ok(Some(value));
        }

        let _guard = self.file_lock.lock().await;
        let value = self.read_file().await?.remove(key);
        if let Some(value) = &value {
            tracing::trace!("File cache hit: {}", key);
            self.l1_cache.insert(key.to_string(), value.clone()).await;
        }
        Ok(value)
    }

    /// Set a value in both tiers
    pub async fn set(&self, key: &str, value: &str) -> Result<(), CacheError> {
        let _guard = self.file_lock.lock().await;
        let mut entries = self.read_file().await?;
        entries.insert(key.to_string(), value.to_string());
        self.write_file(&entries).await?;

        self.l1_cache.insert(key.to_string(), value.to_string()).await;
        tracing::trace!("Cache set: {}", key);
        Ok(())
    }

    /// Delete a value from both tiers
    pub async fn delete(&self, key: &str) -> Result<(), CacheError> {
        let _guard = self.file_lock.lock().await;
        self.l1_cache.invalidate(key).await;

        let mut entries = self.read_file().await?;
        if entries.remove(key).is_some() {
            self.write_file(&entries).await?;
        }
        Ok(())
    }
}
