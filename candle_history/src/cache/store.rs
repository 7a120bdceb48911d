//! Byte-level key/value stores backing the day cache.

use std::{
    collections::HashMap,
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::Mutex,
};

use async_trait::async_trait;
use snafu::{Backtrace, ResultExt, Snafu};

use crate::cache::key::CacheKey;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum StoreError {
    /// Reading or writing a record on disk failed.
    #[snafu(display("I/O error at {}: {source}", path.display()))]
    Io {
        path: PathBuf,
        source: std::io::Error,
        backtrace: Backtrace,
    },
}

/// Opaque byte storage addressed by [`CacheKey`].
///
/// `get` returns `Ok(None)` for a key that was never written.
#[async_trait]
pub trait ByteStore: Send + Sync {
    async fn get(&self, key: &CacheKey) -> Result<Option<Vec<u8>>, StoreError>;
    async fn put(&self, key: &CacheKey, bytes: Vec<u8>) -> Result<(), StoreError>;
}

/// One file per key under a root directory.
///
/// Writes go to a sibling `.tmp` file and are renamed into place, so a reader
/// never observes a half-written record.
#[derive(Debug, Clone)]
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, key: &CacheKey) -> PathBuf {
        self.root.join(key.relative_path())
    }
}

#[async_trait]
impl ByteStore for FsStore {
    async fn get(&self, key: &CacheKey) -> Result<Option<Vec<u8>>, StoreError> {
        let path = self.path_for(key);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).context(IoSnafu { path }),
        }
    }

    async fn put(&self, key: &CacheKey, bytes: Vec<u8>) -> Result<(), StoreError> {
        let path = self.path_for(key);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .context(IoSnafu { path: parent })?;
        }

        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, bytes)
            .await
            .context(IoSnafu { path: &tmp })?;
        tokio::fs::rename(&tmp, &path)
            .await
            .context(IoSnafu { path: &path })?;
        Ok(())
    }
}

/// In-process store, handy for tests and short-lived tools.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<HashMap<CacheKey, Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, key: &CacheKey) -> bool {
        self.lock().contains_key(key)
    }

    /// Overwrites a record directly, bypassing the day cache.
    pub fn insert_raw(&self, key: CacheKey, bytes: Vec<u8>) {
        self.lock().insert(key, bytes);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<CacheKey, Vec<u8>>> {
        // A poisoned map is still a valid map.
        self.records.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl ByteStore for MemoryStore {
    async fn get(&self, key: &CacheKey) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.lock().get(key).cloned())
    }

    async fn put(&self, key: &CacheKey, bytes: Vec<u8>) -> Result<(), StoreError> {
        self.lock().insert(key.clone(), bytes);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{chunk::DayChunk, timeframe::TimeFrame};
    use chrono::{TimeZone, Utc};
    use tempfile::TempDir;

    fn key() -> CacheKey {
        let chunk = DayChunk::starting_at(Utc.with_ymd_and_hms(2024, 1, 8, 0, 0, 0).unwrap());
        CacheKey::new("AAPL", TimeFrame::day(), &chunk)
    }

    #[tokio::test]
    async fn fs_store_missing_key_is_none() {
        let dir = TempDir::new().unwrap();
        let store = FsStore::new(dir.path());
        assert!(store.get(&key()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn fs_store_writes_under_key_path() {
        let dir = TempDir::new().unwrap();
        let store = FsStore::new(dir.path());

        store.put(&key(), b"[]".to_vec()).await.unwrap();

        let path = store.path_for(&key());
        assert!(path.starts_with(dir.path().join("AAPL").join("1Day")));
        assert_eq!(std::fs::read(&path).unwrap(), b"[]");
        assert!(!path.with_extension("json.tmp").exists());
        assert_eq!(store.get(&key()).await.unwrap().as_deref(), Some(&b"[]"[..]));
    }

    #[tokio::test]
    async fn memory_store_round_trip() {
        let store = MemoryStore::new();
        assert!(store.is_empty());
        store.put(&key(), b"[1]".to_vec()).await.unwrap();
        assert_eq!(store.len(), 1);
        assert!(store.contains(&key()));
        assert_eq!(store.get(&key()).await.unwrap(), Some(b"[1]".to_vec()));
    }
}
