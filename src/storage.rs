use crate::errors::StoreError;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::runtime::{Handle, RuntimeFlavor};
use tracing::{debug, error};

/// Durable string-to-string mapping, shaped like browser local storage.
///
/// Each call is independently atomic from the caller's point of view; there
/// are no transactions.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
    /// Removing a key that does not exist is not an error.
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;
    /// Enumeration order is unspecified.
    fn keys(&self) -> Vec<String>;
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.entries.remove(key);
        Ok(())
    }

    fn keys(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }
}

/// Key-value store backed by a single JSON object on disk. The whole map is
/// held in memory and rewritten on every mutation.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl FileStore {
    /// Reads the data file. A missing file is an empty store; an unreadable or
    /// unparsable one is logged and also starts empty.
    pub async fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match fs::read(&path).await {
            Ok(bytes) => match serde_json::from_slice(&bytes) {
                Ok(entries) => entries,
                Err(err) => {
                    error!("failed to parse data file: {err}");
                    BTreeMap::new()
                }
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(err) => {
                error!("failed to read data file: {err}");
                BTreeMap::new()
            }
        };
        debug!(path = %path.display(), keys = entries.len(), "store loaded");

        Self { path, entries }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    // The trait is synchronous, so the write blocks. On a multi-threaded
    // runtime the worker is handed off first.
    fn persist(&self) -> Result<(), StoreError> {
        let payload = serde_json::to_vec_pretty(&self.entries)?;
        let write = || std::fs::write(&self.path, &payload);
        let on_worker = Handle::try_current()
            .is_ok_and(|handle| handle.runtime_flavor() == RuntimeFlavor::MultiThread);
        if on_worker {
            tokio::task::block_in_place(write)?;
        } else {
            write()?;
        }
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value.to_string());
        self.persist()
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        if self.entries.remove(key).is_none() {
            return Ok(());
        }
        self.persist()
    }

    fn keys(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_remove_missing_key_is_noop() {
        let mut store = MemoryStore::new();
        store.set("a", "1").unwrap();
        store.remove("missing").unwrap();
        store.remove("a").unwrap();
        store.remove("a").unwrap();
        assert!(store.is_empty());
        assert_eq!(store.get("a"), None);
    }

    #[tokio::test]
    async fn file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");

        let mut store = FileStore::load(&path).await;
        store.set("block_1", "{}").unwrap();
        store.set("1_titleInput", "coffee").unwrap();
        store.remove("block_1").unwrap();

        let reopened = FileStore::load(&path).await;
        assert_eq!(reopened.get("1_titleInput").as_deref(), Some("coffee"));
        assert_eq!(reopened.get("block_1"), None);
        assert_eq!(reopened.keys(), vec!["1_titleInput".to_string()]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn file_store_writes_from_runtime_worker() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");

        let mut store = FileStore::load(&path).await;
        store.set("A_titleInput", "coffee").unwrap();
        store.remove("A_titleInput").unwrap();
        store.set("B_titleInput", "tea").unwrap();

        let reopened = FileStore::load(store.path()).await;
        assert_eq!(reopened.keys(), vec!["B_titleInput".to_string()]);
    }

    #[tokio::test]
    async fn file_store_starts_empty_on_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        std::fs::write(&path, b"{ not json").unwrap();

        let store = FileStore::load(&path).await;
        assert!(store.keys().is_empty());
    }

    #[tokio::test]
    async fn file_store_reports_write_failures() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing-dir").join("store.json");

        let mut store = FileStore::load(&path).await;
        assert!(store.set("k", "v").is_err());
        assert_eq!(store.get("k").as_deref(), Some("v"));
    }
}
