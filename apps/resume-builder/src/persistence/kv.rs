use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::info;

use crate::errors::AppError;

/// Durable string key-value storage, the local equivalent of a browser's
/// local storage.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, AppError>;
    fn set(&self, key: &str, value: &str) -> Result<(), AppError>;
}

/// Stores each key as `<dir>/<key>.json`. Writes go through a temp file in
/// the same directory and are renamed into place.
#[derive(Debug, Clone)]
pub struct FileKeyValueStore {
    dir: PathBuf,
}

impl FileKeyValueStore {
    /// Creates the data directory if needed.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, AppError> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir)
            .map_err(|e| AppError::Storage(format!("cannot create {}: {e}", dir.display())))?;
        info!("Local storage opened at {}", dir.display());
        Ok(Self { dir })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let file: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.dir.join(format!("{file}.json"))
    }
}

impl KeyValueStore for FileKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, AppError> {
        match std::fs::read_to_string(self.path_for(key)) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Storage(format!("read of '{key}' failed: {e}"))),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), AppError> {
        let storage_err = |e: std::io::Error| AppError::Storage(format!("write of '{key}' failed: {e}"));

        let mut tmp = tempfile::NamedTempFile::new_in(&self.dir).map_err(storage_err)?;
        tmp.write_all(value.as_bytes()).map_err(storage_err)?;
        tmp.flush().map_err(storage_err)?;
        tmp.persist(self.path_for(key))
            .map_err(|e| storage_err(e.error))?;
        Ok(())
    }
}

/// In-process store, used by tests and as a scratch backend.
#[derive(Debug, Default)]
pub struct MemoryKeyValueStore {
    entries: Mutex<HashMap<String, String>>,
    writes: Mutex<usize>,
}

impl MemoryKeyValueStore {
    /// Number of successful `set` calls so far.
    pub fn write_count(&self) -> usize {
        self.writes.lock().map(|w| *w).unwrap_or(0)
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, AppError> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| AppError::Storage("memory store poisoned".into()))?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), AppError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| AppError::Storage("memory store poisoned".into()))?;
        entries.insert(key.to_string(), value.to_string());
        if let Ok(mut writes) = self.writes.lock() {
            *writes += 1;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_store_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileKeyValueStore::open(dir.path()).unwrap();
        assert_eq!(store.get("resumeData").unwrap(), None);
        store.set("resumeData", r#"{"skills":[]}"#).unwrap();
        assert_eq!(
            store.get("resumeData").unwrap().as_deref(),
            Some(r#"{"skills":[]}"#)
        );
        assert!(dir.path().join("resumeData.json").exists());
    }

    #[test]
    fn test_file_store_sanitizes_key() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileKeyValueStore::open(dir.path()).unwrap();
        store.set("../escape", "x").unwrap();
        assert!(dir.path().join("___escape.json").exists());
    }

    #[test]
    fn test_memory_store_counts_writes() {
        let store = MemoryKeyValueStore::default();
        store.set("k", "1").unwrap();
        store.set("k", "2").unwrap();
        assert_eq!(store.write_count(), 2);
        assert_eq!(store.get("k").unwrap().as_deref(), Some("2"));
    }
}
