//! JSON file store.
//!
//! The whole store is one JSON object of string values. Every write replaces
//! the file atomically: the new contents go to a temporary file in the same
//! directory, which is then renamed over the old one.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tempfile::NamedTempFile;
use tracing::warn;

use mockexam_core::traits::SessionStore;

use crate::error::StoreError;

type Values = BTreeMap<String, String>;

/// A store persisted to a single JSON file.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileStore {
    /// The file is created on first write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }

    fn read(&self) -> Result<Values, StoreError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Values::new()),
            Err(e) => return Err(self.io_error(e)),
        };
        if content.trim().is_empty() {
            return Ok(Values::new());
        }
        serde_json::from_str(&content).map_err(|e| StoreError::Corrupt {
            path: self.path.clone(),
            message: e.to_string(),
        })
    }

    /// Like `read`, but a corrupt file is discarded so the next write
    /// replaces it.
    fn read_for_update(&self) -> Result<Values, StoreError> {
        match self.read() {
            Err(StoreError::Corrupt { path, message }) => {
                warn!(path = %path.display(), "overwriting corrupt state file: {message}");
                Ok(Values::new())
            }
            other => other,
        }
    }

    fn write(&self, values: &Values) -> Result<(), StoreError> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir).map_err(|e| self.io_error(e))?;

        let json = serde_json::to_vec_pretty(values).map_err(|e| StoreError::Corrupt {
            path: self.path.clone(),
            message: e.to_string(),
        })?;

        let mut tmp = NamedTempFile::new_in(dir).map_err(|e| self.io_error(e))?;
        tmp.write_all(&json).map_err(|e| self.io_error(e))?;
        tmp.as_file().sync_all().map_err(|e| self.io_error(e))?;
        tmp.persist(&self.path).map_err(|e| self.io_error(e.error))?;
        Ok(())
    }
}

impl SessionStore for JsonFileStore {
    fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        let _guard = self.lock.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(self.read()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> anyhow::Result<()> {
        let _guard = self.lock.lock().map_err(|_| StoreError::Poisoned)?;
        let mut values = self.read_for_update()?;
        values.insert(key.to_string(), value.to_string());
        self.write(&values)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> anyhow::Result<()> {
        let _guard = self.lock.lock().map_err(|_| StoreError::Poisoned)?;
        let mut values = self.read_for_update()?;
        if values.remove(key).is_some() {
            self.write(&values)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_reads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("state.json"));
        assert_eq!(store.get("examStartTime").unwrap(), None);
        assert!(!store.path().exists());
    }

    #[test]
    fn values_survive_a_new_instance() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("state.json");

        JsonFileStore::new(&path)
            .set("examStartTime", "1700000000000")
            .unwrap();

        let reopened = JsonFileStore::new(&path);
        assert_eq!(
            reopened.get("examStartTime").unwrap().as_deref(),
            Some("1700000000000")
        );

        let raw: Values = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw.len(), 1);
    }

    #[test]
    fn remove_keeps_other_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("state.json"));
        store.set("examStartTime", "1").unwrap();
        store.set("theme", "dark").unwrap();

        store.remove("examStartTime").unwrap();
        store.remove("examStartTime").unwrap();
        assert_eq!(store.get("examStartTime").unwrap(), None);
        assert_eq!(store.get("theme").unwrap().as_deref(), Some("dark"));
    }

    #[test]
    fn corrupt_file_errors_on_read_and_is_replaced_on_write() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, "{not json").unwrap();
        let store = JsonFileStore::new(&path);

        let err = store.get("examStartTime").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<StoreError>(),
            Some(StoreError::Corrupt { .. })
        ));

        store.set("examStartTime", "42").unwrap();
        assert_eq!(store.get("examStartTime").unwrap().as_deref(), Some("42"));
    }

    #[test]
    fn no_temp_files_left_behind() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("state.json"));
        for i in 0..5 {
            store.set("examStartTime", &i.to_string()).unwrap();
        }
        let entries = std::fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(entries, 1);
    }
}
