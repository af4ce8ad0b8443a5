//! Durable key-value persistence for the task collection
//!
//! The whole collection is serialized under one fixed key and replaced
//! wholesale on every mutation — no incremental diffing.

use std::fs;
use std::path::PathBuf;

use crate::Result;

/// Fixed key the task collection is stored under
pub const TASKS_KEY: &str = "tasks";

/// A durable key-value store that survives process restarts
pub trait StateStore: Send {
    /// Load the value stored under `key`, or `None` if absent
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be read.
    fn load(&self, key: &str) -> Result<Option<String>>;

    /// Replace the value stored under `key`
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be written.
    fn save(&self, key: &str, value: &str) -> Result<()>;
}

/// File-backed store: one JSON document per key in a data directory
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    /// Create a store rooted at `dir`, creating the directory if needed
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl StateStore for JsonFileStore {
    fn load(&self, key: &str) -> Result<Option<String>> {
        let path = self.key_path(key);
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path)?;
        Ok(Some(content))
    }

    fn save(&self, key: &str, value: &str) -> Result<()> {
        let path = self.key_path(key);
        fs::write(&path, value)?;
        tracing::debug!(path = %path.display(), bytes = value.len(), "state saved");
        Ok(())
    }
}
