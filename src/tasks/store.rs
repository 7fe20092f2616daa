//! Task storage
//!
//! Tasks are stored as an ordered JSON array under a caller-supplied key.

use super::Task;
use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Persistence for task lists, keyed by storage key
pub trait TaskStore: Send + Sync {
    /// Read the list stored under `key`; a missing key is an empty list
    fn load(&self, key: &str) -> Result<Vec<Task>>;

    /// Replace the list stored under `key`
    fn save(&self, key: &str, tasks: &[Task]) -> Result<()>;
}

/// One JSON file per key inside a directory
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File backing `key`. The key is percent-encoded, so path separators
    /// never survive and distinct keys never share a file.
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", urlencoding::encode(key)))
    }
}

impl TaskStore for JsonFileStore {
    fn load(&self, key: &str) -> Result<Vec<Task>> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(Vec::new());
        }

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read task file {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse task file {}", path.display()))
    }

    fn save(&self, key: &str, tasks: &[Task]) -> Result<()> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create {}", self.dir.display()))?;

        let path = self.path_for(key);
        let content = serde_json::to_string_pretty(tasks)?;
        std::fs::write(&path, content)
            .with_context(|| format!("Failed to write task file {}", path.display()))?;

        tracing::debug!("Saved {} task(s) to {}", tasks.len(), path.display());
        Ok(())
    }
}

/// In-memory store, for tests and ephemeral sessions
#[derive(Debug, Default)]
pub struct MemoryStore {
    lists: Mutex<HashMap<String, Vec<Task>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TaskStore for MemoryStore {
    fn load(&self, key: &str) -> Result<Vec<Task>> {
        let lists = self
            .lists
            .lock()
            .map_err(|_| anyhow::anyhow!("task store lock poisoned"))?;
        Ok(lists.get(key).cloned().unwrap_or_default())
    }

    fn save(&self, key: &str, tasks: &[Task]) -> Result<()> {
        let mut lists = self
            .lists
            .lock()
            .map_err(|_| anyhow::anyhow!("task store lock poisoned"))?;
        lists.insert(key.to_string(), tasks.to_vec());
        Ok(())
    }
}
