//! Task list
//!
//! An ordered list of `{id, text, complete}` records. The list is read from
//! its store once when loaded and rewritten after every mutation.

mod store;

pub use store::{JsonFileStore, MemoryStore, TaskStore};

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// A single task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub text: String,
    pub complete: bool,
}

/// Task list bound to a store and a storage key
pub struct TaskList {
    store: Arc<dyn TaskStore>,
    key: String,
    tasks: Vec<Task>,
}

impl TaskList {
    /// Load the list stored under `key`
    pub fn load(store: Arc<dyn TaskStore>, key: impl Into<String>) -> Result<Self> {
        let key = key.into();
        let tasks = store.load(&key)?;
        tracing::debug!("Loaded {} task(s) for key '{}'", tasks.len(), key);
        Ok(Self { store, key, tasks })
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Append a task. Blank text is ignored and returns `None`.
    pub fn add_task(&mut self, text: &str) -> Result<Option<Task>> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(None);
        }

        let task = Task {
            id: Uuid::new_v4().to_string(),
            text: text.to_string(),
            complete: false,
        };
        let mut next = self.tasks.clone();
        next.push(task.clone());
        self.commit(next)?;
        Ok(Some(task))
    }

    /// Flip `complete` on the task with `id`. Returns false if none matched.
    pub fn toggle_task(&mut self, id: &str) -> Result<bool> {
        let mut next = self.tasks.clone();
        let Some(task) = next.iter_mut().find(|t| t.id == id) else {
            return Ok(false);
        };
        task.complete = !task.complete;
        self.commit(next)?;
        Ok(true)
    }

    /// Remove the task with `id`. Returns false if none matched.
    pub fn remove_task(&mut self, id: &str) -> Result<bool> {
        let mut next = self.tasks.clone();
        next.retain(|t| t.id != id);
        if next.len() == self.tasks.len() {
            return Ok(false);
        }
        self.commit(next)?;
        Ok(true)
    }

    /// Save `next`, then adopt it. A failed save leaves the list unchanged.
    fn commit(&mut self, next: Vec<Task>) -> Result<()> {
        self.store.save(&self.key, &next)?;
        self.tasks = next;
        Ok(())
    }
}
