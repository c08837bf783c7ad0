use std::collections::{BTreeMap, BTreeSet};

use anyhow::{Context, anyhow};
use tracing::{debug, info, warn};

use crate::task::Task;

/// Key the task list is stored under.
pub const TODOS_KEY: &str = "todos";

/// Key/blob persistence, in the shape of the browser's `localStorage`.
pub trait Storage {
    fn get_item(&self, key: &str) -> anyhow::Result<Option<String>>;

    /// Overwrites whatever was stored under `key`.
    fn set_item(&mut self, key: &str, value: &str) -> anyhow::Result<()>;
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    items: BTreeMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn get_item(&self, key: &str) -> anyhow::Result<Option<String>> {
        Ok(self.items.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        self.items.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Reads the task list. Missing, unreadable or invalid data all come back as
/// an empty list so that stale state never blocks startup.
#[tracing::instrument(skip(storage))]
pub fn load_tasks<S: Storage + ?Sized>(storage: &S) -> Vec<Task> {
    let raw = match storage.get_item(TODOS_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => {
            debug!("no stored todos; starting empty");
            return Vec::new();
        }
        Err(err) => {
            warn!(error = %format!("{err:#}"), "failed reading stored todos; starting empty");
            return Vec::new();
        }
    };

    match decode_tasks(&raw) {
        Ok(tasks) => {
            info!(count = tasks.len(), "loaded todos");
            tasks
        }
        Err(err) => {
            warn!(error = %format!("{err:#}"), "discarding malformed stored todos");
            Vec::new()
        }
    }
}

#[tracing::instrument(skip(storage, tasks), fields(count = tasks.len()))]
pub fn save_tasks<S: Storage + ?Sized>(storage: &mut S, tasks: &[Task]) -> anyhow::Result<()> {
    let serialized = serde_json::to_string(tasks).context("failed to serialize todos")?;
    storage
        .set_item(TODOS_KEY, &serialized)
        .with_context(|| format!("failed to write \"{TODOS_KEY}\""))?;
    debug!(bytes = serialized.len(), "saved todos");
    Ok(())
}

pub fn decode_tasks(raw: &str) -> anyhow::Result<Vec<Task>> {
    let tasks: Vec<Task> = serde_json::from_str(raw).context("stored todos are not valid json")?;

    let mut seen = BTreeSet::new();
    for task in &tasks {
        if task.text.trim().is_empty() {
            return Err(anyhow!("task {} has empty text", task.id));
        }
        if task.id == u64::MAX {
            return Err(anyhow!("task id {} is out of range", task.id));
        }
        if !seen.insert(task.id) {
            return Err(anyhow!("duplicate task id {}", task.id));
        }
    }

    Ok(tasks)
}
