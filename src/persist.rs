// Write-through persistence of the task sequence

use crate::storage::Storage;
use crate::store::Store;
use crate::task::Task;
use eyre::{Context, Result};
use serde_json::Value;
use std::collections::HashSet;
use tracing::{info, warn};

/// Storage key used when none is configured
pub const DEFAULT_KEY: &str = "todos";

/// Load the store persisted under `key`
///
/// A missing blob gives an empty store. A blob that is not a JSON array is
/// discarded with a warning; individual entries that do not match the task
/// shape, or repeat an earlier id, are skipped. Only storage read failures
/// are errors.
pub fn load(storage: &dyn Storage, key: &str) -> Result<Store> {
    let blob = storage
        .get(key)
        .with_context(|| format!("Failed to read tasks from storage key '{}'", key))?;

    let tasks = match blob {
        Some(blob) => parse_tasks(&blob),
        None => {
            info!(key, "No saved tasks, starting empty");
            Vec::new()
        }
    };

    Ok(Store::from_tasks(tasks))
}

/// Write the whole sequence under `key`
pub fn save(storage: &dyn Storage, key: &str, store: &Store) -> Result<()> {
    let blob = serde_json::to_string(store.tasks()).context("Failed to serialize tasks")?;
    storage
        .set(key, &blob)
        .with_context(|| format!("Failed to write tasks to storage key '{}'", key))?;
    info!(key, count = store.len(), "Saved tasks");
    Ok(())
}

/// Leniently parse a persisted blob into tasks
pub fn parse_tasks(blob: &str) -> Vec<Task> {
    let entries = match serde_json::from_str::<Value>(blob) {
        Ok(Value::Array(entries)) => entries,
        Ok(other) => {
            warn!(kind = json_kind(&other), "Saved tasks are not a JSON array, starting empty");
            return Vec::new();
        }
        Err(e) => {
            warn!(error = ?e, "Failed to parse saved tasks, starting empty");
            return Vec::new();
        }
    };

    let mut seen = HashSet::new();
    let mut tasks = Vec::with_capacity(entries.len());

    for (index, entry) in entries.into_iter().enumerate() {
        let task: Task = match serde_json::from_value(entry) {
            Ok(t) => t,
            Err(e) => {
                warn!(index, error = ?e, "Skipping malformed task entry");
                continue;
            }
        };

        if !seen.insert(task.id) {
            warn!(index, id = task.id, "Skipping task with duplicate id");
            continue;
        }

        tasks.push(task);
    }

    info!(count = tasks.len(), "Loaded saved tasks");
    tasks
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
