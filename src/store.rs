// In-memory task store
//
// The store never touches storage. Every mutation reports whether it changed
// anything; the caller decides when to write the sequence through.

use crate::filter::FilterMode;
use crate::task::Task;
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use tracing::{debug, warn};

/// Prompt shown before a task is removed
pub const DELETE_PROMPT: &str = "Are you sure you want to delete this task?";

/// Yes/no gate in front of destructive actions
pub trait Confirm {
    fn confirm(&mut self, prompt: &str) -> bool;
}

/// A fixed answer
impl Confirm for bool {
    fn confirm(&mut self, _prompt: &str) -> bool {
        *self
    }
}

/// Outcome of [`Store::delete`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Deletion {
    Removed(Task),
    Declined,
    NotFound,
}

/// Monotonic id source seeded from wall-clock milliseconds
///
/// Ids stay timestamp-like but never repeat, even within one millisecond.
#[derive(Debug, Clone, Default)]
struct IdGen {
    last: i64,
}

impl IdGen {
    /// `None` once the sequence has reached `i64::MAX`
    fn next(&mut self, now_ms: i64) -> Option<i64> {
        let id = now_ms.max(self.last.checked_add(1)?);
        self.last = id;
        Some(id)
    }
}

/// Ordered task sequence, newest first
#[derive(Debug, Clone, Default)]
pub struct Store {
    tasks: Vec<Task>,
    ids: IdGen,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store around an existing sequence
    ///
    /// The id generator is seeded past the largest id present.
    pub fn from_tasks(tasks: Vec<Task>) -> Self {
        let last = tasks.iter().map(|t| t.id).max().unwrap_or(0);
        Self {
            tasks,
            ids: IdGen { last },
        }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn into_tasks(self) -> Vec<Task> {
        self.tasks
    }

    pub fn get(&self, id: i64) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    /// Prepend a new task; returns `None` when `text` is blank
    pub fn add(&mut self, text: &str, due_date: Option<&str>) -> Option<&Task> {
        self.add_at(text, due_date, Utc::now())
    }

    /// [`Store::add`] with an explicit clock
    pub fn add_at(&mut self, text: &str, due_date: Option<&str>, now: DateTime<Utc>) -> Option<&Task> {
        let text = text.trim();
        if text.is_empty() {
            debug!("add: blank text, ignoring");
            return None;
        }

        let id = match self.ids.next(now.timestamp_millis()) {
            Some(id) => id,
            None => {
                let id = self.smallest_unused_id();
                warn!(id, "add: id sequence exhausted, reusing a free id");
                id
            }
        };
        let task = Task::new(id, text, due_date.unwrap_or_default(), now);
        debug!(id, due_date = %task.due_date, "add: prepending task");

        self.tasks.insert(0, task);
        self.tasks.first()
    }

    /// Flip completion; returns the new state, or `None` for an unknown id
    pub fn toggle(&mut self, id: i64) -> Option<bool> {
        let task = self.tasks.iter_mut().find(|t| t.id == id)?;
        task.completed = !task.completed;
        debug!(id, completed = task.completed, "toggle");
        Some(task.completed)
    }

    /// Replace the text verbatim; returns false for an unknown id
    pub fn edit(&mut self, id: i64, text: &str) -> bool {
        match self.tasks.iter_mut().find(|t| t.id == id) {
            Some(task) => {
                task.text = text.to_string();
                debug!(id, "edit");
                true
            }
            None => false,
        }
    }

    /// Remove a task once `confirm` agrees
    ///
    /// Unknown ids return [`Deletion::NotFound`] without prompting.
    pub fn delete(&mut self, id: i64, confirm: &mut dyn Confirm) -> Deletion {
        let Some(pos) = self.tasks.iter().position(|t| t.id == id) else {
            return Deletion::NotFound;
        };

        if !confirm.confirm(DELETE_PROMPT) {
            debug!(id, "delete: declined");
            return Deletion::Declined;
        }

        debug!(id, "delete: removing");
        Deletion::Removed(self.tasks.remove(pos))
    }

    fn smallest_unused_id(&self) -> i64 {
        let taken: HashSet<i64> = self.tasks.iter().map(|t| t.id).collect();
        // More candidates than tasks, so one is always free
        (1..).find(|id| !taken.contains(id)).unwrap_or_default()
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn filter(&self, mode: FilterMode) -> Vec<&Task> {
        mode.apply(&self.tasks)
    }
}
