//! In-memory task store with wholesale persistence
//!
//! The store is the sole owner of the task collection. Tasks are kept in
//! insertion order; that order is what the voice matcher iterates and
//! what breaks ties when listing.

use chrono::NaiveDate;

use super::{Priority, StateStore, Status, TASKS_KEY, Task, TaskDraft, TaskFilter, TaskPatch};
use crate::{Error, Result};

/// Owns the ordered task collection and assigns ids
pub struct TaskStore {
    tasks: Vec<Task>,
    next_id: u64,
    persist: Option<Box<dyn StateStore>>,
}

impl TaskStore {
    /// Create an empty in-memory store (no persistence)
    #[must_use]
    pub const fn new() -> Self {
        Self {
            tasks: Vec::new(),
            next_id: 1,
            persist: None,
        }
    }

    /// Create a store backed by a durable state store, loading any
    /// previously persisted tasks
    ///
    /// # Errors
    ///
    /// Returns an error if persisted state exists but cannot be parsed.
    pub fn with_persistence(persist: Box<dyn StateStore>) -> Result<Self> {
        let tasks: Vec<Task> = match persist.load(TASKS_KEY)? {
            Some(json) => serde_json::from_str(&json)?,
            None => Vec::new(),
        };

        // Ids are never reused, so the counter starts past everything loaded
        let next_id = tasks.iter().map(|t| t.id).max().unwrap_or(0) + 1;

        tracing::debug!(count = tasks.len(), next_id, "task store loaded");

        Ok(Self {
            tasks,
            next_id,
            persist: Some(persist),
        })
    }

    /// Seed the reference starter tasks when the store is empty
    ///
    /// # Errors
    ///
    /// Returns an error only on persistence failure plumbing; seeding an
    /// already-populated store is a no-op.
    pub fn seed_defaults(&mut self) -> Result<()> {
        if !self.tasks.is_empty() {
            return Ok(());
        }

        self.add(TaskDraft {
            title: "Complete project proposal".to_string(),
            description: Some("Write up the initial project scope and requirements".to_string()),
            priority: Some(Priority::High),
            due_date: NaiveDate::from_ymd_opt(2024, 3, 20),
        })?;
        let reviewed = self.add(TaskDraft {
            title: "Review code changes".to_string(),
            description: Some("Review pull requests from the team".to_string()),
            priority: Some(Priority::Medium),
            due_date: NaiveDate::from_ymd_opt(2024, 3, 15),
        })?;
        self.toggle_status(reviewed.id)?;

        Ok(())
    }

    /// All tasks in insertion order
    #[must_use]
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Number of stored tasks
    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Whether the store holds no tasks
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Create a task with a fresh id and defaults for unset fields
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if the title is empty after trimming.
    pub fn add(&mut self, draft: TaskDraft) -> Result<Task> {
        let title = draft.title.trim().to_string();
        if title.is_empty() {
            return Err(Error::Validation("task title must not be empty".to_string()));
        }

        let task = Task {
            id: self.next_id,
            title,
            description: draft.description,
            status: Status::Pending,
            priority: draft.priority.unwrap_or(Priority::Medium),
            due_date: draft.due_date,
        };
        self.next_id += 1;

        tracing::info!(id = task.id, title = %task.title, "task added");
        self.tasks.push(task.clone());
        self.persist_state();

        Ok(task)
    }

    /// Look up a task by id
    #[must_use]
    pub fn get(&self, id: u64) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Merge the given fields into an existing task
    ///
    /// The id is immutable; [`TaskPatch`] has no way to express changing it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] for an unknown id, or
    /// [`Error::Validation`] if a patched title is empty after trimming.
    pub fn update(&mut self, id: u64, patch: TaskPatch) -> Result<Task> {
        let title = match patch.title {
            Some(t) => {
                let trimmed = t.trim().to_string();
                if trimmed.is_empty() {
                    return Err(Error::Validation(
                        "task title must not be empty".to_string(),
                    ));
                }
                Some(trimmed)
            }
            None => None,
        };

        let task = self
            .tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| Error::NotFound(format!("task {id}")))?;

        if let Some(t) = title {
            task.title = t;
        }
        if let Some(d) = patch.description {
            task.description = d;
        }
        if let Some(s) = patch.status {
            task.status = s;
        }
        if let Some(p) = patch.priority {
            task.priority = p;
        }
        if let Some(d) = patch.due_date {
            task.due_date = d;
        }

        let updated = task.clone();
        tracing::info!(id, "task updated");
        self.persist_state();
        Ok(updated)
    }

    /// Remove a task
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] for an unknown id.
    pub fn delete(&mut self, id: u64) -> Result<()> {
        let idx = self
            .tasks
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| Error::NotFound(format!("task {id}")))?;

        let removed = self.tasks.remove(idx);
        tracing::info!(id, title = %removed.title, "task deleted");
        self.persist_state();
        Ok(())
    }

    /// Flip a task between pending and completed
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] for an unknown id.
    pub fn toggle_status(&mut self, id: u64) -> Result<Task> {
        let task = self
            .tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| Error::NotFound(format!("task {id}")))?;

        task.status = task.status.toggled();
        let updated = task.clone();
        tracing::info!(id, status = %updated.status, "task status toggled");
        self.persist_state();
        Ok(updated)
    }

    /// Filtered, ordered view of the tasks
    ///
    /// Filters by case-insensitive title substring and exact priority,
    /// then sorts by due date ascending with date-less tasks last; ties
    /// keep insertion order.
    #[must_use]
    pub fn list(&self, filter: &TaskFilter) -> Vec<Task> {
        let search = filter.search.as_ref().map(|s| s.to_lowercase());

        let mut result: Vec<Task> = self
            .tasks
            .iter()
            .filter(|t| {
                let matches_search = search
                    .as_ref()
                    .is_none_or(|s| t.title.to_lowercase().contains(s));
                let matches_priority = filter.priority.is_none_or(|p| t.priority == p);
                matches_search && matches_priority
            })
            .cloned()
            .collect();

        // Stable sort: (false, Some(date)) sorts before (true, None)
        result.sort_by_key(|t| (t.due_date.is_none(), t.due_date));
        result
    }

    /// Write the whole collection to the persistence backend, if any
    ///
    /// Persistence failures are logged and never roll back the in-memory
    /// mutation that triggered them.
    fn persist_state(&self) {
        let Some(persist) = &self.persist else {
            return;
        };

        match serde_json::to_string(&self.tasks) {
            Ok(json) => {
                if let Err(e) = persist.save(TASKS_KEY, &json) {
                    tracing::warn!(error = %e, "failed to persist tasks");
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to serialize tasks");
            }
        }
    }
}

impl Default for TaskStore {
    fn default() -> Self {
        Self::new()
    }
}
