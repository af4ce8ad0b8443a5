//! Task data model and storage
//!
//! A [`Task`] is owned exclusively by the [`TaskStore`]; consumers work
//! with clones or look tasks up by id.

mod persist;
mod store;

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub use persist::{JsonFileStore, StateStore, TASKS_KEY};
pub use store::TaskStore;

/// Completion status of a task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Pending,
    Completed,
}

impl Status {
    /// Flip pending to completed and back
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Pending => Self::Completed,
            Self::Completed => Self::Pending,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => f.write_str("pending"),
            Self::Completed => f.write_str("completed"),
        }
    }
}

/// Task priority level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::High => f.write_str("high"),
            Self::Medium => f.write_str("medium"),
            Self::Low => f.write_str("low"),
        }
    }
}

impl FromStr for Priority {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "high" => Ok(Self::High),
            "medium" => Ok(Self::Medium),
            "low" => Ok(Self::Low),
            other => Err(crate::Error::Validation(format!(
                "unknown priority: {other}"
            ))),
        }
    }
}

/// A single user task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Unique identifier, assigned at creation and never reused
    pub id: u64,
    /// Title; primary key for voice matching. Non-empty after trimming
    pub title: String,
    /// Optional free-text description
    #[serde(default)]
    pub description: Option<String>,
    /// Completion status (defaults to pending at creation)
    pub status: Status,
    /// Priority (defaults to medium at creation)
    pub priority: Priority,
    /// Optional due date (no time component)
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
}

/// Input for creating a task. Only the title is required
#[derive(Debug, Clone, Default)]
pub struct TaskDraft {
    pub title: String,
    pub description: Option<String>,
    pub priority: Option<Priority>,
    pub due_date: Option<NaiveDate>,
}

impl TaskDraft {
    /// Draft with just a title
    #[must_use]
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }
}

/// Partial-field update for an existing task
///
/// Fields left as `None` are preserved. The task id has no
/// representation here, so it cannot be changed through an update.
#[derive(Debug, Clone, Default)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub status: Option<Status>,
    pub priority: Option<Priority>,
    pub due_date: Option<Option<NaiveDate>>,
}

/// Filter for listing tasks
#[derive(Debug, Clone, Default)]
pub struct TaskFilter {
    /// Case-insensitive title substring
    pub search: Option<String>,
    /// Exact priority match
    pub priority: Option<Priority>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_toggles_both_ways() {
        assert_eq!(Status::Pending.toggled(), Status::Completed);
        assert_eq!(Status::Completed.toggled(), Status::Pending);
    }

    #[test]
    fn priority_parses_case_insensitively() {
        assert_eq!("High".parse::<Priority>().unwrap(), Priority::High);
        assert_eq!(" low ".parse::<Priority>().unwrap(), Priority::Low);
        assert!("urgent".parse::<Priority>().is_err());
    }

    #[test]
    fn task_serializes_with_lowercase_enums() {
        let task = Task {
            id: 1,
            title: "Buy milk".to_string(),
            description: None,
            status: Status::Pending,
            priority: Priority::Medium,
            due_date: None,
        };
        let json = serde_json::to_string(&task).unwrap();
        assert!(json.contains("\"pending\""));
        assert!(json.contains("\"medium\""));

        let back: Task = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id, 1);
        assert_eq!(back.status, Status::Pending);
    }
}
