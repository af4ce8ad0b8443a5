//! Intent execution against the task store
//!
//! One call to [`CommandHandler::handle`] processes one utterance:
//! normalize, classify, extract parameters, resolve the target task,
//! apply at most one store mutation, and produce the spoken response.
//! No error escapes this boundary — every store or matcher failure is
//! converted into a response string.

use std::sync::LazyLock;

use regex::Regex;

use super::{IntentKind, classify, find_by_keyword, normalize};
use crate::task::{Priority, Status, TaskDraft, TaskPatch, TaskStore};

/// Parameter pattern for the change-priority rule
///
/// Runs on normalized text, where homophone correction has already
/// rewritten "to" into "two"; the alternation accepts both so raw text
/// matches as well.
static CHANGE_PRIORITY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"change (.*?) (?:to|two) (high|medium|low) priority").expect("valid pattern")
});

/// Navigation signal for the rendering layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    /// Open the create-task view
    Create,
    /// Return to the task list view
    Home,
}

/// Result of processing one utterance
#[derive(Debug, Clone)]
pub struct CommandOutcome {
    /// Which rule fired
    pub intent: IntentKind,
    /// Text to speak back; empty means nothing is spoken
    pub response: String,
    /// Navigation signal for the rendering layer, if any
    pub navigation: Option<Navigation>,
}

impl CommandOutcome {
    fn spoken(intent: IntentKind, response: impl Into<String>) -> Self {
        Self {
            intent,
            response: response.into(),
            navigation: None,
        }
    }

    fn navigate(intent: IntentKind, response: impl Into<String>, target: Navigation) -> Self {
        Self {
            intent,
            response: response.into(),
            navigation: Some(target),
        }
    }
}

/// Classifies utterances and executes them against the owned task store
pub struct CommandHandler {
    store: TaskStore,
}

impl CommandHandler {
    /// Wrap a task store for command execution
    #[must_use]
    pub fn new(store: TaskStore) -> Self {
        Self { store }
    }

    /// Read access to the underlying store
    #[must_use]
    pub fn store(&self) -> &TaskStore {
        &self.store
    }

    /// Mutable access for the form-based CRUD path, which bypasses the
    /// voice pipeline entirely
    pub fn store_mut(&mut self) -> &mut TaskStore {
        &mut self.store
    }

    /// Process one raw utterance
    ///
    /// Applies zero or one store mutation and always returns an outcome;
    /// an unrecognized command is the fallback branch, not an error.
    pub fn handle(&mut self, raw: &str) -> CommandOutcome {
        let utterance = normalize(raw);
        let intent = classify(&utterance);
        tracing::debug!(%utterance, ?intent, "utterance classified");

        match intent {
            IntentKind::ChangePriority => self.change_priority(&utterance),
            IntentKind::AddTask => self.add_task(&utterance),
            IntentKind::Complete => self.complete_task(&utterance),
            IntentKind::Delete => self.delete_task(&utterance),
            IntentKind::NavigateCreate => CommandOutcome::navigate(
                intent,
                "Opening create task form",
                Navigation::Create,
            ),
            IntentKind::NavigateHome => {
                CommandOutcome::navigate(intent, "Showing all tasks", Navigation::Home)
            }
            IntentKind::Help => CommandOutcome::spoken(
                intent,
                "You can say commands like: Add task, Complete task, Delete task, \
                 Change task priority, or Go home",
            ),
            IntentKind::Unknown => CommandOutcome::spoken(
                intent,
                "Sorry, I didn't understand that command. Try saying Help for a list of commands",
            ),
        }
    }

    fn change_priority(&mut self, utterance: &str) -> CommandOutcome {
        let Some(caps) = CHANGE_PRIORITY_RE.captures(utterance) else {
            return CommandOutcome::spoken(
                IntentKind::ChangePriority,
                "Please specify both the task name and the new priority (high, medium, or low)",
            );
        };

        let fragment = &caps[1];
        // The alternation only admits the three valid levels
        let Ok(priority) = caps[2].parse::<Priority>() else {
            return CommandOutcome::spoken(
                IntentKind::ChangePriority,
                "Please specify both the task name and the new priority (high, medium, or low)",
            );
        };

        let Some(id) = find_by_keyword(fragment, self.store.tasks()).map(|t| t.id) else {
            return CommandOutcome::spoken(
                IntentKind::ChangePriority,
                format!("Sorry, I couldn't find a task matching: {fragment}"),
            );
        };

        let patch = TaskPatch {
            priority: Some(priority),
            ..TaskPatch::default()
        };
        match self.store.update(id, patch) {
            Ok(task) => CommandOutcome::spoken(
                IntentKind::ChangePriority,
                format!("Changed {} to {priority} priority", task.title),
            ),
            Err(e) => CommandOutcome::spoken(
                IntentKind::ChangePriority,
                format!("Sorry, I couldn't update that task: {e}"),
            ),
        }
    }

    fn add_task(&mut self, utterance: &str) -> CommandOutcome {
        let title = strip_first(utterance, &["add task", "create task"]);
        if title.is_empty() {
            // Nothing after the trigger phrase: no task, nothing spoken
            return CommandOutcome::spoken(IntentKind::AddTask, "");
        }

        // Priority is inferred from the utterance; the phrase stays in
        // the title.
        let priority = if utterance.contains("high priority") {
            Priority::High
        } else if utterance.contains("low priority") {
            Priority::Low
        } else {
            Priority::Medium
        };

        let draft = TaskDraft {
            title,
            priority: Some(priority),
            ..TaskDraft::default()
        };
        match self.store.add(draft) {
            Ok(task) => CommandOutcome::spoken(
                IntentKind::AddTask,
                format!("Added task: {}", task.title),
            ),
            Err(e) => CommandOutcome::spoken(
                IntentKind::AddTask,
                format!("Sorry, I couldn't add that task: {e}"),
            ),
        }
    }

    fn complete_task(&mut self, utterance: &str) -> CommandOutcome {
        let fragment = strip_first(utterance, &["complete", "finish"]);
        let found = find_by_keyword(&fragment, self.store.tasks()).map(|t| (t.id, t.status));

        match found {
            Some((id, Status::Pending)) => match self.store.toggle_status(id) {
                Ok(task) => CommandOutcome::spoken(
                    IntentKind::Complete,
                    format!("Completed task: {}", task.title),
                ),
                Err(e) => CommandOutcome::spoken(
                    IntentKind::Complete,
                    format!("Sorry, I couldn't complete that task: {e}"),
                ),
            },
            Some((_, Status::Completed)) => {
                CommandOutcome::spoken(IntentKind::Complete, "That task is already completed")
            }
            None => CommandOutcome::spoken(
                IntentKind::Complete,
                format!("Sorry, I couldn't find a pending task matching: {fragment}"),
            ),
        }
    }

    fn delete_task(&mut self, utterance: &str) -> CommandOutcome {
        let fragment = strip_first(utterance, &["delete", "remove"]);
        let Some(id) = find_by_keyword(&fragment, self.store.tasks()).map(|t| t.id) else {
            return CommandOutcome::spoken(
                IntentKind::Delete,
                format!("Sorry, I couldn't find a task matching: {fragment}"),
            );
        };

        let title = self
            .store
            .get(id)
            .map(|t| t.title.clone())
            .unwrap_or_default();
        match self.store.delete(id) {
            Ok(()) => CommandOutcome::spoken(
                IntentKind::Delete,
                format!("Deleted task: {title}"),
            ),
            Err(e) => CommandOutcome::spoken(
                IntentKind::Delete,
                format!("Sorry, I couldn't delete that task: {e}"),
            ),
        }
    }
}

/// Remove the earliest occurrence of any trigger phrase and trim
///
/// Only the first occurrence goes; the leftmost match across all phrases
/// wins, with table order breaking position ties.
fn strip_first(text: &str, phrases: &[&str]) -> String {
    let earliest = phrases
        .iter()
        .filter_map(|p| text.find(p).map(|pos| (pos, *p)))
        .min_by_key(|(pos, _)| *pos);

    match earliest {
        Some((pos, phrase)) => {
            let mut stripped = String::with_capacity(text.len() - phrase.len());
            stripped.push_str(&text[..pos]);
            stripped.push_str(&text[pos + phrase.len()..]);
            stripped.trim().to_string()
        }
        None => text.trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strip_first_removes_only_earliest_occurrence() {
        assert_eq!(strip_first("complete buy milk", &["complete", "finish"]), "buy milk");
        assert_eq!(
            strip_first("finish the complete report", &["complete", "finish"]),
            "the complete report"
        );
        assert_eq!(strip_first("buy milk", &["complete", "finish"]), "buy milk");
    }

    #[test]
    fn strip_first_prefers_leftmost_phrase() {
        assert_eq!(
            strip_first("create task then add task", &["add task", "create task"]),
            "then add task"
        );
    }

    #[test]
    fn change_priority_pattern_extracts_fragment_and_level() {
        let caps = CHANGE_PRIORITY_RE
            .captures("change buy groceries to high priority")
            .unwrap();
        assert_eq!(&caps[1], "buy groceries");
        assert_eq!(&caps[2], "high");
    }

    #[test]
    fn change_priority_pattern_accepts_normalized_connective() {
        // normalize() rewrites "to" into "two" before the pattern runs
        let caps = CHANGE_PRIORITY_RE
            .captures("change buy groceries two high priority")
            .unwrap();
        assert_eq!(&caps[1], "buy groceries");
        assert_eq!(&caps[2], "high");
    }

    #[test]
    fn change_priority_pattern_rejects_missing_level() {
        assert!(CHANGE_PRIORITY_RE.captures("change buy groceries priority").is_none());
        assert!(CHANGE_PRIORITY_RE
            .captures("change buy groceries to urgent priority")
            .is_none());
    }
}
