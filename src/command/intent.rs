//! Intent classification over an ordered rule table
//!
//! Rules are data, not a dispatch hierarchy: an ordered list of trigger
//! descriptors checked top to bottom, first match wins. The order is
//! load-bearing — change-priority is checked before add-task so that an
//! utterance like "change buy groceries to high priority" is never
//! misread as task creation, and the reverse swap would change
//! classification for such inputs.

use super::normalize;

/// Command categories the classifier can produce
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntentKind {
    /// "change <task> to <level> priority"
    ChangePriority,
    /// "add task <title>" / "create task <title>"
    AddTask,
    /// "complete <task>" / "finish <task>"
    Complete,
    /// "delete <task>" / "remove <task>"
    Delete,
    /// "go to create" / "new task"
    NavigateCreate,
    /// "go home" / "show tasks"
    NavigateHome,
    /// "help" / "what can you do"
    Help,
    /// No rule matched
    Unknown,
}

/// How a rule's trigger substrings combine
enum Trigger {
    /// Every listed substring must appear in the utterance
    AllOf(&'static [&'static str]),
    /// At least one listed substring must appear
    AnyOf(&'static [&'static str]),
}

impl Trigger {
    /// Triggers are written as spoken and normalized before comparison,
    /// since the utterance has already been through the homophone table
    /// ("go to create" arrives as "go two create").
    fn matches(&self, utterance: &str) -> bool {
        let contains = |w: &&str| utterance.contains(normalize(w).as_str());
        match self {
            Self::AllOf(words) => words.iter().all(contains),
            Self::AnyOf(words) => words.iter().any(contains),
        }
    }
}

/// The rule table, in evaluation order
const RULES: &[(IntentKind, Trigger)] = &[
    (
        IntentKind::ChangePriority,
        Trigger::AllOf(&["change", "priority"]),
    ),
    (
        IntentKind::AddTask,
        Trigger::AnyOf(&["add task", "create task"]),
    ),
    (IntentKind::Complete, Trigger::AnyOf(&["complete", "finish"])),
    (IntentKind::Delete, Trigger::AnyOf(&["delete", "remove"])),
    (
        IntentKind::NavigateCreate,
        Trigger::AnyOf(&["go to create", "new task"]),
    ),
    (
        IntentKind::NavigateHome,
        Trigger::AnyOf(&["go home", "show tasks"]),
    ),
    (
        IntentKind::Help,
        Trigger::AnyOf(&["help", "what can you do"]),
    ),
];

/// Classify a normalized utterance into an intent
///
/// Expects already-normalized text; callers should run
/// [`super::normalize`] first.
#[must_use]
pub fn classify(normalized: &str) -> IntentKind {
    RULES
        .iter()
        .find(|(_, trigger)| trigger.matches(normalized))
        .map_or(IntentKind::Unknown, |(kind, _)| *kind)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_each_rule() {
        assert_eq!(
            classify("change buy milk to high priority"),
            IntentKind::ChangePriority
        );
        assert_eq!(classify("add task buy milk"), IntentKind::AddTask);
        assert_eq!(classify("create task buy milk"), IntentKind::AddTask);
        assert_eq!(classify("complete buy milk"), IntentKind::Complete);
        assert_eq!(classify("finish buy milk"), IntentKind::Complete);
        assert_eq!(classify("delete buy milk"), IntentKind::Delete);
        assert_eq!(classify("remove buy milk"), IntentKind::Delete);
        assert_eq!(classify("go two create"), IntentKind::NavigateCreate);
        assert_eq!(classify("new task"), IntentKind::NavigateCreate);
        assert_eq!(classify("go home"), IntentKind::NavigateHome);
        assert_eq!(classify("show tasks"), IntentKind::NavigateHome);
        assert_eq!(classify("help"), IntentKind::Help);
        assert_eq!(classify("what can you do"), IntentKind::Help);
        assert_eq!(classify("xyzzy"), IntentKind::Unknown);
    }

    #[test]
    fn change_priority_wins_over_add_task() {
        // Contains both the add-task phrase and change+priority words;
        // rule order pins this to change-priority.
        assert_eq!(
            classify("change add task milk to low priority"),
            IntentKind::ChangePriority
        );
    }

    #[test]
    fn triggers_survive_homophone_rewrites() {
        // The homophone table rewrites "to" into "two" before
        // classification; the trigger still fires.
        assert_eq!(
            classify(&normalize("go to create")),
            IntentKind::NavigateCreate
        );
    }

    #[test]
    fn priority_alone_does_not_trigger_change_rule() {
        // "add task ... high priority" lacks the word "change"
        assert_eq!(
            classify("add task call dentist high priority"),
            IntentKind::AddTask
        );
    }
}
