//! Fuzzy task-reference resolution
//!
//! Matches a spoken fragment against stored task titles. Spoken
//! references are routinely over-specified ("buy groceries today") or
//! under-specified ("groceries"), so containment is checked in both
//! directions after normalization.

use super::normalize;
use crate::task::Task;

/// Find the task a spoken fragment refers to
///
/// A task matches when the normalized title contains the normalized
/// keyword as a substring, or the other way around. The first match in
/// the list's current order wins when several match — a deliberate
/// simplicity trade-off over scored ranking, so callers accept possible
/// ambiguity between near-duplicate titles. An empty or whitespace-only
/// keyword never matches.
#[must_use]
pub fn find_by_keyword<'a>(keyword: &str, tasks: &'a [Task]) -> Option<&'a Task> {
    let keyword = normalize(keyword);
    if keyword.is_empty() {
        return None;
    }

    tasks.iter().find(|task| {
        let title = normalize(&task.title);
        title.contains(&keyword) || keyword.contains(&title)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::{TaskDraft, TaskStore};

    fn store_with(titles: &[&str]) -> TaskStore {
        let mut store = TaskStore::new();
        for title in titles {
            store.add(TaskDraft::titled(*title)).unwrap();
        }
        store
    }

    #[test]
    fn matches_keyword_contained_in_title() {
        let store = store_with(&["Buy groceries", "Buy milk"]);
        let found = find_by_keyword("groceries", store.tasks()).unwrap();
        assert_eq!(found.title, "Buy groceries");
    }

    #[test]
    fn matches_title_contained_in_keyword() {
        let store = store_with(&["Buy milk"]);
        let found = find_by_keyword("buy milk at the corner shop", store.tasks()).unwrap();
        assert_eq!(found.title, "Buy milk");
    }

    #[test]
    fn ambiguity_resolves_to_first_in_store_order() {
        let store = store_with(&["Buy groceries", "Buy milk"]);
        let found = find_by_keyword("buy", store.tasks()).unwrap();
        assert_eq!(found.title, "Buy groceries");
    }

    #[test]
    fn empty_keyword_never_matches() {
        let store = store_with(&["Buy groceries"]);
        assert!(find_by_keyword("", store.tasks()).is_none());
        assert!(find_by_keyword("   ", store.tasks()).is_none());
    }

    #[test]
    fn matching_survives_homophone_drift() {
        // Recognizer hears "by groceries"; stored title is "Buy groceries"
        let store = store_with(&["Buy groceries"]);
        let found = find_by_keyword("by groceries", store.tasks()).unwrap();
        assert_eq!(found.title, "Buy groceries");
    }

    #[test]
    fn no_match_returns_none() {
        let store = store_with(&["Buy groceries"]);
        assert!(find_by_keyword("walk the dog", store.tasks()).is_none());
    }
}
