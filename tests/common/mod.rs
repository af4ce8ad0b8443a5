//! Shared test utilities

use taskvox::{CommandHandler, Priority, TaskDraft, TaskStore};

/// Build an in-memory store with a few known pending tasks
#[must_use]
pub fn sample_store() -> TaskStore {
    let mut store = TaskStore::new();
    store
        .add(TaskDraft::titled("buy groceries"))
        .expect("failed to add task");
    store
        .add(TaskDraft {
            title: "call dentist".to_string(),
            priority: Some(Priority::High),
            ..TaskDraft::default()
        })
        .expect("failed to add task");
    store
        .add(TaskDraft::titled("write report"))
        .expect("failed to add task");
    store
}

/// Handler over the sample store
#[must_use]
pub fn sample_handler() -> CommandHandler {
    CommandHandler::new(sample_store())
}
