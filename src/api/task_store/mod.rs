//! Task storage module with pluggable backends.
//!
//! Supports:
//! - `memory`: In-memory storage (non-persistent, for testing)
//! - `sqlite`: SQLite database file

mod memory;
mod sqlite;

pub use memory::InMemoryTaskStore;
pub use sqlite::SqliteTaskStore;

use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;

use crate::task::{ListFilter, NewTask, Task, TaskId, TaskUpdate};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Background task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid stored value for {field}: {value}")]
    InvalidValue { field: &'static str, value: String },
}

/// Task store trait - implemented by all storage backends.
///
/// # Invariants
/// - ids are assigned in increasing order starting at 1 and never reused
/// - `list_tasks` returns tasks in id order
/// - every successful update bumps `updated_at`
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Whether this store persists data across restarts.
    fn is_persistent(&self) -> bool;

    /// List tasks passing `filter`, ordered by id.
    async fn list_tasks(&self, filter: ListFilter) -> Result<Vec<Task>, StoreError>;

    /// Get a single task by id.
    async fn get_task(&self, id: TaskId) -> Result<Option<Task>, StoreError>;

    /// Create a new task.
    async fn create_task(&self, task: NewTask) -> Result<Task, StoreError>;

    /// Apply a partial update. Returns `None` if the id does not exist.
    async fn update_task(&self, id: TaskId, changes: &TaskUpdate)
        -> Result<Option<Task>, StoreError>;

    /// Delete a task. Returns whether it existed.
    async fn delete_task(&self, id: TaskId) -> Result<bool, StoreError>;

    /// Number of stored tasks.
    async fn count_tasks(&self) -> Result<usize, StoreError> {
        Ok(self.list_tasks(ListFilter::All).await?.len())
    }
}

/// Task store type selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TaskStoreType {
    Memory,
    #[default]
    Sqlite,
}

impl TaskStoreType {
    /// Parse from environment variable value.
    pub fn from_str(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "memory" => Self::Memory,
            "sqlite" | "db" => Self::Sqlite,
            _ => Self::default(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Memory => "memory",
            Self::Sqlite => "sqlite",
        }
    }
}

/// Create a task store based on type and configuration.
pub async fn create_task_store(
    store_type: TaskStoreType,
    database_path: PathBuf,
) -> Result<Box<dyn TaskStore>, StoreError> {
    match store_type {
        TaskStoreType::Memory => Ok(Box::new(InMemoryTaskStore::new())),
        TaskStoreType::Sqlite => {
            let store = SqliteTaskStore::new(database_path).await?;
            Ok(Box::new(store))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::Priority;

    /// Runs the same behavioral checks against any backend.
    async fn exercise_store(store: &dyn TaskStore) {
        let first = store
            .create_task(NewTask::new("Buy groceries").with_priority(Priority::High))
            .await
            .expect("create first");
        let second = store
            .create_task(NewTask::new("Call dentist"))
            .await
            .expect("create second");

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert_eq!(first.priority, Priority::High);
        assert_eq!(second.priority, Priority::Medium);
        assert!(!second.completed);

        let updated = store
            .update_task(second.id, &TaskUpdate::complete())
            .await
            .expect("update")
            .expect("task exists");
        assert!(updated.completed);
        assert!(updated.updated_at >= second.updated_at);
        assert_eq!(updated.title, "Call dentist");

        let pending = store.list_tasks(ListFilter::Pending).await.unwrap();
        assert_eq!(pending.iter().map(|t| t.id).collect::<Vec<_>>(), vec![1]);
        let completed = store.list_tasks(ListFilter::Completed).await.unwrap();
        assert_eq!(completed.iter().map(|t| t.id).collect::<Vec<_>>(), vec![2]);
        assert_eq!(store.count_tasks().await.unwrap(), 2);

        assert!(store
            .update_task(99, &TaskUpdate::complete())
            .await
            .unwrap()
            .is_none());

        assert!(store.delete_task(first.id).await.unwrap());
        assert!(!store.delete_task(first.id).await.unwrap());
        assert!(store.get_task(first.id).await.unwrap().is_none());

        // Ids are not reused after a delete.
        let third = store.create_task(NewTask::new("Exercise")).await.unwrap();
        assert_eq!(third.id, 3);
    }

    #[tokio::test]
    async fn test_memory_store_behavior() {
        let store = InMemoryTaskStore::new();
        assert!(!store.is_persistent());
        exercise_store(&store).await;
    }

    #[tokio::test]
    async fn test_sqlite_store_behavior() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = SqliteTaskStore::new(dir.path().join("todos.db"))
            .await
            .expect("open sqlite");
        assert!(store.is_persistent());
        exercise_store(&store).await;
    }

    #[test]
    fn test_store_type_parse() {
        assert_eq!(TaskStoreType::from_str("memory"), TaskStoreType::Memory);
        assert_eq!(TaskStoreType::from_str("DB"), TaskStoreType::Sqlite);
        assert_eq!(TaskStoreType::from_str("bogus"), TaskStoreType::Sqlite);
    }
}
