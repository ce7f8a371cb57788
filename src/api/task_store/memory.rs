//! In-memory task store (non-persistent).

use super::{StoreError, TaskStore};
use crate::task::{ListFilter, NewTask, Task, TaskId, TaskUpdate};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Default)]
struct Inner {
    tasks: BTreeMap<TaskId, Task>,
    last_id: TaskId,
}

#[derive(Clone, Default)]
pub struct InMemoryTaskStore {
    inner: Arc<RwLock<Inner>>,
}

impl InMemoryTaskStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TaskStore for InMemoryTaskStore {
    fn is_persistent(&self) -> bool {
        false
    }

    async fn list_tasks(&self, filter: ListFilter) -> Result<Vec<Task>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .tasks
            .values()
            .filter(|t| filter.admits(t.completed))
            .cloned()
            .collect())
    }

    async fn get_task(&self, id: TaskId) -> Result<Option<Task>, StoreError> {
        Ok(self.inner.read().await.tasks.get(&id).cloned())
    }

    async fn create_task(&self, task: NewTask) -> Result<Task, StoreError> {
        let mut inner = self.inner.write().await;
        inner.last_id += 1;
        let now = Utc::now();
        let task = Task {
            id: inner.last_id,
            title: task.title,
            description: task.description,
            completed: task.completed,
            priority: task.priority,
            due_date: task.due_date,
            created_at: now,
            updated_at: now,
        };
        inner.tasks.insert(task.id, task.clone());
        Ok(task)
    }

    async fn update_task(
        &self,
        id: TaskId,
        changes: &TaskUpdate,
    ) -> Result<Option<Task>, StoreError> {
        let mut inner = self.inner.write().await;
        let Some(task) = inner.tasks.get_mut(&id) else {
            return Ok(None);
        };
        task.apply(changes);
        task.updated_at = Utc::now();
        Ok(Some(task.clone()))
    }

    async fn delete_task(&self, id: TaskId) -> Result<bool, StoreError> {
        Ok(self.inner.write().await.tasks.remove(&id).is_some())
    }

    async fn count_tasks(&self) -> Result<usize, StoreError> {
        Ok(self.inner.read().await.tasks.len())
    }
}
