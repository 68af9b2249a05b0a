//! In-memory Task Store
//!
//! For tests and the CLI. Ids come from one counter shared by all users.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::TaskStore;
use crate::error::{Result, TaskError};
use crate::model::{NewTask, StatusFilter, Task, TaskUpdate};

/// Per-user task lists behind a lock
pub struct MemoryTaskStore {
    tasks: RwLock<HashMap<String, Vec<Task>>>,
    next_id: AtomicU64,
}

impl Default for MemoryTaskStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryTaskStore {
    pub fn new() -> Self {
        Self {
            tasks: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Total tasks across all users
    pub async fn len(&self) -> usize {
        self.tasks.read().await.values().map(Vec::len).sum()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    async fn modify<F>(&self, user_id: &str, task_id: u64, f: F) -> Result<Task>
    where
        F: FnOnce(&mut Task) + Send,
    {
        let mut tasks = self.tasks.write().await;
        let task = tasks
            .get_mut(user_id)
            .and_then(|list| list.iter_mut().find(|t| t.id == task_id))
            .ok_or(TaskError::NotFound(task_id))?;
        f(task);
        Ok(task.clone())
    }
}

#[async_trait]
impl TaskStore for MemoryTaskStore {
    async fn create(&self, user_id: &str, task: NewTask) -> Result<Task> {
        let now = Utc::now();
        let task = Task {
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            title: task.title,
            description: task.description,
            priority: task.priority,
            completed: false,
            created_at: now,
            updated_at: now,
        };

        self.tasks
            .write()
            .await
            .entry(user_id.to_string())
            .or_default()
            .push(task.clone());

        tracing::debug!(user_id = %user_id, task_id = task.id, "Task created");
        Ok(task)
    }

    async fn list(&self, user_id: &str, filter: StatusFilter) -> Result<Vec<Task>> {
        Ok(self
            .tasks
            .read()
            .await
            .get(user_id)
            .map(|list| list.iter().filter(|t| filter.matches(t)).cloned().collect())
            .unwrap_or_default())
    }

    async fn get(&self, user_id: &str, task_id: u64) -> Result<Task> {
        self.tasks
            .read()
            .await
            .get(user_id)
            .and_then(|list| list.iter().find(|t| t.id == task_id))
            .cloned()
            .ok_or(TaskError::NotFound(task_id))
    }

    async fn update(&self, user_id: &str, task_id: u64, changes: TaskUpdate) -> Result<Task> {
        self.modify(user_id, task_id, |task| changes.apply(task)).await
    }

    async fn complete(&self, user_id: &str, task_id: u64) -> Result<Task> {
        self.modify(user_id, task_id, |task| {
            if !task.completed {
                task.completed = true;
                task.updated_at = Utc::now();
            }
        })
        .await
    }

    async fn delete(&self, user_id: &str, task_id: u64) -> Result<Task> {
        let mut tasks = self.tasks.write().await;
        let list = tasks.get_mut(user_id).ok_or(TaskError::NotFound(task_id))?;
        let index = list
            .iter()
            .position(|t| t.id == task_id)
            .ok_or(TaskError::NotFound(task_id))?;

        tracing::debug!(user_id = %user_id, task_id, "Task deleted");
        Ok(list.remove(index))
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Priority;

    #[tokio::test]
    async fn test_create_assigns_sequential_ids() {
        let store = MemoryTaskStore::new();
        let a = store.create("alice", NewTask::new("One").unwrap()).await.unwrap();
        let b = store.create("bob", NewTask::new("Two").unwrap()).await.unwrap();
        let c = store.create("alice", NewTask::new("Three").unwrap()).await.unwrap();

        assert_eq!((a.id, b.id, c.id), (1, 2, 3));
        assert_eq!(store.name(), "memory");
        assert!(!a.completed);
        assert_eq!(store.len().await, 3);
    }

    #[tokio::test]
    async fn test_users_are_isolated() {
        let store = MemoryTaskStore::new();
        let task = store.create("alice", NewTask::new("Private").unwrap()).await.unwrap();

        assert!(store.list("bob", StatusFilter::All).await.unwrap().is_empty());
        assert_eq!(store.get("bob", task.id).await, Err(TaskError::NotFound(task.id)));
        assert_eq!(store.delete("bob", task.id).await, Err(TaskError::NotFound(task.id)));
        assert_eq!(store.complete("bob", task.id).await, Err(TaskError::NotFound(task.id)));
        assert!(!store.get("alice", task.id).await.unwrap().completed);
    }

    #[tokio::test]
    async fn test_complete_and_filter() {
        let store = MemoryTaskStore::new();
        let first = store.create("u", NewTask::new("First").unwrap()).await.unwrap();
        store.create("u", NewTask::new("Second").unwrap()).await.unwrap();

        let done = store.complete("u", first.id).await.unwrap();
        assert!(done.completed);
        let again = store.complete("u", first.id).await.unwrap();
        assert_eq!(again.updated_at, done.updated_at);

        let pending = store.list("u", StatusFilter::Pending).await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].title, "Second");
        assert_eq!(store.list("u", StatusFilter::Completed).await.unwrap().len(), 1);
        assert_eq!(store.list("u", StatusFilter::All).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let store = MemoryTaskStore::new();
        let task = store.create("u", NewTask::new("Report").unwrap()).await.unwrap();

        let updated = store
            .update(
                "u",
                task.id,
                TaskUpdate {
                    priority: Some(Priority::High),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.priority, Priority::High);
        assert_eq!(updated.title, "Report");

        let removed = store.delete("u", task.id).await.unwrap();
        assert_eq!(removed.id, task.id);
        assert!(store.is_empty().await);
        assert_eq!(store.delete("u", task.id).await, Err(TaskError::NotFound(task.id)));
    }
}
