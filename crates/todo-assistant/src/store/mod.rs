//! Task Storage
//!
//! The tools only talk to [`TaskStore`]; persistence lives behind it.

mod memory;

pub use memory::MemoryTaskStore;

use async_trait::async_trait;

use crate::error::Result;
use crate::model::{NewTask, StatusFilter, Task, TaskUpdate};

/// Task storage trait (Strategy pattern)
///
/// Every operation is scoped to one user. A task owned by someone else is
/// reported as [`TaskError::NotFound`](crate::TaskError::NotFound).
#[async_trait]
pub trait TaskStore: Send + Sync {
    async fn create(&self, user_id: &str, task: NewTask) -> Result<Task>;

    /// Tasks matching `filter`, oldest first
    async fn list(&self, user_id: &str, filter: StatusFilter) -> Result<Vec<Task>>;

    async fn get(&self, user_id: &str, task_id: u64) -> Result<Task>;

    async fn update(&self, user_id: &str, task_id: u64, changes: TaskUpdate) -> Result<Task>;

    /// Mark done. Completing a completed task is not an error.
    async fn complete(&self, user_id: &str, task_id: u64) -> Result<Task>;

    /// Remove and return the task
    async fn delete(&self, user_id: &str, task_id: u64) -> Result<Task>;

    /// Store name for logs
    fn name(&self) -> &str;
}
