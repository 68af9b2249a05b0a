//! Error Types for the Task Domain

use thiserror::Error;

pub type Result<T> = std::result::Result<T, TaskError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TaskError {
    #[error("Task {0} not found")]
    NotFound(u64),

    #[error("{0}")]
    Validation(String),
}

impl TaskError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}
