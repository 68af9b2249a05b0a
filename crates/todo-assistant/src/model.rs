//! Domain Models
//!
//! Tasks as the assistant sees them. Ids are positive integers assigned by
//! the store.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::TaskError;

/// Longest accepted task title, in characters
pub const MAX_TITLE_LEN: usize = 200;

/// Task priority
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

impl Priority {
    pub const ALL: [Self; 4] = [Self::Low, Self::Medium, Self::High, Self::Urgent];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Urgent => "urgent",
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = TaskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" | "normal" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "urgent" => Ok(Self::Urgent),
            other => Err(TaskError::validation(format!(
                "Invalid priority '{other}'. Use one of: low, medium, high, urgent"
            ))),
        }
    }
}

/// Which tasks `list_tasks` returns
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    #[default]
    All,
    Pending,
    Completed,
}

impl StatusFilter {
    pub const fn matches(self, task: &Task) -> bool {
        match self {
            Self::All => true,
            Self::Pending => !task.completed,
            Self::Completed => task.completed,
        }
    }
}

impl FromStr for StatusFilter {
    type Err = TaskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "pending" | "incomplete" | "open" => Ok(Self::Pending),
            "completed" | "complete" | "done" => Ok(Self::Completed),
            other => Err(TaskError::validation(format!(
                "Invalid status '{other}'. Use one of: all, pending, completed"
            ))),
        }
    }
}

/// A user's task
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: u64,
    pub title: String,
    pub description: Option<String>,
    pub priority: Priority,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a task
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub priority: Priority,
}

impl NewTask {
    /// Trimmed, validated task input
    pub fn new(title: &str) -> Result<Self, TaskError> {
        Ok(Self {
            title: clean_title(title)?,
            ..Default::default()
        })
    }

    #[must_use]
    pub fn with_description(mut self, description: Option<&str>) -> Self {
        self.description = clean_description(description);
        self
    }

    #[must_use]
    pub const fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }
}

/// Partial update; `None` leaves a field unchanged
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TaskUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<Priority>,
}

impl TaskUpdate {
    pub const fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.priority.is_none()
    }

    /// Apply to `task`, bumping `updated_at`
    pub fn apply(self, task: &mut Task) {
        if let Some(title) = self.title {
            task.title = title;
        }
        if let Some(description) = self.description {
            task.description = (!description.is_empty()).then_some(description);
        }
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
        task.updated_at = Utc::now();
    }
}

/// Trim a title and reject empty or oversized ones
pub fn clean_title(title: &str) -> Result<String, TaskError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(TaskError::validation("Task title cannot be empty"));
    }
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(TaskError::validation(format!(
            "Task title cannot be longer than {MAX_TITLE_LEN} characters"
        )));
    }
    Ok(title.to_string())
}

fn clean_description(description: Option<&str>) -> Option<String> {
    description
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(ToString::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(completed: bool) -> Task {
        let now = Utc::now();
        Task {
            id: 1,
            title: "Buy groceries".into(),
            description: None,
            priority: Priority::Medium,
            completed,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_priority_parsing() {
        assert_eq!("HIGH".parse::<Priority>().unwrap(), Priority::High);
        assert_eq!(Priority::default(), Priority::Medium);
        let err = "whenever".parse::<Priority>().unwrap_err();
        assert!(err.to_string().contains("low, medium, high, urgent"));
    }

    #[test]
    fn test_status_filter() {
        let open = task(false);
        let done = task(true);
        assert!(StatusFilter::All.matches(&open) && StatusFilter::All.matches(&done));
        assert!(StatusFilter::Pending.matches(&open) && !StatusFilter::Pending.matches(&done));
        assert_eq!("done".parse::<StatusFilter>().unwrap(), StatusFilter::Completed);
    }

    #[test]
    fn test_new_task_validation() {
        let new = NewTask::new("  Buy groceries ").unwrap().with_description(Some("   "));
        assert_eq!(new.title, "Buy groceries");
        assert_eq!(new.description, None);

        assert!(matches!(NewTask::new("   "), Err(TaskError::Validation(_))));
        assert!(NewTask::new(&"x".repeat(MAX_TITLE_LEN + 1)).is_err());
    }

    #[test]
    fn test_task_serializes_lowercase_priority() {
        let value = serde_json::to_value(task(false)).unwrap();
        assert_eq!(value["priority"], "medium");
        assert_eq!(value["completed"], false);
        assert!(value["description"].is_null());
        assert!(value["created_at"].is_string());
    }

    #[test]
    fn test_update_apply() {
        let mut t = task(false);
        let before = t.updated_at;
        TaskUpdate {
            description: Some("milk and eggs".into()),
            priority: Some(Priority::Urgent),
            ..Default::default()
        }
        .apply(&mut t);

        assert_eq!(t.title, "Buy groceries");
        assert_eq!(t.description.as_deref(), Some("milk and eggs"));
        assert_eq!(t.priority, Priority::Urgent);
        assert!(t.updated_at >= before);
        assert!(TaskUpdate::default().is_empty());
    }
}
