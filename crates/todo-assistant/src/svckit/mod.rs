//! Service Kit - Agent Tools
//!
//! One [`ToolExecutor`](agent_core::ToolExecutor) per task operation. Each
//! tool also publishes its [`ToolDefinition`](agent_core::ToolDefinition) so
//! the registry and the bindings come from the same place.

mod add_task;
mod complete_task;
mod delete_task;
mod list_tasks;
mod update_task;

pub use add_task::AddTaskTool;
pub use complete_task::CompleteTaskTool;
pub use delete_task::DeleteTaskTool;
pub use list_tasks::ListTasksTool;
pub use update_task::UpdateTaskTool;

use agent_core::{Arguments, ParamType, ParameterSchema};
use serde_json::Value;

use crate::error::TaskError;
use crate::model::Task;

/// Shared `task_id` parameter
fn task_id_param(action: &str) -> ParameterSchema {
    ParameterSchema::new(
        "task_id",
        ParamType::Integer,
        format!("The ID of the task to {action}"),
    )
    .required()
}

/// String argument, treating `null` and blanks as absent
fn string_arg<'a>(arguments: &'a Arguments, name: &str) -> Option<&'a str> {
    arguments
        .get(name)
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
}

/// Positive integer id. Models sometimes send `"3"` or `3.0`.
fn task_id_arg(arguments: &Arguments) -> Result<u64, TaskError> {
    let invalid = || TaskError::validation("task_id must be a positive integer");

    let id = match arguments.get("task_id") {
        Some(Value::Number(n)) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0 && *f >= 1.0).map(|f| f as u64)),
        Some(Value::String(s)) => s.trim().parse::<u64>().ok(),
        _ => None,
    };

    id.filter(|id| *id > 0).ok_or_else(invalid)
}

fn task_json(task: &Task) -> anyhow::Result<Value> {
    Ok(serde_json::to_value(task)?)
}
