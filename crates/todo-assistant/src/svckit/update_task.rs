//! Update Task Tool

use std::sync::Arc;

use agent_core::{AgentContext, Arguments, ParamType, ParameterSchema, ToolDefinition, ToolExecutor};
use async_trait::async_trait;
use serde_json::Value;

use super::{string_arg, task_id_arg, task_id_param, task_json};
use crate::error::TaskError;
use crate::model::{Priority, TaskUpdate, clean_title};
use crate::store::TaskStore;

pub struct UpdateTaskTool {
    store: Arc<dyn TaskStore>,
}

impl UpdateTaskTool {
    pub const NAME: &'static str = "update_task";

    pub fn new(store: Arc<dyn TaskStore>) -> Self {
        Self { store }
    }

    pub fn definition() -> ToolDefinition {
        ToolDefinition::new(
            Self::NAME,
            "Change a task's title, description or priority. Only the given fields are changed.",
        )
        .param(task_id_param("update"))
        .param(ParameterSchema::new("title", ParamType::String, "New title"))
        .param(ParameterSchema::new("description", ParamType::String, "New description"))
        .param(
            ParameterSchema::new("priority", ParamType::String, "New priority")
                .with_enum(Priority::ALL.map(Priority::as_str)),
        )
    }
}

#[async_trait]
impl ToolExecutor for UpdateTaskTool {
    async fn call(&self, context: &AgentContext, arguments: &Arguments) -> anyhow::Result<Value> {
        let task_id = task_id_arg(arguments)?;

        let changes = TaskUpdate {
            title: string_arg(arguments, "title").map(clean_title).transpose()?,
            description: string_arg(arguments, "description").map(|d| d.trim().to_string()),
            priority: string_arg(arguments, "priority")
                .map(str::parse::<Priority>)
                .transpose()?,
        };

        if changes.is_empty() {
            return Err(TaskError::validation("Nothing to update: provide a title, description or priority").into());
        }

        let task = self.store.update(&context.user_id, task_id, changes).await?;
        tracing::info!(user_id = %context.user_id, task_id, "Updated task");
        task_json(&task)
    }
}
