//! Add Task Tool

use std::sync::Arc;

use agent_core::{AgentContext, Arguments, ParamType, ParameterSchema, ToolDefinition, ToolExecutor};
use async_trait::async_trait;
use serde_json::{Value, json};

use super::{string_arg, task_json};
use crate::model::{NewTask, Priority};
use crate::store::TaskStore;

/// Creates a task for the conversation's user
pub struct AddTaskTool {
    store: Arc<dyn TaskStore>,
}

impl AddTaskTool {
    pub const NAME: &'static str = "add_task";

    pub fn new(store: Arc<dyn TaskStore>) -> Self {
        Self { store }
    }

    pub fn definition() -> ToolDefinition {
        ToolDefinition::new(
            Self::NAME,
            "Create a new task for the user. Use this when the user describes something they need to do.",
        )
        .param(
            ParameterSchema::new("title", ParamType::String, "Short title of the task (e.g. 'Buy groceries')")
                .required(),
        )
        .param(ParameterSchema::new(
            "description",
            ParamType::String,
            "Optional longer description or notes",
        ))
        .param(
            ParameterSchema::new("priority", ParamType::String, "Task priority")
                .with_enum(Priority::ALL.map(Priority::as_str))
                .with_default(json!(Priority::default().as_str())),
        )
    }
}

#[async_trait]
impl ToolExecutor for AddTaskTool {
    async fn call(&self, context: &AgentContext, arguments: &Arguments) -> anyhow::Result<Value> {
        let priority = string_arg(arguments, "priority")
            .map(str::parse::<Priority>)
            .transpose()?
            .unwrap_or_default();

        let new = NewTask::new(string_arg(arguments, "title").unwrap_or_default())?
            .with_description(string_arg(arguments, "description"))
            .with_priority(priority);

        let task = self.store.create(&context.user_id, new).await?;
        tracing::info!(user_id = %context.user_id, task_id = task.id, "Added task");
        task_json(&task)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryTaskStore;
    use agent_core::ToolRegistry;

    fn setup() -> (Arc<MemoryTaskStore>, AddTaskTool, AgentContext) {
        let store = Arc::new(MemoryTaskStore::new());
        let tool = AddTaskTool::new(store.clone());
        let registry = ToolRegistry::new(vec![AddTaskTool::definition()]).unwrap();
        (store, tool, AgentContext::new("user-1", "", &registry))
    }

    fn args(value: Value) -> Arguments {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn test_definition() {
        let def = AddTaskTool::definition();
        assert_eq!(def.required_names(), vec!["title"]);
        let priority = def.parameter("priority").unwrap();
        assert_eq!(priority.default, Some(json!("medium")));
        assert_eq!(priority.enum_values.as_ref().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_add_task_defaults() {
        let (store, tool, ctx) = setup();
        let result = tool.call(&ctx, &args(json!({"title": "Buy groceries"}))).await.unwrap();

        assert_eq!(result["id"], 1);
        assert_eq!(result["title"], "Buy groceries");
        assert_eq!(result["priority"], "medium");
        assert_eq!(result["completed"], false);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_add_task_with_details() {
        let (_store, tool, ctx) = setup();
        let result = tool
            .call(
                &ctx,
                &args(json!({"title": "Report", "description": "Q3 numbers", "priority": "urgent"})),
            )
            .await
            .unwrap();

        assert_eq!(result["description"], "Q3 numbers");
        assert_eq!(result["priority"], "urgent");
    }

    #[tokio::test]
    async fn test_add_task_rejects_bad_input() {
        let (store, tool, ctx) = setup();

        let err = tool.call(&ctx, &args(json!({"title": "   "}))).await.unwrap_err();
        assert_eq!(err.to_string(), "Task title cannot be empty");

        let err = tool
            .call(&ctx, &args(json!({"title": "x", "priority": "someday"})))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Invalid priority"));
        assert!(store.is_empty().await);
    }
}
