//! List Tasks Tool

use std::sync::Arc;

use agent_core::{AgentContext, Arguments, ParamType, ParameterSchema, ToolDefinition, ToolExecutor};
use async_trait::async_trait;
use serde_json::{Value, json};

use super::string_arg;
use crate::model::StatusFilter;
use crate::store::TaskStore;

/// Lists the user's tasks, optionally filtered by status
pub struct ListTasksTool {
    store: Arc<dyn TaskStore>,
}

impl ListTasksTool {
    pub const NAME: &'static str = "list_tasks";

    pub fn new(store: Arc<dyn TaskStore>) -> Self {
        Self { store }
    }

    pub fn definition() -> ToolDefinition {
        ToolDefinition::new(
            Self::NAME,
            "List the user's tasks. Call this before completing, deleting or updating a task to find its ID.",
        )
        .param(
            ParameterSchema::new("status", ParamType::String, "Which tasks to return")
                .with_enum(["all", "pending", "completed"])
                .with_default(json!("all")),
        )
    }
}

#[async_trait]
impl ToolExecutor for ListTasksTool {
    async fn call(&self, context: &AgentContext, arguments: &Arguments) -> anyhow::Result<Value> {
        let filter = string_arg(arguments, "status")
            .map(str::parse::<StatusFilter>)
            .transpose()?
            .unwrap_or_default();

        let tasks = self.store.list(&context.user_id, filter).await?;
        tracing::debug!(user_id = %context.user_id, count = tasks.len(), ?filter, "Listed tasks");

        Ok(json!({
            "tasks": tasks,
            "count": tasks.len(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NewTask;
    use crate::store::MemoryTaskStore;
    use agent_core::ToolRegistry;

    fn args(value: Value) -> Arguments {
        value.as_object().cloned().unwrap_or_default()
    }

    #[tokio::test]
    async fn test_list_tasks_filters() {
        let store = Arc::new(MemoryTaskStore::new());
        let first = store.create("u", NewTask::new("First").unwrap()).await.unwrap();
        store.create("u", NewTask::new("Second").unwrap()).await.unwrap();
        store.create("someone-else", NewTask::new("Hidden").unwrap()).await.unwrap();
        store.complete("u", first.id).await.unwrap();

        let tool = ListTasksTool::new(store);
        let registry = ToolRegistry::new(vec![ListTasksTool::definition()]).unwrap();
        let ctx = AgentContext::new("u", "", &registry);

        let all = tool.call(&ctx, &Arguments::new()).await.unwrap();
        assert_eq!(all["count"], 2);
        assert_eq!(all["tasks"][0]["title"], "First");

        let pending = tool.call(&ctx, &args(json!({"status": "pending"}))).await.unwrap();
        assert_eq!(pending["count"], 1);
        assert_eq!(pending["tasks"][0]["title"], "Second");

        let null_status = tool.call(&ctx, &args(json!({"status": null}))).await.unwrap();
        assert_eq!(null_status["count"], 2);

        assert!(tool.call(&ctx, &args(json!({"status": "later"}))).await.is_err());
    }
}
