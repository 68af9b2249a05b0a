//! Delete Task Tool

use std::sync::Arc;

use agent_core::{AgentContext, Arguments, ToolDefinition, ToolExecutor};
use async_trait::async_trait;
use serde_json::{Value, json};

use super::{task_id_arg, task_id_param};
use crate::store::TaskStore;

pub struct DeleteTaskTool {
    store: Arc<dyn TaskStore>,
}

impl DeleteTaskTool {
    pub const NAME: &'static str = "delete_task";

    pub fn new(store: Arc<dyn TaskStore>) -> Self {
        Self { store }
    }

    pub fn definition() -> ToolDefinition {
        ToolDefinition::new(Self::NAME, "Permanently delete a task.").param(task_id_param("delete"))
    }
}

#[async_trait]
impl ToolExecutor for DeleteTaskTool {
    async fn call(&self, context: &AgentContext, arguments: &Arguments) -> anyhow::Result<Value> {
        let task_id = task_id_arg(arguments)?;
        let task = self.store.delete(&context.user_id, task_id).await?;
        tracing::info!(user_id = %context.user_id, task_id, "Deleted task");

        Ok(json!({
            "id": task.id,
            "title": task.title,
            "deleted": true,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NewTask;
    use crate::store::MemoryTaskStore;
    use agent_core::ToolRegistry;

    #[tokio::test]
    async fn test_delete_task() {
        let store = Arc::new(MemoryTaskStore::new());
        let task = store.create("u", NewTask::new("Meeting notes").unwrap()).await.unwrap();
        let tool = DeleteTaskTool::new(store.clone());
        let registry = ToolRegistry::new(vec![DeleteTaskTool::definition()]).unwrap();
        let ctx = AgentContext::new("u", "", &registry);

        let mut args = Arguments::new();
        args.insert("task_id".into(), json!(task.id.to_string()));
        let result = tool.call(&ctx, &args).await.unwrap();

        assert_eq!(result, json!({"id": task.id, "title": "Meeting notes", "deleted": true}));
        assert!(store.is_empty().await);
        assert!(tool.call(&ctx, &args).await.is_err());
    }
}
