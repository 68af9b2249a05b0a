//! Complete Task Tool

use std::sync::Arc;

use agent_core::{AgentContext, Arguments, ToolDefinition, ToolExecutor};
use async_trait::async_trait;
use serde_json::Value;

use super::{task_id_arg, task_id_param, task_json};
use crate::store::TaskStore;

pub struct CompleteTaskTool {
    store: Arc<dyn TaskStore>,
}

impl CompleteTaskTool {
    pub const NAME: &'static str = "complete_task";

    pub fn new(store: Arc<dyn TaskStore>) -> Self {
        Self { store }
    }

    pub fn definition() -> ToolDefinition {
        ToolDefinition::new(Self::NAME, "Mark a task as completed.").param(task_id_param("complete"))
    }
}

#[async_trait]
impl ToolExecutor for CompleteTaskTool {
    async fn call(&self, context: &AgentContext, arguments: &Arguments) -> anyhow::Result<Value> {
        let task_id = task_id_arg(arguments)?;
        let task = self.store.complete(&context.user_id, task_id).await?;
        tracing::info!(user_id = %context.user_id, task_id, "Completed task");
        task_json(&task)
    }
}
