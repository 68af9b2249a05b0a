//! Tool Executor Dispatch
//!
//! Maps tool names to executors and runs them. This is the containment
//! boundary: [`Dispatch::execute`] always returns a [`ToolCallRecord`], turning
//! unknown tools, invalid arguments, executor errors and executor panics into
//! an `{"error": ...}` result the model can react to.

use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use async_trait::async_trait;
use futures::FutureExt;
use serde_json::Value;

use crate::context::AgentContext;
use crate::error::{AgentError, Result};
use crate::tool::{Arguments, ToolCallRecord, ToolInvocation, ToolRegistry};

/// Performs the actual operation behind one tool name.
///
/// Given the conversation context and validated arguments, perform the
/// operation and return a JSON-serializable summary, or fail with any error.
#[async_trait]
pub trait ToolExecutor: Send + Sync {
    async fn call(&self, context: &AgentContext, arguments: &Arguments) -> anyhow::Result<Value>;
}

/// Name → executor lookup over an immutable registry
pub struct Dispatch {
    registry: Arc<ToolRegistry>,
    executors: HashMap<String, Arc<dyn ToolExecutor>>,
}

impl Dispatch {
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self {
            registry,
            executors: HashMap::new(),
        }
    }

    /// Bind an executor to a registered tool name
    pub fn register<E: ToolExecutor + 'static>(&mut self, name: &str, executor: E) -> Result<()> {
        self.register_arc(name, Arc::new(executor))
    }

    /// Bind a shared executor to a registered tool name
    pub fn register_arc(&mut self, name: &str, executor: Arc<dyn ToolExecutor>) -> Result<()> {
        self.registry.get_tool(name)?;
        self.executors.insert(name.to_string(), executor);
        Ok(())
    }

    /// The registry this dispatch serves
    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Executor bound to `name`, if any
    pub fn resolve(&self, name: &str) -> Option<Arc<dyn ToolExecutor>> {
        self.executors.get(name).cloned()
    }

    /// Registered tools that have no executor bound
    pub fn unbound(&self) -> Vec<&str> {
        self.registry
            .names()
            .into_iter()
            .filter(|name| !self.executors.contains_key(*name))
            .collect()
    }

    /// Execute one invocation. Never fails.
    pub async fn execute(&self, context: &AgentContext, invocation: &ToolInvocation) -> ToolCallRecord {
        let name = invocation.name.as_str();
        let params = invocation.arguments.clone();

        let definition = match self.registry.get_tool(name) {
            Ok(definition) => definition,
            Err(err) => {
                tracing::warn!(tool = %name, "Model requested an unknown tool");
                return ToolCallRecord::failure(name, params, err.to_string());
            }
        };

        let Some(executor) = self.resolve(name) else {
            tracing::warn!(tool = %name, "No executor bound");
            return ToolCallRecord::failure(name, params, format!("Tool {name} not implemented"));
        };

        if let Err(err) = definition.validate(&params) {
            let message = match err {
                AgentError::ToolValidation(msg) => msg,
                other => other.to_string(),
            };
            tracing::warn!(tool = %name, error = %message, "Rejected tool arguments");
            return ToolCallRecord::failure(name, params, message);
        }

        tracing::debug!(tool = %name, id = %invocation.id, "Executing tool");

        let outcome = AssertUnwindSafe(executor.call(context, &params))
            .catch_unwind()
            .await;

        match outcome {
            Ok(Ok(result)) => {
                tracing::info!(tool = %name, "Tool executed successfully");
                ToolCallRecord::success(name, params, result)
            }
            Ok(Err(err)) => {
                let message = err.to_string();
                tracing::warn!(tool = %name, error = %AgentError::from(err), "Tool execution failed");
                ToolCallRecord::failure(name, params, message)
            }
            Err(panic) => {
                let detail = panic
                    .downcast_ref::<&str>()
                    .map(ToString::to_string)
                    .or_else(|| panic.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".into());
                tracing::error!(tool = %name, panic = %detail, "Tool executor panicked");
                ToolCallRecord::failure(name, params, format!("Tool {name} failed: {detail}"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tool::{ParamType, ParameterSchema, ToolDefinition};
    use serde_json::json;

    struct Echo;

    #[async_trait]
    impl ToolExecutor for Echo {
        async fn call(&self, context: &AgentContext, arguments: &Arguments) -> anyhow::Result<Value> {
            Ok(json!({ "user": context.user_id, "args": arguments }))
        }
    }

    struct Failing;

    #[async_trait]
    impl ToolExecutor for Failing {
        async fn call(&self, _: &AgentContext, _: &Arguments) -> anyhow::Result<Value> {
            anyhow::bail!("Task 7 not found")
        }
    }

    struct Panicking;

    #[async_trait]
    impl ToolExecutor for Panicking {
        async fn call(&self, _: &AgentContext, _: &Arguments) -> anyhow::Result<Value> {
            panic!("boom")
        }
    }

    fn setup() -> (Dispatch, AgentContext) {
        let registry = Arc::new(
            ToolRegistry::new(vec![
                ToolDefinition::new("echo", "Echo").param(
                    ParameterSchema::new("text", ParamType::String, "Text").required(),
                ),
                ToolDefinition::new("fail", "Always fails"),
                ToolDefinition::new("explode", "Panics"),
                ToolDefinition::new("unbound", "No executor"),
            ])
            .unwrap(),
        );
        let ctx = AgentContext::new("user-1", "", &registry);
        let mut dispatch = Dispatch::new(registry);
        dispatch.register("echo", Echo).unwrap();
        dispatch.register("fail", Failing).unwrap();
        dispatch.register("explode", Panicking).unwrap();
        (dispatch, ctx)
    }

    fn invocation(name: &str, args: Value) -> ToolInvocation {
        ToolInvocation::new("call_1", name, crate::tool::arguments_from_value(args))
    }

    #[test]
    fn test_register_requires_known_tool() {
        let (mut dispatch, _) = setup();
        assert!(matches!(
            dispatch.register("nope", Echo),
            Err(AgentError::UnknownTool(_))
        ));
        assert_eq!(dispatch.unbound(), vec!["unbound"]);
        assert!(dispatch.resolve("echo").is_some());
        assert!(dispatch.resolve("unbound").is_none());
    }

    #[tokio::test]
    async fn test_execute_success() {
        let (dispatch, ctx) = setup();
        let record = dispatch.execute(&ctx, &invocation("echo", json!({"text": "hi"}))).await;
        assert!(!record.is_error());
        assert_eq!(record.tool_name, "echo");
        assert_eq!(record.result["user"], "user-1");
        assert_eq!(record.parameters.get("text"), Some(&json!("hi")));
    }

    #[tokio::test]
    async fn test_unknown_and_unbound_tools() {
        let (dispatch, ctx) = setup();

        let record = dispatch.execute(&ctx, &invocation("nope", json!({}))).await;
        assert_eq!(record.error(), Some("Unknown tool: nope"));

        let record = dispatch.execute(&ctx, &invocation("unbound", json!({}))).await;
        assert_eq!(record.error(), Some("Tool unbound not implemented"));
    }

    #[tokio::test]
    async fn test_missing_required_argument() {
        let (dispatch, ctx) = setup();
        let record = dispatch.execute(&ctx, &invocation("echo", json!({}))).await;
        assert_eq!(record.error(), Some("Missing required parameter: text"));
    }

    #[tokio::test]
    async fn test_executor_error_is_contained() {
        let (dispatch, ctx) = setup();
        let record = dispatch.execute(&ctx, &invocation("fail", json!({}))).await;
        assert_eq!(record.result, json!({"error": "Task 7 not found"}));
    }

    #[tokio::test]
    async fn test_executor_panic_is_contained() {
        let (dispatch, ctx) = setup();
        let record = dispatch.execute(&ctx, &invocation("explode", json!({}))).await;
        assert!(record.error().unwrap().contains("boom"));
    }
}
