//! # todo-assistant
//!
//! The task domain plugged into `agent-core`: five task tools, the persona the
//! model is given, and a storage seam.
//!
//! ## Wiring
//!
//! ```text
//! ┌──────────────┐    ┌───────────────────┐    ┌──────────────────┐
//! │ tool_registry│───▶│ Dispatch          │───▶│ dyn TaskStore    │
//! │ (definitions)│    │  add_task         │    │  (MemoryTaskStore│
//! └──────────────┘    │  list_tasks       │    │   or your own)   │
//!                     │  complete_task    │    └──────────────────┘
//!                     │  delete_task      │
//!                     │  update_task      │
//!                     └───────────────────┘
//! ```
//!
//! ```rust,ignore
//! let store: Arc<dyn TaskStore> = Arc::new(MemoryTaskStore::new());
//! let dispatch = Arc::new(todo_assistant::build_dispatch(store)?);
//! let mut context = todo_assistant::new_context("user-42", dispatch.registry());
//! let reply = agent.process_message("Add a task to buy groceries", &mut context, None).await?;
//! ```

pub mod error;
pub mod model;
pub mod store;
pub mod svckit;

use std::sync::Arc;

use agent_core::{AgentContext, Dispatch, ToolRegistry};

pub use error::{Result, TaskError};
pub use model::{NewTask, Priority, StatusFilter, Task, TaskUpdate};
pub use store::{MemoryTaskStore, TaskStore};

/// Re-export tools for easy registration
pub mod tools {
    pub use crate::svckit::{AddTaskTool, CompleteTaskTool, DeleteTaskTool, ListTasksTool, UpdateTaskTool};
}

use tools::{AddTaskTool, CompleteTaskTool, DeleteTaskTool, ListTasksTool, UpdateTaskTool};

/// Canonical tool set, in the order it is offered to the model
pub fn tool_registry() -> agent_core::Result<ToolRegistry> {
    ToolRegistry::new(vec![
        AddTaskTool::definition(),
        ListTasksTool::definition(),
        CompleteTaskTool::definition(),
        DeleteTaskTool::definition(),
        UpdateTaskTool::definition(),
    ])
}

/// Registry plus one executor per tool, all backed by `store`
pub fn build_dispatch(store: Arc<dyn TaskStore>) -> agent_core::Result<Dispatch> {
    let store_name = store.name().to_string();
    let mut dispatch = Dispatch::new(Arc::new(tool_registry()?));
    dispatch.register(AddTaskTool::NAME, AddTaskTool::new(store.clone()))?;
    dispatch.register(ListTasksTool::NAME, ListTasksTool::new(store.clone()))?;
    dispatch.register(CompleteTaskTool::NAME, CompleteTaskTool::new(store.clone()))?;
    dispatch.register(DeleteTaskTool::NAME, DeleteTaskTool::new(store.clone()))?;
    dispatch.register(UpdateTaskTool::NAME, UpdateTaskTool::new(store))?;

    tracing::debug!(store = %store_name, tools = dispatch.registry().len(), "Task tools bound");
    Ok(dispatch)
}

/// Fresh conversation for `user_id` with the assistant persona
pub fn new_context(user_id: impl Into<String>, registry: &ToolRegistry) -> AgentContext {
    AgentContext::new(user_id, SYSTEM_INSTRUCTIONS, registry)
}

/// System instructions for the todo assistant
pub const SYSTEM_INSTRUCTIONS: &str = r#"You are a friendly Todo Assistant. You help people manage their task list through ordinary conversation.

## What You Can Do

1. **Add tasks** with `add_task` when the user describes something they need to do
   ("Add a task to buy groceries", "Remind me to call mom").
2. **List tasks** with `list_tasks` when the user wants to see what is on their plate.
   Filter with `status` ("pending", "completed") when they ask for a subset.
3. **Complete tasks** with `complete_task` when the user says they finished something.
4. **Delete tasks** with `delete_task` when a task is no longer needed.
5. **Update tasks** with `update_task` to change a title, description or priority.

## Finding the Right Task

Complete, delete and update need a task ID. Never guess one:

1. Call `list_tasks` first.
2. Match the user's words to a task by title, or by position ("the first one", "task 2").
3. Call the action with that task's `id`.
4. Confirm using the task's title, not its ID.

If several tasks match, or none do, ask which one they mean.

## How to Respond

- Warm and brief. Confirm every action in plain language
  ("Done! I've added 'Buy groceries' to your list.").
- When listing, number the tasks and mark them pending ⏳ or done ✅.
- If a tool returns an `error`, explain it without jargon and suggest what to try next.
- Only ever talk about this user's own tasks, and only what the tools returned.
- If the request is unclear, ask a short clarifying question instead of guessing.
- For unrelated topics, gently steer back to task management."#;

#[cfg(test)]
mod tests {
    use super::*;
    use agent_core::{
        Agent, AgentTurn, Role, ToolInvocation, mock::ScriptedAdapter, tool::Arguments,
    };
    use serde_json::{Value, json};

    fn args(value: Value) -> Arguments {
        value.as_object().cloned().unwrap_or_default()
    }

    fn call(id: &str, name: &str, arguments: Value) -> ToolInvocation {
        ToolInvocation::new(id, name, args(arguments))
    }

    fn setup(turns: Vec<AgentTurn>) -> (Arc<MemoryTaskStore>, Arc<ScriptedAdapter>, Agent, AgentContext) {
        let store = Arc::new(MemoryTaskStore::new());
        let dispatch = Arc::new(build_dispatch(store.clone()).unwrap());
        let context = new_context("user-1", dispatch.registry());
        let adapter = Arc::new(ScriptedAdapter::new(turns));
        let agent = Agent::with_defaults(adapter.clone(), dispatch);
        (store, adapter, agent, context)
    }

    #[test]
    fn test_registry_is_complete() {
        let registry = tool_registry().unwrap();
        assert_eq!(
            registry.names(),
            vec!["add_task", "list_tasks", "complete_task", "delete_task", "update_task"]
        );

        let dispatch = build_dispatch(Arc::new(MemoryTaskStore::new())).unwrap();
        assert!(dispatch.unbound().is_empty());
    }

    #[test]
    fn test_instructions_mention_every_tool() {
        for name in tool_registry().unwrap().names() {
            assert!(SYSTEM_INSTRUCTIONS.contains(name), "{name} missing from instructions");
        }
    }

    #[tokio::test]
    async fn test_add_task_conversation() {
        let (store, adapter, agent, mut context) = setup(vec![
            AgentTurn::tool_calls(vec![call("c1", "add_task", json!({"title": "Buy groceries"}))]),
            AgentTurn::text("Done! I've added 'Buy groceries' to your task list."),
        ]);

        let reply = agent
            .process_message("Add a task to buy groceries", &mut context, None)
            .await
            .unwrap();

        assert_eq!(reply.message, "Done! I've added 'Buy groceries' to your task list.");
        assert_eq!(reply.tool_calls.len(), 1);
        assert_eq!(reply.tool_calls[0].result["title"], "Buy groceries");
        assert_eq!(store.list("user-1", StatusFilter::All).await.unwrap().len(), 1);

        let requests = adapter.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].system_instructions, SYSTEM_INSTRUCTIONS);
        assert_eq!(requests[0].tool_names.len(), 5);
        assert_eq!(requests[1].rounds.len(), 1);

        let roles: Vec<Role> = context.conversation_history().iter().map(|m| m.role).collect();
        assert_eq!(roles, vec![Role::User, Role::Assistant]);
    }

    #[tokio::test]
    async fn test_list_then_complete_across_rounds() {
        let (store, _adapter, agent, mut context) = setup(vec![
            AgentTurn::tool_calls(vec![call("c1", "list_tasks", json!({}))]),
            AgentTurn::tool_calls(vec![call("c2", "complete_task", json!({"task_id": 2}))]),
            AgentTurn::text("Great! I've marked 'Call mom' as complete."),
        ]);
        store.create("user-1", NewTask::new("Buy groceries").unwrap()).await.unwrap();
        store.create("user-1", NewTask::new("Call mom").unwrap()).await.unwrap();

        let reply = agent
            .process_message("I called mom", &mut context, None)
            .await
            .unwrap();

        let names: Vec<&str> = reply.tool_calls.iter().map(|r| r.tool_name.as_str()).collect();
        assert_eq!(names, vec!["list_tasks", "complete_task"]);
        assert_eq!(reply.tool_calls[0].result["count"], 2);
        assert!(store.get("user-1", 2).await.unwrap().completed);
        assert!(!store.get("user-1", 1).await.unwrap().completed);
    }

    #[tokio::test]
    async fn test_domain_errors_reach_the_model() {
        let (_store, adapter, agent, mut context) = setup(vec![
            AgentTurn::tool_calls(vec![
                call("c1", "delete_task", json!({"task_id": 42})),
                call("c2", "add_task", json!({})),
            ]),
            AgentTurn::text("I couldn't find that task. Could you check the name?"),
        ]);

        let reply = agent
            .process_message("Delete task 42", &mut context, None)
            .await
            .unwrap();

        assert_eq!(reply.tool_calls[0].error(), Some("Task 42 not found"));
        assert_eq!(reply.tool_calls[1].error(), Some("Missing required parameter: title"));

        let fed_back = &adapter.requests()[1].rounds[0].records;
        assert!(fed_back.iter().all(|r| r.is_error()));
    }

    #[tokio::test]
    async fn test_history_is_replayed() {
        let (_store, adapter, agent, mut context) = setup(vec![
            AgentTurn::text("📋 You have no tasks yet."),
            AgentTurn::text("Sure, what should the task be called?"),
        ]);

        agent.process_message("What do I need to do?", &mut context, None).await.unwrap();
        agent.process_message("Add something", &mut context, None).await.unwrap();

        let second = &adapter.requests()[1];
        assert_eq!(second.history.len(), 2);
        assert_eq!(second.history[0].content, "What do I need to do?");
        assert_eq!(second.history[1].role, Role::Assistant);
        assert_eq!(context.conversation_history().len(), 4);
    }
}
