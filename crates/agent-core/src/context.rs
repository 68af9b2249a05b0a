//! Agent Context
//!
//! Per-conversation state handed to the orchestration loop and to every tool
//! executor. History only ever grows through [`AgentContext::add_message`].
//!
//! A context is single-owner: callers must not run two `process_message`
//! calls on the same context concurrently. `&mut` access enforces this within
//! one process; callers that share contexts behind their own locks must hold
//! the lock for the whole call.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::message::{Conversation, Message, Role};
use crate::tool::{ToolDefinition, ToolRegistry};

/// Unique conversation identifier
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConversationId(String);

impl ConversationId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ConversationId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ConversationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Per-conversation agent state
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AgentContext {
    /// Owner of the conversation; tool executors scope their work by it
    pub user_id: String,

    pub conversation_id: ConversationId,

    pub system_instructions: String,

    /// Tools offered to the model, in registry order
    pub available_tools: Vec<ToolDefinition>,

    conversation_history: Conversation,

    /// Optional locator for the external executor surface
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mcp_server_url: Option<String>,
}

impl AgentContext {
    /// Create a context offering every tool in `registry`
    pub fn new(
        user_id: impl Into<String>,
        system_instructions: impl Into<String>,
        registry: &ToolRegistry,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            conversation_id: ConversationId::new(),
            system_instructions: system_instructions.into(),
            available_tools: registry.list_tools().to_vec(),
            conversation_history: Conversation::new(),
            mcp_server_url: None,
        }
    }

    #[must_use]
    pub fn with_conversation_id(mut self, id: ConversationId) -> Self {
        self.conversation_id = id;
        self
    }

    /// Seed history loaded from elsewhere (e.g. a conversation store)
    #[must_use]
    pub fn with_history(mut self, history: Vec<Message>) -> Self {
        self.conversation_history = Conversation::from(history);
        self
    }

    #[must_use]
    pub fn with_mcp_server_url(mut self, url: impl Into<String>) -> Self {
        self.mcp_server_url = Some(url.into());
        self
    }

    /// Append a message to the history
    pub fn add_message(&mut self, role: Role, content: impl Into<String>) {
        self.conversation_history.push(Message::new(role, content));
    }

    /// Stored history, oldest first
    pub fn conversation_history(&self) -> &[Message] {
        self.conversation_history.messages()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tool::ToolDefinition;

    fn registry() -> ToolRegistry {
        ToolRegistry::new(vec![
            ToolDefinition::new("add_task", "Create a task"),
            ToolDefinition::new("list_tasks", "List tasks"),
        ])
        .unwrap()
    }

    #[test]
    fn test_context_creation() {
        let ctx = AgentContext::new("user-1", "Be helpful.", &registry());
        assert_eq!(ctx.user_id, "user-1");
        assert_eq!(ctx.available_tools.len(), 2);
        assert!(ctx.conversation_history().is_empty());
        assert!(ctx.mcp_server_url.is_none());
    }

    #[test]
    fn test_add_message_appends_in_order() {
        let mut ctx = AgentContext::new("user-1", "Be helpful.", &registry())
            .with_history(vec![Message::user("first")]);

        ctx.add_message(Role::Assistant, "second");
        ctx.add_message(Role::User, "third");

        let contents: Vec<_> = ctx
            .conversation_history()
            .iter()
            .map(|m| m.content.as_str())
            .collect();
        assert_eq!(contents, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_conversation_id() {
        let id = ConversationId::from_string("conv-42");
        let ctx = AgentContext::new("u", "", &registry()).with_conversation_id(id.clone());
        assert_eq!(ctx.conversation_id, id);
        assert_eq!(ctx.conversation_id.to_string(), "conv-42");
    }
}
