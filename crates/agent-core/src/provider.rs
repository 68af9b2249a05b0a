//! Provider Adapter Strategy Pattern
//!
//! Every LLM backend implements [`ProviderAdapter`]. The orchestration loop
//! talks only in canonical terms ([`CompletionRequest`] in, [`AgentTurn`] out);
//! each adapter owns the translation to and from its wire protocol, including
//! how executed tool results are fed back on the next submission.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use agent_core::provider::{CompletionRequest, ProviderAdapter};
//!
//! let turn = adapter.complete(&request).await?;
//! if turn.is_terminal() {
//!     println!("{}", turn.text.unwrap_or_default());
//! }
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::message::Message;
use crate::tool::{ToolCallRecord, ToolDefinition, ToolInvocation};

/// Token usage statistics
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Reason for completion finishing
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    Stop,
    Length,
    ToolUse,
    ContentFilter,
    Other(String),
}

impl FinishReason {
    /// Map a provider's finish token onto the canonical set
    pub fn from_provider(raw: &str) -> Self {
        match raw.to_ascii_lowercase().as_str() {
            "stop" | "end_turn" => Self::Stop,
            "length" | "max_tokens" => Self::Length,
            "tool_calls" | "function_call" | "tool_use" => Self::ToolUse,
            "content_filter" | "safety" | "recitation" | "blocklist" | "prohibited_content" => {
                Self::ContentFilter
            }
            other => Self::Other(other.to_string()),
        }
    }
}

/// One canonical response unit from a provider
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentTurn {
    /// Assistant text, if the provider produced any
    pub text: Option<String>,

    /// Requested tool invocations, in provider order
    pub tool_invocations: Vec<ToolInvocation>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<FinishReason>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<TokenUsage>,
}

impl AgentTurn {
    /// Text-only turn
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Default::default()
        }
    }

    /// Turn requesting tool invocations
    pub fn tool_calls(invocations: Vec<ToolInvocation>) -> Self {
        Self {
            tool_invocations: invocations,
            ..Default::default()
        }
    }

    /// A turn with no tool invocations ends the loop
    pub fn is_terminal(&self) -> bool {
        self.tool_invocations.is_empty()
    }

    /// Whether the turn carries non-blank text
    pub fn has_text(&self) -> bool {
        self.text.as_deref().is_some_and(|t| !t.trim().is_empty())
    }
}

/// A completed tool round: the turn that asked for tools and what they returned
///
/// `records[i]` is the outcome of `turn.tool_invocations[i]`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ToolRound {
    pub turn: AgentTurn,
    pub records: Vec<ToolCallRecord>,
}

impl ToolRound {
    /// Invocations paired with their records
    pub fn results(&self) -> impl Iterator<Item = (&ToolInvocation, &ToolCallRecord)> {
        self.turn.tool_invocations.iter().zip(self.records.iter())
    }
}

/// Everything an adapter needs to build one submission
#[derive(Clone, Copy, Debug)]
pub struct CompletionRequest<'a> {
    pub system_instructions: &'a str,

    /// Prior conversation, oldest first
    pub history: &'a [Message],

    /// The new user message for this call
    pub user_message: &'a str,

    /// Tool rounds completed so far within this call
    pub rounds: &'a [ToolRound],

    pub tools: &'a [ToolDefinition],
}

impl<'a> CompletionRequest<'a> {
    /// History entries an adapter should replay.
    ///
    /// System entries are dropped because the system instructions are always
    /// sent once, up front. Tool entries are dropped because tool results only
    /// make sense next to the invocation that produced them, which stored
    /// history does not keep.
    pub fn replayable_history(&self) -> impl Iterator<Item = &'a Message> + 'a {
        self.history.iter().filter(|m| {
            if !m.is_dialogue() {
                tracing::debug!(role = %m.role, "Eliding history entry");
            }
            m.is_dialogue()
        })
    }
}

/// Strategy trait for LLM providers
///
/// Implement this trait to add support for new LLM backends. One call is one
/// network round trip; implementations must not retry internally and must map
/// transport failures, non-success statuses and unparseable bodies to
/// [`AgentError::Provider`](crate::AgentError::Provider) or
/// [`AgentError::Timeout`](crate::AgentError::Timeout).
#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    /// Provider name for logs (e.g. "openai_compatible", "gemini")
    fn name(&self) -> &str;

    /// Model identifier requests are sent to
    fn model(&self) -> &str;

    /// Submit the request and parse the reply into a canonical turn
    async fn complete(&self, request: &CompletionRequest<'_>) -> Result<AgentTurn>;
}
