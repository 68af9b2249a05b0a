//! Orchestration Loop
//!
//! Drives one user message to a final answer: ask the adapter for a turn,
//! execute any requested tools through the [`Dispatch`], hand the results back
//! through the adapter, and repeat until the model answers with text only or
//! the round cap is hit.
//!
//! Tool invocations within a round run sequentially in provider order. Their
//! arguments are fixed by the model before the round starts, so a later
//! invocation cannot see an earlier one's result until the next round.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::context::AgentContext;
use crate::dispatch::Dispatch;
use crate::error::{AgentError, AgentProcessingError, Result};
use crate::message::{Message, Role};
use crate::provider::{AgentTurn, CompletionRequest, ProviderAdapter, ToolRound};
use crate::tool::ToolCallRecord;

/// Default cap on tool rounds per `process_message` call
pub const DEFAULT_MAX_ROUNDS: usize = 5;

/// Reply used when tools ran but the final turn carried no text
pub const TOOLS_RAN_FALLBACK: &str = "I've processed your request.";

/// Reply used when the model produced neither text nor tool calls
pub const EMPTY_TURN_FALLBACK: &str =
    "I'm sorry, I couldn't generate a response. Could you try rephrasing your request?";

/// Agent configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Maximum tool rounds before giving up
    pub max_rounds: usize,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_rounds: DEFAULT_MAX_ROUNDS,
        }
    }
}

/// Final answer plus the audit trail of executed tools
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AgentReply {
    pub message: String,
    pub tool_calls: Vec<ToolCallRecord>,
}

/// The main Agent struct
pub struct Agent {
    adapter: Arc<dyn ProviderAdapter>,
    dispatch: Arc<Dispatch>,
    config: AgentConfig,
}

impl Agent {
    /// Create a new agent
    pub fn new(adapter: Arc<dyn ProviderAdapter>, dispatch: Arc<Dispatch>, config: AgentConfig) -> Self {
        Self {
            adapter,
            dispatch,
            config,
        }
    }

    /// Create with default configuration
    pub fn with_defaults(adapter: Arc<dyn ProviderAdapter>, dispatch: Arc<Dispatch>) -> Self {
        Self::new(adapter, dispatch, AgentConfig::default())
    }

    /// Process one user message.
    ///
    /// `history` overrides the context's stored history for this call only.
    /// On success the context gains exactly two entries: the user message and
    /// the final assistant text. On failure the context is left untouched.
    pub async fn process_message(
        &self,
        message: &str,
        context: &mut AgentContext,
        history: Option<&[Message]>,
    ) -> std::result::Result<AgentReply, AgentProcessingError> {
        let reply = self.run(message, context, history).await?;
        Self::commit(context, message, &reply);
        Ok(reply)
    }

    /// Like [`Agent::process_message`], abandoning the call when `cancel` fires.
    ///
    /// Cancellation drops the in-flight provider request or tool execution and
    /// fails with a `Cancelled` cause; the context is not modified.
    pub async fn process_message_cancellable(
        &self,
        message: &str,
        context: &mut AgentContext,
        history: Option<&[Message]>,
        cancel: &CancellationToken,
    ) -> std::result::Result<AgentReply, AgentProcessingError> {
        let reply = tokio::select! {
            biased;
            () = cancel.cancelled() => {
                tracing::info!(user = %context.user_id, "Message processing cancelled");
                return Err(AgentError::Cancelled.into());
            }
            result = self.run(message, context, history) => result?,
        };
        Self::commit(context, message, &reply);
        Ok(reply)
    }

    fn commit(context: &mut AgentContext, message: &str, reply: &AgentReply) {
        context.add_message(Role::User, message);
        context.add_message(Role::Assistant, reply.message.clone());
    }

    async fn run(
        &self,
        message: &str,
        context: &AgentContext,
        history: Option<&[Message]>,
    ) -> Result<AgentReply> {
        let history = history.unwrap_or_else(|| context.conversation_history());

        tracing::info!(
            user = %context.user_id,
            conversation = %context.conversation_id,
            provider = self.adapter.name(),
            history = history.len(),
            tools = context.available_tools.len(),
            "Processing message"
        );

        let mut rounds: Vec<ToolRound> = Vec::new();
        let mut audit: Vec<ToolCallRecord> = Vec::new();

        loop {
            let request = CompletionRequest {
                system_instructions: &context.system_instructions,
                history,
                user_message: message,
                rounds: &rounds,
                tools: &context.available_tools,
            };

            let turn = self.adapter.complete(&request).await.inspect_err(|e| {
                tracing::error!(provider = self.adapter.name(), round = rounds.len(), error = %e, "Provider call failed");
            })?;

            if let Some(usage) = turn.usage {
                tracing::debug!(
                    prompt_tokens = usage.prompt_tokens,
                    completion_tokens = usage.completion_tokens,
                    "Provider usage"
                );
            }

            if turn.is_terminal() {
                let message = Self::final_text(turn, !audit.is_empty());
                tracing::info!(
                    tool_calls = audit.len(),
                    rounds = rounds.len(),
                    response_len = message.len(),
                    "Successfully processed message"
                );
                return Ok(AgentReply {
                    message,
                    tool_calls: audit,
                });
            }

            if rounds.len() >= self.config.max_rounds {
                tracing::warn!(max_rounds = self.config.max_rounds, "Tool-call round limit exceeded");
                return Err(AgentError::RoundLimitExceeded(self.config.max_rounds));
            }

            tracing::debug!(
                round = rounds.len() + 1,
                invocations = turn.tool_invocations.len(),
                "Executing tool round"
            );

            let mut records = Vec::with_capacity(turn.tool_invocations.len());
            for invocation in &turn.tool_invocations {
                records.push(self.dispatch.execute(context, invocation).await);
            }

            audit.extend(records.iter().cloned());
            rounds.push(ToolRound { turn, records });
        }
    }

    /// Text of a terminal turn, substituting a fallback when it is empty
    fn final_text(turn: AgentTurn, tools_ran: bool) -> String {
        let AgentTurn {
            text, finish_reason, ..
        } = turn;

        match text.filter(|t| !t.trim().is_empty()) {
            Some(text) => text,
            None => {
                tracing::warn!(?finish_reason, tools_ran, "Terminal turn has no text");
                if tools_ran {
                    TOOLS_RAN_FALLBACK.into()
                } else {
                    EMPTY_TURN_FALLBACK.into()
                }
            }
        }
    }

    /// Get the dispatch
    pub fn dispatch(&self) -> &Dispatch {
        &self.dispatch
    }

    /// Get the adapter
    pub fn adapter(&self) -> &dyn ProviderAdapter {
        self.adapter.as_ref()
    }

    /// Get configuration
    pub const fn config(&self) -> &AgentConfig {
        &self.config
    }
}

/// Builder for Agent configuration
#[derive(Default)]
pub struct AgentBuilder {
    adapter: Option<Arc<dyn ProviderAdapter>>,
    dispatch: Option<Arc<Dispatch>>,
    config: AgentConfig,
}

impl AgentBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn adapter(mut self, adapter: Arc<dyn ProviderAdapter>) -> Self {
        self.adapter = Some(adapter);
        self
    }

    #[must_use]
    pub fn dispatch(mut self, dispatch: Arc<Dispatch>) -> Self {
        self.dispatch = Some(dispatch);
        self
    }

    #[must_use]
    pub const fn max_rounds(mut self, max: usize) -> Self {
        self.config.max_rounds = max;
        self
    }

    pub fn build(self) -> Result<Agent> {
        let adapter = self
            .adapter
            .ok_or_else(|| AgentError::Config("Provider adapter is required".into()))?;
        let dispatch = self
            .dispatch
            .ok_or_else(|| AgentError::Config("Tool dispatch is required".into()))?;

        Ok(Agent::new(adapter, dispatch, self.config))
    }
}
