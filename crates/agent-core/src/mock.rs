//! Scripted provider adapter for tests and demos.
//!
//! Replays pre-configured turns in order and records every request it sees,
//! so tests can assert on what the loop submitted.

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;

use crate::error::{AgentError, Result};
use crate::message::Message;
use crate::provider::{AgentTurn, CompletionRequest, ProviderAdapter, ToolRound};

/// Owned copy of a [`CompletionRequest`]
#[derive(Clone, Debug)]
pub struct RecordedRequest {
    pub system_instructions: String,
    pub history: Vec<Message>,
    pub user_message: String,
    pub rounds: Vec<ToolRound>,
    pub tool_names: Vec<String>,
}

enum Script {
    Queue(VecDeque<Result<AgentTurn>>),
    Repeat(AgentTurn),
}

/// Adapter returning canned turns
pub struct ScriptedAdapter {
    script: Mutex<Script>,
    requests: Mutex<Vec<RecordedRequest>>,
    delay: Option<Duration>,
}

impl ScriptedAdapter {
    /// Return `turns` in order, then fail with a provider error
    pub fn new(turns: Vec<AgentTurn>) -> Self {
        Self::from_results(turns.into_iter().map(Ok).collect())
    }

    /// Like [`ScriptedAdapter::new`] but individual steps may be errors
    pub fn from_results(results: Vec<Result<AgentTurn>>) -> Self {
        Self {
            script: Mutex::new(Script::Queue(results.into())),
            requests: Mutex::new(Vec::new()),
            delay: None,
        }
    }

    /// Return the same turn forever
    pub fn repeating(turn: AgentTurn) -> Self {
        Self {
            script: Mutex::new(Script::Repeat(turn)),
            requests: Mutex::new(Vec::new()),
            delay: None,
        }
    }

    /// Sleep before answering each request
    #[must_use]
    pub const fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Requests received so far
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of requests received so far
    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    fn next(&self) -> Result<AgentTurn> {
        let mut script = self.script.lock().unwrap_or_else(PoisonError::into_inner);
        match &mut *script {
            Script::Repeat(turn) => Ok(turn.clone()),
            Script::Queue(queue) => queue
                .pop_front()
                .unwrap_or_else(|| Err(AgentError::provider("scripted adapter exhausted"))),
        }
    }
}

#[async_trait]
impl ProviderAdapter for ScriptedAdapter {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn model(&self) -> &'static str {
        "scripted"
    }

    async fn complete(&self, request: &CompletionRequest<'_>) -> Result<AgentTurn> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(RecordedRequest {
                system_instructions: request.system_instructions.to_string(),
                history: request.history.to_vec(),
                user_message: request.user_message.to_string(),
                rounds: request.rounds.to_vec(),
                tool_names: request.tools.iter().map(|t| t.name.clone()).collect(),
            });

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        self.next()
    }
}
