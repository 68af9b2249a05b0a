//! Session state for one terminal user.

use std::sync::Arc;

use agent_core::{Agent, AgentBuilder, AgentContext, ProviderAdapter};
use todo_assistant::{MemoryTaskStore, TaskStore};

pub const USER_ENV: &str = "TODO_USER_ID";
pub const MAX_ROUNDS_ENV: &str = "AGENT_MAX_ROUNDS";
pub const DEFAULT_USER: &str = "local-user";

/// Everything the chat loop needs
pub struct AppState {
    pub agent: Agent,
    pub context: AgentContext,
    pub store: Arc<dyn TaskStore>,
}

impl AppState {
    /// In-memory store, task tools and the given adapter
    pub fn new(
        adapter: Arc<dyn ProviderAdapter>,
        user_id: &str,
        max_rounds: Option<usize>,
    ) -> anyhow::Result<Self> {
        let store: Arc<dyn TaskStore> = Arc::new(MemoryTaskStore::new());
        let dispatch = Arc::new(todo_assistant::build_dispatch(store.clone())?);
        let context = todo_assistant::new_context(user_id, dispatch.registry());

        let mut builder = AgentBuilder::new().adapter(adapter).dispatch(dispatch);
        if let Some(max) = max_rounds {
            builder = builder.max_rounds(max);
        }

        Ok(Self {
            agent: builder.build()?,
            context,
            store,
        })
    }

    /// User id and round cap from the environment
    pub fn settings_from_env() -> anyhow::Result<(String, Option<usize>)> {
        let user_id = std::env::var(USER_ENV)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_USER.into());

        let max_rounds = match std::env::var(MAX_ROUNDS_ENV) {
            Ok(raw) => Some(
                raw.trim()
                    .parse::<usize>()
                    .map_err(|_| anyhow::anyhow!("{MAX_ROUNDS_ENV} must be a non-negative integer, got {raw:?}"))?,
            ),
            Err(_) => None,
        };

        Ok((user_id, max_rounds))
    }
}
