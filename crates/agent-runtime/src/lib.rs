//! # agent-runtime
//!
//! LLM provider adapters for the todo agent.
//!
//! ## Providers
//!
//! - **OpenAI-compatible** (default): Groq, OpenAI and anything serving
//!   `/chat/completions` with `tool_calls`
//! - **Gemini**: `generateContent` with function-call parts
//!
//! ## Usage
//!
//! ```rust,ignore
//! use agent_runtime::{ProviderConfig, ProviderKind, build_adapter};
//!
//! let config = ProviderConfig::from_env(ProviderKind::OpenAiCompatible)?;
//! let adapter = build_adapter(ProviderKind::OpenAiCompatible, config)?;
//! let agent = AgentBuilder::new()
//!     .adapter(adapter)
//!     .dispatch(dispatch)
//!     .build()?;
//! ```

use std::sync::Arc;

pub mod config;
mod http;

#[cfg(feature = "gemini")]
pub mod gemini;
#[cfg(feature = "openai")]
pub mod openai;

pub use config::{ProviderConfig, ProviderKind};
#[cfg(feature = "gemini")]
pub use gemini::GeminiAdapter;
#[cfg(feature = "openai")]
pub use openai::OpenAiCompatibleAdapter;

// Re-export core types for convenience
pub use agent_core::{AgentError, ProviderAdapter, Result};

/// Environment variable selecting the provider family
pub const PROVIDER_ENV: &str = "LLM_PROVIDER";

/// Construct the adapter for `kind`
pub fn build_adapter(kind: ProviderKind, config: ProviderConfig) -> Result<Arc<dyn ProviderAdapter>> {
    let adapter: Arc<dyn ProviderAdapter> = match kind {
        #[cfg(feature = "openai")]
        ProviderKind::OpenAiCompatible => Arc::new(OpenAiCompatibleAdapter::new(config)?),
        #[cfg(feature = "gemini")]
        ProviderKind::Gemini => Arc::new(GeminiAdapter::new(config)?),
        #[allow(unreachable_patterns)]
        other => {
            return Err(AgentError::Config(format!(
                "provider {other} is not enabled in this build"
            )));
        }
    };

    tracing::info!(provider = adapter.name(), model = adapter.model(), "Provider adapter ready");
    Ok(adapter)
}

/// Provider kind named by `LLM_PROVIDER` (defaults to `groq`)
pub fn provider_kind_from_env() -> Result<ProviderKind> {
    std::env::var(PROVIDER_ENV)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .map_or(Ok(ProviderKind::OpenAiCompatible), |v| v.parse())
}

/// Adapter selected and configured entirely from the environment
pub fn adapter_from_env() -> Result<Arc<dyn ProviderAdapter>> {
    let kind = provider_kind_from_env()?;
    let config = ProviderConfig::from_env(kind)?;
    build_adapter(kind, config)
}
