//! Error Types
//!
//! Two tiers: [`AgentError`] is the full taxonomy used inside the core, and
//! [`AgentProcessingError`] is the only failure `process_message` hands back to
//! callers. Tool-level errors never reach the second tier; they are turned
//! into `{"error": ...}` payloads at the dispatch boundary.

use thiserror::Error;

/// Result type alias for agent operations
pub type Result<T> = std::result::Result<T, AgentError>;

/// Agent error types
#[derive(Error, Debug)]
pub enum AgentError {
    /// Tool name not present in the registry
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    /// Arguments failed validation against the tool definition
    #[error("Tool validation error: {0}")]
    ToolValidation(String),

    /// Underlying task operation failed
    #[error("Tool execution error: {0}")]
    ToolExecution(String),

    /// Transport failure, non-success status or malformed provider response
    #[error("Provider error{}: {detail}", .status.map(|s| format!(" ({s})")).unwrap_or_default())]
    Provider { status: Option<u16>, detail: String },

    /// Provider call exceeded its request timeout
    #[error("Provider request timed out after {0} ms")]
    Timeout(u64),

    /// Tool arguments from the provider could not be decoded
    #[error("Argument decode error: {0}")]
    ArgumentDecode(String),

    /// Orchestration loop hit its round cap
    #[error("tool-call round limit exceeded ({0} rounds)")]
    RoundLimitExceeded(usize),

    /// Caller cancelled the in-flight round
    #[error("Processing cancelled")]
    Cancelled,

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AgentError {
    /// Shorthand for a provider error without an HTTP status
    pub fn provider(detail: impl Into<String>) -> Self {
        Self::Provider {
            status: None,
            detail: detail.into(),
        }
    }

    /// Check if error is retryable
    ///
    /// The core never retries on its own; this is advice for callers.
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Timeout(_) => true,
            Self::Provider { status, .. } => match status {
                Some(code) => *code == 429 || *code >= 500,
                None => true,
            },
            _ => false,
        }
    }
}

impl From<anyhow::Error> for AgentError {
    fn from(err: anyhow::Error) -> Self {
        Self::ToolExecution(err.to_string())
    }
}

/// Unrecoverable failure of one `process_message` call
#[derive(Error, Debug)]
#[error("Failed to process message: {source}")]
pub struct AgentProcessingError {
    #[source]
    source: AgentError,
}

impl AgentProcessingError {
    /// The underlying cause
    pub const fn cause(&self) -> &AgentError {
        &self.source
    }

    /// Whether the cause was the round cap
    pub const fn is_round_limit(&self) -> bool {
        matches!(self.source, AgentError::RoundLimitExceeded(_))
    }

    /// Generic message safe to show end users. Never includes provider bodies.
    pub fn user_message(&self) -> &'static str {
        match self.source {
            AgentError::Cancelled => "The request was cancelled.",
            _ => "Sorry, something went wrong while processing your message. Please try again.",
        }
    }
}

impl From<AgentError> for AgentProcessingError {
    fn from(source: AgentError) -> Self {
        Self { source }
    }
}
