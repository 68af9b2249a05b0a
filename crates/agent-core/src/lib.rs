//! # agent-core
//!
//! Provider-neutral core of the todo assistant: one tool abstraction, one
//! canonical turn type, and a multi-round tool-calling loop that works the
//! same whichever LLM backend is plugged in.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                              Agent                               │
//! │  ┌───────────────┐   ┌──────────────┐   ┌──────────────────────┐ │
//! │  │ Orchestration │──▶│   Dispatch   │──▶│  ToolExecutor (task  │ │
//! │  │     Loop      │   │  (contains   │   │   operations)        │ │
//! │  │               │   │   failures)  │   └──────────────────────┘ │
//! │  │               │   └──────────────┘                            │
//! │  │               │   ┌──────────────────────────────────────────┐│
//! │  │               │──▶│ ProviderAdapter (OpenAI-compatible,      ││
//! │  └───────────────┘   │ parts-based, ...)                        ││
//! │                      └──────────────────────────────────────────┘│
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The loop only ever sees [`AgentTurn`] and [`ToolInvocation`]; adapters own
//! every provider-specific shape.

pub mod context;
pub mod dispatch;
pub mod error;
pub mod message;
pub mod mock;
pub mod provider;
pub mod reasoning;
pub mod tool;

pub use context::{AgentContext, ConversationId};
pub use dispatch::{Dispatch, ToolExecutor};
pub use error::{AgentError, AgentProcessingError, Result};
pub use message::{Message, Role};
pub use provider::{AgentTurn, CompletionRequest, ProviderAdapter, ToolRound};
pub use reasoning::{Agent, AgentBuilder, AgentConfig, AgentReply};
pub use tool::{
    Arguments, ParamType, ParameterSchema, ToolCallRecord, ToolDefinition, ToolInvocation,
    ToolRegistry,
};
