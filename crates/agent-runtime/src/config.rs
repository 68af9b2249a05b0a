//! Provider Configuration
//!
//! Explicit settings handed to an adapter at construction time. Nothing reads
//! global state after this point.

use std::str::FromStr;
use std::time::Duration;

use agent_core::error::{AgentError, Result};
use serde::{Deserialize, Serialize};

/// Supported provider families
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    /// `POST {base}/chat/completions` with embedded `tool_calls` (Groq, OpenAI, ...)
    OpenAiCompatible,
    /// Gemini `generateContent` with function-call parts
    Gemini,
}

impl ProviderKind {
    /// Prefix of the environment variables configuring this provider
    pub const fn env_prefix(self) -> &'static str {
        match self {
            Self::OpenAiCompatible => "GROQ",
            Self::Gemini => "GEMINI",
        }
    }

    pub const fn default_model(self) -> &'static str {
        match self {
            Self::OpenAiCompatible => "llama-3.3-70b-versatile",
            Self::Gemini => "gemini-1.5-flash",
        }
    }

    pub const fn default_max_tokens(self) -> u32 {
        match self {
            Self::OpenAiCompatible => 4000,
            Self::Gemini => 1000,
        }
    }

    pub const fn default_base_url(self) -> &'static str {
        match self {
            Self::OpenAiCompatible => "https://api.groq.com/openai/v1",
            Self::Gemini => "https://generativelanguage.googleapis.com/v1beta",
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OpenAiCompatible => write!(f, "openai_compatible"),
            Self::Gemini => write!(f, "gemini"),
        }
    }
}

impl FromStr for ProviderKind {
    type Err = AgentError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "groq" | "openai" | "openai_compatible" | "openai-compatible" => Ok(Self::OpenAiCompatible),
            "gemini" | "google" => Ok(Self::Gemini),
            other => Err(AgentError::Config(format!("Unknown LLM provider: {other}"))),
        }
    }
}

pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Adapter settings
#[derive(Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(skip_serializing)]
    pub api_key: String,

    /// Model identifier (e.g. "llama-3.3-70b-versatile", "gemini-1.5-flash")
    pub model: String,

    /// Maximum output tokens
    pub max_tokens: u32,

    /// Sampling temperature
    pub temperature: f32,

    /// Per-request timeout
    pub timeout_ms: u64,

    /// API root, without the endpoint path
    pub base_url: String,
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .field("timeout_ms", &self.timeout_ms)
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl ProviderConfig {
    /// Defaults for `kind` with the given key
    pub fn new(kind: ProviderKind, api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: kind.default_model().into(),
            max_tokens: kind.default_max_tokens(),
            temperature: DEFAULT_TEMPERATURE,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            base_url: kind.default_base_url().into(),
        }
    }

    /// Load from `<PREFIX>_API_KEY`, `<PREFIX>_MODEL`, `<PREFIX>_MAX_TOKENS`,
    /// `<PREFIX>_TEMPERATURE`, `<PREFIX>_TIMEOUT_MS` and `<PREFIX>_BASE_URL`.
    pub fn from_env(kind: ProviderKind) -> Result<Self> {
        Self::from_lookup(kind, |key| std::env::var(key).ok())
    }

    /// Same as [`ProviderConfig::from_env`] over an arbitrary lookup
    pub fn from_lookup<F>(kind: ProviderKind, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let prefix = kind.env_prefix();
        let var = |name: &str| {
            lookup(&format!("{prefix}_{name}"))
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let api_key = var("API_KEY")
            .ok_or_else(|| AgentError::Config(format!("{prefix}_API_KEY is not set")))?;

        let mut config = Self::new(kind, api_key);
        if let Some(model) = var("MODEL") {
            config.model = model;
        }
        if let Some(base_url) = var("BASE_URL") {
            config.base_url = base_url;
        }
        config.max_tokens = parse_or(var("MAX_TOKENS"), prefix, "MAX_TOKENS", config.max_tokens)?;
        config.temperature = parse_or(var("TEMPERATURE"), prefix, "TEMPERATURE", config.temperature)?;
        config.timeout_ms = parse_or(var("TIMEOUT_MS"), prefix, "TIMEOUT_MS", config.timeout_ms)?;

        config.validate()?;
        Ok(config)
    }

    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    #[must_use]
    pub const fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    #[must_use]
    pub const fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    #[must_use]
    pub const fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Base URL without a trailing slash
    pub fn base(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    /// Reject settings no provider accepts
    pub fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(AgentError::Config("api_key is empty".into()));
        }
        if self.model.trim().is_empty() {
            return Err(AgentError::Config("model is empty".into()));
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(AgentError::Config(format!(
                "temperature {} is outside 0.0..=2.0",
                self.temperature
            )));
        }
        if self.timeout_ms == 0 {
            return Err(AgentError::Config("timeout_ms must be positive".into()));
        }
        Ok(())
    }
}

fn parse_or<T: FromStr>(raw: Option<String>, prefix: &str, name: &str, default: T) -> Result<T> {
    raw.map_or(Ok(default), |value| {
        value
            .parse()
            .map_err(|_| AgentError::Config(format!("{prefix}_{name} has an invalid value: {value}")))
    })
}
