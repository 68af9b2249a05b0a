//! OpenAI-compatible Provider Adapter
//!
//! Speaks `POST {base}/chat/completions` as served by Groq, OpenAI and other
//! compatible backends. Tool invocations arrive as `message.tool_calls` with
//! JSON-encoded argument strings; results go back as one `tool` message per
//! invocation id.

use agent_core::{
    error::Result,
    provider::{AgentTurn, CompletionRequest, FinishReason, ProviderAdapter, TokenUsage},
    tool::{ParamType, ToolDefinition, ToolInvocation, arguments_from_value},
    AgentError,
};
use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, HeaderMap};
use serde::Deserialize;
use serde_json::{Map, Value, json};

use crate::config::ProviderConfig;
use crate::http;

/// Adapter for OpenAI-style chat completions
pub struct OpenAiCompatibleAdapter {
    client: reqwest::Client,
    config: ProviderConfig,
}

impl OpenAiCompatibleAdapter {
    pub fn new(config: ProviderConfig) -> Result<Self> {
        config.validate()?;

        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            http::secret_header(&format!("Bearer {}", config.api_key))?,
        );
        let client = http::build_client(&config, headers)?;

        tracing::info!(
            model = %config.model,
            max_tokens = config.max_tokens,
            temperature = config.temperature,
            "Initialized OpenAI-compatible adapter"
        );

        Ok(Self { client, config })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.config.base())
    }

    /// Wire schema for one tool
    pub fn tool_schema(tool: &ToolDefinition) -> Value {
        let mut properties = Map::new();
        for param in &tool.parameters {
            let mut prop = Map::new();
            prop.insert("type".into(), json!(param.param_type.as_str()));
            prop.insert("description".into(), json!(param.description));
            if param.param_type == ParamType::Array {
                prop.insert("items".into(), json!({ "type": param.item_type().as_str() }));
            }
            if let Some(values) = &param.enum_values {
                prop.insert("enum".into(), Value::Array(values.clone()));
            }
            if let Some(default) = &param.default {
                prop.insert("default".into(), default.clone());
            }
            properties.insert(param.name.clone(), Value::Object(prop));
        }

        json!({
            "type": "function",
            "function": {
                "name": tool.name,
                "description": tool.description,
                "parameters": {
                    "type": "object",
                    "properties": properties,
                    "required": tool.required_names(),
                }
            }
        })
    }

    /// System message, replayable history, the new user message, then one
    /// assistant `tool_calls` message and its `tool` results per round.
    fn build_messages(request: &CompletionRequest<'_>) -> Result<Vec<Value>> {
        let mut messages = vec![json!({
            "role": "system",
            "content": request.system_instructions,
        })];

        for msg in request.replayable_history() {
            messages.push(json!({ "role": msg.role.as_str(), "content": msg.content }));
        }

        messages.push(json!({ "role": "user", "content": request.user_message }));

        for round in request.rounds {
            let tool_calls = round
                .turn
                .tool_invocations
                .iter()
                .map(|inv| {
                    Ok(json!({
                        "id": inv.id,
                        "type": "function",
                        "function": {
                            "name": inv.name,
                            "arguments": serde_json::to_string(&inv.arguments)?,
                        }
                    }))
                })
                .collect::<Result<Vec<_>>>()?;

            messages.push(json!({
                "role": "assistant",
                "content": round.turn.text,
                "tool_calls": tool_calls,
            }));

            for (invocation, record) in round.results() {
                messages.push(json!({
                    "role": "tool",
                    "tool_call_id": invocation.id,
                    "content": serde_json::to_string(&record.result)?,
                }));
            }
        }

        Ok(messages)
    }

    fn build_body(&self, request: &CompletionRequest<'_>) -> Result<Value> {
        let mut body = json!({
            "model": self.config.model,
            "messages": Self::build_messages(request)?,
            "temperature": self.config.temperature,
            "max_tokens": self.config.max_tokens,
        });

        if !request.tools.is_empty() {
            let tools: Vec<Value> = request.tools.iter().map(Self::tool_schema).collect();
            body["tools"] = Value::Array(tools);
            body["tool_choice"] = json!("auto");
        }

        Ok(body)
    }

    fn parse_response(response: ChatResponse) -> Result<AgentTurn> {
        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| AgentError::provider("response contained no choices"))?;

        let tool_invocations = choice
            .message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .enumerate()
            .map(|(i, call)| {
                let id = call
                    .id
                    .filter(|id| !id.is_empty())
                    .unwrap_or_else(|| format!("call_{i}"));
                ToolInvocation::new(
                    id,
                    call.function.name,
                    arguments_from_value(call.function.arguments.unwrap_or(Value::Null)),
                )
            })
            .collect();

        Ok(AgentTurn {
            text: choice.message.content.filter(|c| !c.is_empty()),
            tool_invocations,
            finish_reason: choice.finish_reason.as_deref().map(FinishReason::from_provider),
            usage: response.usage.map(|u| TokenUsage {
                prompt_tokens: u.prompt_tokens,
                completion_tokens: u.completion_tokens,
                total_tokens: u.total_tokens,
            }),
        })
    }
}

#[async_trait]
impl ProviderAdapter for OpenAiCompatibleAdapter {
    fn name(&self) -> &'static str {
        "openai_compatible"
    }

    fn model(&self) -> &str {
        &self.config.model
    }

    async fn complete(&self, request: &CompletionRequest<'_>) -> Result<AgentTurn> {
        let body = self.build_body(request)?;

        tracing::debug!(
            model = %self.config.model,
            rounds = request.rounds.len(),
            tools = request.tools.len(),
            "Sending chat completion request"
        );

        let response: ChatResponse =
            http::post_json(&self.client, &self.endpoint(), &body, self.config.timeout_ms).await?;

        Self::parse_response(response)
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tool_calls: Option<Vec<WireToolCall>>,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
    #[serde(default)]
    total_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct WireToolCall {
    #[serde(default)]
    id: Option<String>,
    function: WireFunctionCall,
}

#[derive(Debug, Deserialize)]
struct WireFunctionCall {
    name: String,
    /// Usually a JSON-encoded string; some servers send an object or null
    #[serde(default)]
    arguments: Option<Value>,
}
