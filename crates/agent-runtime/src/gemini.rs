//! Gemini Provider Adapter
//!
//! Parts-based protocol: `POST {base}/models/{model}:generateContent`.
//! Assistant turns use the `model` role, tool invocations arrive as
//! `functionCall` parts, and results go back as `functionResponse` parts in a
//! `user` content.

use agent_core::{
    AgentError, Role,
    error::Result,
    provider::{AgentTurn, CompletionRequest, FinishReason, ProviderAdapter, TokenUsage},
    tool::{ParamType, ToolDefinition, ToolInvocation, arguments_from_value},
};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName};
use serde::Deserialize;
use serde_json::{Map, Value, json};

use crate::config::ProviderConfig;
use crate::http;

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Adapter for Gemini `generateContent`
pub struct GeminiAdapter {
    client: reqwest::Client,
    config: ProviderConfig,
}

impl GeminiAdapter {
    pub fn new(config: ProviderConfig) -> Result<Self> {
        config.validate()?;

        let mut headers = HeaderMap::new();
        headers.insert(
            HeaderName::from_static(API_KEY_HEADER),
            http::secret_header(&config.api_key)?,
        );
        let client = http::build_client(&config, headers)?;

        tracing::info!(
            model = %config.model,
            max_tokens = config.max_tokens,
            "Initialized Gemini adapter"
        );

        Ok(Self { client, config })
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.config.base(), self.config.model)
    }

    /// Function declaration for one tool.
    ///
    /// Types are uppercase and `default` is dropped; the declaration format
    /// has no place for it.
    pub fn function_declaration(tool: &ToolDefinition) -> Value {
        let mut declaration = json!({
            "name": tool.name,
            "description": tool.description,
        });

        if !tool.parameters.is_empty() {
            let mut properties = Map::new();
            for param in &tool.parameters {
                let mut prop = Map::new();
                prop.insert("type".into(), json!(param.param_type.as_str().to_ascii_uppercase()));
                prop.insert("description".into(), json!(param.description));
                if param.param_type == ParamType::Array {
                    prop.insert("items".into(), json!({ "type": param.item_type().as_str().to_ascii_uppercase() }));
                }
                if let (Some(values), ParamType::String) = (&param.enum_values, param.param_type) {
                    prop.insert("enum".into(), Value::Array(values.clone()));
                }
                properties.insert(param.name.clone(), Value::Object(prop));
            }

            declaration["parameters"] = json!({
                "type": "OBJECT",
                "properties": properties,
                "required": tool.required_names(),
            });
        }

        declaration
    }

    fn build_contents(request: &CompletionRequest<'_>) -> Vec<Value> {
        let mut contents: Vec<Value> = request
            .replayable_history()
            .map(|msg| {
                let role = match msg.role {
                    Role::User => "user",
                    _ => "model",
                };
                json!({ "role": role, "parts": [{ "text": msg.content }] })
            })
            .collect();

        contents.push(json!({ "role": "user", "parts": [{ "text": request.user_message }] }));

        for round in request.rounds {
            let mut call_parts = Vec::new();
            if let Some(text) = round.turn.text.as_deref().filter(|t| !t.is_empty()) {
                call_parts.push(json!({ "text": text }));
            }
            for inv in &round.turn.tool_invocations {
                call_parts.push(json!({
                    "functionCall": { "name": inv.name, "args": inv.arguments }
                }));
            }
            contents.push(json!({ "role": "model", "parts": call_parts }));

            let response_parts: Vec<Value> = round
                .results()
                .map(|(invocation, record)| {
                    let response = match &record.result {
                        Value::Object(_) => record.result.clone(),
                        other => json!({ "result": other }),
                    };
                    json!({
                        "functionResponse": { "name": invocation.name, "response": response }
                    })
                })
                .collect();
            contents.push(json!({ "role": "user", "parts": response_parts }));
        }

        contents
    }

    fn build_body(&self, request: &CompletionRequest<'_>) -> Value {
        let mut body = json!({
            "systemInstruction": { "parts": [{ "text": request.system_instructions }] },
            "contents": Self::build_contents(request),
            "generationConfig": {
                "maxOutputTokens": self.config.max_tokens,
                "temperature": self.config.temperature,
            },
        });

        if !request.tools.is_empty() {
            let declarations: Vec<Value> =
                request.tools.iter().map(Self::function_declaration).collect();
            body["tools"] = json!([{ "functionDeclarations": declarations }]);
        }

        body
    }

    fn parse_response(response: GenerateResponse) -> Result<AgentTurn> {
        let usage = response.usage_metadata.map(|u| TokenUsage {
            prompt_tokens: u.prompt_token_count,
            completion_tokens: u.candidates_token_count,
            total_tokens: u.total_token_count,
        });

        let Some(candidate) = response.candidates.into_iter().next() else {
            if let Some(reason) = response.prompt_feedback.and_then(|f| f.block_reason) {
                tracing::warn!(reason = %reason, "Prompt was blocked by the provider");
                return Ok(AgentTurn {
                    finish_reason: Some(FinishReason::ContentFilter),
                    usage,
                    ..Default::default()
                });
            }
            return Err(AgentError::provider("response contained no candidates"));
        };

        let mut text = String::new();
        let mut tool_invocations = Vec::new();

        for part in candidate.content.map(|c| c.parts).unwrap_or_default() {
            if let Some(call) = part.function_call {
                let id = call
                    .id
                    .filter(|id| !id.is_empty())
                    .unwrap_or_else(|| format!("{}-{}", call.name, tool_invocations.len()));
                tool_invocations.push(ToolInvocation::new(
                    id,
                    call.name,
                    arguments_from_value(call.args.unwrap_or(Value::Null)),
                ));
            } else if let Some(chunk) = part.text {
                if !part.thought {
                    text.push_str(&chunk);
                }
            }
        }

        Ok(AgentTurn {
            text: (!text.is_empty()).then_some(text),
            tool_invocations,
            finish_reason: candidate.finish_reason.as_deref().map(FinishReason::from_provider),
            usage,
        })
    }
}

#[async_trait]
impl ProviderAdapter for GeminiAdapter {
    fn name(&self) -> &'static str {
        "gemini"
    }

    fn model(&self) -> &str {
        &self.config.model
    }

    async fn complete(&self, request: &CompletionRequest<'_>) -> Result<AgentTurn> {
        let body = self.build_body(request);

        tracing::debug!(
            model = %self.config.model,
            rounds = request.rounds.len(),
            tools = request.tools.len(),
            "Sending generateContent request"
        );

        let response: GenerateResponse =
            http::post_json(&self.client, &self.endpoint(), &body, self.config.timeout_ms).await?;

        Self::parse_response(response)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
    #[serde(default)]
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    thought: bool,
    #[serde(default)]
    function_call: Option<FunctionCall>,
}

#[derive(Debug, Deserialize)]
struct FunctionCall {
    #[serde(default)]
    id: Option<String>,
    name: String,
    #[serde(default)]
    args: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
    #[serde(default)]
    total_token_count: u32,
}
