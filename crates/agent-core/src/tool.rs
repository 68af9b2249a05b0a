//! Tool Schema Registry
//!
//! Provider-neutral tool definitions. Every adapter derives its own wire
//! format from these; nothing in this module knows about provider shapes.
//! The registry is built once and never mutated afterwards.

use std::collections::HashMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{AgentError, Result};

/// Decoded tool arguments
pub type Arguments = serde_json::Map<String, Value>;

/// Semantic type of a tool parameter
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    String,
    Integer,
    Number,
    Boolean,
    Array,
    Object,
}

impl ParamType {
    /// JSON Schema token (`"string"`, `"integer"`, ...)
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Array => "array",
            Self::Object => "object",
        }
    }
}

impl std::fmt::Display for ParamType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ParamType {
    type Err = AgentError;

    /// Case-insensitive, so both `"string"` and `"STRING"` parse.
    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "string" => Ok(Self::String),
            "integer" => Ok(Self::Integer),
            "number" => Ok(Self::Number),
            "boolean" => Ok(Self::Boolean),
            "array" => Ok(Self::Array),
            "object" => Ok(Self::Object),
            other => Err(AgentError::Config(format!("Unknown parameter type: {other}"))),
        }
    }
}

/// Parameter definition for tool schema
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParameterSchema {
    /// Parameter name
    pub name: String,

    #[serde(rename = "type")]
    pub param_type: ParamType,

    /// Human-readable description
    pub description: String,

    /// Whether this parameter is required
    #[serde(default)]
    pub required: bool,

    /// Default value if not provided
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,

    /// Enum of allowed values
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<Value>>,

    /// Element type for `Array` parameters; adapters fall back to `String`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<ParamType>,
}

impl ParameterSchema {
    pub fn new(name: impl Into<String>, param_type: ParamType, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            param_type,
            description: description.into(),
            required: false,
            default: None,
            enum_values: None,
            items: None,
        }
    }

    /// Array element type, or `String` when unset
    pub fn item_type(&self) -> ParamType {
        self.items.unwrap_or(ParamType::String)
    }

    #[must_use]
    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    #[must_use]
    pub fn with_default(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }

    #[must_use]
    pub const fn with_items(mut self, item_type: ParamType) -> Self {
        self.items = Some(item_type);
        self
    }

    #[must_use]
    pub fn with_enum<I, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.enum_values = Some(values.into_iter().map(Into::into).collect());
        self
    }
}

/// Canonical tool definition
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Unique tool identifier
    pub name: String,

    /// Human-readable description (shown to the model)
    pub description: String,

    /// Parameter definitions, in declaration order
    pub parameters: Vec<ParameterSchema>,
}

impl ToolDefinition {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters: Vec::new(),
        }
    }

    #[must_use]
    pub fn param(mut self, param: ParameterSchema) -> Self {
        self.parameters.push(param);
        self
    }

    /// Names of required parameters, in declaration order
    pub fn required_names(&self) -> Vec<&str> {
        self.parameters
            .iter()
            .filter(|p| p.required)
            .map(|p| p.name.as_str())
            .collect()
    }

    /// Look up a parameter by name
    pub fn parameter(&self, name: &str) -> Option<&ParameterSchema> {
        self.parameters.iter().find(|p| p.name == name)
    }

    /// Check that every required parameter is present and non-null
    pub fn validate(&self, arguments: &Arguments) -> Result<()> {
        for param in self.parameters.iter().filter(|p| p.required) {
            match arguments.get(&param.name) {
                None | Some(Value::Null) => {
                    return Err(AgentError::ToolValidation(format!(
                        "Missing required parameter: {}",
                        param.name
                    )));
                }
                Some(_) => {}
            }
        }
        Ok(())
    }
}

/// Immutable, ordered set of tool definitions
#[derive(Clone, Debug, Default)]
pub struct ToolRegistry {
    tools: Vec<ToolDefinition>,
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    /// Build a registry snapshot. Fails on duplicate names or duplicate
    /// parameter names within one tool.
    pub fn new(tools: Vec<ToolDefinition>) -> Result<Self> {
        let mut index = HashMap::with_capacity(tools.len());

        for (pos, tool) in tools.iter().enumerate() {
            if index.insert(tool.name.clone(), pos).is_some() {
                return Err(AgentError::Config(format!("Duplicate tool name: {}", tool.name)));
            }

            let mut seen = std::collections::HashSet::new();
            for param in &tool.parameters {
                if !seen.insert(param.name.as_str()) {
                    return Err(AgentError::Config(format!(
                        "Duplicate parameter '{}' in tool {}",
                        param.name, tool.name
                    )));
                }
            }
        }

        Ok(Self { tools, index })
    }

    /// All definitions, in registration order
    pub fn list_tools(&self) -> &[ToolDefinition] {
        &self.tools
    }

    /// Get a definition by name
    pub fn get_tool(&self, name: &str) -> Result<&ToolDefinition> {
        self.index
            .get(name)
            .map(|&pos| &self.tools[pos])
            .ok_or_else(|| AgentError::UnknownTool(name.to_string()))
    }

    /// Tool names, in registration order
    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name.as_str()).collect()
    }

    /// Number of registered tools
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

/// Tool invocation request emitted by a model turn
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ToolInvocation {
    /// Provider-assigned id used to correlate the result
    pub id: String,

    /// Tool identifier
    pub name: String,

    /// Decoded arguments
    #[serde(default)]
    pub arguments: Arguments,
}

impl ToolInvocation {
    pub fn new(id: impl Into<String>, name: impl Into<String>, arguments: Arguments) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments,
        }
    }
}

/// Audit record of one executed invocation. Never mutated after creation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ToolCallRecord {
    pub tool_name: String,
    pub parameters: Arguments,
    pub result: Value,
}

impl ToolCallRecord {
    pub fn success(tool_name: impl Into<String>, parameters: Arguments, result: Value) -> Self {
        Self {
            tool_name: tool_name.into(),
            parameters,
            result,
        }
    }

    pub fn failure(tool_name: impl Into<String>, parameters: Arguments, error: impl Into<String>) -> Self {
        Self {
            tool_name: tool_name.into(),
            parameters,
            result: serde_json::json!({ "error": error.into() }),
        }
    }

    /// Error message carried by the result, if any
    pub fn error(&self) -> Option<&str> {
        self.result.get("error").and_then(Value::as_str)
    }

    pub fn is_error(&self) -> bool {
        self.error().is_some()
    }
}

/// Decode a JSON-encoded argument string.
///
/// Empty input and the literal `null` give an empty mapping. Malformed JSON
/// falls back to an empty mapping as well; the tool then rejects or defaults.
pub fn decode_arguments(raw: &str) -> Arguments {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Arguments::new();
    }

    match serde_json::from_str::<Value>(trimmed) {
        Ok(value) => arguments_from_value(value),
        Err(e) => {
            let err = AgentError::ArgumentDecode(e.to_string());
            tracing::warn!(error = %err, "Falling back to empty tool arguments");
            Arguments::new()
        }
    }
}

/// Normalize a native structured argument value into a mapping
pub fn arguments_from_value(value: Value) -> Arguments {
    match value {
        Value::Object(map) => map,
        Value::Null => Arguments::new(),
        // Some providers double-encode
        Value::String(s) => decode_arguments(&s),
        other => {
            let err = AgentError::ArgumentDecode(format!("expected an object, got {other}"));
            tracing::warn!(error = %err, "Falling back to empty tool arguments");
            Arguments::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> ToolDefinition {
        ToolDefinition::new("add_task", "Create a task")
            .param(ParameterSchema::new("title", ParamType::String, "Task title").required())
            .param(ParameterSchema::new("description", ParamType::String, "Details"))
    }

    #[test]
    fn test_tool_registry() {
        let registry = ToolRegistry::new(vec![
            sample(),
            ToolDefinition::new("list_tasks", "List tasks"),
        ])
        .unwrap();

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.names(), vec!["add_task", "list_tasks"]);
        assert!(registry.get_tool("add_task").is_ok());
        assert!(matches!(
            registry.get_tool("unknown"),
            Err(AgentError::UnknownTool(name)) if name == "unknown"
        ));
    }

    #[test]
    fn test_duplicate_tool_rejected() {
        let result = ToolRegistry::new(vec![sample(), sample()]);
        assert!(matches!(result, Err(AgentError::Config(_))));
    }

    #[test]
    fn test_validate_required() {
        let def = sample();
        assert_eq!(def.required_names(), vec!["title"]);

        let mut args = Arguments::new();
        assert!(def.validate(&args).is_err());

        args.insert("title".into(), Value::Null);
        assert!(def.validate(&args).is_err());

        args.insert("title".into(), json!("Buy milk"));
        assert!(def.validate(&args).is_ok());
    }

    #[test]
    fn test_array_item_type() {
        let tags = ParameterSchema::new("tags", ParamType::Array, "Labels");
        assert_eq!(tags.item_type(), ParamType::String);

        let ids = ParameterSchema::new("ids", ParamType::Array, "Task ids").with_items(ParamType::Integer);
        assert_eq!(ids.item_type(), ParamType::Integer);
        assert_eq!(serde_json::to_value(&ids).unwrap()["items"], "integer");
    }

    #[test]
    fn test_param_type_parsing_is_case_insensitive() {
        assert_eq!("STRING".parse::<ParamType>().unwrap(), ParamType::String);
        assert_eq!("integer".parse::<ParamType>().unwrap(), ParamType::Integer);
        assert!("decimal".parse::<ParamType>().is_err());
    }

    #[test]
    fn test_decode_arguments() {
        assert!(decode_arguments("").is_empty());
        assert!(decode_arguments("null").is_empty());
        assert!(decode_arguments("{not json").is_empty());
        assert!(decode_arguments("[1, 2]").is_empty());

        let args = decode_arguments(r#"{"title": "Buy groceries"}"#);
        assert_eq!(args.get("title"), Some(&json!("Buy groceries")));

        let args = arguments_from_value(json!("{\"task_id\": 2}"));
        assert_eq!(args.get("task_id"), Some(&json!(2)));
    }

    #[test]
    fn test_record_error_payload() {
        let record = ToolCallRecord::failure("delete_task", Arguments::new(), "Task 9 not found");
        assert!(record.is_error());
        assert_eq!(record.result, json!({"error": "Task 9 not found"}));

        let ok = ToolCallRecord::success("list_tasks", Arguments::new(), json!({"count": 0}));
        assert!(!ok.is_error());
    }
}
