//! Tool System
//!
//! Tools are registered once at startup and invoked by name from the
//! reasoning loop. Names are unique within a [`ToolRegistry`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{AgentError, Result};

/// Tool call request from the LLM
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Tool identifier
    #[serde(alias = "tool")]
    pub name: String,

    /// Arguments as key-value pairs
    #[serde(default)]
    pub arguments: HashMap<String, serde_json::Value>,

    /// Optional call ID for tracking
    #[serde(default)]
    pub id: Option<String>,
}

impl ToolCall {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            arguments: HashMap::new(),
            id: None,
        }
    }

    /// Add an argument
    #[must_use]
    pub fn with_arg(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.arguments.insert(key.into(), value.into());
        self
    }

    /// String argument, trimmed; empty strings count as absent
    pub fn str_arg(&self, key: &str) -> Option<&str> {
        self.arguments
            .get(key)
            .and_then(|v| v.as_str())
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Non-negative integer argument, accepting numeric strings
    pub fn index_arg(&self, key: &str) -> Option<usize> {
        match self.arguments.get(key)? {
            serde_json::Value::Number(n) => n.as_u64().and_then(|n| usize::try_from(n).ok()),
            serde_json::Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Compact JSON rendering of the arguments, used in step records and logs
    pub fn input_json(&self) -> String {
        serde_json::to_string(&self.arguments).unwrap_or_else(|_| "{}".into())
    }
}

/// Result from tool execution
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ToolResult {
    /// Tool that was called
    pub name: String,

    /// Call ID (if provided in request)
    pub id: Option<String>,

    /// Whether execution succeeded
    pub success: bool,

    /// Output (success message or error)
    pub output: String,
}

impl ToolResult {
    pub fn success(name: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: None,
            success: true,
            output: output.into(),
        }
    }

    pub fn failure(name: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: None,
            success: false,
            output: error.into(),
        }
    }

    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
}

/// Parameter definition for tool schema
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ParameterSchema {
    /// Parameter name
    pub name: String,

    /// JSON Schema type (string, integer, number, boolean)
    #[serde(rename = "type")]
    pub param_type: String,

    /// Human-readable description
    pub description: String,

    /// Whether this parameter is required
    #[serde(default)]
    pub required: bool,

    /// Enum of allowed values
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<serde_json::Value>>,
}

impl ParameterSchema {
    /// Required string parameter
    pub fn required(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            param_type: "string".into(),
            description: description.into(),
            required: true,
            enum_values: None,
        }
    }

    /// Optional string parameter
    pub fn optional(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            required: false,
            ..Self::required(name, description)
        }
    }

    #[must_use]
    pub fn of_type(mut self, param_type: impl Into<String>) -> Self {
        self.param_type = param_type.into();
        self
    }

    #[must_use]
    pub fn one_of(mut self, values: &[&str]) -> Self {
        self.enum_values = Some(values.iter().map(|v| serde_json::json!(v)).collect());
        self
    }

    /// JSON Schema fragment for function-calling APIs
    pub fn json_schema(&self) -> serde_json::Value {
        let mut schema = serde_json::json!({
            "type": self.param_type,
            "description": self.description,
        });
        if let Some(values) = &self.enum_values {
            schema["enum"] = serde_json::Value::Array(values.clone());
        }
        schema
    }

    fn accepts(&self, value: &serde_json::Value) -> bool {
        match self.param_type.as_str() {
            "string" => value.is_string(),
            "integer" => {
                value.is_u64()
                    || value.is_i64()
                    || value.as_str().is_some_and(|s| s.trim().parse::<i64>().is_ok())
            }
            "number" => value.is_number(),
            "boolean" => value.is_boolean(),
            _ => true,
        }
    }
}

/// Tool definition schema (for LLM function calling)
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ToolSchema {
    /// Unique tool identifier
    pub name: String,

    /// Human-readable description (shown to LLM)
    pub description: String,

    /// Parameter definitions
    pub parameters: Vec<ParameterSchema>,

    /// Whether tool has side effects
    #[serde(default)]
    pub has_side_effects: bool,
}

impl ToolSchema {
    /// JSON Schema object describing all parameters
    pub fn parameters_json_schema(&self) -> serde_json::Value {
        let properties: serde_json::Map<String, serde_json::Value> = self
            .parameters
            .iter()
            .map(|p| (p.name.clone(), p.json_schema()))
            .collect();
        let required: Vec<&str> = self
            .parameters
            .iter()
            .filter(|p| p.required)
            .map(|p| p.name.as_str())
            .collect();

        serde_json::json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }
}

/// Tool trait - implement to add new capabilities
///
/// Implementations should report their own failures (network, I/O,
/// credentials) as [`ToolResult::failure`] rather than as `Err`.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Get the tool's schema for LLM function calling
    fn schema(&self) -> ToolSchema;

    /// Execute the tool with given arguments
    async fn execute(&self, call: &ToolCall) -> Result<ToolResult>;

    /// Validate arguments before execution
    fn validate(&self, call: &ToolCall) -> Result<()> {
        let schema = self.schema();

        for param in &schema.parameters {
            match call.arguments.get(&param.name) {
                None | Some(serde_json::Value::Null) if param.required => {
                    return Err(AgentError::ToolValidation(format!(
                        "Missing required parameter: {}",
                        param.name
                    )));
                }
                Some(value) if !value.is_null() && !param.accepts(value) => {
                    return Err(AgentError::ToolValidation(format!(
                        "Parameter '{}' must be of type {}",
                        param.name, param.param_type
                    )));
                }
                _ => {}
            }

            if let (Some(allowed), Some(value)) = (&param.enum_values, call.arguments.get(&param.name)) {
                if !value.is_null() && !allowed.contains(value) {
                    return Err(AgentError::ToolValidation(format!(
                        "Parameter '{}' must be one of {}",
                        param.name,
                        serde_json::Value::Array(allowed.clone())
                    )));
                }
            }
        }

        Ok(())
    }
}

/// Catalog of available tools, in registration order
#[derive(Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
    order: Vec<String>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new tool
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::DuplicateTool`] if the name is already taken.
    pub fn register<T: Tool + 'static>(&mut self, tool: T) -> Result<()> {
        self.register_shared(Arc::new(tool))
    }

    /// Register a shared tool
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::DuplicateTool`] if the name is already taken.
    pub fn register_shared(&mut self, tool: Arc<dyn Tool>) -> Result<()> {
        let name = tool.schema().name;
        if self.tools.contains_key(&name) {
            return Err(AgentError::DuplicateTool(name));
        }
        self.order.push(name.clone());
        self.tools.insert(name, tool);
        Ok(())
    }

    /// Resolve a tool by name
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::ToolNotFound`] for unregistered names.
    pub fn resolve(&self, name: &str) -> Result<Arc<dyn Tool>> {
        self.tools
            .get(name)
            .cloned()
            .ok_or_else(|| AgentError::ToolNotFound(name.to_string()))
    }

    /// Get a tool by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    /// Execute a tool call
    ///
    /// # Errors
    ///
    /// Fails when the tool is unknown, the arguments do not validate, or the
    /// tool itself returns an error.
    pub async fn execute(&self, call: &ToolCall) -> Result<ToolResult> {
        let tool = self.resolve(&call.name)?;
        tool.validate(call)?;
        tool.execute(call).await
    }

    /// All tool schemas, in registration order
    pub fn list(&self) -> Vec<ToolSchema> {
        self.order
            .iter()
            .filter_map(|name| self.tools.get(name))
            .map(|t| t.schema())
            .collect()
    }

    /// Tool names, in registration order
    pub fn names(&self) -> Vec<&str> {
        self.order.iter().map(String::as_str).collect()
    }

    /// Number of registered tools
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Generate system prompt section describing available tools
    pub fn generate_prompt_section(&self) -> String {
        use std::fmt::Write;

        let mut prompt = String::from("## Available Tools\n\n");
        prompt.push_str("To use a tool, respond with one JSON block per call in this exact format:\n\n");
        prompt.push_str("```tool\n{\"tool\": \"ToolName\", \"arguments\": {\"arg\": \"value\"}}\n```\n\n");

        for schema in self.list() {
            let _ = writeln!(prompt, "### {}", schema.name);
            let _ = writeln!(prompt, "{}", schema.description);

            if !schema.parameters.is_empty() {
                prompt.push_str("**Parameters:**\n");
                for param in &schema.parameters {
                    let required = if param.required { " (required)" } else { "" };
                    let _ = writeln!(
                        prompt,
                        "- `{}` ({}){}: {}",
                        param.name, param.param_type, required, param.description
                    );
                }
            }
            prompt.push('\n');
        }

        prompt
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EchoTool {
        name: &'static str,
    }

    #[async_trait]
    impl Tool for EchoTool {
        fn schema(&self) -> ToolSchema {
            ToolSchema {
                name: self.name.into(),
                description: "Echo the input back".into(),
                parameters: vec![
                    ParameterSchema::required("text", "Text to echo"),
                    ParameterSchema::optional("mode", "Echo mode").one_of(&["plain", "loud"]),
                    ParameterSchema::optional("times", "Repeat count").of_type("integer"),
                ],
                has_side_effects: false,
            }
        }

        async fn execute(&self, call: &ToolCall) -> Result<ToolResult> {
            Ok(ToolResult::success(self.name, call.str_arg("text").unwrap_or_default()))
        }
    }

    #[test]
    fn test_resolve_registered_and_unknown() {
        let mut registry = ToolRegistry::new();
        registry.register(EchoTool { name: "Echo" }).unwrap();
        registry.register(EchoTool { name: "Shout" }).unwrap();

        assert_eq!(registry.len(), 2);
        for name in ["Echo", "Shout"] {
            assert_eq!(registry.resolve(name).unwrap().schema().name, name);
        }
        assert!(matches!(
            registry.resolve("Calendar"),
            Err(AgentError::ToolNotFound(name)) if name == "Calendar"
        ));
        assert!(registry.get("Calendar").is_none());
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let mut registry = ToolRegistry::new();
        registry.register(EchoTool { name: "Echo" }).unwrap();

        let err = registry.register(EchoTool { name: "Echo" }).unwrap_err();
        assert!(matches!(err, AgentError::DuplicateTool(_)));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_list_keeps_registration_order() {
        let mut registry = ToolRegistry::new();
        for name in ["Weather", "Reminder", "ToDo"] {
            registry.register(EchoTool { name }).unwrap();
        }

        let names: Vec<String> = registry.list().into_iter().map(|s| s.name).collect();
        assert_eq!(names, ["Weather", "Reminder", "ToDo"]);
        assert_eq!(registry.names(), ["Weather", "Reminder", "ToDo"]);
    }

    #[test]
    fn test_validation() {
        let tool = EchoTool { name: "Echo" };

        assert!(tool.validate(&ToolCall::new("Echo").with_arg("text", "hi")).is_ok());
        assert!(tool.validate(&ToolCall::new("Echo")).is_err());
        assert!(tool.validate(&ToolCall::new("Echo").with_arg("text", 42)).is_err());
        assert!(
            tool.validate(&ToolCall::new("Echo").with_arg("text", "hi").with_arg("mode", "quiet"))
                .is_err()
        );
        assert!(
            tool.validate(&ToolCall::new("Echo").with_arg("text", "hi").with_arg("times", "3"))
                .is_ok()
        );
    }

    #[test]
    fn test_call_parses_tool_alias() {
        let call: ToolCall =
            serde_json::from_str(r#"{"tool": "Weather", "arguments": {"city": "Paris"}}"#).unwrap();
        assert_eq!(call.name, "Weather");
        assert_eq!(call.str_arg("city"), Some("Paris"));
        assert_eq!(ToolCall::new("ToDo").with_arg("index", "2").index_arg("index"), Some(2));
    }

    #[test]
    fn test_prompt_section_lists_tools() {
        let mut registry = ToolRegistry::new();
        registry.register(EchoTool { name: "Echo" }).unwrap();

        let section = registry.generate_prompt_section();
        assert!(section.contains("### Echo"));
        assert!(section.contains("`text` (string) (required)"));
    }

    #[test]
    fn test_parameters_json_schema() {
        let schema = EchoTool { name: "Echo" }.schema().parameters_json_schema();
        assert_eq!(schema["required"], serde_json::json!(["text"]));
        assert_eq!(schema["properties"]["mode"]["enum"], serde_json::json!(["plain", "loud"]));
    }
}
