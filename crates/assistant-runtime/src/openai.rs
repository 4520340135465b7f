//! OpenAI LLM Provider
//!
//! `LlmProvider` over the OpenAI chat-completions API (or any compatible
//! endpoint). The tool catalog is sent as function definitions so the model
//! can answer with native tool calls.

use std::collections::HashMap;
use std::time::Duration;

use assistant_core::{
    error::{AgentError, Result},
    message::{Message, Role},
    provider::{Completion, FinishReason, GenerationOptions, LlmProvider, ModelInfo, TokenUsage},
    tool::{ToolCall, ToolSchema},
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// OpenAI provider configuration
#[derive(Clone, Debug)]
pub struct OpenAiConfig {
    /// API key sent as a bearer token
    pub api_key: String,

    /// API base URL, without trailing slash
    pub base_url: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl OpenAiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: "https://api.openai.com/v1".into(),
            timeout_secs: 60,
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }
}

/// OpenAI LLM provider
pub struct OpenAiProvider {
    http: reqwest::Client,
    config: OpenAiConfig,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
    top_p: f32,
    #[serde(skip_serializing_if = "no_stop_sequences")]
    stop: &'a [String],
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<WireTool<'a>>,
}

const fn no_stop_sequences(stop: &&[String]) -> bool {
    stop.is_empty()
}

#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct WireTool<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    function: WireFunction<'a>,
}

#[derive(Debug, Serialize)]
struct WireFunction<'a> {
    name: &'a str,
    description: &'a str,
    parameters: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    model: String,
    choices: Vec<Choice>,
    usage: Option<WireUsage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
    #[serde(default)]
    tool_calls: Vec<WireToolCall>,
}

#[derive(Debug, Deserialize)]
struct WireToolCall {
    id: String,
    function: WireFunctionCall,
}

#[derive(Debug, Deserialize)]
struct WireFunctionCall {
    name: String,
    arguments: String,
}

#[derive(Debug, Deserialize)]
struct WireUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ModelList {
    data: Vec<ModelEntry>,
}

#[derive(Debug, Deserialize)]
struct ModelEntry {
    id: String,
}

impl OpenAiProvider {
    /// Create from configuration
    ///
    /// # Errors
    ///
    /// Fails if the HTTP client cannot be built.
    pub fn from_config(config: OpenAiConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AgentError::Config(format!("HTTP client: {e}")))?;

        Ok(Self { http, config })
    }

    fn build_request<'a>(
        messages: &'a [Message],
        options: &'a GenerationOptions,
        tools: &'a [ToolSchema],
    ) -> ChatRequest<'a> {
        ChatRequest {
            model: &options.model,
            messages: messages
                .iter()
                .map(|m| WireMessage {
                    role: match m.role {
                        Role::System => "system",
                        Role::Assistant => "assistant",
                        // Tool results are threaded as plain text context
                        Role::User | Role::Tool => "user",
                    },
                    content: &m.content,
                })
                .collect(),
            temperature: options.temperature,
            max_tokens: options.max_tokens,
            top_p: options.top_p,
            stop: &options.stop_sequences,
            tools: tools
                .iter()
                .map(|t| WireTool {
                    kind: "function",
                    function: WireFunction {
                        name: &t.name,
                        description: &t.description,
                        parameters: t.parameters_json_schema(),
                    },
                })
                .collect(),
        }
    }

    fn convert_response(response: ChatResponse) -> Result<Completion> {
        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| AgentError::Provider("response has no choices".into()))?;

        let tool_calls = choice
            .message
            .tool_calls
            .into_iter()
            .map(|tc| {
                let arguments: HashMap<String, serde_json::Value> =
                    serde_json::from_str(&tc.function.arguments).unwrap_or_else(|e| {
                        // Empty arguments fail validation and reach the model as an error
                        tracing::warn!(tool = %tc.function.name, error = %e, "Malformed tool arguments");
                        HashMap::new()
                    });
                ToolCall {
                    name: tc.function.name,
                    arguments,
                    id: Some(tc.id),
                }
            })
            .collect();

        let finish_reason = choice.finish_reason.as_deref().map(|reason| match reason {
            "length" => FinishReason::Length,
            "tool_calls" | "function_call" => FinishReason::ToolUse,
            "content_filter" => FinishReason::ContentFilter,
            _ => FinishReason::Stop,
        });

        Ok(Completion {
            content: choice.message.content.unwrap_or_default(),
            tool_calls,
            model: response.model,
            usage: response.usage.map(|u| TokenUsage {
                prompt_tokens: u.prompt_tokens,
                completion_tokens: u.completion_tokens,
                total_tokens: u.total_tokens,
            }),
            finish_reason,
        })
    }

    fn map_transport_error(&self, err: &reqwest::Error) -> AgentError {
        if err.is_timeout() {
            AgentError::ProviderTimeout(self.config.timeout_secs)
        } else if err.is_connect() {
            AgentError::ProviderUnavailable(err.to_string())
        } else {
            AgentError::Provider(err.to_string())
        }
    }

    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(status_error(status.as_u16(), &body))
    }
}

/// Map an HTTP error status to an agent error
fn status_error(status: u16, body: &str) -> AgentError {
    let detail = format!("HTTP {status}: {}", body.chars().take(300).collect::<String>());
    match status {
        401 | 403 => AgentError::Auth(detail),
        429 => AgentError::RateLimited(detail),
        500..=599 => AgentError::ProviderUnavailable(detail),
        _ => AgentError::Provider(detail),
    }
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    fn name(&self) -> &str {
        "OpenAI"
    }

    async fn health_check(&self) -> Result<bool> {
        match self.list_models().await {
            Ok(_) => Ok(true),
            Err(e) => {
                tracing::warn!("OpenAI health check failed: {}", e);
                Ok(false)
            }
        }
    }

    async fn complete(
        &self,
        messages: &[Message],
        options: &GenerationOptions,
        tools: &[ToolSchema],
    ) -> Result<Completion> {
        let request = Self::build_request(messages, options, tools);

        let response = self
            .http
            .post(format!("{}/chat/completions", self.config.base_url))
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.map_transport_error(&e))?;

        let body: ChatResponse = Self::check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| AgentError::Provider(format!("invalid response body: {e}")))?;

        Self::convert_response(body)
    }

    async fn list_models(&self) -> Result<Vec<ModelInfo>> {
        let response = self
            .http
            .get(format!("{}/models", self.config.base_url))
            .bearer_auth(&self.config.api_key)
            .send()
            .await
            .map_err(|e| self.map_transport_error(&e))?;

        let list: ModelList = Self::check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| AgentError::Provider(format!("invalid response body: {e}")))?;

        Ok(list
            .data
            .into_iter()
            .map(|m| ModelInfo {
                name: m.id.clone(),
                id: m.id,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assistant_core::tool::ParameterSchema;

    fn weather_schema() -> ToolSchema {
        ToolSchema {
            name: "Weather".into(),
            description: "Get current weather for a city.".into(),
            parameters: vec![ParameterSchema::required("city", "City name")],
            has_side_effects: false,
        }
    }

    #[test]
    fn test_request_body() {
        let messages = vec![
            Message::system("You are helpful."),
            Message::user("Weather in Paris?"),
            Message::tool("[Tool 'Weather' returned]\nsunny", "Weather", None),
        ];
        let options = GenerationOptions::default();
        let tools = vec![weather_schema()];

        let body = serde_json::to_value(OpenAiProvider::build_request(&messages, &options, &tools)).unwrap();

        assert_eq!(body["model"], "gpt-3.5-turbo");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][2]["role"], "user");
        assert_eq!(body["tools"][0]["type"], "function");
        assert_eq!(body["tools"][0]["function"]["name"], "Weather");
        assert_eq!(body["tools"][0]["function"]["parameters"]["required"][0], "city");
        assert!(body.get("stop").is_none());
    }

    #[test]
    fn test_request_body_without_tools() {
        let options = GenerationOptions::default();
        let body = serde_json::to_value(OpenAiProvider::build_request(&[], &options, &[])).unwrap();
        assert!(body.get("tools").is_none());
    }

    #[test]
    fn test_convert_tool_call_response() {
        let response: ChatResponse = serde_json::from_value(serde_json::json!({
            "model": "gpt-3.5-turbo-0125",
            "choices": [{
                "message": {
                    "content": null,
                    "tool_calls": [
                        {"id": "call_1", "type": "function",
                         "function": {"name": "Weather", "arguments": "{\"city\": \"Paris\"}"}},
                        {"id": "call_2", "type": "function",
                         "function": {"name": "ToDo", "arguments": "{not json"}}
                    ]
                },
                "finish_reason": "tool_calls"
            }],
            "usage": {"prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15}
        }))
        .unwrap();

        let completion = OpenAiProvider::convert_response(response).unwrap();
        assert_eq!(completion.content, "");
        assert_eq!(completion.finish_reason, Some(FinishReason::ToolUse));
        assert_eq!(completion.tool_calls.len(), 2);
        assert_eq!(completion.tool_calls[0].str_arg("city"), Some("Paris"));
        assert_eq!(completion.tool_calls[0].id.as_deref(), Some("call_1"));
        assert!(completion.tool_calls[1].arguments.is_empty());
        assert_eq!(completion.usage.unwrap().total_tokens, 15);
    }

    #[test]
    fn test_convert_text_response() {
        let response: ChatResponse = serde_json::from_value(serde_json::json!({
            "model": "gpt-3.5-turbo",
            "choices": [{"message": {"content": "Hello!"}, "finish_reason": "stop"}]
        }))
        .unwrap();

        let completion = OpenAiProvider::convert_response(response).unwrap();
        assert_eq!(completion.content, "Hello!");
        assert!(completion.tool_calls.is_empty());
    }

    #[test]
    fn test_empty_choices_is_error() {
        let response: ChatResponse =
            serde_json::from_value(serde_json::json!({"model": "m", "choices": []})).unwrap();
        assert!(OpenAiProvider::convert_response(response).is_err());
    }

    #[test]
    fn test_status_mapping() {
        assert!(matches!(status_error(401, "bad key"), AgentError::Auth(_)));
        assert!(matches!(status_error(429, ""), AgentError::RateLimited(_)));
        assert!(matches!(status_error(503, ""), AgentError::ProviderUnavailable(_)));
        assert!(matches!(status_error(400, ""), AgentError::Provider(_)));
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let config = OpenAiConfig::new("sk-test").with_base_url("http://localhost:8080/v1/");
        assert_eq!(config.base_url, "http://localhost:8080/v1");
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_an_error() {
        let mut config = OpenAiConfig::new("sk-test").with_base_url("http://127.0.0.1:1/v1");
        config.timeout_secs = 2;
        let provider = OpenAiProvider::from_config(config).unwrap();

        let result = provider
            .complete(&[Message::user("hi")], &GenerationOptions::default(), &[])
            .await;
        assert!(matches!(
            result,
            Err(AgentError::ProviderUnavailable(_) | AgentError::ProviderTimeout(_) | AgentError::Provider(_))
        ));
        assert!(!provider.health_check().await.unwrap());
    }
}
