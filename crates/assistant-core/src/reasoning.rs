//! Reasoning Loop
//!
//! Tool-routing loop in the ReAct style. Each turn alternates between asking
//! the LLM for a decision and executing the tools it requests:
//!
//! ```text
//! AwaitingDecision ──tool calls──▶ ExecutingTool ──results──▶ AwaitingDecision
//!        │                                                        │
//!        └──answer──▶ Answered          cycles == max ──▶ StepLimitExceeded
//! ```
//!
//! Tool failures, unknown tool names and invalid arguments are fed back to the
//! LLM as observations. A reply that cannot be parsed gets one corrective
//! retry per turn.

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::error::{AgentError, Result};
use crate::message::{Conversation, Message};
use crate::provider::{Completion, GenerationOptions, LlmProvider};
use crate::tool::{Tool, ToolCall, ToolRegistry, ToolResult};

/// Answer surfaced when the step bound is reached
pub const STEP_LIMIT_ANSWER: &str =
    "I could not complete this request within the allotted reasoning steps.";

/// Answer surfaced after a second unparseable LLM reply
pub const PARSE_FAILURE_ANSWER: &str =
    "Sorry, I could not work out how to handle that request. Please try rephrasing it.";

const CORRECTIVE_PROMPT: &str = "Your previous reply could not be understood. \
Either answer the user directly in plain text, or request a tool with a block like:\n\
```tool\n{\"tool\": \"ToolName\", \"arguments\": {\"arg\": \"value\"}}\n```";

/// Agent configuration
#[derive(Clone, Debug)]
pub struct AgentConfig {
    /// System prompt template
    pub system_prompt: String,

    /// Maximum tool cycles per turn before giving up
    pub max_iterations: usize,

    /// Generation options
    pub generation: GenerationOptions,

    /// Whether to append tool descriptions to system prompt
    pub inject_tool_descriptions: bool,

    /// Upper bound on a single tool invocation
    pub tool_timeout: Duration,

    /// Tool outputs longer than this many characters are cut before they
    /// enter the prompt
    pub max_observation_chars: usize,

    /// Token budget for system prompt, prior turns and the new input
    pub max_context_tokens: u32,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            system_prompt: DEFAULT_SYSTEM_PROMPT.into(),
            max_iterations: 5,
            generation: GenerationOptions::default(),
            inject_tool_descriptions: true,
            tool_timeout: Duration::from_secs(30),
            max_observation_chars: 2000,
            max_context_tokens: 8192,
        }
    }
}

const DEFAULT_SYSTEM_PROMPT: &str = r"You are a helpful personal assistant.
Use the available tools to help the user with their requests.

When you need a tool, respond only with tool blocks as described below.
After receiving tool results, use them to write your answer.
If you can answer directly without tools, do so.
Be concise and friendly.";

/// One tool invocation within a turn
#[derive(Clone, Debug, Serialize)]
pub struct IntermediateStep {
    pub tool_name: String,
    pub tool_input: serde_json::Value,
    pub tool_output: String,
    pub success: bool,
}

/// How a turn ended
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnOutcome {
    /// The LLM produced a final answer
    Answered,
    /// The tool-cycle bound was reached first
    StepLimitExceeded,
    /// The LLM reply could not be parsed, even after a corrective retry
    ParseFailure,
    /// The provider failed; the answer carries the error
    Failed,
}

/// Result of one user turn
#[derive(Clone, Debug, Serialize)]
pub struct TurnReport {
    /// Text shown to the user
    pub answer: String,
    pub outcome: TurnOutcome,
    /// Tool invocations in execution order
    pub steps: Vec<IntermediateStep>,
    /// Number of LLM requests made
    pub llm_calls: usize,
}

/// Parsed LLM decision
#[derive(Debug, PartialEq)]
enum Decision {
    Answer(String),
    Invoke(Vec<PlannedCall>),
}

/// A requested call, with the reason it cannot run if its input is malformed
#[derive(Debug, PartialEq)]
struct PlannedCall {
    call: ToolCall,
    input: serde_json::Value,
    rejection: Option<String>,
}

impl PlannedCall {
    fn accepted(call: ToolCall) -> Self {
        let input = serde_json::Value::Object(
            call.arguments.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
        );
        Self {
            call,
            input,
            rejection: None,
        }
    }
}

/// Tool request as written in a text reply; `arguments` is checked later
#[derive(Deserialize)]
struct RequestedCall {
    #[serde(alias = "tool")]
    name: String,
    #[serde(default)]
    arguments: serde_json::Value,
    #[serde(default)]
    id: Option<String>,
}

impl RequestedCall {
    fn plan(self) -> PlannedCall {
        let call = ToolCall {
            name: self.name,
            arguments: std::collections::HashMap::new(),
            id: self.id,
        };
        match self.arguments {
            serde_json::Value::Object(map) => PlannedCall::accepted(ToolCall {
                arguments: map.into_iter().collect(),
                ..call
            }),
            serde_json::Value::Null => PlannedCall::accepted(call),
            other => PlannedCall {
                call,
                input: other,
                rejection: Some("arguments must be an object".into()),
            },
        }
    }
}

/// The main Agent struct
pub struct Agent {
    provider: Arc<dyn LlmProvider>,
    tools: Arc<ToolRegistry>,
    config: AgentConfig,
}

impl Agent {
    /// Create a new agent
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        tools: Arc<ToolRegistry>,
        config: AgentConfig,
    ) -> Self {
        Self {
            provider,
            tools,
            config,
        }
    }

    /// Build the full system prompt including tool descriptions
    fn build_system_prompt(&self) -> String {
        let mut prompt = self.config.system_prompt.clone();

        if self.config.inject_tool_descriptions && !self.tools.is_empty() {
            prompt.push_str("\n\n");
            prompt.push_str(&self.tools.generate_prompt_section());
        }

        prompt
    }

    /// Run one user turn
    ///
    /// `history` holds the prior user/assistant turns; it is read, never
    /// modified.
    ///
    /// # Errors
    ///
    /// Only provider failures propagate. Tool and parse failures are handled
    /// inside the loop.
    pub async fn respond(&self, input: &str, history: &Conversation) -> Result<TurnReport> {
        let mut prompt = Conversation::with_system_prompt(self.build_system_prompt())
            .with_max_context(self.config.max_context_tokens);
        prompt.extend(history.turns().cloned());
        prompt.push(Message::user(input));
        prompt.truncate_to_fit();

        let schemas = self.tools.list();
        let mut steps = Vec::new();
        let mut cycles = 0;
        let mut llm_calls = 0;
        let mut retried = false;

        loop {
            if cycles >= self.config.max_iterations {
                tracing::warn!(cycles, llm_calls, "Step limit reached");
                return Ok(TurnReport {
                    answer: STEP_LIMIT_ANSWER.into(),
                    outcome: TurnOutcome::StepLimitExceeded,
                    steps,
                    llm_calls,
                });
            }

            let completion = self
                .provider
                .complete(prompt.messages(), &self.config.generation, &schemas)
                .await?;
            llm_calls += 1;

            match parse_decision(&completion) {
                Ok(Decision::Answer(answer)) => {
                    tracing::info!(steps = steps.len(), llm_calls, "Turn answered");
                    return Ok(TurnReport {
                        answer,
                        outcome: TurnOutcome::Answered,
                        steps,
                        llm_calls,
                    });
                }
                Ok(Decision::Invoke(planned)) => {
                    prompt.push(Message::assistant(render_calls(&completion, &planned)));

                    for PlannedCall { call, input, rejection } in planned {
                        let result = match rejection {
                            Some(reason) => {
                                tracing::warn!(tool = %call.name, %reason, "Malformed tool request");
                                ToolResult::failure(&call.name, format!("Error: {reason}"))
                            }
                            None => self.execute_tool(&call).await,
                        };
                        let output = truncate_chars(&result.output, self.config.max_observation_chars);

                        prompt.push(Message::tool(
                            format_tool_result(&result.name, result.success, &output),
                            &call.name,
                            call.id.clone(),
                        ));
                        steps.push(IntermediateStep {
                            tool_name: call.name,
                            tool_input: input,
                            tool_output: output,
                            success: result.success,
                        });
                    }

                    cycles += 1;
                }
                Err(reason) => {
                    tracing::warn!(%reason, retried, "Unparseable LLM reply");
                    if retried {
                        return Ok(TurnReport {
                            answer: PARSE_FAILURE_ANSWER.into(),
                            outcome: TurnOutcome::ParseFailure,
                            steps,
                            llm_calls,
                        });
                    }
                    retried = true;
                    prompt.push(Message::assistant(completion.content));
                    prompt.push(Message::user(format!("{CORRECTIVE_PROMPT}\n\nProblem: {reason}")));
                }
            }
        }
    }

    /// Execute a tool call, converting every failure into a failed result
    async fn execute_tool(&self, call: &ToolCall) -> ToolResult {
        let started = Instant::now();
        tracing::debug!(tool = %call.name, input = %call.input_json(), "Executing tool");

        let result = match tokio::time::timeout(self.config.tool_timeout, self.tools.execute(call)).await {
            Ok(Ok(mut result)) => {
                result.id.clone_from(&call.id);
                result
            }
            Ok(Err(AgentError::ToolNotFound(name))) => ToolResult::failure(
                &call.name,
                format!(
                    "Error: Tool not found: {name}. Available tools: {}",
                    self.tools.names().join(", ")
                ),
            ),
            Ok(Err(e)) => ToolResult::failure(&call.name, format!("Error: {e}")),
            Err(_) => ToolResult::failure(
                &call.name,
                format!(
                    "Error: tool '{}' timed out after {}ms",
                    call.name,
                    self.config.tool_timeout.as_millis()
                ),
            ),
        };

        if !result.success {
            tracing::warn!(tool = %call.name, output = %result.output, "Tool failed");
        }
        tracing::debug!(tool = %call.name, elapsed_ms = %started.elapsed().as_millis(), "Tool finished");

        result
    }

    /// Get the tool registry
    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    /// Get the provider
    pub fn provider(&self) -> &Arc<dyn LlmProvider> {
        &self.provider
    }

    /// Get configuration
    pub const fn config(&self) -> &AgentConfig {
        &self.config
    }
}

/// Classify an LLM reply as an answer or tool requests
fn parse_decision(completion: &Completion) -> std::result::Result<Decision, String> {
    if !completion.tool_calls.is_empty() {
        let calls = completion.tool_calls.iter().cloned().map(PlannedCall::accepted).collect();
        return Ok(Decision::Invoke(with_call_ids(calls)));
    }

    let content = completion.content.trim();
    if content.is_empty() {
        return Err("empty reply".into());
    }

    let fenced = parse_fenced_calls(content)?;
    if !fenced.is_empty() {
        return Ok(Decision::Invoke(with_call_ids(fenced)));
    }

    if let Some(call) = parse_inline_tool_call(content) {
        return Ok(Decision::Invoke(with_call_ids(vec![call.plan()])));
    }

    // A bare JSON object naming a tool that failed to parse above
    if content.starts_with('{') && content.contains(r#""tool""#) {
        return Err("tool request is not valid JSON".into());
    }

    Ok(Decision::Answer(content.to_string()))
}

/// Parse every ```tool block; a block may hold one call or an array of calls
fn parse_fenced_calls(content: &str) -> std::result::Result<Vec<PlannedCall>, String> {
    const TOOL_START: &str = "```tool";
    const TOOL_END: &str = "```";

    let mut calls = Vec::new();
    let mut rest = content;

    while let Some(start_idx) = rest.find(TOOL_START) {
        let after_marker = &rest[start_idx + TOOL_START.len()..];
        let end_idx = after_marker
            .find(TOOL_END)
            .ok_or_else(|| "unterminated tool block".to_string())?;
        let json_str = after_marker[..end_idx].trim();

        let value: serde_json::Value =
            serde_json::from_str(json_str).map_err(|e| format!("invalid tool block JSON: {e}"))?;
        match value {
            serde_json::Value::Array(items) => {
                for item in items {
                    calls.push(parse_requested(item)?);
                }
            }
            other => calls.push(parse_requested(other)?),
        }

        rest = &after_marker[end_idx + TOOL_END.len()..];
    }

    Ok(calls)
}

fn parse_requested(value: serde_json::Value) -> std::result::Result<PlannedCall, String> {
    serde_json::from_value::<RequestedCall>(value)
        .map(RequestedCall::plan)
        .map_err(|e| format!("invalid tool call: {e}"))
}

/// Try to parse an inline JSON object with a "tool" field
fn parse_inline_tool_call(content: &str) -> Option<RequestedCall> {
    if !content.contains(r#""tool""#) {
        return None;
    }

    let start = content.find('{')?;
    let end = content.rfind('}')?;
    if end <= start {
        return None;
    }

    serde_json::from_str(&content[start..=end]).ok()
}

fn with_call_ids(calls: Vec<PlannedCall>) -> Vec<PlannedCall> {
    calls
        .into_iter()
        .map(|mut planned| {
            if planned.call.id.is_none() {
                planned.call.id = Some(uuid::Uuid::new_v4().to_string());
            }
            planned
        })
        .collect()
}

/// Assistant message recorded for a tool-requesting reply
fn render_calls(completion: &Completion, calls: &[PlannedCall]) -> String {
    if completion.tool_calls.is_empty() {
        return completion.content.clone();
    }

    let mut rendered = completion.content.trim().to_string();
    for PlannedCall { call, input, .. } in calls {
        let body = serde_json::json!({ "tool": call.name, "arguments": input });
        if !rendered.is_empty() {
            rendered.push('\n');
        }
        rendered.push_str(&format!("```tool\n{body}\n```"));
    }
    rendered
}

/// Format tool result for conversation
fn format_tool_result(name: &str, success: bool, output: &str) -> String {
    if success {
        format!("[Tool '{name}' returned]\n{output}")
    } else {
        format!("[Tool '{name}' failed]\n{output}")
    }
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

/// Builder for Agent configuration
pub struct AgentBuilder {
    provider: Option<Arc<dyn LlmProvider>>,
    tools: ToolRegistry,
    config: AgentConfig,
    error: Option<AgentError>,
}

impl Default for AgentBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl AgentBuilder {
    pub fn new() -> Self {
        Self {
            provider: None,
            tools: ToolRegistry::new(),
            config: AgentConfig::default(),
            error: None,
        }
    }

    #[must_use]
    pub fn provider(mut self, provider: Arc<dyn LlmProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    #[must_use]
    pub fn tool<T: Tool + 'static>(mut self, tool: T) -> Self {
        if let Err(e) = self.tools.register(tool) {
            self.error.get_or_insert(e);
        }
        self
    }

    #[must_use]
    pub fn tools(mut self, tools: ToolRegistry) -> Self {
        self.tools = tools;
        self
    }

    #[must_use]
    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.system_prompt = prompt.into();
        self
    }

    #[must_use]
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.generation.model = model.into();
        self
    }

    #[must_use]
    pub const fn temperature(mut self, temp: f32) -> Self {
        self.config.generation.temperature = temp;
        self
    }

    #[must_use]
    pub const fn max_iterations(mut self, max: usize) -> Self {
        self.config.max_iterations = max;
        self
    }

    #[must_use]
    pub const fn tool_timeout(mut self, timeout: Duration) -> Self {
        self.config.tool_timeout = timeout;
        self
    }

    #[must_use]
    pub const fn max_observation_chars(mut self, max: usize) -> Self {
        self.config.max_observation_chars = max;
        self
    }

    /// # Errors
    ///
    /// Fails without a provider, or if two tools shared a name.
    pub fn build(self) -> Result<Agent> {
        if let Some(e) = self.error {
            return Err(e);
        }
        let provider = self
            .provider
            .ok_or_else(|| AgentError::Config("Provider is required".into()))?;

        Ok(Agent::new(provider, Arc::new(self.tools), self.config))
    }
}
