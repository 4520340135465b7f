//! LLM Provider Strategy Pattern
//!
//! Defines a common interface for all LLM providers (Ollama, OpenAI, etc.)
//! so the reasoning loop works with any backend without code changes.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use assistant_core::provider::{GenerationOptions, LlmProvider};
//!
//! let provider = OllamaProvider::from_config(config);
//! let completion = provider.complete(&messages, &options, &tools.list()).await?;
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

use crate::error::{AgentError, Result};
use crate::message::Message;
use crate::tool::{ToolCall, ToolSchema};

/// Configuration for LLM generation
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GenerationOptions {
    /// Model identifier (e.g., "gpt-3.5-turbo", "llama3.2")
    pub model: String,

    /// Temperature for sampling (0.0 = deterministic, 1.0 = creative)
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Maximum tokens to generate
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Top-p nucleus sampling
    #[serde(default = "default_top_p")]
    pub top_p: f32,

    /// Stop sequences
    #[serde(default)]
    pub stop_sequences: Vec<String>,
}

// Tool routing wants deterministic output
const fn default_temperature() -> f32 { 0.0 }
const fn default_max_tokens() -> u32 { 1024 }
const fn default_top_p() -> f32 { 1.0 }

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            model: "gpt-3.5-turbo".into(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            top_p: default_top_p(),
            stop_sequences: Vec::new(),
        }
    }
}

/// Response from an LLM completion
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Completion {
    /// The generated text
    pub content: String,

    /// Native tool calls requested by the model (function-calling providers)
    #[serde(default)]
    pub tool_calls: Vec<ToolCall>,

    /// Model that generated this response
    pub model: String,

    /// Token usage statistics (if available)
    pub usage: Option<TokenUsage>,

    /// Finish reason
    pub finish_reason: Option<FinishReason>,
}

impl Completion {
    /// Plain text completion
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            tool_calls: Vec::new(),
            model: String::new(),
            usage: None,
            finish_reason: Some(FinishReason::Stop),
        }
    }

    /// Completion carrying native tool calls
    pub fn with_tool_calls(tool_calls: Vec<ToolCall>) -> Self {
        Self {
            content: String::new(),
            tool_calls,
            model: String::new(),
            usage: None,
            finish_reason: Some(FinishReason::ToolUse),
        }
    }
}

/// Token usage statistics
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Reason for completion finishing
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    Stop,
    Length,
    ToolUse,
    ContentFilter,
    Error,
}

/// Information about a model
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ModelInfo {
    pub id: String,
    pub name: String,
}

/// Strategy trait for LLM providers
///
/// Implement this trait to add support for new LLM backends.
/// The agent works exclusively through this interface.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Human-readable provider name
    fn name(&self) -> &str;

    /// Check if the provider is available and configured correctly
    async fn health_check(&self) -> Result<bool>;

    /// Generate a completion from messages
    ///
    /// `tools` is the current catalog; providers with native function calling
    /// forward it, text-only providers rely on the tool section of the system
    /// prompt instead.
    async fn complete(
        &self,
        messages: &[Message],
        options: &GenerationOptions,
        tools: &[ToolSchema],
    ) -> Result<Completion>;

    /// List available models
    async fn list_models(&self) -> Result<Vec<ModelInfo>>;
}

/// Provider that replays a fixed script of completions
///
/// For tests and offline demos. Every prompt it receives is recorded.
pub struct ScriptedProvider {
    script: Mutex<VecDeque<Completion>>,
    fallback: Option<Completion>,
    prompts: Mutex<Vec<Vec<Message>>>,
}

impl ScriptedProvider {
    /// Replay `script` in order, then fail
    pub fn new(script: impl IntoIterator<Item = Completion>) -> Self {
        Self {
            script: Mutex::new(script.into_iter().collect()),
            fallback: None,
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Answer every request with the same completion
    pub fn repeating(completion: Completion) -> Self {
        Self {
            fallback: Some(completion),
            ..Self::new([])
        }
    }

    /// Number of completions requested so far
    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Every prompt received, oldest first
    pub fn prompts(&self) -> Vec<Vec<Message>> {
        self.prompts.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "Scripted"
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }

    async fn complete(
        &self,
        messages: &[Message],
        _options: &GenerationOptions,
        _tools: &[ToolSchema],
    ) -> Result<Completion> {
        self.prompts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(messages.to_vec());

        let next = self
            .script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front();

        next.or_else(|| self.fallback.clone())
            .ok_or_else(|| AgentError::Provider("scripted provider exhausted".into()))
    }

    async fn list_models(&self) -> Result<Vec<ModelInfo>> {
        Ok(vec![ModelInfo {
            id: "scripted".into(),
            name: "scripted".into(),
        }])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_options_defaults() {
        let opts = GenerationOptions::default();
        assert!(opts.temperature.abs() < f32::EPSILON);
        assert_eq!(opts.max_tokens, 1024);
        assert_eq!(opts.model, "gpt-3.5-turbo");
    }

    #[tokio::test]
    async fn test_scripted_provider_replays_then_fails() {
        let provider = ScriptedProvider::new([Completion::text("one"), Completion::text("two")]);
        let opts = GenerationOptions::default();
        let prompt = [Message::user("hi")];

        assert_eq!(provider.complete(&prompt, &opts, &[]).await.unwrap().content, "one");
        assert_eq!(provider.complete(&prompt, &opts, &[]).await.unwrap().content, "two");
        assert!(provider.complete(&prompt, &opts, &[]).await.is_err());
        assert_eq!(provider.calls(), 3);
    }

    #[tokio::test]
    async fn test_scripted_provider_repeating() {
        let provider = ScriptedProvider::repeating(Completion::text("again"));
        let opts = GenerationOptions::default();

        for _ in 0..3 {
            let completion = provider.complete(&[], &opts, &[]).await.unwrap();
            assert_eq!(completion.content, "again");
        }
    }
}
