//! # assistant-runtime
//!
//! LLM providers for the personal assistant.
//!
//! ## Providers
//!
//! - **OpenAI** (default at the server): chat completions with native tool calling
//! - **Ollama**: local inference, tools requested through the fenced prompt protocol
//!
//! ## Usage
//!
//! ```rust,ignore
//! use assistant_runtime::openai::{OpenAiConfig, OpenAiProvider};
//!
//! let provider = OpenAiProvider::from_config(OpenAiConfig::new(api_key))?;
//! let agent = AgentBuilder::new()
//!     .provider(Arc::new(provider))
//!     .build()?;
//! ```

#[cfg(feature = "ollama")]
pub mod ollama;
pub mod openai;

#[cfg(feature = "ollama")]
pub use ollama::{OllamaConfig, OllamaProvider};
pub use openai::{OpenAiConfig, OpenAiProvider};

// Re-export core types for convenience
pub use assistant_core::{
    AgentError, Completion, GenerationOptions, LlmProvider, Message, Result, Role,
};
