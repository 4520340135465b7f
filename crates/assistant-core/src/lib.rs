//! # assistant-core
//!
//! Tool-routing core of the personal assistant: a provider-agnostic LLM
//! abstraction, the tool catalog, the bounded reasoning loop and chat sessions.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Session (history)                                          │
//! │     │ one turn per submission                               │
//! │  ┌──▼──────────┐  ┌─────────────┐  ┌─────────────────────┐  │
//! │  │  Reasoning  │  │    Tool     │  │   LlmProvider       │  │
//! │  │    Loop     │──│   Registry  │  │   (Strategy)        │  │
//! │  └─────────────┘  └─────────────┘  └─────────────────────┘  │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! The `LlmProvider` trait enables swapping between OpenAI, Ollama or a
//! scripted test double without changing agent logic.

pub mod error;
pub mod message;
pub mod provider;
pub mod reasoning;
pub mod session;
pub mod tool;

pub use error::{AgentError, Result};
pub use message::{Conversation, Message, Role};
pub use provider::{Completion, GenerationOptions, LlmProvider, ScriptedProvider};
pub use reasoning::{Agent, AgentBuilder, AgentConfig, IntermediateStep, TurnOutcome, TurnReport};
pub use session::{Session, SessionId};
pub use tool::{ParameterSchema, Tool, ToolCall, ToolRegistry, ToolResult, ToolSchema};
