//! # assistant-tools
//!
//! The tools behind the personal assistant, each a thin adapter over a local
//! file or an external service:
//!
//! | Tool        | Backend                                  |
//! |-------------|------------------------------------------|
//! | `RAGSearch` | retrieval service + LLM answer synthesis |
//! | `Reminder`  | `reminders.json`                         |
//! | `ToDo`      | `todo.json`                              |
//! | `Weather`   | OpenWeatherMap                           |
//! | `WebSearch` | SerpAPI (Google)                         |
//!
//! Tools never fail past their boundary: network errors, missing keys and
//! timeouts come back as text the LLM can read.

pub mod backend;
pub mod catalog;
pub mod error;
pub mod model;
pub mod store;
pub mod svckit;

pub use catalog::{open_stores, ToolBackends};
pub use error::{Result, ToolsError};
pub use model::{DocumentChunk, Reminder, SearchHit, WeatherReport};
pub use store::{JsonListStore, SharedStore};

/// Re-export tools for easy registration
pub mod tools {
    pub use crate::svckit::{RagSearchTool, ReminderTool, ToDoTool, WeatherTool, WebSearchTool};
}

/// System prompt for the personal assistant agent
pub const ASSISTANT_PROMPT: &str = r"You are a helpful personal assistant.
Use the available tools to help the user with their requests.

## When to use which tool

- `RAGSearch` for questions about the user's uploaded documents
- `Reminder` to add a reminder (pass `message` and, if given, `time`), or to list/delete reminders
- `ToDo` to add, list or remove to-do tasks
- `Weather` for current weather in a city
- `WebSearch` for anything that needs fresh information from the web

When you need a tool, respond only with tool blocks as described below.
After receiving tool results, use them to write your answer.
If you can answer directly without tools, do so.
Be concise and friendly.";
