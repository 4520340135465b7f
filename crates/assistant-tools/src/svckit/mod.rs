//! Service Kit - Agent Tools
//!
//! Adapters that implement `assistant_core::Tool` for the personal assistant.

mod rag_search;
mod reminder;
mod todo;
mod weather;
mod web_search;

pub use rag_search::{RagSearchTool, DEFAULT_TOP_K};
pub use reminder::ReminderTool;
pub use todo::ToDoTool;
pub use weather::WeatherTool;
pub use web_search::WebSearchTool;
