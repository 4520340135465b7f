//! Tool catalog assembly

use std::path::Path;
use std::sync::Arc;

use assistant_core::{GenerationOptions, LlmProvider, ToolRegistry};

use crate::backend::{Retriever, SearchClient, WeatherClient};
use crate::error::Result;
use crate::model::Reminder;
use crate::store::{JsonListStore, SharedStore};
use crate::tools::{RagSearchTool, ReminderTool, ToDoTool, WeatherTool, WebSearchTool};

pub const REMINDERS_FILE: &str = "reminders.json";
pub const TODOS_FILE: &str = "todo.json";

/// Everything the five tools need
pub struct ToolBackends {
    pub reminders: SharedStore<Reminder>,
    pub todos: SharedStore<String>,
    pub weather: Arc<dyn WeatherClient>,
    pub search: Arc<dyn SearchClient>,
    pub retriever: Arc<dyn Retriever>,
}

/// Open the reminder and to-do stores under `data_dir`
///
/// # Errors
///
/// Fails if an existing file cannot be read or parsed.
pub fn open_stores(data_dir: &Path) -> Result<(SharedStore<Reminder>, SharedStore<String>)> {
    Ok((
        JsonListStore::shared(data_dir.join(REMINDERS_FILE))?,
        JsonListStore::shared(data_dir.join(TODOS_FILE))?,
    ))
}

impl ToolBackends {
    /// Register RAGSearch, Reminder, ToDo, Weather and WebSearch, in that order
    ///
    /// `provider` and `options` drive the answer synthesis of document search.
    ///
    /// # Errors
    ///
    /// Fails only on a duplicate tool name.
    pub fn into_registry(
        self,
        provider: Arc<dyn LlmProvider>,
        options: GenerationOptions,
    ) -> assistant_core::Result<ToolRegistry> {
        let mut registry = ToolRegistry::new();
        registry.register(RagSearchTool::new(self.retriever, provider, options))?;
        registry.register(ReminderTool::new(self.reminders))?;
        registry.register(ToDoTool::new(self.todos))?;
        registry.register(WeatherTool::new(self.weather))?;
        registry.register(WebSearchTool::new(self.search))?;
        Ok(registry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{StaticRetriever, StaticSearch, StaticWeather};
    use crate::ASSISTANT_PROMPT;
    use assistant_core::{
        AgentBuilder, Completion, Conversation, Role, ScriptedProvider, Session, TurnOutcome,
    };

    fn tool_block(name: &str, args: &serde_json::Value) -> String {
        format!("```tool\n{}\n```", serde_json::json!({ "tool": name, "arguments": args }))
    }

    fn backends(dir: &tempfile::TempDir) -> ToolBackends {
        let (reminders, todos) = open_stores(dir.path()).unwrap();
        ToolBackends {
            reminders,
            todos,
            weather: Arc::new(StaticWeather::new().with_city("Paris", "light rain", 14.2)),
            search: Arc::new(StaticSearch::default()),
            retriever: Arc::new(StaticRetriever::default()),
        }
    }

    fn agent_for(provider: Arc<ScriptedProvider>, backends: ToolBackends) -> assistant_core::Agent {
        let registry = backends
            .into_registry(provider.clone(), GenerationOptions::default())
            .unwrap();
        AgentBuilder::new()
            .provider(provider)
            .tools(registry)
            .system_prompt(ASSISTANT_PROMPT)
            .build()
            .unwrap()
    }

    #[test]
    fn test_registry_order() {
        let dir = tempfile::tempdir().unwrap();
        let registry = backends(&dir)
            .into_registry(Arc::new(ScriptedProvider::new([])), GenerationOptions::default())
            .unwrap();

        assert_eq!(registry.names(), ["RAGSearch", "Reminder", "ToDo", "Weather", "WebSearch"]);
        assert!(registry.resolve("Calendar").is_err());
    }

    #[tokio::test]
    async fn test_weather_question_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let provider = Arc::new(ScriptedProvider::new([
            Completion::text(tool_block("Weather", &serde_json::json!({"city": "Paris"}))),
            Completion::text("It's 14.2°C with light rain in Paris."),
        ]));
        let agent = agent_for(provider.clone(), backends(&dir));

        let report = agent
            .respond("What's the weather in Paris?", &Conversation::new())
            .await
            .unwrap();

        assert_eq!(report.outcome, TurnOutcome::Answered);
        assert_eq!(report.steps.len(), 1);
        assert_eq!(report.steps[0].tool_name, "Weather");
        assert_eq!(report.steps[0].tool_input, serde_json::json!({"city": "Paris"}));
        assert!(report.steps[0].tool_output.contains("Paris"));
        assert!(report.steps[0].tool_output.contains("14.2"));
        assert_eq!(report.answer, "It's 14.2°C with light rain in Paris.");
        assert_eq!(provider.calls(), 2);

        let observation = provider.prompts()[1].last().cloned().unwrap();
        assert_eq!(observation.role, Role::Tool);
        assert!(observation.content.contains("Weather in Paris: light rain, temperature: 14.2°C"));
    }

    #[tokio::test]
    async fn test_reminder_request_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let backends = backends(&dir);
        let reminders = backends.reminders.clone();
        let provider = Arc::new(ScriptedProvider::new([
            Completion::text(tool_block(
                "Reminder",
                &serde_json::json!({"message": "call mom", "time": "5pm"}),
            )),
            Completion::text("Reminder added: call mom at 5pm"),
        ]));
        let agent = agent_for(provider, backends);
        let mut session = Session::new();

        let report = session.submit(&agent, "remind me to call mom at 5pm").await.unwrap();

        assert_eq!(report.steps[0].tool_output, "Reminder added: call mom at 5pm");
        assert!(report.answer.contains("Reminder added: call mom at 5pm"));
        assert_eq!(
            reminders.lock().await.items(),
            [Reminder::new("call mom", Some("5pm".into()))]
        );
        assert_eq!(session.message_count(), 2);
    }

    #[tokio::test]
    async fn test_misnamed_tool_self_corrects() {
        let dir = tempfile::tempdir().unwrap();
        let backends = backends(&dir);
        let todos = backends.todos.clone();
        let provider = Arc::new(ScriptedProvider::new([
            Completion::text(tool_block("TodoList", &serde_json::json!({"task": "buy milk"}))),
            Completion::text(tool_block("ToDo", &serde_json::json!({"task": "buy milk"}))),
            Completion::text("Added buy milk to your list."),
        ]));
        let agent = agent_for(provider, backends);

        let report = agent.respond("add buy milk to my todo", &Conversation::new()).await.unwrap();

        assert_eq!(report.outcome, TurnOutcome::Answered);
        assert!(!report.steps[0].success);
        assert!(report.steps[0].tool_output.contains("Available tools"));
        assert_eq!(report.steps[1].tool_output, "Task added: buy milk");
        assert_eq!(todos.lock().await.items(), ["buy milk"]);
    }
}
