//! Reminder Tool
//!
//! Adds, lists and deletes reminders kept in a JSON file.

use async_trait::async_trait;

use assistant_core::{
    tool::ParameterSchema, Result as CoreResult, Tool, ToolCall, ToolResult, ToolSchema,
};

use crate::model::Reminder;
use crate::store::SharedStore;

const NAME: &str = "Reminder";

/// Tool for managing reminders
pub struct ReminderTool {
    store: SharedStore<Reminder>,
}

impl ReminderTool {
    pub fn new(store: SharedStore<Reminder>) -> Self {
        Self { store }
    }

    async fn add(&self, call: &ToolCall) -> ToolResult {
        let Some(message) = call.str_arg("message") else {
            return ToolResult::failure(NAME, "Error: 'message' is required to add a reminder");
        };
        let reminder = Reminder::new(message, call.str_arg("time").map(str::to_string));
        let confirmation = format!("Reminder added: {reminder}");

        match self.store.lock().await.push(reminder) {
            Ok(()) => ToolResult::success(NAME, confirmation),
            Err(e) => ToolResult::failure(NAME, format!("Could not save reminder: {e}")),
        }
    }

    async fn list(&self) -> ToolResult {
        let store = self.store.lock().await;
        if store.is_empty() {
            return ToolResult::success(NAME, "No reminders.");
        }

        let lines: Vec<String> = store
            .items()
            .iter()
            .enumerate()
            .map(|(i, r)| format!("{i}. {r}"))
            .collect();
        ToolResult::success(NAME, format!("Reminders:\n{}", lines.join("\n")))
    }

    async fn delete(&self, call: &ToolCall) -> ToolResult {
        let Some(index) = call.index_arg("index") else {
            return ToolResult::failure(NAME, "Invalid index");
        };

        match self.store.lock().await.remove(index) {
            Ok(Some(removed)) => ToolResult::success(NAME, format!("Deleted reminder: {}", removed.message)),
            Ok(None) => ToolResult::failure(NAME, "Invalid index"),
            Err(e) => ToolResult::failure(NAME, format!("Could not save reminders: {e}")),
        }
    }
}

#[async_trait]
impl Tool for ReminderTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: NAME.into(),
            description: "Add a reminder for the user. Also lists reminders or deletes one by its list index.".into(),
            parameters: vec![
                ParameterSchema::optional("action", "What to do (default: add)")
                    .one_of(&["add", "list", "delete"]),
                ParameterSchema::optional("message", "What to be reminded about (for add)"),
                ParameterSchema::optional("time", "When, in the user's words, e.g. '5pm' (for add)"),
                ParameterSchema::optional("index", "Zero-based position of the reminder (for delete)")
                    .of_type("integer"),
            ],
            has_side_effects: true,
        }
    }

    async fn execute(&self, call: &ToolCall) -> CoreResult<ToolResult> {
        let result = match call.str_arg("action").unwrap_or("add") {
            "list" => self.list().await,
            "delete" => self.delete(call).await,
            _ => self.add(call).await,
        };
        Ok(result)
    }
}
