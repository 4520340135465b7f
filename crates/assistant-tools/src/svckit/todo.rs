//! To-Do Tool

use async_trait::async_trait;

use assistant_core::{
    tool::ParameterSchema, Result as CoreResult, Tool, ToolCall, ToolResult, ToolSchema,
};

use crate::store::SharedStore;

const NAME: &str = "ToDo";

/// Tool for managing the to-do list
pub struct ToDoTool {
    store: SharedStore<String>,
}

impl ToDoTool {
    pub fn new(store: SharedStore<String>) -> Self {
        Self { store }
    }

    async fn add(&self, call: &ToolCall) -> ToolResult {
        let Some(task) = call.str_arg("task") else {
            return ToolResult::failure(NAME, "Error: 'task' is required to add a to-do");
        };

        match self.store.lock().await.push(task.to_string()) {
            Ok(()) => ToolResult::success(NAME, format!("Task added: {task}")),
            Err(e) => ToolResult::failure(NAME, format!("Could not save task: {e}")),
        }
    }

    async fn list(&self) -> ToolResult {
        let store = self.store.lock().await;
        if store.is_empty() {
            return ToolResult::success(NAME, "No tasks.");
        }

        let lines: Vec<String> = store
            .items()
            .iter()
            .enumerate()
            .map(|(i, task)| format!("{i}. {task}"))
            .collect();
        ToolResult::success(NAME, format!("To-do list:\n{}", lines.join("\n")))
    }

    async fn remove(&self, call: &ToolCall) -> ToolResult {
        let Some(index) = call.index_arg("index") else {
            return ToolResult::failure(NAME, "Invalid index");
        };

        match self.store.lock().await.remove(index) {
            Ok(Some(task)) => ToolResult::success(NAME, format!("Removed task: {task}")),
            Ok(None) => ToolResult::failure(NAME, "Invalid index"),
            Err(e) => ToolResult::failure(NAME, format!("Could not save tasks: {e}")),
        }
    }
}

#[async_trait]
impl Tool for ToDoTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: NAME.into(),
            description: "Manage to-do list tasks: add a task, list tasks, or remove one by its list index.".into(),
            parameters: vec![
                ParameterSchema::optional("action", "What to do (default: add)")
                    .one_of(&["add", "list", "remove", "delete"]),
                ParameterSchema::optional("task", "Task text (for add)"),
                ParameterSchema::optional("index", "Zero-based position of the task (for remove)")
                    .of_type("integer"),
            ],
            has_side_effects: true,
        }
    }

    async fn execute(&self, call: &ToolCall) -> CoreResult<ToolResult> {
        let result = match call.str_arg("action").unwrap_or("add") {
            "list" => self.list().await,
            "remove" | "delete" => self.remove(call).await,
            _ => self.add(call).await,
        };
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::JsonListStore;

    #[tokio::test]
    async fn test_tasks_keep_insertion_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("todo.json");
        let store = JsonListStore::shared(&path).unwrap();
        let tool = ToDoTool::new(store.clone());

        for task in ["buy milk", "call mom"] {
            let result = tool.execute(&ToolCall::new(NAME).with_arg("task", task)).await.unwrap();
            assert_eq!(result.output, format!("Task added: {task}"));
        }
        assert_eq!(store.lock().await.items(), ["buy milk", "call mom"]);

        let listed = tool.execute(&ToolCall::new(NAME).with_arg("action", "list")).await.unwrap();
        assert_eq!(listed.output, "To-do list:\n0. buy milk\n1. call mom");

        let removed = tool
            .execute(&ToolCall::new(NAME).with_arg("action", "remove").with_arg("index", 0))
            .await
            .unwrap();
        assert_eq!(removed.output, "Removed task: buy milk");
        assert_eq!(store.lock().await.items(), ["call mom"]);

        let reloaded: JsonListStore<String> = JsonListStore::open(&path).unwrap();
        assert_eq!(reloaded.items(), ["call mom"]);
    }

    #[tokio::test]
    async fn test_invalid_index() {
        let dir = tempfile::tempdir().unwrap();
        let tool = ToDoTool::new(JsonListStore::shared(dir.path().join("todo.json")).unwrap());

        for index in [serde_json::json!(0), serde_json::json!(-1), serde_json::json!("first")] {
            let call = ToolCall::new(NAME).with_arg("action", "delete").with_arg("index", index);
            let result = tool.execute(&call).await.unwrap();
            assert!(!result.success);
            assert_eq!(result.output, "Invalid index");
        }
    }
}
