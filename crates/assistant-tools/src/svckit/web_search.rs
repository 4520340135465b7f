//! Web Search Tool

use std::fmt::Write;
use std::sync::Arc;

use async_trait::async_trait;

use assistant_core::{
    tool::ParameterSchema, Result as CoreResult, Tool, ToolCall, ToolResult, ToolSchema,
};

use crate::backend::SearchClient;
use crate::model::SearchHit;

const NAME: &str = "WebSearch";
const RESULT_LIMIT: usize = 3;

/// Tool for searching the web
pub struct WebSearchTool {
    client: Arc<dyn SearchClient>,
}

impl WebSearchTool {
    pub fn new(client: Arc<dyn SearchClient>) -> Self {
        Self { client }
    }
}

fn render_hits(hits: &[SearchHit]) -> String {
    let mut out = String::new();
    for (i, hit) in hits.iter().enumerate() {
        let _ = writeln!(out, "{}. {}\n   {}", i + 1, hit.title, hit.link);
        if !hit.snippet.is_empty() {
            let _ = writeln!(out, "   {}", hit.snippet);
        }
    }
    out.trim_end().to_string()
}

#[async_trait]
impl Tool for WebSearchTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: NAME.into(),
            description: "Search the web for information not in uploaded documents.".into(),
            parameters: vec![ParameterSchema::required("query", "Search query")],
            has_side_effects: false,
        }
    }

    async fn execute(&self, call: &ToolCall) -> CoreResult<ToolResult> {
        let Some(query) = call.str_arg("query") else {
            return Ok(ToolResult::failure(NAME, "Error: 'query' must not be empty"));
        };

        let result = match self.client.search(query, RESULT_LIMIT).await {
            Ok(hits) if hits.is_empty() => {
                ToolResult::success(NAME, format!("No web results found for: {query}"))
            }
            Ok(hits) => ToolResult::success(NAME, render_hits(&hits)),
            Err(e) => {
                tracing::warn!(query, error = %e, "Web search failed");
                ToolResult::failure(NAME, format!("Web search failed: {e}"))
            }
        };
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{SerpApiClient, StaticSearch};
    use std::time::Duration;

    fn hit(n: usize) -> SearchHit {
        SearchHit {
            title: format!("Result {n}"),
            link: format!("https://example.com/{n}"),
            snippet: if n == 2 { String::new() } else { format!("Snippet {n}") },
        }
    }

    #[tokio::test]
    async fn test_returns_top_three() {
        let tool = WebSearchTool::new(Arc::new(StaticSearch::new((1..=5).map(hit).collect())));

        let result = tool.execute(&ToolCall::new(NAME).with_arg("query", "rust")).await.unwrap();
        assert_eq!(
            result.output,
            "1. Result 1\n   https://example.com/1\n   Snippet 1\n\
             2. Result 2\n   https://example.com/2\n\
             3. Result 3\n   https://example.com/3\n   Snippet 3"
        );
    }

    #[tokio::test]
    async fn test_no_results() {
        let tool = WebSearchTool::new(Arc::new(StaticSearch::default()));
        let result = tool.execute(&ToolCall::new(NAME).with_arg("query", "zzqx")).await.unwrap();
        assert_eq!(result.output, "No web results found for: zzqx");
    }

    #[tokio::test]
    async fn test_failure_returns_text() {
        let client =
            SerpApiClient::with_endpoint("key", "http://127.0.0.1:1/search.json", Duration::from_secs(2)).unwrap();
        let tool = WebSearchTool::new(Arc::new(client));

        let result = tool.execute(&ToolCall::new(NAME).with_arg("query", "rust")).await.unwrap();
        assert!(!result.success);
        assert!(result.output.starts_with("Web search failed: "));
    }
}
