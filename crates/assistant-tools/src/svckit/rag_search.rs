//! Document Search Tool
//!
//! Retrieval-augmented answering: fetch the top chunks for the query, then
//! ask the LLM to answer from those chunks alone.

use std::fmt::Write;
use std::sync::Arc;

use async_trait::async_trait;

use assistant_core::{
    tool::ParameterSchema, GenerationOptions, LlmProvider, Message, Result as CoreResult, Tool,
    ToolCall, ToolResult, ToolSchema,
};

use crate::backend::Retriever;
use crate::model::DocumentChunk;

const NAME: &str = "RAGSearch";

/// Chunks retrieved per query
pub const DEFAULT_TOP_K: usize = 3;

const ANSWER_INSTRUCTIONS: &str = "Use the following pieces of context to answer the question at the end. \
If you don't know the answer, just say that you don't know, don't try to make up an answer.";

/// Tool answering questions from the indexed documents
pub struct RagSearchTool {
    retriever: Arc<dyn Retriever>,
    provider: Arc<dyn LlmProvider>,
    options: GenerationOptions,
    top_k: usize,
}

impl RagSearchTool {
    pub fn new(retriever: Arc<dyn Retriever>, provider: Arc<dyn LlmProvider>, options: GenerationOptions) -> Self {
        Self {
            retriever,
            provider,
            options,
            top_k: DEFAULT_TOP_K,
        }
    }

    fn build_prompt(question: &str, chunks: &[DocumentChunk]) -> Vec<Message> {
        let mut context = String::from(ANSWER_INSTRUCTIONS);
        context.push_str("\n\n");
        for chunk in chunks {
            let _ = writeln!(context, "{}\n", chunk.content.trim());
        }

        vec![
            Message::system(context.trim_end()),
            Message::user(format!("Question: {question}\nHelpful Answer:")),
        ]
    }
}

#[async_trait]
impl Tool for RagSearchTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: NAME.into(),
            description: "Use this tool to answer questions based on uploaded documents.".into(),
            parameters: vec![ParameterSchema::required("query", "Question about the documents")],
            has_side_effects: false,
        }
    }

    async fn execute(&self, call: &ToolCall) -> CoreResult<ToolResult> {
        let Some(query) = call.str_arg("query") else {
            return Ok(ToolResult::failure(NAME, "Error: 'query' must not be empty"));
        };

        let chunks = match self.retriever.retrieve(query, self.top_k).await {
            Ok(chunks) if chunks.is_empty() => {
                return Ok(ToolResult::success(NAME, format!("No relevant documents found for: {query}")));
            }
            Ok(chunks) => chunks,
            Err(e) => {
                tracing::warn!(query, error = %e, "Document retrieval failed");
                return Ok(ToolResult::failure(NAME, format!("Document search failed: {e}")));
            }
        };
        tracing::debug!(query, chunks = chunks.len(), "Retrieved document chunks");

        let prompt = Self::build_prompt(query, &chunks);
        let result = match self.provider.complete(&prompt, &self.options, &[]).await {
            Ok(completion) => ToolResult::success(NAME, completion.content.trim()),
            Err(e) => {
                tracing::warn!(query, error = %e, "Document answer synthesis failed");
                ToolResult::failure(NAME, format!("Document search failed: {e}"))
            }
        };
        Ok(result)
    }
}
