//! HTTP retrieval backend
//!
//! Talks to a similarity-search service fronting the vector store. The
//! request is `POST {base}/search` with `{collection, query, k}` and the
//! answer is either a bare array of chunks or `{"results": [...]}`.
//! A location that is not an http(s) URL (e.g. a raw Postgres connection
//! string) is accepted at construction and reported on every search.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{http_client, Retriever, DEFAULT_HTTP_TIMEOUT};
use crate::error::{Result, ToolsError};
use crate::model::DocumentChunk;

pub struct HttpRetriever {
    http: reqwest::Client,
    base_url: String,
    collection: String,
}

#[derive(Serialize)]
struct SearchRequest<'a> {
    collection: &'a str,
    query: &'a str,
    k: usize,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SearchResponse {
    Wrapped { results: Vec<DocumentChunk> },
    Bare(Vec<DocumentChunk>),
}

impl HttpRetriever {
    /// # Errors
    ///
    /// Fails if the HTTP client cannot be built.
    pub fn new(base_url: &str, collection: impl Into<String>) -> Result<Self> {
        Self::with_timeout(base_url, collection, DEFAULT_HTTP_TIMEOUT)
    }

    /// # Errors
    ///
    /// See [`HttpRetriever::new`].
    pub fn with_timeout(base_url: &str, collection: impl Into<String>, timeout: Duration) -> Result<Self> {
        Ok(Self {
            http: http_client(timeout)?,
            base_url: base_url.trim_end_matches('/').to_string(),
            collection: collection.into(),
        })
    }

    /// Whether the configured location can be reached over HTTP
    pub fn is_http(&self) -> bool {
        self.base_url.starts_with("http://") || self.base_url.starts_with("https://")
    }
}

#[async_trait]
impl Retriever for HttpRetriever {
    async fn retrieve(&self, query: &str, k: usize) -> Result<Vec<DocumentChunk>> {
        if !self.is_http() {
            return Err(ToolsError::Config("retrieval backend must be an http(s) URL".into()));
        }

        let response = self
            .http
            .post(format!("{}/search", self.base_url))
            .json(&SearchRequest {
                collection: &self.collection,
                query,
                k,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ToolsError::from_response(response).await);
        }

        let chunks = match response.json::<SearchResponse>().await? {
            SearchResponse::Wrapped { results } | SearchResponse::Bare(results) => results,
        };
        Ok(chunks.into_iter().take(k).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_non_http_location_fails_on_search() {
        let retriever = HttpRetriever::new("postgresql://user:pw@localhost:5432/rag", "rag_docs").unwrap();
        assert!(!retriever.is_http());
        assert!(matches!(
            retriever.retrieve("vacation policy", 3).await,
            Err(ToolsError::Config(_))
        ));
    }

    #[test]
    fn test_accepts_both_response_shapes() {
        let wrapped: SearchResponse =
            serde_json::from_str(r#"{"results":[{"content":"a","source":"doc.pdf","score":0.9}]}"#).unwrap();
        let bare: SearchResponse = serde_json::from_str(r#"[{"content":"a"},{"content":"b"}]"#).unwrap();

        assert!(matches!(wrapped, SearchResponse::Wrapped { ref results } if results.len() == 1));
        assert!(matches!(bare, SearchResponse::Bare(ref results) if results.len() == 2));
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_an_error() {
        let retriever =
            HttpRetriever::with_timeout("http://127.0.0.1:1", "rag_docs", Duration::from_secs(2)).unwrap();
        assert!(retriever.retrieve("vacation policy", 3).await.is_err());
    }
}
