//! SerpAPI Google search client

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use super::{http_client, SearchClient, DEFAULT_HTTP_TIMEOUT};
use crate::error::{Result, ToolsError};
use crate::model::SearchHit;

const DEFAULT_ENDPOINT: &str = "https://serpapi.com/search.json";

pub struct SerpApiClient {
    http: reqwest::Client,
    api_key: String,
    endpoint: String,
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    organic_results: Vec<SearchHit>,
    error: Option<String>,
}

impl SerpApiClient {
    /// # Errors
    ///
    /// Fails if the HTTP client cannot be built.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_endpoint(api_key, DEFAULT_ENDPOINT, DEFAULT_HTTP_TIMEOUT)
    }

    /// # Errors
    ///
    /// Fails if the HTTP client cannot be built.
    pub fn with_endpoint(api_key: impl Into<String>, endpoint: &str, timeout: Duration) -> Result<Self> {
        Ok(Self {
            http: http_client(timeout)?,
            api_key: api_key.into(),
            endpoint: endpoint.to_string(),
        })
    }
}

#[async_trait]
impl SearchClient for SerpApiClient {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>> {
        let num = limit.to_string();
        let response = self
            .http
            .get(&self.endpoint)
            .query(&[
                ("engine", "google"),
                ("q", query),
                ("num", num.as_str()),
                ("api_key", self.api_key.as_str()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ToolsError::from_response(response).await);
        }

        let body: SearchResponse = response.json().await?;
        if let Some(error) = body.error {
            // "Google hasn't returned any results" arrives as an error field
            if body.organic_results.is_empty() && error.contains("hasn't returned any results") {
                return Ok(Vec::new());
            }
            return Err(ToolsError::InvalidResponse(error));
        }

        Ok(body.organic_results.into_iter().take(limit).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_organic_results() {
        let body: SearchResponse = serde_json::from_str(
            r#"{"search_metadata":{"status":"Success"},
                "organic_results":[
                    {"position":1,"title":"Rust","link":"https://www.rust-lang.org","snippet":"A language"},
                    {"position":2,"title":"Docs","link":"https://doc.rust-lang.org"}
                ]}"#,
        )
        .unwrap();
        assert_eq!(body.organic_results.len(), 2);
        assert_eq!(body.organic_results[1].snippet, "");
        assert!(body.error.is_none());
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_error_hides_api_key() {
        let client =
            SerpApiClient::with_endpoint("serp-secret-456", "http://127.0.0.1:1/search.json", Duration::from_secs(2))
                .unwrap();
        let err = client.search("rust", 3).await.unwrap_err();
        assert!(matches!(err, ToolsError::Network(_)));
        assert!(!err.to_string().contains("serp-secret-456"), "{err}");
    }
}
