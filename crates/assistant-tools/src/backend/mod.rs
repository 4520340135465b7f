//! External Backends
//!
//! Clients the tools call out to. Each concern sits behind a trait so the
//! tools can be exercised against the static doubles in [`mock`].

mod mock;
mod openweather;
mod retrieval;
mod serpapi;

pub use mock::{StaticRetriever, StaticSearch, StaticWeather};
pub use openweather::OpenWeatherClient;
pub use retrieval::HttpRetriever;
pub use serpapi::SerpApiClient;

use std::time::Duration;

use async_trait::async_trait;

use crate::error::{Result, ToolsError};
use crate::model::{DocumentChunk, SearchHit, WeatherReport};

/// Timeout applied to every backend HTTP client
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Current-weather lookup
#[async_trait]
pub trait WeatherClient: Send + Sync {
    async fn current(&self, city: &str) -> Result<WeatherReport>;
}

/// Web search engine
#[async_trait]
pub trait SearchClient: Send + Sync {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>>;
}

/// Similarity search over a pre-indexed document collection
#[async_trait]
pub trait Retriever: Send + Sync {
    async fn retrieve(&self, query: &str, k: usize) -> Result<Vec<DocumentChunk>>;
}

pub(crate) fn http_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| ToolsError::Config(format!("HTTP client: {e}")))
}
