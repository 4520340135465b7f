//! Static backends
//!
//! For tests and offline demos. Return fixed data without network access.

use std::collections::HashMap;

use async_trait::async_trait;

use super::{Retriever, SearchClient, WeatherClient};
use crate::error::{Result, ToolsError};
use crate::model::{DocumentChunk, SearchHit, WeatherReport};

/// Weather for a fixed set of cities
#[derive(Default)]
pub struct StaticWeather {
    cities: HashMap<String, WeatherReport>,
}

impl StaticWeather {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_city(mut self, city: &str, description: &str, temperature: f64) -> Self {
        self.cities.insert(
            city.to_lowercase(),
            WeatherReport {
                description: description.into(),
                temperature,
            },
        );
        self
    }
}

#[async_trait]
impl WeatherClient for StaticWeather {
    async fn current(&self, city: &str) -> Result<WeatherReport> {
        self.cities
            .get(&city.to_lowercase())
            .cloned()
            .ok_or_else(|| ToolsError::Upstream {
                status: 404,
                body: "city not found".into(),
            })
    }
}

/// Search engine returning the same hits for every query
#[derive(Default)]
pub struct StaticSearch {
    hits: Vec<SearchHit>,
}

impl StaticSearch {
    pub const fn new(hits: Vec<SearchHit>) -> Self {
        Self { hits }
    }
}

#[async_trait]
impl SearchClient for StaticSearch {
    async fn search(&self, _query: &str, limit: usize) -> Result<Vec<SearchHit>> {
        Ok(self.hits.iter().take(limit).cloned().collect())
    }
}

/// Retriever returning the same chunks for every query
#[derive(Default)]
pub struct StaticRetriever {
    chunks: Vec<DocumentChunk>,
}

impl StaticRetriever {
    pub const fn new(chunks: Vec<DocumentChunk>) -> Self {
        Self { chunks }
    }
}

#[async_trait]
impl Retriever for StaticRetriever {
    async fn retrieve(&self, _query: &str, k: usize) -> Result<Vec<DocumentChunk>> {
        Ok(self.chunks.iter().take(k).cloned().collect())
    }
}
