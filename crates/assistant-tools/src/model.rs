//! Domain records shared by the tools and their backends

use serde::{Deserialize, Serialize};

/// A stored reminder
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reminder {
    pub message: String,
    #[serde(default)]
    pub time: Option<String>,
}

impl Reminder {
    pub fn new(message: impl Into<String>, time: Option<String>) -> Self {
        Self {
            message: message.into(),
            time,
        }
    }
}

impl std::fmt::Display for Reminder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.time {
            Some(time) => write!(f, "{} at {}", self.message, time),
            None => write!(f, "{}", self.message),
        }
    }
}

/// Current conditions for a city
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WeatherReport {
    pub description: String,
    /// Degrees Celsius
    pub temperature: f64,
}

/// One organic web search result
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: String,
    pub link: String,
    #[serde(default)]
    pub snippet: String,
}

/// A chunk returned by the retrieval backend
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DocumentChunk {
    pub content: String,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub score: Option<f64>,
}
