//! OpenWeatherMap current-weather client

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use super::{http_client, WeatherClient, DEFAULT_HTTP_TIMEOUT};
use crate::error::{Result, ToolsError};
use crate::model::WeatherReport;

const DEFAULT_BASE_URL: &str = "http://api.openweathermap.org";

pub struct OpenWeatherClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

#[derive(Deserialize)]
struct CurrentWeather {
    weather: Vec<Condition>,
    main: Readings,
}

#[derive(Deserialize)]
struct Condition {
    description: String,
}

#[derive(Deserialize)]
struct Readings {
    temp: f64,
}

impl OpenWeatherClient {
    /// # Errors
    ///
    /// Fails if the HTTP client cannot be built.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_base_url(api_key, DEFAULT_BASE_URL, DEFAULT_HTTP_TIMEOUT)
    }

    /// Client against a different host (proxies, tests)
    ///
    /// # Errors
    ///
    /// Fails if the HTTP client cannot be built.
    pub fn with_base_url(api_key: impl Into<String>, base_url: &str, timeout: Duration) -> Result<Self> {
        Ok(Self {
            http: http_client(timeout)?,
            api_key: api_key.into(),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl WeatherClient for OpenWeatherClient {
    async fn current(&self, city: &str) -> Result<WeatherReport> {
        let response = self
            .http
            .get(format!("{}/data/2.5/weather", self.base_url))
            .query(&[("q", city), ("appid", self.api_key.as_str()), ("units", "metric")])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ToolsError::from_response(response).await);
        }

        let body: CurrentWeather = response.json().await?;
        let description = body
            .weather
            .into_iter()
            .next()
            .map(|c| c.description)
            .ok_or_else(|| ToolsError::InvalidResponse("no weather conditions".into()))?;

        Ok(WeatherReport {
            description,
            temperature: body.main.temp,
        })
    }
}
