//! Weather Tool

use std::sync::Arc;

use async_trait::async_trait;

use assistant_core::{
    tool::ParameterSchema, Result as CoreResult, Tool, ToolCall, ToolResult, ToolSchema,
};

use crate::backend::WeatherClient;

const NAME: &str = "Weather";

/// Tool for current weather by city
pub struct WeatherTool {
    client: Arc<dyn WeatherClient>,
}

impl WeatherTool {
    pub fn new(client: Arc<dyn WeatherClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Tool for WeatherTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: NAME.into(),
            description: "Get real-time weather information for a city.".into(),
            parameters: vec![ParameterSchema::required("city", "City name, e.g. 'Paris'")],
            has_side_effects: false,
        }
    }

    async fn execute(&self, call: &ToolCall) -> CoreResult<ToolResult> {
        let Some(city) = call.str_arg("city") else {
            return Ok(ToolResult::failure(NAME, "Error: 'city' must not be empty"));
        };

        let result = match self.client.current(city).await {
            Ok(report) => ToolResult::success(
                NAME,
                format!(
                    "Weather in {city}: {}, temperature: {}°C",
                    report.description, report.temperature
                ),
            ),
            Err(e) => {
                tracing::warn!(city, error = %e, "Weather lookup failed");
                ToolResult::failure(NAME, format!("Could not fetch weather for {city}: {e}"))
            }
        };
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{OpenWeatherClient, StaticWeather};
    use std::time::Duration;

    #[tokio::test]
    async fn test_formats_report() {
        let tool = WeatherTool::new(Arc::new(StaticWeather::new().with_city("Paris", "clear sky", 18.5)));

        let result = tool.execute(&ToolCall::new(NAME).with_arg("city", "Paris")).await.unwrap();
        assert!(result.success);
        assert_eq!(result.output, "Weather in Paris: clear sky, temperature: 18.5°C");
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_returns_text_without_api_key() {
        let client =
            OpenWeatherClient::with_base_url("ow-secret-123", "http://127.0.0.1:1", Duration::from_secs(2)).unwrap();
        let tool = WeatherTool::new(Arc::new(client));

        let result = tool.execute(&ToolCall::new(NAME).with_arg("city", "Paris")).await.unwrap();
        assert!(!result.success);
        assert!(result.output.starts_with("Could not fetch weather for Paris"));
        assert!(!result.output.contains("ow-secret-123"), "{}", result.output);
    }

    #[tokio::test]
    async fn test_unknown_city_returns_text() {
        let tool = WeatherTool::new(Arc::new(StaticWeather::new()));
        let result = tool.execute(&ToolCall::new(NAME).with_arg("city", "Atlantis")).await.unwrap();
        assert!(result.output.starts_with("Could not fetch weather for Atlantis"));
    }
}
