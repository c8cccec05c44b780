use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use indoc::indoc;
use reqwest::Client;
use serde_json::{json, Value};

use crate::errors::{AgentError, AgentResult};
use crate::models::content::Content;
use crate::models::response::Context;
use crate::models::tool::{Tool, ToolCall};
use crate::providers::configs::get_env;
use crate::toolkit::Toolkit;

pub const WEATHER_API_HOST: &str = "https://api.openweathermap.org";

/// Configuration for the networked weather tools
#[derive(Debug, Clone)]
pub struct WeatherConfig {
    pub api_key: String,
    pub host: String,
}

impl WeatherConfig {
    /// Read the weather configuration from the environment.
    /// `WEATHER_API_KEY` is required; `WEATHER_API_HOST` is overridable,
    /// mainly so tests can point at a local server.
    pub fn from_env() -> Result<Self> {
        let api_key = get_env("WEATHER_API_KEY", true, None)?.unwrap_or_default();
        let host = get_env("WEATHER_API_HOST", false, Some(WEATHER_API_HOST.to_string()))?
            .unwrap_or_default();
        Ok(Self { api_key, host })
    }
}

/// Toolkit exposing weather lookup, city resolution, and user-city inference
pub struct WeatherToolkit {
    config: WeatherConfig,
    client: Client,
    tools: Vec<Tool>,
}

impl WeatherToolkit {
    pub fn new(config: WeatherConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            config,
            client,
            tools: weather_tools(),
        })
    }

    /// Deterministic canned forecast, useful without any API credential
    fn get_weather_for_city(&self, city: &str) -> String {
        format!("The weather in {} is sunny with a high of 75°F.", city)
    }

    /// Resolve a city name to coordinates through the geocoding endpoint.
    /// An empty match list is a typed lookup failure naming the city.
    async fn get_coordinates_for_city(&self, city: &str) -> AgentResult<Value> {
        let url = format!("{}/geo/1.0/direct", self.config.host.trim_end_matches('/'));
        let response = self
            .client
            .get(&url)
            .query(&[("q", city), ("limit", "1"), ("appid", self.config.api_key.as_str())])
            .send()
            .await
            .map_err(|e| AgentError::ExecutionError(e.to_string()))?;

        let matches: Value = response
            .json()
            .await
            .map_err(|e| AgentError::ExecutionError(e.to_string()))?;

        let first = matches
            .as_array()
            .and_then(|arr| arr.first())
            .ok_or_else(|| AgentError::LookupFailed(city.to_string()))?;

        let lat = first
            .get("lat")
            .and_then(|v| v.as_f64())
            .ok_or_else(|| AgentError::LookupFailed(city.to_string()))?;
        let lon = first
            .get("lon")
            .and_then(|v| v.as_f64())
            .ok_or_else(|| AgentError::LookupFailed(city.to_string()))?;

        Ok(json!({"latitude": lat, "longitude": lon}))
    }

    /// Fetch current conditions for coordinates. Missing payload fields are
    /// surfaced as execution errors rather than panics.
    async fn get_current_weather(&self, latitude: f64, longitude: f64) -> AgentResult<String> {
        let url = format!(
            "{}/data/2.5/weather",
            self.config.host.trim_end_matches('/')
        );
        let response = self
            .client
            .get(&url)
            .query(&[
                ("lat", latitude.to_string()),
                ("lon", longitude.to_string()),
                ("units", "imperial".to_string()),
                ("appid", self.config.api_key.clone()),
            ])
            .send()
            .await
            .map_err(|e| AgentError::ExecutionError(e.to_string()))?;

        let payload: Value = response
            .json()
            .await
            .map_err(|e| AgentError::ExecutionError(e.to_string()))?;

        let name = payload
            .get("name")
            .and_then(|v| v.as_str())
            .ok_or_else(|| missing_field("name"))?;
        let description = payload
            .pointer("/weather/0/description")
            .and_then(|v| v.as_str())
            .ok_or_else(|| missing_field("weather[0].description"))?;
        let temp = payload
            .pointer("/main/temp")
            .and_then(|v| v.as_f64())
            .ok_or_else(|| missing_field("main.temp"))?;

        Ok(format!("{}: {}, {:.0}°F", name, description, temp))
    }

    /// Infer the user's city from the invocation context
    fn get_user_city(&self, context: &Context) -> &'static str {
        if context.user_id == "1" {
            "Miami"
        } else {
            "San Francisco"
        }
    }
}

fn missing_field(field: &str) -> AgentError {
    AgentError::ExecutionError(format!("Weather payload is missing field '{}'", field))
}

fn required_str<'a>(arguments: &'a Value, key: &str) -> AgentResult<&'a str> {
    arguments
        .get(key)
        .and_then(|v| v.as_str())
        .ok_or_else(|| AgentError::InvalidParameters(format!("Missing string argument '{}'", key)))
}

fn required_f64(arguments: &Value, key: &str) -> AgentResult<f64> {
    arguments
        .get(key)
        .and_then(|v| v.as_f64())
        .ok_or_else(|| AgentError::InvalidParameters(format!("Missing number argument '{}'", key)))
}

fn weather_tools() -> Vec<Tool> {
    vec![
        Tool::new(
            "get_weather_for_city",
            "Get the weather for a specific city",
            json!({
                "type": "object",
                "properties": {
                    "city": {"type": "string", "description": "The city name"}
                },
                "required": ["city"]
            }),
        ),
        Tool::new(
            "get_coordinates_for_city",
            "Get the latitude and longitude for a specific city",
            json!({
                "type": "object",
                "properties": {
                    "city": {"type": "string", "description": "The city name"}
                },
                "required": ["city"]
            }),
        ),
        Tool::new(
            "get_current_weather",
            "Get the current weather conditions for explicit coordinates",
            json!({
                "type": "object",
                "properties": {
                    "latitude": {"type": "number", "description": "Latitude in degrees"},
                    "longitude": {"type": "number", "description": "Longitude in degrees"}
                },
                "required": ["latitude", "longitude"]
            }),
        ),
        Tool::new(
            "get_user_city",
            "Get the user's city from the invocation context",
            json!({
                "type": "object",
                "properties": {}
            }),
        ),
    ]
}

#[async_trait]
impl Toolkit for WeatherToolkit {
    fn name(&self) -> &str {
        "weather"
    }

    fn description(&self) -> &str {
        "Weather lookups, city resolution, and user location inference"
    }

    fn instructions(&self) -> &str {
        indoc! {"
            If a user asks you for the weather, make sure you know the location.
            If you can tell from the question that they mean wherever they are,
            use the get_user_city tool to find their location. Use
            get_coordinates_for_city to resolve a city before asking for current
            conditions at coordinates.
        "}
    }

    fn tools(&self) -> &[Tool] {
        &self.tools
    }

    async fn call(&self, tool_call: ToolCall, context: &Context) -> AgentResult<Vec<Content>> {
        match tool_call.name.as_str() {
            "get_weather_for_city" => {
                let city = required_str(&tool_call.arguments, "city")?;
                Ok(vec![Content::text(self.get_weather_for_city(city))])
            }
            "get_coordinates_for_city" => {
                let city = required_str(&tool_call.arguments, "city")?;
                let coordinates = self.get_coordinates_for_city(city).await?;
                Ok(vec![Content::text(coordinates.to_string())])
            }
            "get_current_weather" => {
                let latitude = required_f64(&tool_call.arguments, "latitude")?;
                let longitude = required_f64(&tool_call.arguments, "longitude")?;
                let conditions = self.get_current_weather(latitude, longitude).await?;
                Ok(vec![Content::text(conditions)])
            }
            "get_user_city" => Ok(vec![Content::text(self.get_user_city(context))]),
            _ => Err(AgentError::ToolNotFound(tool_call.name)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toolkit_for(host: &str) -> WeatherToolkit {
        WeatherToolkit::new(WeatherConfig {
            api_key: "test-key".to_string(),
            host: host.to_string(),
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_stub_weather_contains_city_and_fixed_phrase() {
        let toolkit = toolkit_for(WEATHER_API_HOST);
        let context = Context::new("1");

        for city in ["Miami", "Reykjavík", "St. John's"] {
            let result = toolkit
                .call(
                    ToolCall::new("get_weather_for_city", json!({"city": city})),
                    &context,
                )
                .await
                .unwrap();

            let text = result[0].as_text().unwrap();
            assert!(text.contains(city));
            assert!(text.contains("sunny with a high of 75°F."));
        }
    }

    #[tokio::test]
    async fn test_user_city_mapping() {
        let toolkit = toolkit_for(WEATHER_API_HOST);
        let call = || ToolCall::new("get_user_city", json!({}));

        let result = toolkit.call(call(), &Context::new("1")).await.unwrap();
        assert_eq!(result[0].as_text(), Some("Miami"));

        for user_id in ["2", "42", "anything-else"] {
            let result = toolkit.call(call(), &Context::new(user_id)).await.unwrap();
            assert_eq!(result[0].as_text(), Some("San Francisco"));
        }
    }

    #[tokio::test]
    async fn test_coordinates_lookup_success() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/geo/1.0/direct")
            .match_query(mockito::Matcher::AllOf(vec![
                mockito::Matcher::UrlEncoded("q".into(), "Miami".into()),
                mockito::Matcher::UrlEncoded("limit".into(), "1".into()),
            ]))
            .with_status(200)
            .with_body(r#"[{"name": "Miami", "lat": 25.7617, "lon": -80.1918}]"#)
            .create_async()
            .await;

        let toolkit = toolkit_for(&server.url());
        let result = toolkit
            .call(
                ToolCall::new("get_coordinates_for_city", json!({"city": "Miami"})),
                &Context::new("1"),
            )
            .await
            .unwrap();

        let parsed: Value = serde_json::from_str(result[0].as_text().unwrap()).unwrap();
        assert_eq!(parsed["latitude"], 25.7617);
        assert_eq!(parsed["longitude"], -80.1918);
    }

    #[tokio::test]
    async fn test_coordinates_lookup_no_match_names_city() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/geo/1.0/direct")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body("[]")
            .create_async()
            .await;

        let toolkit = toolkit_for(&server.url());
        let err = toolkit
            .call(
                ToolCall::new("get_coordinates_for_city", json!({"city": "Atlantis"})),
                &Context::new("1"),
            )
            .await
            .unwrap_err();

        assert_eq!(err, AgentError::LookupFailed("Atlantis".to_string()));
        assert!(err.to_string().contains("Atlantis"));
    }

    #[tokio::test]
    async fn test_current_weather_renders_conditions() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/data/2.5/weather")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body(
                r#"{"name": "Miami", "weather": [{"description": "clear sky"}], "main": {"temp": 82.4}}"#,
            )
            .create_async()
            .await;

        let toolkit = toolkit_for(&server.url());
        let result = toolkit
            .call(
                ToolCall::new(
                    "get_current_weather",
                    json!({"latitude": 25.7617, "longitude": -80.1918}),
                ),
                &Context::new("1"),
            )
            .await
            .unwrap();

        assert_eq!(result[0].as_text(), Some("Miami: clear sky, 82°F"));
    }

    #[tokio::test]
    async fn test_current_weather_malformed_payload_is_typed_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/data/2.5/weather")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body(r#"{"cod": 200}"#)
            .create_async()
            .await;

        let toolkit = toolkit_for(&server.url());
        let err = toolkit
            .call(
                ToolCall::new(
                    "get_current_weather",
                    json!({"latitude": 0.0, "longitude": 0.0}),
                ),
                &Context::new("1"),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, AgentError::ExecutionError(_)));
        assert!(err.to_string().contains("missing field"));
    }

    #[tokio::test]
    async fn test_unknown_tool() {
        let toolkit = toolkit_for(WEATHER_API_HOST);
        let err = toolkit
            .call(
                ToolCall::new("get_tide_tables", json!({})),
                &Context::new("1"),
            )
            .await
            .unwrap_err();
        assert_eq!(
            err,
            AgentError::ToolNotFound("get_tide_tables".to_string())
        );
    }

    #[tokio::test]
    async fn test_missing_argument_is_invalid_parameters() {
        let toolkit = toolkit_for(WEATHER_API_HOST);
        let err = toolkit
            .call(
                ToolCall::new("get_weather_for_city", json!({})),
                &Context::new("1"),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AgentError::InvalidParameters(_)));
    }
}
