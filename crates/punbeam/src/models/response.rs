use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Per-invocation runtime data made available to tools, separate from the
/// conversation history. Immutable for the duration of one invocation and
/// never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Context {
    /// Caller- or session-specific identifier used by tools
    /// (e.g., to infer location preferences)
    pub user_id: String,
}

impl Context {
    pub fn new<S: Into<String>>(user_id: S) -> Self {
        Self {
            user_id: user_id.into(),
        }
    }
}

/// The structured final answer the model must produce each turn.
///
/// Invariant: `weather_conditions` is populated iff weather data was
/// obtained during the turn; otherwise the punny reply alone is the answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseFormat {
    /// The human-friendly response crafted with puns
    pub punny_response: String,
    /// Optional summary of the weather conditions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weather_conditions: Option<String>,
}

impl ResponseFormat {
    /// The display content for the turn: the weather summary when present,
    /// the punny reply otherwise
    pub fn display_content(&self) -> &str {
        self.weather_conditions
            .as_deref()
            .unwrap_or(&self.punny_response)
    }

    /// JSON schema for the structured response, in the shape expected as a
    /// tool input schema
    pub fn schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "punny_response": {
                    "type": "string",
                    "description": "The pun-filled reply to show the user"
                },
                "weather_conditions": {
                    "type": "string",
                    "description": "Summary of the weather conditions, only when weather data was obtained"
                }
            },
            "required": ["punny_response"]
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_content_prefers_weather() {
        let response = ResponseFormat {
            punny_response: "sky-high hopes!".to_string(),
            weather_conditions: Some("Miami: clear sky, 82°F".to_string()),
        };
        assert_eq!(response.display_content(), "Miami: clear sky, 82°F");

        let response = ResponseFormat {
            punny_response: "sky-high hopes!".to_string(),
            weather_conditions: None,
        };
        assert_eq!(response.display_content(), "sky-high hopes!");
    }

    #[test]
    fn test_weather_conditions_optional_in_json() {
        let parsed: ResponseFormat =
            serde_json::from_value(json!({"punny_response": "hail yes"})).unwrap();
        assert_eq!(parsed.weather_conditions, None);

        let serialized = serde_json::to_value(&parsed).unwrap();
        assert!(serialized.get("weather_conditions").is_none());
    }
}
