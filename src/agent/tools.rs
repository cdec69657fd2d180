//! Tool capability interface and the built-in weather tool

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Value, json};
use thiserror::Error;
use tracing::{info, instrument};

use crate::llm::ToolDefinition;
use crate::weather::WeatherClient;

/// Failure of a single tool invocation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ToolError {
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),

    #[error("{0}")]
    Failed(String),
}

/// A callable the model may request by name
#[async_trait]
pub trait Tool: Send + Sync {
    /// Name, description and input schema advertised to the model
    fn definition(&self) -> ToolDefinition;

    async fn invoke(&self, arguments: &Value) -> Result<String, ToolError>;
}

/// Fixed registry of tools keyed by name
#[derive(Clone, Default)]
pub struct ToolTable {
    tools: BTreeMap<String, Arc<dyn Tool>>,
}

impl ToolTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool, replacing any tool with the same name
    #[must_use]
    pub fn with_tool(mut self, tool: Arc<dyn Tool>) -> Self {
        self.tools.insert(tool.definition().name, tool);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.get(name)
    }

    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.values().map(|tool| tool.definition()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

/// Current weather for a bare city name
pub struct WeatherTool {
    weather: WeatherClient,
}

impl WeatherTool {
    pub const NAME: &'static str = "WeatherTool";

    pub fn new(weather: WeatherClient) -> Self {
        Self { weather }
    }

    /// Accepts `{"city": "..."}` or a bare JSON string
    fn city_argument(arguments: &Value) -> Result<&str, ToolError> {
        let city = match arguments {
            Value::String(city) => Some(city.as_str()),
            Value::Object(map) => map.get("city").and_then(Value::as_str),
            _ => None,
        };

        city.map(str::trim)
            .filter(|city| !city.is_empty())
            .ok_or_else(|| ToolError::InvalidArguments(format!("expected a city name, got {arguments}")))
    }
}

#[async_trait]
impl Tool for WeatherTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: Self::NAME.to_string(),
            description:
                "Get the current weather for a city. Input should be a bare city name."
                    .to_string(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "city": {
                        "type": "string",
                        "description": "City name, e.g. 'Pune' or 'New York'"
                    }
                },
                "required": ["city"]
            }),
        }
    }

    #[instrument(name = "weather_tool", skip(self, arguments))]
    async fn invoke(&self, arguments: &Value) -> Result<String, ToolError> {
        let city = Self::city_argument(arguments)?;
        info!("WeatherTool lookup for '{}'", city);

        self.weather
            .fetch(city)
            .await
            .map(|summary| summary.to_string())
            .map_err(|e| ToolError::Failed(format!("weather lookup for '{city}' failed: {e}")))
    }
}
