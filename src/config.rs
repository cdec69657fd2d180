//! Service configuration
//!
//! Sources, lowest precedence first: built-in defaults, an optional TOML
//! file, `SKYSENSE_*` environment variables. Provider keys additionally fall
//! back to `OPENWEATHER_API_KEY` / `OPENROUTER_API_KEY`.

use crate::SkySenseError;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

/// Environment variable holding the OpenWeather key
pub const OPENWEATHER_KEY_VAR: &str = "OPENWEATHER_API_KEY";
/// Environment variable holding the OpenRouter key
pub const OPENROUTER_KEY_VAR: &str = "OPENROUTER_API_KEY";

/// Root configuration structure for the `SkySense` service
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SkySenseConfig {
    /// Geocoding and weather API configuration
    pub weather: WeatherConfig,
    /// Language-model completion configuration
    pub completion: CompletionConfig,
    /// Message dispatch configuration
    pub dispatch: DispatchConfig,
    /// HTTP server configuration
    pub server: ServerConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// OpenWeather configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    /// OpenWeather API key, used for both geocoding and current conditions
    pub api_key: Option<String>,
    /// Direct geocoding endpoint
    pub geocoding_url: String,
    /// One Call endpoint
    pub onecall_url: String,
    /// Request timeout in seconds
    pub timeout_seconds: u32,
}

/// Completion provider configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CompletionConfig {
    /// OpenRouter API key. Without it the completion path is disabled.
    pub api_key: Option<String>,
    /// Chat completions endpoint
    pub base_url: String,
    /// Model identifier
    pub model: String,
    /// Output length cap
    pub max_tokens: u32,
    /// Request timeout in seconds
    pub timeout_seconds: u32,
    /// System instruction sent with every request
    pub system_prompt: String,
}

/// How incoming messages are answered
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DispatchStrategy {
    /// Keyword and bare-city heuristics with a chat fallback
    #[default]
    Heuristic,
    /// Tool-calling agent, degrading to a last-token weather lookup
    Agent,
}

/// Dispatch configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    pub strategy: DispatchStrategy,
    /// Upper bound on model/tool round trips per agent run
    pub agent_max_steps: u32,
}

/// HTTP server configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Origins allowed by CORS. `*` allows any origin.
    pub allowed_origins: Vec<String>,
    /// Whole-request timeout in seconds
    pub request_timeout_seconds: u32,
    /// Maximum accepted request body size in bytes
    pub body_limit_bytes: usize,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    pub level: String,
    /// Log format (pretty or json)
    pub format: String,
}

// Default value functions
fn default_geocoding_url() -> String {
    "https://api.openweathermap.org/geo/1.0/direct".to_string()
}

fn default_onecall_url() -> String {
    "https://api.openweathermap.org/data/3.0/onecall".to_string()
}

fn default_weather_timeout() -> u32 {
    8
}

fn default_completion_url() -> String {
    "https://openrouter.ai/api/v1/chat/completions".to_string()
}

fn default_model() -> String {
    "meta-llama/llama-3.1-8b-instruct".to_string()
}

fn default_max_tokens() -> u32 {
    200
}

fn default_completion_timeout() -> u32 {
    15
}

fn default_system_prompt() -> String {
    "You are a helpful assistant.".to_string()
}

fn default_agent_max_steps() -> u32 {
    4
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_allowed_origins() -> Vec<String> {
    vec!["http://localhost:3000".to_string()]
}

fn default_request_timeout() -> u32 {
    60
}

fn default_body_limit() -> usize {
    16 * 1024
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            geocoding_url: default_geocoding_url(),
            onecall_url: default_onecall_url(),
            timeout_seconds: default_weather_timeout(),
        }
    }
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_completion_url(),
            model: default_model(),
            max_tokens: default_max_tokens(),
            timeout_seconds: default_completion_timeout(),
            system_prompt: default_system_prompt(),
        }
    }
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            strategy: DispatchStrategy::default(),
            agent_max_steps: default_agent_max_steps(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            allowed_origins: default_allowed_origins(),
            request_timeout_seconds: default_request_timeout(),
            body_limit_bytes: default_body_limit(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl SkySenseConfig {
    /// Load from `config_path`, or the per-user config file when `None`.
    /// A missing file is not an error.
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path().unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // SKYSENSE_COMPLETION__MODEL=... overrides completion.model
        builder = builder.add_source(
            Environment::with_prefix("SKYSENSE")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .context("Failed to read configuration sources")?;

        let mut config: SkySenseConfig = settings
            .try_deserialize()
            .with_context(|| format!("Invalid configuration in {}", config_file.display()))?;

        config.apply_credentials_from_env();
        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// `<config dir>/skysense/config.toml`
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("skysense").join("config.toml"))
    }

    /// Fill missing credentials from the provider's well-known variables
    pub fn apply_credentials_from_env(&mut self) {
        if self.weather.api_key.is_none() {
            self.weather.api_key = non_empty_var(OPENWEATHER_KEY_VAR);
        }
        if self.completion.api_key.is_none() {
            self.completion.api_key = non_empty_var(OPENROUTER_KEY_VAR);
        }
    }

    /// Replace zero and empty values with defaults
    pub fn apply_defaults(&mut self) {
        if self.weather.geocoding_url.is_empty() {
            self.weather.geocoding_url = default_geocoding_url();
        }
        if self.weather.onecall_url.is_empty() {
            self.weather.onecall_url = default_onecall_url();
        }
        if self.weather.timeout_seconds == 0 {
            self.weather.timeout_seconds = default_weather_timeout();
        }
        if self.completion.base_url.is_empty() {
            self.completion.base_url = default_completion_url();
        }
        if self.completion.model.is_empty() {
            self.completion.model = default_model();
        }
        if self.completion.max_tokens == 0 {
            self.completion.max_tokens = default_max_tokens();
        }
        if self.completion.timeout_seconds == 0 {
            self.completion.timeout_seconds = default_completion_timeout();
        }
        if self.completion.system_prompt.is_empty() {
            self.completion.system_prompt = default_system_prompt();
        }
        if self.dispatch.agent_max_steps == 0 {
            self.dispatch.agent_max_steps = default_agent_max_steps();
        }
        if self.server.host.is_empty() {
            self.server.host = default_host();
        }
        if self.server.request_timeout_seconds == 0 {
            self.server.request_timeout_seconds = default_request_timeout();
        }
        if self.server.body_limit_bytes == 0 {
            self.server.body_limit_bytes = default_body_limit();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.validate_api_keys()?;
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    /// Keys are optional, but a configured key must look like one
    pub fn validate_api_keys(&self) -> Result<()> {
        for (name, key) in [
            ("Weather", &self.weather.api_key),
            ("Completion", &self.completion.api_key),
        ] {
            if let Some(api_key) = key {
                if api_key.trim().is_empty() {
                    return Err(SkySenseError::config(format!(
                        "{name} API key cannot be empty if provided. Either remove it or provide a valid key."
                    ))
                    .into());
                }

                if api_key.len() > 200 {
                    return Err(SkySenseError::config(format!(
                        "{name} API key appears to be invalid (too long). Please check your API key."
                    ))
                    .into());
                }
            }
        }

        Ok(())
    }

    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.weather.timeout_seconds > 120 {
            return Err(
                SkySenseError::config("Weather API timeout cannot exceed 120 seconds").into(),
            );
        }

        if self.completion.timeout_seconds > 300 {
            return Err(
                SkySenseError::config("Completion API timeout cannot exceed 300 seconds").into(),
            );
        }

        if self.completion.max_tokens > 32_768 {
            return Err(SkySenseError::config("Completion max tokens cannot exceed 32768").into());
        }

        if self.dispatch.agent_max_steps > 16 {
            return Err(SkySenseError::config("Agent max steps cannot exceed 16").into());
        }

        if self.server.request_timeout_seconds > 600 {
            return Err(
                SkySenseError::config("Server request timeout cannot exceed 600 seconds").into(),
            );
        }

        Ok(())
    }

    fn validate_string_values(&self) -> Result<()> {
        one_of("log level", &self.logging.level, &LOG_LEVELS)?;
        one_of("log format", &self.logging.format, &LOG_FORMATS)?;

        for (name, url) in [
            ("Geocoding", &self.weather.geocoding_url),
            ("Weather", &self.weather.onecall_url),
            ("Completion", &self.completion.base_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(SkySenseError::config(format!(
                    "{name} API URL must be a valid HTTP or HTTPS URL"
                ))
                .into());
            }
        }

        Ok(())
    }
}

const LOG_LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];
const LOG_FORMATS: [&str; 2] = ["pretty", "json"];

fn one_of(what: &str, value: &str, allowed: &[&str]) -> Result<()> {
    if allowed.contains(&value) {
        return Ok(());
    }
    Err(SkySenseError::config(format!(
        "Invalid {what} '{value}', expected one of: {}",
        allowed.join(", ")
    ))
    .into())
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}
