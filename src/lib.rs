//! `SkySense` - conversational weather assistant backend
//!
//! Routes free-text messages either to a weather lookup (OpenWeather) or to
//! a chat completion (OpenRouter), and serves the reply over HTTP.

pub mod agent;
pub mod api;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod geocoding;
pub mod llm;
pub mod logging;
pub mod models;
pub mod weather;
pub mod web;

// Re-export core types for public API
pub use config::{DispatchStrategy, SkySenseConfig};
pub use dispatcher::Dispatcher;
pub use error::{ClientError, ClientResult, SkySenseError};
pub use geocoding::Geocoder;
pub use llm::{CompletionClient, CompletionProvider};
pub use models::{Coordinates, CurrentConditions, WeatherSummary};
pub use weather::{ConditionsSource, WeatherClient};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, SkySenseError>;
