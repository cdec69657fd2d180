//! Data models for the SkySense service
//!
//! All values are transient and live for a single request:
//! - Location: coordinate pair produced by geocoding
//! - Weather: current conditions and the rendered one-line summary

pub mod location;
pub mod weather;

pub use location::Coordinates;
pub use weather::{CurrentConditions, WeatherSummary, title_case};
