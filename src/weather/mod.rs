//! Weather lookup for a named city
//!
//! [`WeatherClient`] chains a [`Geocoder`] and a [`ConditionsSource`] and
//! renders the result into a [`WeatherSummary`].

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, instrument, warn};

use crate::config::WeatherConfig;
use crate::error::{ClientError, ClientResult};
use crate::geocoding::Geocoder;
use crate::models::{Coordinates, CurrentConditions, WeatherSummary};

pub mod openweather;

pub use openweather::OpenWeatherClient;

/// Source of current weather conditions at a coordinate pair
#[async_trait]
pub trait ConditionsSource: Send + Sync {
    async fn current_conditions(&self, coordinates: Coordinates)
    -> ClientResult<CurrentConditions>;
}

/// Geocoding plus current-conditions lookup
#[derive(Clone)]
pub struct WeatherClient {
    geocoder: Arc<dyn Geocoder>,
    conditions: Arc<dyn ConditionsSource>,
}

impl WeatherClient {
    pub fn new(geocoder: Arc<dyn Geocoder>, conditions: Arc<dyn ConditionsSource>) -> Self {
        Self {
            geocoder,
            conditions,
        }
    }

    /// Build a client backed by the OpenWeather geocoding and One Call APIs
    pub fn openweather(config: &WeatherConfig) -> anyhow::Result<Self> {
        let client = Arc::new(OpenWeatherClient::new(config)?);
        Ok(Self::new(client.clone(), client))
    }

    /// Resolve a city name without fetching conditions
    #[instrument(skip(self))]
    pub async fn resolve(&self, city: &str) -> ClientResult<Coordinates> {
        let city = city.trim();
        if city.is_empty() {
            return Err(ClientError::NotFound(String::new()));
        }

        let result = self.geocoder.resolve(city).await;
        match &result {
            Ok(coordinates) => debug!(
                "Resolved '{}' to {}",
                city,
                coordinates.format_coordinates()
            ),
            Err(e) => warn!(kind = e.kind(), "Geocoding '{}' failed: {}", city, e),
        }
        result
    }

    /// Geocode `city` and fetch its current conditions
    #[instrument(skip(self))]
    pub async fn fetch(&self, city: &str) -> ClientResult<WeatherSummary> {
        let coordinates = self.resolve(city).await?;
        self.fetch_at(city, coordinates).await
    }

    /// Fetch current conditions for an already resolved city
    #[instrument(skip(self, coordinates))]
    pub async fn fetch_at(
        &self,
        city: &str,
        coordinates: Coordinates,
    ) -> ClientResult<WeatherSummary> {
        let conditions = self
            .conditions
            .current_conditions(coordinates)
            .await
            .inspect_err(|e| {
                warn!(
                    kind = e.kind(),
                    "Current conditions for '{}' ({}) failed: {}",
                    city,
                    coordinates.format_coordinates(),
                    e
                )
            })?;

        let summary = WeatherSummary::new(city.trim(), conditions);
        debug!("Weather summary: {}", summary);
        Ok(summary)
    }
}
