//! OpenWeather API client
//!
//! Implements both [`Geocoder`] (direct geocoding API) and
//! [`ConditionsSource`] (One Call 3.0) over one shared HTTP client.
//! Each call is a single request with a bounded timeout and no retries.

use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info, instrument, warn};

use super::ConditionsSource;
use crate::config::WeatherConfig;
use crate::error::{ClientError, ClientResult};
use crate::geocoding::Geocoder;
use crate::models::{Coordinates, CurrentConditions};

const PROVIDER: &str = "openweather";
const EXCLUDED_TIERS: &str = "minutely,hourly,alerts";

/// HTTP client for the OpenWeather geocoding and One Call endpoints
pub struct OpenWeatherClient {
    client: Client,
    api_key: Option<String>,
    geocoding_url: String,
    onecall_url: String,
}

impl OpenWeatherClient {
    /// Create a new OpenWeather client
    pub fn new(config: &WeatherConfig) -> Result<Self> {
        let timeout = Duration::from_secs(config.timeout_seconds.into());

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("SkySense/", env!("CARGO_PKG_VERSION")))
            .build()
            .with_context(|| "Failed to create HTTP client")?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            geocoding_url: config.geocoding_url.clone(),
            onecall_url: config.onecall_url.clone(),
        })
    }

    fn api_key(&self) -> ClientResult<&str> {
        self.api_key
            .as_deref()
            .ok_or(ClientError::MissingCredential(PROVIDER))
    }

    /// Issue a GET and decode the JSON body. `endpoint` is only used for logging
    /// so the key in the query string never reaches the logs.
    async fn get_json<T: DeserializeOwned>(&self, endpoint: &str, url: &str) -> ClientResult<T> {
        let start_time = Instant::now();

        let response = self.client.get(url).send().await.map_err(|e| {
            warn!("Request to {} failed: {}", endpoint, e);
            ClientError::from(e)
        })?;

        let status = response.status();
        debug!(
            "HTTP response from {}: {} in {:.3}s",
            endpoint,
            status,
            start_time.elapsed().as_secs_f64()
        );

        if !status.is_success() {
            warn!("{} returned status {}", endpoint, status);
            return Err(ClientError::Status {
                status: status.as_u16(),
            });
        }

        response.json::<T>().await.map_err(|e| {
            warn!("Failed to parse response from {}: {}", endpoint, e);
            ClientError::Shape(e.to_string())
        })
    }
}

#[async_trait]
impl Geocoder for OpenWeatherClient {
    #[instrument(skip(self), fields(city = city))]
    async fn resolve(&self, city: &str) -> ClientResult<Coordinates> {
        let api_key = self.api_key()?;
        let url = format!(
            "{}?q={}&limit=1&appid={}",
            self.geocoding_url,
            urlencoding::encode(city),
            urlencoding::encode(api_key)
        );

        let candidates: Vec<GeocodingCandidate> = self.get_json("geocoding", &url).await?;
        let coordinates = first_coordinates(city, candidates)?;

        info!(
            "Geocoded '{}' to {}",
            city,
            coordinates.format_coordinates()
        );
        Ok(coordinates)
    }
}

#[async_trait]
impl ConditionsSource for OpenWeatherClient {
    #[instrument(skip(self), fields(lat = coordinates.latitude, lon = coordinates.longitude))]
    async fn current_conditions(
        &self,
        coordinates: Coordinates,
    ) -> ClientResult<CurrentConditions> {
        let api_key = self.api_key()?;
        let url = format!(
            "{}?lat={}&lon={}&exclude={}&units=metric&appid={}",
            self.onecall_url,
            coordinates.latitude,
            coordinates.longitude,
            EXCLUDED_TIERS,
            urlencoding::encode(api_key)
        );

        let response: OneCallResponse = self.get_json("onecall", &url).await?;
        CurrentConditions::try_from(response)
    }
}

/// One entry of the direct geocoding response array
#[derive(Debug, Deserialize)]
pub struct GeocodingCandidate {
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    #[allow(dead_code)]
    pub name: Option<String>,
}

/// Subset of the One Call response that carries current conditions
#[derive(Debug, Deserialize)]
pub struct OneCallResponse {
    pub current: Option<OneCallCurrent>,
}

#[derive(Debug, Deserialize)]
pub struct OneCallCurrent {
    pub temp: Option<serde_json::Number>,
    #[serde(default)]
    pub weather: Vec<OneCallCondition>,
}

#[derive(Debug, Deserialize)]
pub struct OneCallCondition {
    pub description: Option<String>,
}

/// Take the first candidate; it must carry both halves of the coordinate pair
pub fn first_coordinates(
    city: &str,
    candidates: Vec<GeocodingCandidate>,
) -> ClientResult<Coordinates> {
    let first = candidates
        .into_iter()
        .next()
        .ok_or_else(|| ClientError::NotFound(city.to_string()))?;

    match (first.lat, first.lon) {
        (Some(lat), Some(lon)) => Ok(Coordinates::new(lat, lon)),
        _ => Err(ClientError::Shape(format!(
            "geocoding result for '{city}' lacks lat/lon"
        ))),
    }
}

impl TryFrom<OneCallResponse> for CurrentConditions {
    type Error = ClientError;

    fn try_from(response: OneCallResponse) -> ClientResult<Self> {
        let current = response
            .current
            .ok_or_else(|| ClientError::Shape("missing 'current' block".to_string()))?;

        let temperature = current
            .temp
            .ok_or_else(|| ClientError::Shape("missing 'current.temp'".to_string()))?;

        let description = current
            .weather
            .into_iter()
            .next()
            .and_then(|condition| condition.description)
            .ok_or_else(|| {
                ClientError::Shape("missing 'current.weather[0].description'".to_string())
            })?;

        Ok(Self {
            temperature,
            description,
        })
    }
}
