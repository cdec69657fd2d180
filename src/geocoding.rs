//! Geocoding seam
//!
//! Resolves a free-text city name into a coordinate pair. Implementations
//! perform a single remote lookup limited to one result and never retry.

use async_trait::async_trait;

use crate::error::ClientResult;
use crate::models::Coordinates;

/// City name to coordinates lookup
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Resolve `city` to the coordinates of the best match.
    ///
    /// An empty result set is reported as [`ClientError::NotFound`](crate::ClientError::NotFound).
    async fn resolve(&self, city: &str) -> ClientResult<Coordinates>;
}
