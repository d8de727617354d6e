//! Google Maps Geocoding API client.

use std::time::Duration;

use gigify_core::geo::Coordinates;
use serde::Deserialize;

use crate::{GeocodeError, Geocoder};

/// HTTP request timeout for a single lookup. The engine applies its own,
/// usually shorter, timeout on top.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Default API host.
const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com";

/// Configuration for [`GoogleGeocoder`].
#[derive(Debug, Clone)]
pub struct GoogleGeocoderConfig {
    /// Maps API key.
    pub api_key: String,
    /// Scheme and host, without trailing slash. Overridable for tests.
    pub base_url: String,
}

impl GoogleGeocoderConfig {
    /// Load configuration from environment variables.
    ///
    /// Returns `None` if `GOOGLE_MAPS_API_KEY` is not set; geocoding is then
    /// disabled and every event stays distance-unfilterable.
    ///
    /// | Variable               | Required | Default                        |
    /// |------------------------|----------|--------------------------------|
    /// | `GOOGLE_MAPS_API_KEY`  | yes      | --                              |
    /// | `GOOGLE_MAPS_BASE_URL` | no       | `https://maps.googleapis.com`  |
    pub fn from_env() -> Option<Self> {
        let api_key = std::env::var("GOOGLE_MAPS_API_KEY").ok()?;
        Some(Self {
            api_key,
            base_url: std::env::var("GOOGLE_MAPS_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
        })
    }
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    results: Vec<GeocodeResult>,
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    geometry: Geometry,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: LatLng,
}

#[derive(Debug, Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}

/// Geocoder backed by `GET /maps/api/geocode/json`.
pub struct GoogleGeocoder {
    client: reqwest::Client,
    config: GoogleGeocoderConfig,
}

impl GoogleGeocoder {
    pub fn new(config: GoogleGeocoderConfig) -> Result<Self, GeocodeError> {
        let client = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self { client, config })
    }

    /// Reuse an existing client (shared connection pool).
    pub fn with_client(client: reqwest::Client, config: GoogleGeocoderConfig) -> Self {
        Self { client, config }
    }
}

#[async_trait::async_trait]
impl Geocoder for GoogleGeocoder {
    async fn geocode(&self, location: &str) -> Result<Coordinates, GeocodeError> {
        let response: GeocodeResponse = self
            .client
            .get(format!("{}/maps/api/geocode/json", self.config.base_url))
            .query(&[("address", location), ("key", self.config.api_key.as_str())])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let coords = first_coordinates(location, response)?;
        tracing::debug!(location, lat = coords.lat, lng = coords.lng, "Location geocoded");
        Ok(coords)
    }
}

/// Interpret a provider response body.
fn first_coordinates(location: &str, response: GeocodeResponse) -> Result<Coordinates, GeocodeError> {
    match response.status.as_str() {
        "OK" => {}
        "ZERO_RESULTS" => return Err(GeocodeError::NoResults(location.to_string())),
        other => {
            return Err(GeocodeError::Api {
                status: other.to_string(),
                message: response.error_message.unwrap_or_default(),
            })
        }
    }

    let first = response
        .results
        .into_iter()
        .next()
        .ok_or_else(|| GeocodeError::NoResults(location.to_string()))?;
    let LatLng { lat, lng } = first.geometry.location;
    Coordinates::new(lat, lng).map_err(|e| GeocodeError::InvalidCoordinates(e.to_string()))
}
