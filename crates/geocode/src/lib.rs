//! Geocoding provider boundary.
//!
//! [`Geocoder`] is the only thing the engine knows about geocoding. The
//! production implementation, [`GoogleGeocoder`], calls the Google Maps
//! Geocoding API; tests supply their own implementations.

pub mod google;

use gigify_core::geo::Coordinates;

pub use google::{GoogleGeocoder, GoogleGeocoderConfig};

/// Errors from a geocoding provider.
#[derive(Debug, thiserror::Error)]
pub enum GeocodeError {
    /// The provider answered but found nothing for the query.
    #[error("No geocoding results for '{0}'")]
    NoResults(String),

    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The provider returned an error status.
    #[error("Geocoding API error ({status}): {message}")]
    Api { status: String, message: String },

    /// The provider returned coordinates outside the valid range.
    #[error("Provider returned invalid coordinates: {0}")]
    InvalidCoordinates(String),
}

/// Resolve free-text locations to coordinates.
#[async_trait::async_trait]
pub trait Geocoder: Send + Sync {
    async fn geocode(&self, location: &str) -> Result<Coordinates, GeocodeError>;
}
