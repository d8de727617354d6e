//! Geospatial Index: cached location resolution plus distance.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use gigify_core::error::CoreError;
use gigify_core::geo::Coordinates;
use gigify_geocode::{GeocodeError, Geocoder};
use tokio::sync::RwLock;

/// Why a location could not be resolved. Callers treat this as non-fatal.
#[derive(Debug, thiserror::Error)]
pub enum GeocodeFailure {
    #[error("Location text is empty")]
    EmptyLocation,

    #[error("Geocoding is not configured")]
    Disabled,

    #[error("Geocoding timed out after {0:?}")]
    TimedOut(Duration),

    #[error(transparent)]
    Provider(#[from] GeocodeError),
}

/// Resolves free-text locations through a [`Geocoder`], caching successes
/// per normalized location string.
pub struct GeospatialIndex {
    geocoder: Option<Arc<dyn Geocoder>>,
    cache: RwLock<HashMap<String, Coordinates>>,
    timeout: Duration,
}

impl GeospatialIndex {
    /// `geocoder = None` disables resolution; every lookup fails with
    /// [`GeocodeFailure::Disabled`].
    pub fn new(geocoder: Option<Arc<dyn Geocoder>>, timeout: Duration) -> Self {
        Self {
            geocoder,
            cache: RwLock::new(HashMap::new()),
            timeout,
        }
    }

    pub async fn resolve(&self, location: &str) -> Result<Coordinates, GeocodeFailure> {
        let key = normalize(location);
        if key.is_empty() {
            return Err(GeocodeFailure::EmptyLocation);
        }
        if let Some(hit) = self.cache.read().await.get(&key) {
            return Ok(*hit);
        }

        let geocoder = self.geocoder.as_ref().ok_or(GeocodeFailure::Disabled)?;
        let coords = tokio::time::timeout(self.timeout, geocoder.geocode(location.trim()))
            .await
            .map_err(|_| GeocodeFailure::TimedOut(self.timeout))??;

        self.cache.write().await.insert(key, coords);
        Ok(coords)
    }

    pub fn distance_miles(&self, a: &Coordinates, b: &Coordinates) -> Result<f64, CoreError> {
        gigify_core::geo::distance_miles(a, b)
    }

    pub async fn cached_len(&self) -> usize {
        self.cache.read().await.len()
    }
}

/// Cache key: trimmed, whitespace-collapsed, lowercase.
fn normalize(location: &str) -> String {
    location
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use assert_matches::assert_matches;

    use super::*;

    struct CountingGeocoder {
        calls: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl Geocoder for CountingGeocoder {
        async fn geocode(&self, location: &str) -> Result<Coordinates, GeocodeError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match location {
                "London" | "london" => Ok(Coordinates { lat: 51.5074, lng: -0.1278 }),
                other => Err(GeocodeError::NoResults(other.to_string())),
            }
        }
    }

    struct SlowGeocoder;

    #[async_trait::async_trait]
    impl Geocoder for SlowGeocoder {
        async fn geocode(&self, _location: &str) -> Result<Coordinates, GeocodeError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(Coordinates { lat: 0.0, lng: 0.0 })
        }
    }

    #[tokio::test]
    async fn repeated_lookups_hit_the_cache() {
        let geocoder = Arc::new(CountingGeocoder { calls: AtomicUsize::new(0) });
        let index = GeospatialIndex::new(Some(geocoder.clone()), Duration::from_secs(1));

        index.resolve("London").await.unwrap();
        index.resolve("  london ").await.unwrap();

        assert_eq!(geocoder.calls.load(Ordering::SeqCst), 1);
        assert_eq!(index.cached_len().await, 1);
    }

    #[tokio::test]
    async fn failures_are_not_cached() {
        let geocoder = Arc::new(CountingGeocoder { calls: AtomicUsize::new(0) });
        let index = GeospatialIndex::new(Some(geocoder.clone()), Duration::from_secs(1));

        assert_matches!(index.resolve("Atlantis").await, Err(GeocodeFailure::Provider(_)));
        assert_matches!(index.resolve("Atlantis").await, Err(GeocodeFailure::Provider(_)));
        assert_eq!(geocoder.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn empty_text_never_reaches_the_provider() {
        let geocoder = Arc::new(CountingGeocoder { calls: AtomicUsize::new(0) });
        let index = GeospatialIndex::new(Some(geocoder.clone()), Duration::from_secs(1));

        assert_matches!(index.resolve("   ").await, Err(GeocodeFailure::EmptyLocation));
        assert_eq!(geocoder.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_provider_times_out() {
        let index = GeospatialIndex::new(Some(Arc::new(SlowGeocoder)), Duration::from_millis(50));
        assert_matches!(index.resolve("Anywhere").await, Err(GeocodeFailure::TimedOut(_)));
    }

    #[tokio::test]
    async fn disabled_index_fails_fast() {
        let index = GeospatialIndex::new(None, Duration::from_secs(1));
        assert_matches!(index.resolve("London").await, Err(GeocodeFailure::Disabled));
    }
}
