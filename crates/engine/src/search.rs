//! Match/Search Planner.

use std::sync::Arc;

use futures::future::try_join_all;
use gigify_core::error::CoreError;
use gigify_core::event::Event;
use gigify_core::geo::Coordinates;
use gigify_core::search::{filter_events, random_sample, SearchCriteria};
use gigify_core::store::ScheduleStore;
use gigify_core::time_window::TimeWindow;
use gigify_core::types::{Timestamp, UserId};
use serde::Serialize;

use crate::availability::IntervalSet;
use crate::geo::GeospatialIndex;

/// Whether the distance filter took part in a search.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DistanceFilter {
    Applied { origin: Coordinates },
    /// Requested, but the search location could not be resolved.
    Skipped { reason: String },
    NotRequested,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchResults {
    pub events: Vec<Event>,
    pub distance_filter: DistanceFilter,
}

pub struct SearchPlanner {
    store: Arc<dyn ScheduleStore>,
    geo: Arc<GeospatialIndex>,
    intervals: Arc<IntervalSet>,
}

impl SearchPlanner {
    pub fn new(
        store: Arc<dyn ScheduleStore>,
        geo: Arc<GeospatialIndex>,
        intervals: Arc<IntervalSet>,
    ) -> Self {
        Self {
            store,
            geo,
            intervals,
        }
    }

    /// Upcoming events matching `criteria`, ordered by start then id.
    ///
    /// When the search location cannot be geocoded the distance filter is
    /// skipped rather than failing the search.
    pub async fn search(
        &self,
        criteria: &SearchCriteria,
        as_of: Timestamp,
    ) -> Result<SearchResults, CoreError> {
        criteria.validate()?;

        let (distance, distance_filter) = match (
            criteria.wants_distance(),
            criteria.location_text.as_deref(),
            criteria.max_distance_miles,
        ) {
            (true, Some(text), Some(max)) => match self.geo.resolve(text).await {
                Ok(origin) => (Some((origin, max)), DistanceFilter::Applied { origin }),
                Err(e) => {
                    tracing::warn!(location = text, error = %e, "Search location unresolved, skipping distance filter");
                    (
                        None,
                        DistanceFilter::Skipped {
                            reason: e.to_string(),
                        },
                    )
                }
            },
            _ => (None, DistanceFilter::NotRequested),
        };

        let upcoming = self.store.list_upcoming(as_of).await?;
        let events = filter_events(upcoming, criteria, distance);
        tracing::debug!(results = events.len(), ?distance_filter, "Search completed");
        Ok(SearchResults {
            events,
            distance_filter,
        })
    }

    /// The candidates free for all of `window`, in the given order.
    pub async fn available_among(
        &self,
        candidates: &[UserId],
        window: &TimeWindow,
    ) -> Result<Vec<UserId>, CoreError> {
        let checks = candidates.iter().map(|&user_id| async move {
            self.intervals
                .is_free(user_id, window)
                .await
                .map(|free| free.then_some(user_id))
        });
        Ok(try_join_all(checks).await?.into_iter().flatten().collect())
    }

    /// Uniform sample of `n` distinct candidates.
    pub fn random_sample<T>(&self, candidates: Vec<T>, n: usize) -> Result<Vec<T>, CoreError> {
        random_sample(candidates, n, &mut rand::rng())
    }

    /// Run a search, then draw `n` of its results at random.
    pub async fn sample_events(
        &self,
        criteria: &SearchCriteria,
        n: usize,
        as_of: Timestamp,
    ) -> Result<Vec<Event>, CoreError> {
        let results = self.search(criteria, as_of).await?;
        self.random_sample(results.events, n)
    }
}
