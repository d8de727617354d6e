//! Search criteria, event filters and random candidate sampling.
//!
//! Geocoding of `location_text` happens in the engine; the functions here only
//! see already-resolved coordinates.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::event::{sort_by_start, Event};
use crate::geo::{distance_miles, Coordinates};
use crate::time_window::TimeWindow;

/// Upper bound on returned results when the caller gives no limit.
pub const DEFAULT_SEARCH_LIMIT: usize = 100;

/// Hard cap on `limit`.
pub const MAX_SEARCH_LIMIT: usize = 500;

/// Ephemeral query over upcoming events. Every field is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchCriteria {
    pub genre: Option<String>,
    pub location_text: Option<String>,
    pub max_distance_miles: Option<f64>,
    pub date_window: Option<TimeWindow>,
    pub min_capacity: Option<i32>,
    pub limit: Option<usize>,
}

impl SearchCriteria {
    pub fn validate(&self) -> Result<(), CoreError> {
        if let Some(d) = self.max_distance_miles {
            if !d.is_finite() || d <= 0.0 {
                return Err(CoreError::Validation(format!(
                    "max_distance_miles must be a positive number, got {d}"
                )));
            }
        }
        if let Some(c) = self.min_capacity {
            if c < 0 {
                return Err(CoreError::Validation(format!(
                    "min_capacity must be >= 0, got {c}"
                )));
            }
        }
        if self.limit == Some(0) {
            return Err(CoreError::Validation("limit must be >= 1".into()));
        }
        Ok(())
    }

    /// Distance filtering is requested when both a place and a radius are set.
    pub fn wants_distance(&self) -> bool {
        self.max_distance_miles.is_some()
            && self
                .location_text
                .as_deref()
                .is_some_and(|t| !t.trim().is_empty())
    }

    pub fn effective_limit(&self) -> usize {
        self.limit
            .unwrap_or(DEFAULT_SEARCH_LIMIT)
            .min(MAX_SEARCH_LIMIT)
    }
}

/// Genre (exact), capacity and date-window containment.
pub fn matches_attributes(event: &Event, criteria: &SearchCriteria) -> bool {
    criteria
        .genre
        .as_deref()
        .is_none_or(|g| event.genre == g)
        && criteria
            .min_capacity
            .is_none_or(|min| event.capacity >= min)
        && criteria
            .date_window
            .is_none_or(|w| w.contains(&event.window))
}

/// Within `max_miles` of `origin`. Unresolved or invalid coordinates never match.
pub fn within_distance(event: &Event, origin: &Coordinates, max_miles: f64) -> bool {
    event
        .coordinates
        .as_ref()
        .and_then(|c| distance_miles(origin, c).ok())
        .is_some_and(|d| d <= max_miles)
}

/// Apply the attribute filters and, when `distance` is given, the radius
/// filter. Results are ordered by start, ties by id, then truncated.
pub fn filter_events(
    events: Vec<Event>,
    criteria: &SearchCriteria,
    distance: Option<(Coordinates, f64)>,
) -> Vec<Event> {
    let mut matched: Vec<Event> = events
        .into_iter()
        .filter(|e| matches_attributes(e, criteria))
        .filter(|e| {
            distance
                .as_ref()
                .is_none_or(|(origin, max)| within_distance(e, origin, *max))
        })
        .collect();
    sort_by_start(&mut matched);
    matched.truncate(criteria.effective_limit());
    matched
}

/// Uniform selection of `n` distinct candidates, without replacement.
///
/// Fails instead of returning fewer than `n`.
pub fn random_sample<T, R>(candidates: Vec<T>, n: usize, rng: &mut R) -> Result<Vec<T>, CoreError>
where
    R: Rng + ?Sized,
{
    if n > candidates.len() {
        return Err(CoreError::InsufficientCandidates {
            requested: n,
            available: candidates.len(),
        });
    }

    let mut slots: Vec<Option<T>> = candidates.into_iter().map(Some).collect();
    let picked = rand::seq::index::sample(rng, slots.len(), n);
    Ok(picked
        .into_iter()
        .filter_map(|i| slots[i].take())
        .collect())
}
