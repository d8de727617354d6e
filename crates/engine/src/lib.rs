//! Gigify scheduling engine.
//!
//! Wires the five components over a shared [`ScheduleStore`]:
//!
//! - [`geo::GeospatialIndex`]: cached geocoding and distance.
//! - [`availability::IntervalSet`]: per-owner availability windows.
//! - [`registry::EventRegistry`]: events and their accept/favorite/contact edges.
//! - [`reconcile::ReconciliationEngine`]: merged, conflict-annotated schedules.
//! - [`search::SearchPlanner`]: event search, availability matching and sampling.

pub mod availability;
pub mod config;
pub mod geo;
pub mod memory;
pub mod reconcile;
pub mod registry;
pub mod search;

use std::sync::Arc;

use gigify_calendar::CalendarClient;
use gigify_core::store::ScheduleStore;
use gigify_events::EventBus;
use gigify_geocode::Geocoder;

pub use availability::{InsertOutcome, IntervalSet};
pub use config::EngineConfig;
pub use geo::{GeocodeFailure, GeospatialIndex};
pub use memory::MemoryStore;
pub use reconcile::{ReconciliationEngine, ScheduleRequest};
pub use registry::EventRegistry;
pub use search::{DistanceFilter, SearchPlanner, SearchResults};

/// All engine components, sharing one store. Cheap to clone.
#[derive(Clone)]
pub struct Engine {
    pub geo: Arc<GeospatialIndex>,
    pub intervals: Arc<IntervalSet>,
    pub registry: Arc<EventRegistry>,
    pub reconciler: Arc<ReconciliationEngine>,
    pub search: Arc<SearchPlanner>,
}

impl Engine {
    pub fn new(
        store: Arc<dyn ScheduleStore>,
        geocoder: Option<Arc<dyn Geocoder>>,
        calendar: Arc<dyn CalendarClient>,
        bus: Arc<EventBus>,
        config: EngineConfig,
    ) -> Self {
        let geo = Arc::new(GeospatialIndex::new(geocoder, config.geocode_timeout));
        let intervals = Arc::new(IntervalSet::new(Arc::clone(&store)));
        let registry = Arc::new(EventRegistry::new(
            Arc::clone(&store),
            Arc::clone(&geo),
            Arc::clone(&calendar),
            bus,
            config.clone(),
        ));
        let reconciler = Arc::new(ReconciliationEngine::new(
            Arc::clone(&store),
            Arc::clone(&intervals),
            calendar,
            config,
        ));
        let search = Arc::new(SearchPlanner::new(store, Arc::clone(&geo), Arc::clone(&intervals)));

        Self {
            geo,
            intervals,
            registry,
            reconciler,
            search,
        }
    }
}
