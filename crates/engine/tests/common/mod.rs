//! Shared fixtures for engine integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use gigify_calendar::{CalendarClient, CalendarError, MirrorEvent};
use gigify_core::calendar::ExternalCalendarEvent;
use gigify_core::event::NewEvent;
use gigify_core::geo::Coordinates;
use gigify_core::store::ScheduleStore;
use gigify_core::time_window::TimeWindow;
use gigify_engine::{Engine, EngineConfig, MemoryStore};
use gigify_events::EventBus;
use gigify_geocode::{GeocodeError, Geocoder};

pub const LONDON: Coordinates = Coordinates { lat: 51.5074, lng: -0.1278 };
/// Roughly 175 miles north of London.
pub const YORK: Coordinates = Coordinates { lat: 53.9590, lng: -1.0815 };

/// Geocoder with a fixed gazetteer. `"Down"` simulates a provider outage.
pub struct FixedGeocoder;

#[async_trait::async_trait]
impl Geocoder for FixedGeocoder {
    async fn geocode(&self, location: &str) -> Result<Coordinates, GeocodeError> {
        match location {
            "London" | "Camden, London" => Ok(LONDON),
            "York" => Ok(YORK),
            "Down" => Err(GeocodeError::Api {
                status: "UNKNOWN_ERROR".into(),
                message: "backend unavailable".into(),
            }),
            other => Err(GeocodeError::NoResults(other.to_string())),
        }
    }
}

/// What the fake calendar does on reads.
#[derive(Clone)]
pub enum CalendarMode {
    Entries(Vec<ExternalCalendarEvent>),
    Fail,
    Hang,
}

pub struct FakeCalendar {
    pub mode: Mutex<CalendarMode>,
    pub inserted: Mutex<Vec<MirrorEvent>>,
}

impl FakeCalendar {
    pub fn new(mode: CalendarMode) -> Self {
        Self {
            mode: Mutex::new(mode),
            inserted: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait::async_trait]
impl CalendarClient for FakeCalendar {
    async fn list_upcoming(
        &self,
        _credential: &str,
        _time_min: DateTime<Utc>,
        _max_results: u32,
    ) -> Result<Vec<ExternalCalendarEvent>, CalendarError> {
        let mode = self.mode.lock().unwrap().clone();
        match mode {
            CalendarMode::Entries(entries) => Ok(entries),
            CalendarMode::Fail => Err(CalendarError::Api {
                status: 503,
                body: "unavailable".into(),
            }),
            CalendarMode::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(Vec::new())
            }
        }
    }

    async fn insert_event(
        &self,
        _credential: &str,
        event: &MirrorEvent,
    ) -> Result<String, CalendarError> {
        let mut inserted = self.inserted.lock().unwrap();
        inserted.push(event.clone());
        Ok(format!("ext-{}", inserted.len()))
    }
}

pub struct Harness {
    pub engine: Engine,
    pub store: Arc<MemoryStore>,
    pub calendar: Arc<FakeCalendar>,
    pub bus: Arc<EventBus>,
}

fn test_engine_config() -> EngineConfig {
    EngineConfig {
        geocode_timeout: Duration::from_millis(200),
        calendar_timeout: Duration::from_millis(200),
        calendar_max_results: 10,
    }
}

pub fn harness(mode: CalendarMode) -> Harness {
    let store = Arc::new(MemoryStore::new());
    let calendar = Arc::new(FakeCalendar::new(mode));
    let bus = Arc::new(EventBus::default());
    let engine = Engine::new(
        store.clone(),
        Some(Arc::new(FixedGeocoder)),
        calendar.clone(),
        bus.clone(),
        test_engine_config(),
    );
    Harness {
        engine,
        store,
        calendar,
        bus,
    }
}

/// Tomorrow at `hour:00` UTC plus `day_offset` days.
pub fn tomorrow_at(hour: u32, day_offset: i64) -> DateTime<Utc> {
    let date = (Utc::now() + chrono::Duration::days(1 + day_offset)).date_naive();
    date.and_hms_opt(hour, 0, 0).unwrap().and_utc()
}

pub fn span(from_hour: u32, to_hour: u32) -> TimeWindow {
    TimeWindow::new(tomorrow_at(from_hour, 0), tomorrow_at(to_hour, 0)).unwrap()
}

pub fn gig(title: &str, genre: &str, location: &str, window: TimeWindow) -> NewEvent {
    NewEvent {
        title: title.into(),
        genre: genre.into(),
        description: String::new(),
        window,
        location: location.into(),
        capacity: 100,
        photo_ref: None,
    }
}

/// Engine over a caller-supplied store, with the fixed geocoder and an empty
/// calendar.
pub fn engine_over(store: Arc<dyn ScheduleStore>) -> Engine {
    Engine::new(
        store,
        Some(Arc::new(FixedGeocoder)),
        Arc::new(FakeCalendar::new(CalendarMode::Entries(vec![]))),
        Arc::new(EventBus::default()),
        test_engine_config(),
    )
}
