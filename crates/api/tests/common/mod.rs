//! Shared fixtures for API integration tests.
//!
//! The app runs over `MemoryStore` with a fixed geocoder and a scripted
//! calendar, behind the same middleware stack production uses.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use chrono::{DateTime, Utc};
use gigify_api::auth::jwt::{generate_access_token, JwtConfig};
use gigify_api::config::{ServerConfig, StoreBackend};
use gigify_api::router::build_app_router;
use gigify_api::state::AppState;
use gigify_calendar::{CalendarClient, CalendarError, MirrorEvent};
use gigify_core::calendar::ExternalCalendarEvent;
use gigify_core::geo::Coordinates;
use gigify_core::types::UserId;
use gigify_engine::{Engine, EngineConfig, MemoryStore};
use gigify_events::EventBus;
use gigify_geocode::{GeocodeError, Geocoder};
use http_body_util::BodyExt;
use tower::ServiceExt;

pub const LONDON: Coordinates = Coordinates { lat: 51.5074, lng: -0.1278 };
pub const YORK: Coordinates = Coordinates { lat: 53.9590, lng: -1.0815 };

pub struct FixedGeocoder;

#[async_trait::async_trait]
impl Geocoder for FixedGeocoder {
    async fn geocode(&self, location: &str) -> Result<Coordinates, GeocodeError> {
        match location {
            "London" => Ok(LONDON),
            "York" => Ok(YORK),
            other => Err(GeocodeError::NoResults(other.to_string())),
        }
    }
}

/// Calendar that serves nothing on reads, or fails when `failing` is set.
#[derive(Default)]
pub struct ScriptedCalendar {
    pub failing: Mutex<bool>,
    pub inserted: Mutex<Vec<MirrorEvent>>,
}

#[async_trait::async_trait]
impl CalendarClient for ScriptedCalendar {
    async fn list_upcoming(
        &self,
        _credential: &str,
        _time_min: DateTime<Utc>,
        _max_results: u32,
    ) -> Result<Vec<ExternalCalendarEvent>, CalendarError> {
        if *self.failing.lock().unwrap() {
            return Err(CalendarError::Api {
                status: 503,
                body: "unavailable".into(),
            });
        }
        Ok(Vec::new())
    }

    async fn insert_event(
        &self,
        _credential: &str,
        event: &MirrorEvent,
    ) -> Result<String, CalendarError> {
        if *self.failing.lock().unwrap() {
            return Err(CalendarError::Unauthorized { status: 401 });
        }
        let mut inserted = self.inserted.lock().unwrap();
        inserted.push(event.clone());
        Ok(format!("ext-{}", inserted.len()))
    }
}

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 5,
        store_backend: StoreBackend::Memory,
        jwt: JwtConfig {
            secret: "test-secret-that-is-long-enough-for-hmac".to_string(),
            access_token_expiry_mins: 15,
        },
    }
}

pub struct TestApp {
    pub router: Router,
    pub engine: Engine,
    pub store: Arc<MemoryStore>,
    pub calendar: Arc<ScriptedCalendar>,
    pub config: ServerConfig,
}

impl TestApp {
    /// A valid bearer token for `user_id`.
    pub fn token(&self, user_id: UserId) -> String {
        generate_access_token(user_id, "musician", &self.config.jwt).unwrap()
    }

    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        user_id: Option<UserId>,
        body: Option<serde_json::Value>,
    ) -> Response<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(user_id) = user_id {
            builder = builder.header("authorization", format!("Bearer {}", self.token(user_id)));
        }
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.router.clone().oneshot(request).await.unwrap()
    }

    pub async fn get(&self, uri: &str, user_id: UserId) -> Response<Body> {
        self.send(Method::GET, uri, Some(user_id), None).await
    }

    pub async fn post_json(
        &self,
        uri: &str,
        user_id: UserId,
        body: serde_json::Value,
    ) -> Response<Body> {
        self.send(Method::POST, uri, Some(user_id), Some(body)).await
    }

    pub async fn put_json(
        &self,
        uri: &str,
        user_id: UserId,
        body: serde_json::Value,
    ) -> Response<Body> {
        self.send(Method::PUT, uri, Some(user_id), Some(body)).await
    }

    pub async fn delete(&self, uri: &str, user_id: UserId) -> Response<Body> {
        self.send(Method::DELETE, uri, Some(user_id), None).await
    }

    /// Create an event through the API and return its JSON.
    pub async fn create_event(
        &self,
        owner: UserId,
        title: &str,
        location: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> serde_json::Value {
        let response = self
            .post_json(
                "/api/v1/events",
                owner,
                serde_json::json!({
                    "title": title,
                    "genre": "Jazz",
                    "description": "Live set",
                    "window": { "start": start, "end": end },
                    "location": location,
                    "capacity": 120,
                }),
            )
            .await;
        assert_eq!(response.status(), axum::http::StatusCode::CREATED);
        body_json(response).await["data"].clone()
    }
}

pub fn build_test_app() -> TestApp {
    let config = test_config();
    let store = Arc::new(MemoryStore::new());
    let calendar = Arc::new(ScriptedCalendar::default());
    let bus = Arc::new(EventBus::default());
    let engine = Engine::new(
        store.clone(),
        Some(Arc::new(FixedGeocoder)),
        calendar.clone(),
        bus,
        EngineConfig {
            geocode_timeout: Duration::from_millis(200),
            calendar_timeout: Duration::from_millis(200),
            calendar_max_results: 10,
        },
    );

    let state = AppState {
        engine: engine.clone(),
        store: store.clone(),
        pool: None,
        config: Arc::new(config.clone()),
    };

    TestApp {
        router: build_app_router(state, &config),
        engine,
        store,
        calendar,
        config,
    }
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// `day_offset` days from now at `hour:00` UTC.
pub fn days_ahead_at(day_offset: i64, hour: u32) -> DateTime<Utc> {
    (Utc::now() + chrono::Duration::days(day_offset))
        .date_naive()
        .and_hms_opt(hour, 0, 0)
        .unwrap()
        .and_utc()
}
