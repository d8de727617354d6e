use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use gigify_api::config::{ServerConfig, StoreBackend};
use gigify_api::router::build_app_router;
use gigify_api::state::AppState;
use gigify_calendar::{CalendarClient, GoogleCalendarClient, GoogleCalendarConfig};
use gigify_core::store::ScheduleStore;
use gigify_engine::{Engine, EngineConfig, MemoryStore};
use gigify_events::{EmailConfig, EmailDelivery, EventBus, NotificationDispatcher};
use gigify_geocode::{Geocoder, GoogleGeocoder, GoogleGeocoderConfig};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    init_tracing();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    let engine_config = EngineConfig::from_env();
    tracing::info!(
        host = %config.host,
        port = config.port,
        backend = ?config.store_backend,
        "Loaded server configuration"
    );

    // --- Store ---
    let (store, pool): (Arc<dyn ScheduleStore>, Option<gigify_db::DbPool>) =
        match config.store_backend {
            StoreBackend::Postgres => {
                let database_url =
                    std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
                let pool = gigify_db::create_pool(&database_url)
                    .await
                    .expect("Failed to connect to database");
                tracing::info!("Database connection pool created");

                gigify_db::health_check(&pool)
                    .await
                    .expect("Database health check failed");

                gigify_db::run_migrations(&pool)
                    .await
                    .expect("Failed to run database migrations");
                tracing::info!("Database migrations applied");

                (Arc::new(gigify_db::PgStore::new(pool.clone())), Some(pool))
            }
            StoreBackend::Memory => {
                tracing::warn!("Using in-memory store, data will not survive a restart");
                (Arc::new(MemoryStore::new()), None)
            }
        };

    // --- External providers ---
    let geocoder: Option<Arc<dyn Geocoder>> = match GoogleGeocoderConfig::from_env() {
        Some(geo_config) => match GoogleGeocoder::new(geo_config) {
            Ok(geocoder) => Some(Arc::new(geocoder)),
            Err(e) => {
                tracing::error!(error = %e, "Failed to build geocoder, location search disabled");
                None
            }
        },
        None => {
            tracing::warn!("GOOGLE_MAPS_API_KEY not set, geocoding disabled");
            None
        }
    };

    let calendar: Arc<dyn CalendarClient> = Arc::new(
        GoogleCalendarClient::new(GoogleCalendarConfig::from_env())
            .expect("Failed to build calendar HTTP client"),
    );

    // --- Event bus and notification dispatcher ---
    let event_bus = Arc::new(EventBus::default());
    let email = EmailConfig::from_env().map(EmailDelivery::new);
    if email.is_none() {
        tracing::info!("SMTP not configured, notifications are in-app only");
    }

    let dispatcher_cancel = CancellationToken::new();
    let dispatcher = NotificationDispatcher::new(Arc::clone(&store), email);
    let dispatcher_handle = tokio::spawn(
        dispatcher.run(event_bus.subscribe(), dispatcher_cancel.clone()),
    );
    tracing::info!("Notification dispatcher started");

    // --- Engine and app state ---
    let engine = Engine::new(
        Arc::clone(&store),
        geocoder,
        calendar,
        event_bus,
        engine_config,
    );

    let state = AppState {
        engine: engine.clone(),
        store,
        pool,
        config: Arc::new(config.clone()),
    };

    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");
    let drain = Duration::from_secs(config.shutdown_timeout_secs);

    // Drain pending coordinate writes from in-flight geocoding.
    if tokio::time::timeout(drain, engine.registry.wait_for_background())
        .await
        .is_err()
    {
        tracing::warn!("Background geocoding did not finish before shutdown timeout");
    }

    dispatcher_cancel.cancel();
    let _ = tokio::time::timeout(drain, dispatcher_handle).await;
    tracing::info!("Notification dispatcher stopped");

    tracing::info!("Graceful shutdown complete");
}

/// `RUST_LOG` filter with a debug default; JSON lines when `LOG_FORMAT=json`.
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        "gigify_api=debug,gigify_engine=debug,gigify_events=debug,tower_http=debug".into()
    });
    let json = std::env::var("LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json"));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

/// Wait for SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
