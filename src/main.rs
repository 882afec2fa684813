//! Presentia Server - Gym Occupancy & Attendance Engine
//!
//! A Rust REST API server tracking live facility occupancy and streaming
//! a reconciled dashboard view to connected clients.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    routing::{get, post, put},
    Router,
};
use chrono::{DateTime, Local, NaiveTime, Utc};
use sqlx::postgres::PgPoolOptions;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use presentia_server::{
    api,
    config::AppConfig,
    engine::{hub::DashboardHub, reconcile::Reconciler, EnginePolicy, OccupancyEngine},
    repository::Repository,
    services::Services,
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Load configuration
    let config = AppConfig::load().expect("Failed to load configuration");

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!(
            "presentia_server={},tower_http=debug",
            config.logging.level
        )
        .into()
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Presentia Server v{}", env!("CARGO_PKG_VERSION"));

    // Create database connection pool
    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .connect(&config.database.url)
        .await
        .expect("Failed to connect to database");

    tracing::info!("Connected to database");

    // Run migrations
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run database migrations");

    tracing::info!("Database migrations completed");

    // Save server address before moving config
    let server_host = config.server.host.clone();
    let server_port = config.server.port;

    // Create repository and rebuild the live engine from the store
    let repository = Repository::new(pool);
    let facilities = repository
        .facilities
        .list()
        .await
        .expect("Failed to load facilities");
    tracing::info!(count = facilities.len(), "Facilities loaded");

    let engine = Arc::new(OccupancyEngine::new(
        EnginePolicy {
            full_threshold_percent: config.engine.full_threshold_percent,
        },
        facilities,
        config.engine.event_buffer,
    ));

    let (day_start, day_end) = today_utc_window();
    let todays_sessions = repository
        .sessions
        .list_between(day_start, day_end)
        .await
        .expect("Failed to load today's sessions");
    engine.restore(todays_sessions);

    // Propagation hub, seeded so the first subscriber never starts blank
    let hub = Arc::new(DashboardHub::new(
        engine.snapshot(),
        config.engine.subscriber_buffer,
    ));

    // Debounced reconciliation task
    let reconciler = Reconciler::new(
        engine.clone(),
        hub.clone(),
        Duration::from_millis(config.engine.debounce_ms),
    );
    tokio::spawn(reconciler.run());

    // Create services and application state
    let services = Services::new(repository, engine, hub);
    let state = AppState {
        config: Arc::new(config),
        services: Arc::new(services),
    };

    // Build router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(
        server_host.parse().expect("Invalid host address"),
        server_port,
    );

    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// UTC bounds of the current local calendar day, for startup recovery
fn today_utc_window() -> (DateTime<Utc>, DateTime<Utc>) {
    let start = Local::now()
        .date_naive()
        .and_time(NaiveTime::MIN)
        .and_local_timezone(Local)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        // Midnight does not exist in this offset; a generous window is fine
        .unwrap_or_else(|| Utc::now() - chrono::Duration::hours(24));
    (start, start + chrono::Duration::days(1))
}

/// Create the application router with all routes
fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // API v1 routes
    let api_v1 = Router::new()
        // Health check
        .route("/health", get(api::health::health_check))
        .route("/ready", get(api::health::readiness_check))
        // Attendance
        .route("/attendance/arrivals", post(api::attendance::arrive))
        .route("/attendance/sessions", get(api::attendance::list_sessions))
        .route(
            "/attendance/sessions/:id/facility",
            post(api::attendance::select_facility),
        )
        .route(
            "/attendance/sessions/:id/depart",
            post(api::attendance::depart),
        )
        // Facilities
        .route("/facilities", get(api::facilities::list_facilities))
        .route("/facilities/:id", get(api::facilities::get_facility))
        .route(
            "/facilities/:id/status",
            put(api::facilities::update_facility_status),
        )
        // Dashboard
        .route("/dashboard", get(api::dashboard::get_dashboard))
        .route("/dashboard/stats", get(api::dashboard::get_stats))
        .route("/dashboard/stream", get(api::dashboard::stream_dashboard))
        .with_state(state.clone());

    // OpenAPI documentation
    let openapi = api::openapi::create_openapi_router();

    Router::new()
        .nest("/api/v1", api_v1)
        .merge(openapi)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
