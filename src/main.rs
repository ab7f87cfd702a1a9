//! Corrida Tracker Backend
//!
//! A REST backend for delivery/ride tracking: drivers report locations,
//! dispatchers read most-recent-position-per-ride, and a jittered background
//! scheduler keeps push subscriptions in step with ride state.

mod api;
mod config;
mod db;
mod errors;
mod models;
mod push;
mod scheduler;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tokio::sync::watch;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use config::Config;
use db::Repository;
use push::{HttpPushTransport, PushTransport};
use scheduler::NotificationScheduler;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<Repository>,
    pub config: Arc<Config>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env();

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Corrida Tracker Backend");
    tracing::info!("Database path: {:?}", config.db_path);
    tracing::info!("Bind address: {}", config.bind_addr);

    // Initialize database
    let pool = db::init_database(&config.db_path).await?;
    let repo = Arc::new(Repository::new(pool));

    // Create application state
    let state = AppState {
        repo: Arc::clone(&repo),
        config: Arc::new(config.clone()),
    };

    // Spawn the notification scheduler, stoppable on shutdown
    let transport: Arc<dyn PushTransport> = Arc::new(HttpPushTransport::new(config.push_timeout)?);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let sched = NotificationScheduler::new(
        repo,
        transport,
        config.push_min_interval,
        config.push_max_interval,
    );
    tokio::spawn(sched.run(shutdown_rx));
    tracing::info!("Push notification scheduler running");

    // Build router
    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            tokio::signal::ctrl_c().await.ok();
            shutdown_tx.send(true).ok();
        })
        .await?;

    Ok(())
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // API routes
    let api_routes = Router::new()
        // Locations
        .route("/location", post(api::report_location))
        .route("/location", get(api::list_locations))
        .route("/location/check/{corrida_number}", get(api::check_location))
        .route("/recent-locations", post(api::recent_locations))
        // Rides
        .route("/rides/generate", post(api::generate_ride))
        .route("/rides/all-rides", get(api::list_rides))
        .route("/rides/{corrida_number}", get(api::get_ride_summary))
        .route("/ride/{hash}", get(api::get_ride))
        .route("/ride/status", post(api::update_status))
        // Subscriptions
        .route("/subscribe", post(api::subscribe));

    // Health check
    let health_routes = Router::new().route("/health", get(health_check));

    Router::new()
        .nest("/api", api_routes)
        .merge(health_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}
