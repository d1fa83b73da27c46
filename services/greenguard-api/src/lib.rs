//! GreenGuard API Service Library
//!
//! HTTP shell over the `greenguard-core` aggregator: sensor pushes in,
//! station listings and summaries out.

pub mod config;
pub mod handlers;
pub mod metrics;
pub mod state;
pub mod validation;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Extension, Router,
};
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

use state::AppState;

/// Build the HTTP router.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Sensors
        .route("/api/sensors", get(handlers::sensors::list_sensors_handler))
        .route(
            "/api/temperature",
            post(handlers::sensors::push_reading_handler)
                .get(handlers::sensors::latest_reading_handler),
        )
        .route("/api/summary", get(handlers::sensors::summary_handler))
        .route("/api/fires", get(handlers::sensors::fires_handler))
        // Health and metrics
        .route("/health", get(handlers::health::health_handler))
        .route("/ready", get(handlers::health::ready_handler))
        .route("/metrics", get(handlers::health::metrics_handler))
        // Middleware
        .layer(Extension(state))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
}
