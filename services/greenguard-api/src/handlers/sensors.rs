//! Sensor ingestion and station listing handlers.

use std::sync::Arc;

use axum::{body::Bytes, extract::Extension, Json};
use serde::Serialize;
use tracing::warn;

use greenguard_core::{FireEntry, LatestReading, Station, Summary};

use super::ApiError;
use crate::state::AppState;
use crate::validation::parse_reading;

#[derive(Debug, Serialize)]
pub struct SensorsResponse {
    pub sensors: Vec<Station>,
}

#[derive(Debug, Serialize)]
pub struct PushResponse {
    pub success: bool,
    /// Whether the reading created a new station.
    pub created: bool,
}

/// GET /api/sensors - All stations, refreshed if stale
pub async fn list_sensors_handler(
    Extension(state): Extension<Arc<AppState>>,
) -> Json<SensorsResponse> {
    Json(SensorsResponse {
        sensors: state.aggregator.sensors().await,
    })
}

/// POST /api/temperature - Accept a field sensor reading
pub async fn push_reading_handler(
    Extension(state): Extension<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<PushResponse>, ApiError> {
    let reading = parse_reading(&body).map_err(|e| {
        warn!(error = %e, "Rejected sensor reading");
        ApiError::from(e)
    })?;

    let outcome = state.aggregator.push(reading).await;
    Ok(Json(PushResponse {
        success: true,
        created: outcome.is_created(),
    }))
}

/// GET /api/temperature - Most recent pushed reading
pub async fn latest_reading_handler(
    Extension(state): Extension<Arc<AppState>>,
) -> Json<LatestReading> {
    Json(state.aggregator.latest_reading().await)
}

/// GET /api/summary - Average temperature and high-risk count
pub async fn summary_handler(Extension(state): Extension<Arc<AppState>>) -> Json<Summary> {
    Json(state.aggregator.summary().await)
}

/// GET /api/fires - Located stations with their risk category
pub async fn fires_handler(Extension(state): Extension<Arc<AppState>>) -> Json<Vec<FireEntry>> {
    Json(state.aggregator.fires().await)
}
