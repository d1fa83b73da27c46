//! Read and write paths over the station registry.
//!
//! Reads make sure the externally fetched fields are fresh before taking a
//! snapshot. Writes merge an already-validated sensor reading into the
//! registry.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::info;

use crate::conditions::ConditionsSource;
use crate::classifier::FireRisk;
use crate::refresh::RefreshCoordinator;
use crate::registry::{PushOutcome, StationRegistry};
use crate::station::Station;

/// Location recorded when a reading does not name one.
pub const DEFAULT_LOCATION: &str = "Unknown";

/// A validated reading pushed by a field sensor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorReading {
    pub sensor_id: String,
    pub temperature: f64,
    pub location: String,
}

impl SensorReading {
    pub fn new(sensor_id: impl Into<String>, temperature: f64, location: Option<String>) -> Self {
        Self {
            sensor_id: sensor_id.into(),
            temperature,
            location: location.unwrap_or_else(|| DEFAULT_LOCATION.to_string()),
        }
    }
}

/// The most recent push, with every field null before the first one.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LatestReading {
    pub temperature: Option<f64>,
    pub sensor_id: Option<String>,
    pub location: Option<String>,
}

impl From<&SensorReading> for LatestReading {
    fn from(reading: &SensorReading) -> Self {
        Self {
            temperature: Some(reading.temperature),
            sensor_id: Some(reading.sensor_id.clone()),
            location: Some(reading.location.clone()),
        }
    }
}

/// One map marker: a located station and its risk category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FireEntry {
    pub id: String,
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    pub risk: FireRisk,
}

impl FireEntry {
    /// `None` for stations without coordinates.
    pub fn from_station(station: &Station) -> Option<Self> {
        let coordinate = station.coordinate()?;
        Some(Self {
            id: station.id.clone(),
            name: station.name.clone(),
            lat: coordinate.lat,
            lng: coordinate.lng,
            risk: station.fire_risk,
        })
    }
}

/// Dashboard roll-up of all stations.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    /// Mean of known temperatures, one decimal.
    pub average_temperature: Option<f64>,
    /// Stations at High or Extreme risk.
    pub high_risk_count: usize,
    /// Set when any station is at High or Extreme risk.
    pub alert: bool,
    pub station_count: usize,
    pub timestamp: DateTime<Utc>,
}

impl Summary {
    pub fn from_stations(stations: &[Station]) -> Self {
        let temperatures: Vec<f64> = stations.iter().filter_map(|s| s.temperature).collect();
        let average_temperature = if temperatures.is_empty() {
            None
        } else {
            let mean = temperatures.iter().sum::<f64>() / temperatures.len() as f64;
            Some((mean * 10.0).round() / 10.0)
        };

        let high_risk_count = stations.iter().filter(|s| s.fire_risk.is_elevated()).count();
        Self {
            average_temperature,
            high_risk_count,
            alert: high_risk_count > 0,
            station_count: stations.len(),
            timestamp: Utc::now(),
        }
    }
}

/// Entry point for request handlers.
pub struct Aggregator {
    registry: Arc<StationRegistry>,
    coordinator: RefreshCoordinator,
    latest: RwLock<Option<SensorReading>>,
}

impl Aggregator {
    pub fn new(
        registry: Arc<StationRegistry>,
        source: Arc<dyn ConditionsSource>,
        refresh_interval: Duration,
    ) -> Self {
        let coordinator = RefreshCoordinator::new(Arc::clone(&registry), source, refresh_interval);
        Self::from_parts(registry, coordinator)
    }

    pub fn from_parts(registry: Arc<StationRegistry>, coordinator: RefreshCoordinator) -> Self {
        Self {
            registry,
            coordinator,
            latest: RwLock::new(None),
        }
    }

    pub fn registry(&self) -> &StationRegistry {
        &self.registry
    }

    pub fn coordinator(&self) -> &RefreshCoordinator {
        &self.coordinator
    }

    /// All stations, refreshed first if the data is stale.
    pub async fn sensors(&self) -> Vec<Station> {
        self.coordinator.ensure_fresh().await;
        self.registry.list().await
    }

    /// Located stations with their risk, refreshed first if stale.
    pub async fn fires(&self) -> Vec<FireEntry> {
        self.sensors()
            .await
            .iter()
            .filter_map(FireEntry::from_station)
            .collect()
    }

    /// Merge a pushed reading into its station.
    ///
    /// The latest-reading slot stays locked across the upsert so it always
    /// names the push that last touched a station.
    pub async fn push(&self, reading: SensorReading) -> PushOutcome {
        info!(
            sensor_id = %reading.sensor_id,
            location = %reading.location,
            temperature = reading.temperature,
            "Received sensor reading"
        );

        let mut latest = self.latest.write().await;
        let outcome = self
            .registry
            .upsert_push(&reading.sensor_id, reading.temperature, &reading.location)
            .await;
        *latest = Some(reading);
        drop(latest);

        metrics::counter!("greenguard_pushes_total").increment(1);
        outcome
    }

    /// Roll-up over a fresh snapshot.
    pub async fn summary(&self) -> Summary {
        Summary::from_stations(&self.sensors().await)
    }

    pub async fn latest_reading(&self) -> LatestReading {
        self.latest
            .read()
            .await
            .as_ref()
            .map(LatestReading::from)
            .unwrap_or_default()
    }
}
