//! Application state for the GreenGuard API.

use std::sync::Arc;

use anyhow::{Context, Result};
use metrics_exporter_prometheus::PrometheusHandle;

use greenguard_core::{
    Aggregator, ConditionsSource, OpenMeteoClient, RefreshCoordinator, StationRegistry,
    StationsConfig,
};

use crate::config::ServiceConfig;

/// Shared application state.
pub struct AppState {
    /// Read and write paths over the station registry.
    pub aggregator: Aggregator,

    /// Prometheus renderer, when a recorder was installed.
    pub prometheus: Option<PrometheusHandle>,
}

impl AppState {
    /// Load stations and build the Open-Meteo backed aggregator.
    pub fn new(config: &ServiceConfig) -> Result<Self> {
        let stations = StationsConfig::load_or_default(config.stations_file.as_deref())
            .context("Failed to load station configuration")?;

        let client = OpenMeteoClient::new(config.open_meteo.clone())
            .context("Failed to create conditions client")?;

        Ok(Self::with_source(config, &stations, Arc::new(client)))
    }

    /// Build state around any conditions source.
    pub fn with_source(
        config: &ServiceConfig,
        stations: &StationsConfig,
        source: Arc<dyn ConditionsSource>,
    ) -> Self {
        let registry = Arc::new(StationRegistry::from_stations(stations.to_stations()));
        let coordinator =
            RefreshCoordinator::new(Arc::clone(&registry), source, config.refresh_interval)
                .with_max_concurrent(config.max_concurrent_fetches);

        tracing::info!(
            stations = stations.stations.len(),
            refresh_interval_secs = config.refresh_interval.as_secs(),
            "Station registry initialized"
        );

        Self {
            aggregator: Aggregator::from_parts(registry, coordinator),
            prometheus: None,
        }
    }

    pub fn with_prometheus(mut self, handle: PrometheusHandle) -> Self {
        self.prometheus = Some(handle);
        self
    }
}
