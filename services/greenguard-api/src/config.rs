//! Service configuration.

use std::path::PathBuf;
use std::time::Duration;

use greenguard_core::refresh::DEFAULT_MAX_CONCURRENT_FETCHES;
use greenguard_core::{OpenMeteoConfig, DEFAULT_REFRESH_INTERVAL};

/// Settings needed to build [`crate::state::AppState`].
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// YAML station file; the built-in station set is used when absent.
    pub stations_file: Option<PathBuf>,

    /// Minimum time between refresh passes.
    pub refresh_interval: Duration,

    /// Stations fetched at once during a refresh pass.
    pub max_concurrent_fetches: usize,

    /// External conditions endpoints and timeout.
    pub open_meteo: OpenMeteoConfig,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            stations_file: None,
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
            max_concurrent_fetches: DEFAULT_MAX_CONCURRENT_FETCHES,
            open_meteo: OpenMeteoConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServiceConfig::default();
        assert_eq!(config.refresh_interval, Duration::from_secs(300));
        assert_eq!(config.open_meteo.timeout, Duration::from_secs(5));
        assert!(config.stations_file.is_none());
    }
}
