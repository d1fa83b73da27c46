//! Throttled refresh of externally fetched station fields.
//!
//! Refresh is lazy: the first read that finds the data older than the refresh
//! interval runs a pass while holding the coordinator lock. Readers that
//! arrive during the pass wait on that lock and then find the data fresh, so
//! the external APIs see at most one batch per interval.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use serde::Serialize;
use tokio::sync::{Mutex, RwLock};
use tokio::time::Instant;
use tracing::{debug, info, instrument};

use crate::conditions::ConditionsSource;
use crate::registry::StationRegistry;

/// Minimum time between two refresh passes.
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(300);

/// Default cap on stations fetched at once during a pass.
pub const DEFAULT_MAX_CONCURRENT_FETCHES: usize = 8;

/// Summary of one refresh pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RefreshReport {
    /// Coordinate-bearing stations fetched.
    pub stations: usize,
    /// Stations whose fields were merged.
    pub applied: usize,
    pub weather_failures: usize,
    pub air_quality_failures: usize,
    pub duration_ms: u64,
    pub completed_at: DateTime<Utc>,
}

/// Result of [`RefreshCoordinator::ensure_fresh`].
#[derive(Debug, Clone, PartialEq)]
pub enum RefreshOutcome {
    /// Data was within the interval; nothing was fetched.
    Fresh,
    /// A pass ran.
    Refreshed(RefreshReport),
}

/// Decides when to refresh and runs the refresh pass.
pub struct RefreshCoordinator {
    registry: Arc<StationRegistry>,
    source: Arc<dyn ConditionsSource>,
    interval: Duration,
    max_concurrent: usize,
    /// Held across the staleness check and the pass.
    last_refresh_at: Mutex<Option<Instant>>,
    last_report: RwLock<Option<RefreshReport>>,
}

impl RefreshCoordinator {
    pub fn new(
        registry: Arc<StationRegistry>,
        source: Arc<dyn ConditionsSource>,
        interval: Duration,
    ) -> Self {
        Self {
            registry,
            source,
            interval,
            max_concurrent: DEFAULT_MAX_CONCURRENT_FETCHES,
            last_refresh_at: Mutex::new(None),
            last_report: RwLock::new(None),
        }
    }

    pub fn with_max_concurrent(mut self, max_concurrent: usize) -> Self {
        self.max_concurrent = max_concurrent.max(1);
        self
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Refresh if the last check that triggered a pass was more than one
    /// interval ago, or no pass has run.
    pub async fn ensure_fresh(&self) -> RefreshOutcome {
        let mut last = self.last_refresh_at.lock().await;
        let now = Instant::now();

        let stale = match *last {
            None => true,
            Some(at) => now.duration_since(at) > self.interval,
        };
        if !stale {
            return RefreshOutcome::Fresh;
        }

        debug!("Station conditions are stale, refreshing");
        let report = self.run_pass().await;
        *last = Some(now);
        RefreshOutcome::Refreshed(report)
    }

    /// Run a pass regardless of age. Still serialized with `ensure_fresh`.
    #[cfg(test)]
    pub(crate) async fn force_refresh(&self) -> RefreshReport {
        let mut last = self.last_refresh_at.lock().await;
        let now = Instant::now();
        let report = self.run_pass().await;
        *last = Some(now);
        report
    }

    /// Report of the most recent completed pass.
    pub async fn last_report(&self) -> Option<RefreshReport> {
        self.last_report.read().await.clone()
    }

    #[instrument(skip(self))]
    async fn run_pass(&self) -> RefreshReport {
        let started = Instant::now();
        let targets = self.registry.refresh_targets().await;
        let stations = targets.len();

        let mut fetched = stream::iter(targets)
            .map(|(id, coordinate)| {
                let source = Arc::clone(&self.source);
                async move {
                    let (weather, air) = tokio::join!(
                        source.weather(coordinate),
                        source.air_quality(coordinate)
                    );
                    (id, weather, air)
                }
            })
            .buffer_unordered(self.max_concurrent);

        let mut applied = 0;
        let mut weather_failures = 0;
        let mut air_quality_failures = 0;

        while let Some((id, weather, air)) = fetched.next().await {
            if weather.is_unavailable() {
                weather_failures += 1;
            }
            if air.is_unavailable() {
                air_quality_failures += 1;
            }
            let weather = weather.into_fields();
            let air = air.into_fields();
            if self.registry.apply_refresh(&id, &weather, &air).await {
                applied += 1;
            }
        }

        let elapsed = started.elapsed();
        let report = RefreshReport {
            stations,
            applied,
            weather_failures,
            air_quality_failures,
            duration_ms: elapsed.as_millis() as u64,
            completed_at: Utc::now(),
        };

        metrics::counter!("greenguard_refresh_passes_total").increment(1);
        metrics::histogram!("greenguard_refresh_duration_seconds").record(elapsed.as_secs_f64());
        info!(
            stations = report.stations,
            applied = report.applied,
            weather_failures = report.weather_failures,
            air_quality_failures = report.air_quality_failures,
            duration_ms = report.duration_ms,
            "Refresh pass complete"
        );

        *self.last_report.write().await = Some(report.clone());
        report
    }
}
