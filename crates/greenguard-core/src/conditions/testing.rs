//! Scripted conditions source for unit tests.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use super::{AirQualityFields, ConditionsSource, Coordinate, FetchOutcome, WeatherFields};

/// Returns fixed fields for every coordinate, except coordinates marked as
/// failing, and counts calls.
pub struct ScriptedSource {
    pub weather: WeatherFields,
    pub air: AirQualityFields,
    pub latency: Duration,
    failing: Mutex<HashSet<(u64, u64)>>,
    weather_calls: AtomicUsize,
    air_calls: AtomicUsize,
}

fn key(at: Coordinate) -> (u64, u64) {
    (at.lat.to_bits(), at.lng.to_bits())
}

impl ScriptedSource {
    pub fn new(weather: WeatherFields, air: AirQualityFields) -> Self {
        Self {
            weather,
            air,
            latency: Duration::from_millis(50),
            failing: Mutex::new(HashSet::new()),
            weather_calls: AtomicUsize::new(0),
            air_calls: AtomicUsize::new(0),
        }
    }

    pub fn fail_at(&self, at: Coordinate) {
        self.failing.lock().unwrap().insert(key(at));
    }

    fn is_failing(&self, at: Coordinate) -> bool {
        self.failing.lock().unwrap().contains(&key(at))
    }

    pub fn weather_calls(&self) -> usize {
        self.weather_calls.load(Ordering::SeqCst)
    }

    pub fn air_calls(&self) -> usize {
        self.air_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ConditionsSource for ScriptedSource {
    async fn weather(&self, at: Coordinate) -> FetchOutcome<WeatherFields> {
        self.weather_calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.latency).await;
        if self.is_failing(at) {
            FetchOutcome::Unavailable
        } else {
            FetchOutcome::Ok(self.weather)
        }
    }

    async fn air_quality(&self, at: Coordinate) -> FetchOutcome<AirQualityFields> {
        self.air_calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.latency).await;
        if self.is_failing(at) {
            FetchOutcome::Unavailable
        } else {
            FetchOutcome::Ok(self.air)
        }
    }
}
