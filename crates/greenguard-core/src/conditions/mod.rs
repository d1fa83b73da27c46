//! Current weather and air-quality conditions for a coordinate.
//!
//! The refresh path only sees the [`ConditionsSource`] trait. Each call
//! reports either the fields the upstream actually returned or
//! [`FetchOutcome::Unavailable`]; upstream errors never escape a source.

mod open_meteo;
#[cfg(test)]
pub(crate) mod testing;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use open_meteo::{OpenMeteoClient, OpenMeteoConfig};

/// A WGS84 position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

/// Fields read from the general weather service.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct WeatherFields {
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub wind_speed: Option<f64>,
    pub uv_index: Option<f64>,
}

/// Fields read from the air-quality service.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AirQualityFields {
    pub pm2_5: Option<f64>,
    pub pm10: Option<f64>,
    pub aqi_us: Option<f64>,
    pub uv_index: Option<f64>,
}

/// Result of one fetch against one source.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome<T> {
    Ok(T),
    /// The source could not be reached or answered with garbage.
    Unavailable,
}

impl<T: Default> FetchOutcome<T> {
    /// Fields to merge into a station. `Unavailable` means every field is absent.
    pub fn into_fields(self) -> T {
        match self {
            FetchOutcome::Ok(fields) => fields,
            FetchOutcome::Unavailable => T::default(),
        }
    }
}

impl<T> FetchOutcome<T> {
    pub fn is_unavailable(&self) -> bool {
        matches!(self, FetchOutcome::Unavailable)
    }
}

/// Provider of current conditions.
#[async_trait]
pub trait ConditionsSource: Send + Sync {
    /// Current temperature, humidity, wind speed and UV index.
    async fn weather(&self, at: Coordinate) -> FetchOutcome<WeatherFields>;

    /// Current PM2.5, PM10, US AQI and UV index.
    async fn air_quality(&self, at: Coordinate) -> FetchOutcome<AirQualityFields>;
}
