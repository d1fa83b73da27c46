//! Station data model.
//!
//! A [`Station`] combines a field-sensor temperature (when one exists) with
//! conditions fetched from the external weather and air-quality services.
//! Every mutation goes through a method here so that `fire_risk` is
//! recomputed in the same step as the fields it depends on.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::classifier::{classify, FireRisk};
use crate::conditions::{AirQualityFields, Coordinate, WeatherFields};

/// Where a station's temperature comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StationKind {
    /// Backed by a field sensor; pushed temperatures win over fetched ones.
    Physical,
    /// No sensor; temperature always follows the external service.
    #[default]
    Virtual,
}

/// A tracked location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Station {
    pub id: String,
    pub name: String,
    pub city: String,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub kind: StationKind,

    /// Air temperature in °C.
    pub temperature: Option<f64>,
    /// Relative humidity in %.
    pub humidity: Option<f64>,
    /// Wind speed in km/h.
    pub wind_speed: Option<f64>,
    pub uv_index: Option<f64>,
    pub pm2_5: Option<f64>,
    pub pm10: Option<f64>,
    pub aqi_us: Option<f64>,

    pub fire_risk: FireRisk,
    pub last_update: Option<DateTime<Utc>>,
}

impl Station {
    /// Create a station with known coordinates and no readings yet.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        city: impl Into<String>,
        coordinate: Option<Coordinate>,
        kind: StationKind,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            city: city.into(),
            lat: coordinate.map(|c| c.lat),
            lng: coordinate.map(|c| c.lng),
            kind,
            temperature: None,
            humidity: None,
            wind_speed: None,
            uv_index: None,
            pm2_5: None,
            pm10: None,
            aqi_us: None,
            fire_risk: FireRisk::Unknown,
            last_update: None,
        }
    }

    /// Create the station for a sensor id that was never configured.
    ///
    /// The push came from a field sensor, so the station is physical. Its
    /// position is unknown and it is never refreshed externally.
    pub fn from_unseen_push(id: impl Into<String>) -> Self {
        let id = id.into();
        Self::new(id.clone(), id, "Unknown", None, StationKind::Physical)
    }

    /// Coordinates, when both halves are known.
    pub fn coordinate(&self) -> Option<Coordinate> {
        match (self.lat, self.lng) {
            (Some(lat), Some(lng)) => Some(Coordinate { lat, lng }),
            _ => None,
        }
    }

    /// Record a pushed sensor reading. Environmental fields and coordinates
    /// are left alone.
    pub fn apply_push(&mut self, temperature: f64, city: &str, at: DateTime<Utc>) {
        self.temperature = Some(temperature);
        self.city = city.to_string();
        self.last_update = Some(at);
        self.recompute_risk();
    }

    /// Merge freshly fetched conditions.
    ///
    /// Every environmental field takes the fetched value, absent included.
    /// A physical station keeps a temperature it already has; a virtual
    /// station always takes the fetched temperature.
    pub fn apply_conditions(
        &mut self,
        weather: &WeatherFields,
        air: &AirQualityFields,
        at: DateTime<Utc>,
    ) {
        match self.kind {
            StationKind::Physical => {
                if self.temperature.is_none() {
                    self.temperature = weather.temperature;
                }
            }
            StationKind::Virtual => self.temperature = weather.temperature,
        }

        self.humidity = weather.humidity;
        self.wind_speed = weather.wind_speed;
        self.uv_index = air.uv_index.or(weather.uv_index);
        self.pm2_5 = air.pm2_5;
        self.pm10 = air.pm10;
        self.aqi_us = air.aqi_us;
        self.last_update = Some(at);
        self.recompute_risk();
    }

    fn recompute_risk(&mut self) {
        self.fire_risk = classify(self.temperature, self.humidity, self.wind_speed, self.aqi_us);
    }
}
