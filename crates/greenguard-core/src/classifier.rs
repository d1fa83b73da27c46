//! Fire-risk classification.
//!
//! Four signals contribute independent thresholded points to a score, and the
//! score maps to a [`FireRisk`] category. Temperature, humidity and wind speed
//! are required; AQI only adds points when it is known.

use serde::{Deserialize, Serialize};

/// Discrete fire-risk category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub enum FireRisk {
    #[default]
    Unknown,
    Low,
    Moderate,
    High,
    Extreme,
}

impl FireRisk {
    /// Whether this category should raise an alert (High or Extreme).
    pub fn is_elevated(self) -> bool {
        matches!(self, FireRisk::High | FireRisk::Extreme)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FireRisk::Unknown => "Unknown",
            FireRisk::Low => "Low",
            FireRisk::Moderate => "Moderate",
            FireRisk::High => "High",
            FireRisk::Extreme => "Extreme",
        }
    }
}

impl std::fmt::Display for FireRisk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify fire risk from current conditions.
///
/// * `temperature` - air temperature in °C
/// * `humidity` - relative humidity in %
/// * `wind_speed` - wind speed in km/h
/// * `aqi` - US air quality index
pub fn classify(
    temperature: Option<f64>,
    humidity: Option<f64>,
    wind_speed: Option<f64>,
    aqi: Option<f64>,
) -> FireRisk {
    let (Some(temperature), Some(humidity), Some(wind_speed)) = (temperature, humidity, wind_speed)
    else {
        return FireRisk::Unknown;
    };

    let score = temperature_points(temperature)
        + humidity_points(humidity)
        + wind_points(wind_speed)
        + aqi.map(aqi_points).unwrap_or(0);

    match score {
        s if s >= 8 => FireRisk::Extreme,
        s if s >= 6 => FireRisk::High,
        s if s >= 3 => FireRisk::Moderate,
        _ => FireRisk::Low,
    }
}

fn temperature_points(celsius: f64) -> u8 {
    if celsius >= 35.0 {
        3
    } else if celsius >= 30.0 {
        2
    } else if celsius >= 25.0 {
        1
    } else {
        0
    }
}

// Drier air scores higher.
fn humidity_points(percent: f64) -> u8 {
    if percent <= 25.0 {
        3
    } else if percent <= 40.0 {
        2
    } else if percent <= 60.0 {
        1
    } else {
        0
    }
}

fn wind_points(kmh: f64) -> u8 {
    if kmh >= 30.0 {
        3
    } else if kmh >= 20.0 {
        2
    } else if kmh >= 10.0 {
        1
    } else {
        0
    }
}

fn aqi_points(aqi: f64) -> u8 {
    if aqi >= 150.0 {
        2
    } else if aqi >= 100.0 {
        1
    } else {
        0
    }
}
