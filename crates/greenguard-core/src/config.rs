//! Static station configuration.
//!
//! Stations known at startup come from a YAML file:
//!
//! ```yaml
//! stations:
//!   - id: sensor01
//!     name: Sheridan Forest
//!     city: Oakville
//!     lat: 43.4695
//!     lng: -79.6987
//!     kind: physical
//!   - id: toronto
//!     name: Toronto
//!     lat: 43.6532
//!     lng: -79.3832
//! ```
//!
//! `city` defaults to `name` and `kind` defaults to `virtual`.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::conditions::Coordinate;
use crate::error::ConfigError;
use crate::station::{Station, StationKind};

/// One configured station.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationDefinition {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lng: Option<f64>,
    #[serde(default)]
    pub kind: StationKind,
}

impl StationDefinition {
    pub fn new(id: &str, name: &str, lat: f64, lng: f64, kind: StationKind) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            city: None,
            lat: Some(lat),
            lng: Some(lng),
            kind,
        }
    }

    pub fn with_city(mut self, city: &str) -> Self {
        self.city = Some(city.to_string());
        self
    }

    /// Build the initial station state: coordinates set, no readings.
    pub fn to_station(&self) -> Station {
        let coordinate = match (self.lat, self.lng) {
            (Some(lat), Some(lng)) => Some(Coordinate { lat, lng }),
            _ => None,
        };
        let city = self.city.clone().unwrap_or_else(|| self.name.clone());
        Station::new(self.id.clone(), self.name.clone(), city, coordinate, self.kind)
    }
}

/// The full set of configured stations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationsConfig {
    #[serde(default)]
    pub stations: Vec<StationDefinition>,
}

impl Default for StationsConfig {
    /// Greater Toronto Area locations plus the Oakville field sensor.
    fn default() -> Self {
        use StationKind::{Physical, Virtual};

        Self {
            stations: vec![
                StationDefinition::new("sensor01", "Sheridan Forest", 43.4695, -79.6987, Physical)
                    .with_city("Oakville"),
                StationDefinition::new("toronto", "Toronto", 43.6532, -79.3832, Virtual),
                StationDefinition::new("mississauga", "Mississauga", 43.5890, -79.6441, Virtual),
                StationDefinition::new("brampton", "Brampton", 43.7315, -79.7624, Virtual),
                StationDefinition::new("markham", "Markham", 43.8561, -79.3370, Virtual),
                StationDefinition::new("vaughan", "Vaughan", 43.8372, -79.5083, Virtual),
                StationDefinition::new("richmond-hill", "Richmond Hill", 43.8828, -79.4403, Virtual),
                StationDefinition::new("oakville", "Oakville", 43.4675, -79.6877, Virtual),
                StationDefinition::new("scarborough", "Scarborough", 43.7764, -79.2318, Virtual)
                    .with_city("Toronto"),
                StationDefinition::new("etobicoke", "Etobicoke", 43.6205, -79.5132, Virtual)
                    .with_city("Toronto"),
                StationDefinition::new("pickering", "Pickering", 43.8373, -79.0892, Virtual),
            ],
        }
    }
}

impl StationsConfig {
    /// Parse and validate a YAML station file.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let config: Self = serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        config.validate()?;

        tracing::info!(
            "Loaded {} stations from {}",
            config.stations.len(),
            path.display()
        );

        Ok(config)
    }

    /// Load `path` if given and present, otherwise fall back to the defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) if path.exists() => Self::load_from_file(path),
            Some(path) => {
                tracing::warn!(
                    "Station config {} does not exist, using defaults",
                    path.display()
                );
                Ok(Self::default())
            }
            None => Ok(Self::default()),
        }
    }

    /// Reject duplicate ids and out-of-range coordinates.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        for def in &self.stations {
            if !seen.insert(def.id.as_str()) {
                return Err(ConfigError::DuplicateStation(def.id.clone()));
            }
            if let Some(lat) = def.lat {
                if !(-90.0..=90.0).contains(&lat) {
                    return Err(ConfigError::InvalidCoordinate {
                        id: def.id.clone(),
                        message: format!("latitude {} out of range", lat),
                    });
                }
            }
            if let Some(lng) = def.lng {
                if !(-180.0..=180.0).contains(&lng) {
                    return Err(ConfigError::InvalidCoordinate {
                        id: def.id.clone(),
                        message: format!("longitude {} out of range", lng),
                    });
                }
            }
            if def.lat.is_some() != def.lng.is_some() {
                return Err(ConfigError::InvalidCoordinate {
                    id: def.id.clone(),
                    message: "lat and lng must be given together".to_string(),
                });
            }
        }
        Ok(())
    }

    /// Initial station states, in file order.
    pub fn to_stations(&self) -> Vec<Station> {
        self.stations.iter().map(StationDefinition::to_station).collect()
    }
}
