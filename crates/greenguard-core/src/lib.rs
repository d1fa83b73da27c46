//! GreenGuard core: sensor aggregation and fire-risk classification.
//!
//! This crate owns all of the decision logic of the service:
//! - [`station`]: the per-location data model
//! - [`classifier`]: fire-risk scoring from temperature, humidity, wind and AQI
//! - [`conditions`]: the external weather / air-quality client
//! - [`registry`]: the in-memory station table
//! - [`refresh`]: throttled refresh of externally fetched fields
//! - [`aggregator`]: read and write paths composed from the above
//!
//! The HTTP shell lives in the `greenguard-api` service.

pub mod aggregator;
pub mod classifier;
pub mod conditions;
pub mod config;
pub mod error;
pub mod registry;
pub mod refresh;
pub mod station;

pub use aggregator::{Aggregator, FireEntry, LatestReading, SensorReading, Summary};
pub use classifier::{classify, FireRisk};
pub use conditions::{
    AirQualityFields, ConditionsSource, Coordinate, FetchOutcome, OpenMeteoClient,
    OpenMeteoConfig, WeatherFields,
};
pub use config::{StationDefinition, StationsConfig};
pub use error::{ConfigError, FetchError};
pub use registry::{PushOutcome, StationRegistry};
pub use refresh::{RefreshCoordinator, RefreshOutcome, RefreshReport, DEFAULT_REFRESH_INTERVAL};
pub use station::{Station, StationKind};
