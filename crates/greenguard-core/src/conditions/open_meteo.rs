//! Open-Meteo client for current weather and air quality.
//!
//! Both endpoints take `latitude`/`longitude` and a `current` list of
//! variables, and answer with a `current` object holding whichever of those
//! variables they have. Anything missing from that object stays `None`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use super::{AirQualityFields, ConditionsSource, Coordinate, FetchOutcome, WeatherFields};
use crate::error::FetchError;

const WEATHER_VARIABLES: &str = "temperature_2m,relative_humidity_2m,wind_speed_10m,uv_index";
const AIR_QUALITY_VARIABLES: &str = "pm2_5,pm10,us_aqi,uv_index";

/// Endpoints and limits for [`OpenMeteoClient`].
#[derive(Debug, Clone)]
pub struct OpenMeteoConfig {
    /// Forecast API endpoint.
    pub weather_url: String,
    /// Air-quality API endpoint.
    pub air_quality_url: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl Default for OpenMeteoConfig {
    fn default() -> Self {
        Self {
            weather_url: "https://api.open-meteo.com/v1/forecast".to_string(),
            air_quality_url: "https://air-quality-api.open-meteo.com/v1/air-quality".to_string(),
            timeout: Duration::from_secs(5),
        }
    }
}

/// [`ConditionsSource`] backed by the Open-Meteo APIs.
#[derive(Debug, Clone)]
pub struct OpenMeteoClient {
    client: Client,
    config: OpenMeteoConfig,
}

impl OpenMeteoClient {
    pub fn new(config: OpenMeteoConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.timeout)
            .pool_max_idle_per_host(4)
            .build()?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &OpenMeteoConfig {
        &self.config
    }

    async fn get_current<T: DeserializeOwned>(
        &self,
        url: &str,
        variables: &str,
        at: Coordinate,
    ) -> Result<T, FetchError> {
        let response = self
            .client
            .get(url)
            .query(&[
                ("latitude", at.lat.to_string()),
                ("longitude", at.lng.to_string()),
                ("current", variables.to_string()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let body = response.bytes().await?;
        let parsed: CurrentEnvelope<T> =
            serde_json::from_slice(&body).map_err(|e| FetchError::Decode(e.to_string()))?;

        parsed
            .current
            .ok_or_else(|| FetchError::Decode("response has no 'current' object".to_string()))
    }
}

#[async_trait]
impl ConditionsSource for OpenMeteoClient {
    #[instrument(skip(self), fields(lat = at.lat, lng = at.lng))]
    async fn weather(&self, at: Coordinate) -> FetchOutcome<WeatherFields> {
        match self
            .get_current::<CurrentWeather>(&self.config.weather_url, WEATHER_VARIABLES, at)
            .await
        {
            Ok(current) => {
                debug!(?current, "Fetched current weather");
                FetchOutcome::Ok(current.into())
            }
            Err(e) => {
                warn!(error = %e, "Weather fetch failed");
                metrics::counter!("greenguard_fetch_failures_total", "source" => "weather")
                    .increment(1);
                FetchOutcome::Unavailable
            }
        }
    }

    #[instrument(skip(self), fields(lat = at.lat, lng = at.lng))]
    async fn air_quality(&self, at: Coordinate) -> FetchOutcome<AirQualityFields> {
        match self
            .get_current::<CurrentAirQuality>(
                &self.config.air_quality_url,
                AIR_QUALITY_VARIABLES,
                at,
            )
            .await
        {
            Ok(current) => {
                debug!(?current, "Fetched current air quality");
                FetchOutcome::Ok(current.into())
            }
            Err(e) => {
                warn!(error = %e, "Air quality fetch failed");
                metrics::counter!("greenguard_fetch_failures_total", "source" => "air_quality")
                    .increment(1);
                FetchOutcome::Unavailable
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct CurrentEnvelope<T> {
    current: Option<T>,
}

#[derive(Debug, Deserialize)]
struct CurrentWeather {
    temperature_2m: Option<f64>,
    relative_humidity_2m: Option<f64>,
    wind_speed_10m: Option<f64>,
    uv_index: Option<f64>,
}

impl From<CurrentWeather> for WeatherFields {
    fn from(c: CurrentWeather) -> Self {
        Self {
            temperature: c.temperature_2m,
            humidity: c.relative_humidity_2m,
            wind_speed: c.wind_speed_10m,
            uv_index: c.uv_index,
        }
    }
}

#[derive(Debug, Deserialize)]
struct CurrentAirQuality {
    pm2_5: Option<f64>,
    pm10: Option<f64>,
    us_aqi: Option<f64>,
    uv_index: Option<f64>,
}

impl From<CurrentAirQuality> for AirQualityFields {
    fn from(c: CurrentAirQuality) -> Self {
        Self {
            pm2_5: c.pm2_5,
            pm10: c.pm10,
            aqi_us: c.us_aqi,
            uv_index: c.uv_index,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weather_response_parsing() {
        let body = r#"{
            "latitude": 43.65,
            "longitude": -79.38,
            "current": {
                "time": "2025-07-01T15:00",
                "interval": 900,
                "temperature_2m": 31.4,
                "relative_humidity_2m": 38,
                "wind_speed_10m": 22.1,
                "uv_index": 7.2
            }
        }"#;
        let parsed: CurrentEnvelope<CurrentWeather> = serde_json::from_str(body).unwrap();
        let fields: WeatherFields = parsed.current.unwrap().into();

        assert_eq!(fields.temperature, Some(31.4));
        assert_eq!(fields.humidity, Some(38.0));
        assert_eq!(fields.wind_speed, Some(22.1));
        assert_eq!(fields.uv_index, Some(7.2));
    }

    #[test]
    fn test_missing_fields_stay_absent() {
        let body = r#"{"current": {"time": "2025-07-01T15:00", "us_aqi": 57}}"#;
        let parsed: CurrentEnvelope<CurrentAirQuality> = serde_json::from_str(body).unwrap();
        let fields: AirQualityFields = parsed.current.unwrap().into();

        assert_eq!(fields.aqi_us, Some(57.0));
        assert_eq!(fields.pm2_5, None);
        assert_eq!(fields.pm10, None);
        assert_eq!(fields.uv_index, None);
    }

    #[test]
    fn test_null_fields_stay_absent() {
        let body = r#"{"current": {"temperature_2m": null, "relative_humidity_2m": 50}}"#;
        let parsed: CurrentEnvelope<CurrentWeather> = serde_json::from_str(body).unwrap();
        let fields: WeatherFields = parsed.current.unwrap().into();

        assert_eq!(fields.temperature, None);
        assert_eq!(fields.humidity, Some(50.0));
    }

    #[test]
    fn test_default_config() {
        let config = OpenMeteoConfig::default();
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert!(config.weather_url.contains("open-meteo.com"));
        assert!(config.air_quality_url.contains("air-quality"));
    }
}
