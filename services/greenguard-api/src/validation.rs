//! Ingestion payload validation.
//!
//! Readings are checked here, before anything reaches the aggregator:
//! `sensor_id` must be a non-empty string, `temperature` must be a JSON
//! number and `location` must be a string when present.

use serde_json::Value;
use thiserror::Error;

use greenguard_core::SensorReading;

/// Rejection of an inbound sensor reading.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Field '{field}' must be {expected}")]
    InvalidField {
        field: &'static str,
        expected: &'static str,
    },

    #[error("Malformed payload: {0}")]
    Malformed(String),
}

impl ValidationError {
    /// HTTP status code for this rejection.
    pub fn status_code(&self) -> u16 {
        400
    }
}

/// Parse and validate a raw request body.
pub fn parse_reading(body: &[u8]) -> Result<SensorReading, ValidationError> {
    let value: Value =
        serde_json::from_slice(body).map_err(|e| ValidationError::Malformed(e.to_string()))?;
    validate_reading(&value)
}

/// Validate an already-decoded JSON payload.
pub fn validate_reading(value: &Value) -> Result<SensorReading, ValidationError> {
    let Some(object) = value.as_object() else {
        return Err(ValidationError::Malformed(
            "expected a JSON object".to_string(),
        ));
    };

    let sensor_id = match object.get("sensor_id") {
        None | Some(Value::Null) => return Err(ValidationError::MissingField("sensor_id")),
        Some(Value::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
        Some(_) => {
            return Err(ValidationError::InvalidField {
                field: "sensor_id",
                expected: "a non-empty string",
            })
        }
    };

    let temperature = match object.get("temperature") {
        None | Some(Value::Null) => return Err(ValidationError::MissingField("temperature")),
        Some(Value::Number(n)) => n.as_f64().ok_or(ValidationError::InvalidField {
            field: "temperature",
            expected: "a number",
        })?,
        Some(_) => {
            return Err(ValidationError::InvalidField {
                field: "temperature",
                expected: "a number",
            })
        }
    };

    let location = match object.get("location") {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(_) => {
            return Err(ValidationError::InvalidField {
                field: "location",
                expected: "a string",
            })
        }
    };

    Ok(SensorReading::new(sensor_id, temperature, location))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_valid_reading() {
        let reading = validate_reading(&json!({
            "sensor_id": "sensor01",
            "temperature": 23.4,
            "location": "Sheridan Forest Oakville"
        }))
        .unwrap();

        assert_eq!(reading.sensor_id, "sensor01");
        assert_eq!(reading.temperature, 23.4);
        assert_eq!(reading.location, "Sheridan Forest Oakville");
    }

    #[test]
    fn test_location_defaults_to_unknown() {
        let reading = validate_reading(&json!({"sensor_id": "s1", "temperature": 20})).unwrap();
        assert_eq!(reading.location, "Unknown");
        assert_eq!(reading.temperature, 20.0);

        let reading =
            validate_reading(&json!({"sensor_id": "s1", "temperature": 20, "location": null}))
                .unwrap();
        assert_eq!(reading.location, "Unknown");
    }

    #[test]
    fn test_missing_sensor_id() {
        assert_eq!(
            validate_reading(&json!({"temperature": 20.0})),
            Err(ValidationError::MissingField("sensor_id"))
        );
        assert!(matches!(
            validate_reading(&json!({"sensor_id": "  ", "temperature": 20.0})),
            Err(ValidationError::InvalidField { field: "sensor_id", .. })
        ));
    }

    #[test]
    fn test_non_numeric_temperature() {
        assert_eq!(
            validate_reading(&json!({"sensor_id": "s1"})),
            Err(ValidationError::MissingField("temperature"))
        );
        assert!(matches!(
            validate_reading(&json!({"sensor_id": "s1", "temperature": "hot"})),
            Err(ValidationError::InvalidField { field: "temperature", .. })
        ));
        assert!(matches!(
            validate_reading(&json!({"sensor_id": "s1", "temperature": "25.0"})),
            Err(ValidationError::InvalidField { field: "temperature", .. })
        ));
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            ValidationError::MissingField("sensor_id").to_string(),
            "Missing required field: sensor_id"
        );
        let err = ValidationError::InvalidField {
            field: "temperature",
            expected: "a number",
        };
        assert_eq!(err.to_string(), "Field 'temperature' must be a number");
        assert_eq!(err.status_code(), 400);
    }

    #[test]
    fn test_malformed_body() {
        assert!(matches!(
            parse_reading(b"{not json"),
            Err(ValidationError::Malformed(_))
        ));
        assert!(matches!(
            parse_reading(b"[1, 2, 3]"),
            Err(ValidationError::Malformed(_))
        ));
    }
}
