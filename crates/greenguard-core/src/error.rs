//! Error types for the GreenGuard core.
//!
//! Only configuration errors ever reach a caller.
//! [`FetchError`] stays inside the conditions client, where it is logged and
//! turned into [`crate::FetchOutcome::Unavailable`].

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading the static station configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read station config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse station config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Duplicate station id in config: {0}")]
    DuplicateStation(String),

    #[error("Station '{id}' has an invalid coordinate: {message}")]
    InvalidCoordinate { id: String, message: String },
}

/// A single failed request to an external conditions service.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request timed out")]
    Timeout,

    #[error("Request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("Upstream returned HTTP {0}")]
    Status(u16),

    #[error("Malformed response body: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout
        } else if err.is_decode() {
            FetchError::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            FetchError::Status(status.as_u16())
        } else {
            FetchError::Transport(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::DuplicateStation("toronto".to_string());
        assert!(err.to_string().contains("toronto"));
    }
}
