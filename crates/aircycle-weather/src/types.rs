use aircycle_core::NetworkError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Geographic coordinates in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// Current outside conditions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReading {
    /// Air temperature at 2 m, °C
    pub temperature: f64,
    pub observed_at: DateTime<Utc>,
}

/// Transport or payload failure while talking to a lookup service.
///
/// Always transient from the caller's point of view: the next cycle tries
/// again.
#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    #[error("Network error: {0}")]
    Network(#[from] NetworkError),
    #[error("Malformed response: {0}")]
    Parse(String),
    #[error("No geocoding result for '{0}'")]
    NotFound(String),
}

/// Weather provider errors
#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    #[error("Weather location not configured: {0}")]
    Configuration(String),
    #[error("Weather lookup failed: {0}")]
    Lookup(#[from] LookupError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weather_error_wraps_lookup() {
        let err: WeatherError = LookupError::NotFound("Atlantis".into()).into();
        assert!(matches!(err, WeatherError::Lookup(LookupError::NotFound(_))));
        assert!(err.to_string().contains("Atlantis"));
    }
}
