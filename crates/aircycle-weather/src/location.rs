use crate::types::{Coordinates, WeatherError};

/// Where to read the outside temperature.
#[derive(Debug, Clone, PartialEq)]
pub enum WeatherLocation {
    Coordinates(Coordinates),
    /// Resolved through geocoding before each lookup (cached).
    City(String),
}

impl WeatherLocation {
    /// Build a location from the optional settings values.
    ///
    /// Complete coordinates win over a city name.
    ///
    /// # Errors
    /// `WeatherError::Configuration` when neither is usable.
    pub fn from_settings(
        latitude: Option<f64>,
        longitude: Option<f64>,
        city: Option<&str>,
    ) -> Result<Self, WeatherError> {
        if let (Some(latitude), Some(longitude)) = (latitude, longitude) {
            return Ok(Self::Coordinates(Coordinates {
                latitude,
                longitude,
            }));
        }

        match city.map(str::trim) {
            Some(city) if !city.is_empty() => Ok(Self::City(city.to_string())),
            _ => Err(WeatherError::Configuration(
                "set weather.latitude/longitude or weather.city".to_string(),
            )),
        }
    }
}
