use aircycle_core::WeatherConfig;

use crate::location::WeatherLocation;
use crate::provider::WeatherProvider;
use crate::types::{WeatherError, WeatherReading};

/// Outside temperature for the configured location.
///
/// The location is checked on every call so that a missing setting shows
/// up as a per-cycle configuration error instead of preventing start-up.
#[derive(Debug)]
pub struct WeatherLookup {
    provider: WeatherProvider,
    latitude: Option<f64>,
    longitude: Option<f64>,
    city: Option<String>,
}

impl WeatherLookup {
    /// # Errors
    /// Fails when the HTTP client cannot be built.
    pub fn from_config(config: &WeatherConfig) -> Result<Self, WeatherError> {
        let provider = WeatherProvider::new(&config.forecast_base_url, &config.geocoding_base_url)?;
        Ok(Self::new(provider, config))
    }

    pub fn new(provider: WeatherProvider, config: &WeatherConfig) -> Self {
        Self {
            provider,
            latitude: config.latitude,
            longitude: config.longitude,
            city: config.city.clone(),
        }
    }

    /// # Errors
    /// `WeatherError::Configuration` without a usable location,
    /// `WeatherError::Lookup` on transport or parse failure.
    pub async fn outside_temperature(&self) -> Result<WeatherReading, WeatherError> {
        let location =
            WeatherLocation::from_settings(self.latitude, self.longitude, self.city.as_deref())?;
        self.provider.current(&location).await
    }
}
