use aircycle_device::DeviceError;
use aircycle_weather::WeatherError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ControlError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error(transparent)]
    Device(#[from] DeviceError),

    #[error(transparent)]
    Weather(#[from] WeatherError),

    #[error("Cancelled")]
    Cancelled,
}

impl ControlError {
    /// Whether the next cycle can reasonably expect a different result.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Device(e) => e.is_transient(),
            Self::Weather(WeatherError::Lookup(_)) => true,
            Self::Weather(WeatherError::Configuration(_))
            | Self::Configuration(_)
            | Self::Cancelled => false,
        }
    }
}
