//! What the control loop needs from the device cloud and the weather service.

use aircycle_device::{DeviceApiClient, DeviceError};
use aircycle_weather::{WeatherError, WeatherLookup, WeatherReading};

/// Device operations used by one control cycle.
#[allow(async_fn_in_trait)]
pub trait DeviceControl {
    async fn login(&mut self) -> Result<(), DeviceError>;

    async fn get_louver_position(&mut self) -> Result<String, DeviceError>;

    async fn set_louver_position(&mut self, code: &str) -> Result<(), DeviceError>;

    async fn get_temperature(&mut self) -> Result<f64, DeviceError>;

    async fn set_temperature(&mut self, celsius: f64) -> Result<(), DeviceError>;
}

/// Source of the current outside temperature.
#[allow(async_fn_in_trait)]
pub trait OutsideTemperature {
    async fn outside_temperature(&self) -> Result<WeatherReading, WeatherError>;
}

impl DeviceControl for DeviceApiClient {
    async fn login(&mut self) -> Result<(), DeviceError> {
        DeviceApiClient::login(self).await
    }

    async fn get_louver_position(&mut self) -> Result<String, DeviceError> {
        DeviceApiClient::get_louver_position(self).await
    }

    async fn set_louver_position(&mut self, code: &str) -> Result<(), DeviceError> {
        DeviceApiClient::set_louver_position(self, code).await
    }

    async fn get_temperature(&mut self) -> Result<f64, DeviceError> {
        DeviceApiClient::get_temperature(self).await
    }

    async fn set_temperature(&mut self, celsius: f64) -> Result<(), DeviceError> {
        DeviceApiClient::set_temperature(self, celsius).await.map(|_| ())
    }
}

impl OutsideTemperature for WeatherLookup {
    async fn outside_temperature(&self) -> Result<WeatherReading, WeatherError> {
        WeatherLookup::outside_temperature(self).await
    }
}
