use aircycle_core::ReqwestErrorExt;
use chrono::{DateTime, NaiveDateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::instrument;

use crate::geocode::Geocoder;
use crate::location::WeatherLocation;
use crate::types::{Coordinates, LookupError, WeatherError, WeatherReading};

const FORECAST_PATH: &str = "/v1/forecast";
const REQUEST_TIMEOUT_SECS: u64 = 30;
const USER_AGENT: &str = concat!("aircycle/", env!("CARGO_PKG_VERSION"));

/// Open-Meteo reports GMT timestamps without seconds or offset.
const OPEN_METEO_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M";

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    current: CurrentBlock,
}

#[derive(Debug, Deserialize)]
struct CurrentBlock {
    time: Option<String>,
    temperature_2m: f64,
}

/// Outside temperature lookup backed by Open-Meteo.
#[derive(Debug)]
pub struct WeatherProvider {
    client: Client,
    forecast_base_url: String,
    geocoder: Geocoder,
}

impl WeatherProvider {
    pub fn new(forecast_base_url: &str, geocoding_base_url: &str) -> Result<Self, WeatherError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| LookupError::Network(e.into_network_error()))?;

        Ok(Self::with_client(client, forecast_base_url, geocoding_base_url))
    }

    pub fn with_client(client: Client, forecast_base_url: &str, geocoding_base_url: &str) -> Self {
        Self {
            geocoder: Geocoder::new(client.clone(), geocoding_base_url),
            client,
            forecast_base_url: forecast_base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Current outside temperature at `location`.
    ///
    /// # Errors
    /// `WeatherError::Lookup` for geocoding or forecast failures.
    #[instrument(skip(self), level = "debug")]
    pub async fn current(&self, location: &WeatherLocation) -> Result<WeatherReading, WeatherError> {
        let coords = match location {
            WeatherLocation::Coordinates(coords) => *coords,
            WeatherLocation::City(city) => self.geocoder.resolve(city).await?,
        };

        let reading = self.fetch_current(coords).await?;
        tracing::info!(
            temperature = reading.temperature,
            observed_at = %reading.observed_at,
            "Outside temperature"
        );
        Ok(reading)
    }

    async fn fetch_current(&self, coords: Coordinates) -> Result<WeatherReading, LookupError> {
        let url = format!("{}{}", self.forecast_base_url, FORECAST_PATH);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("latitude", coords.latitude.to_string()),
                ("longitude", coords.longitude.to_string()),
                ("current", "temperature_2m".to_string()),
            ])
            .send()
            .await
            .map_err(|e| LookupError::Network(e.into_network_error()))?
            .error_for_status()
            .map_err(|e| LookupError::Network(e.into_network_error()))?;

        let body: ForecastResponse = response
            .json()
            .await
            .map_err(|e| LookupError::Parse(e.to_string()))?;

        Ok(WeatherReading {
            temperature: body.current.temperature_2m,
            observed_at: parse_observation_time(body.current.time.as_deref()),
        })
    }
}

fn parse_observation_time(raw: Option<&str>) -> DateTime<Utc> {
    raw.and_then(|s| NaiveDateTime::parse_from_str(s, OPEN_METEO_TIME_FORMAT).ok())
        .map(|naive| naive.and_utc())
        .unwrap_or_else(|| {
            tracing::debug!(?raw, "Unparseable observation time, using now");
            Utc::now()
        })
}
