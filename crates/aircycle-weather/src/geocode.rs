//! Forward geocoding: city name to coordinates.
//! Uses the Open-Meteo geocoding API - free, no API key required.

use aircycle_core::ReqwestErrorExt;
use parking_lot::Mutex;
use reqwest::Client;
use serde::Deserialize;

use crate::cache::GeocodeCache;
use crate::types::{Coordinates, LookupError};

const SEARCH_PATH: &str = "/v1/search";

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchResult>,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    name: String,
    latitude: f64,
    longitude: f64,
    country: Option<String>,
}

/// Resolves city names, remembering the last answer.
#[derive(Debug)]
pub struct Geocoder {
    client: Client,
    base_url: String,
    cache: Mutex<GeocodeCache>,
}

impl Geocoder {
    pub fn new(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            cache: Mutex::new(GeocodeCache::new()),
        }
    }

    /// Coordinates for `city`, from cache when the same name was resolved before.
    ///
    /// # Errors
    /// `LookupError` on transport failure, a malformed body, or no match.
    pub async fn resolve(&self, city: &str) -> Result<Coordinates, LookupError> {
        if let Some(coords) = self.cache.lock().get(city) {
            tracing::debug!(city, "Geocode cache hit");
            return Ok(coords);
        }

        let coords = self.search(city).await?;
        self.cache.lock().insert(city, coords);
        Ok(coords)
    }

    async fn search(&self, city: &str) -> Result<Coordinates, LookupError> {
        let url = format!("{}{}", self.base_url, SEARCH_PATH);

        let response = self
            .client
            .get(&url)
            .query(&[("name", city), ("count", "1"), ("format", "json")])
            .send()
            .await
            .map_err(|e| LookupError::Network(e.into_network_error()))?
            .error_for_status()
            .map_err(|e| LookupError::Network(e.into_network_error()))?;

        let body: SearchResponse = response
            .json()
            .await
            .map_err(|e| LookupError::Parse(e.to_string()))?;

        let best = body
            .results
            .into_iter()
            .next()
            .ok_or_else(|| LookupError::NotFound(city.to_string()))?;

        tracing::info!(
            city,
            resolved = %best.name,
            country = best.country.as_deref().unwrap_or("?"),
            latitude = best.latitude,
            longitude = best.longitude,
            "Geocoded weather location"
        );

        Ok(Coordinates {
            latitude: best.latitude,
            longitude: best.longitude,
        })
    }
}
