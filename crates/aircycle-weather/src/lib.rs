//! Outside temperature lookup for aircycle
//!
//! Current conditions come from the Open-Meteo forecast API. City names are
//! resolved through Open-Meteo geocoding and the coordinates are cached for
//! the lifetime of the process.

pub mod cache;
pub mod geocode;
pub mod location;
pub mod lookup;
pub mod provider;
pub mod types;

pub use cache::GeocodeCache;
pub use geocode::Geocoder;
pub use location::WeatherLocation;
pub use lookup::WeatherLookup;
pub use provider::WeatherProvider;
pub use types::*;
