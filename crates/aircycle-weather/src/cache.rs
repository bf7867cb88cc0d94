use crate::types::Coordinates;

/// Remembers the coordinates of the last geocoded city.
///
/// Keys compare case-insensitively. Storing a different city replaces the
/// previous entry.
#[derive(Debug, Default)]
pub struct GeocodeCache {
    entry: Option<(String, Coordinates)>,
}

impl GeocodeCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, city: &str) -> Option<Coordinates> {
        let key = Self::key(city);
        self.entry
            .as_ref()
            .filter(|(cached, _)| *cached == key)
            .map(|(_, coords)| *coords)
    }

    pub fn insert(&mut self, city: &str, coordinates: Coordinates) {
        self.entry = Some((Self::key(city), coordinates));
    }

    fn key(city: &str) -> String {
        city.to_lowercase()
    }
}
