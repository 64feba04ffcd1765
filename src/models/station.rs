//! Station reference record

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A fixed weather-reporting location, bound from the `station` table
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Station {
    /// Station identifier, e.g. `USC00519397`
    pub station: String,
    pub name: String,
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
    /// Elevation above sea level
    pub elevation: f64,
}

impl Station {
    #[must_use]
    pub fn new(station: &str, name: &str, latitude: f64, longitude: f64, elevation: f64) -> Self {
        Self {
            station: station.to_string(),
            name: name.to_string(),
            latitude,
            longitude,
            elevation,
        }
    }

    /// Format location as coordinates string
    #[must_use]
    pub fn format_coordinates(&self) -> String {
        format!("{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_station_coordinates() {
        let station = Station::new("USC00519397", "WAIKIKI 717.2, HI US", 21.2716, -157.8168, 3.0);
        assert_eq!(station.format_coordinates(), "21.2716, -157.8168");
    }
}
