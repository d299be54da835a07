//! Geographic coordinates with explicit axis ordering.
//!
//! Routing services speak `[lon, lat]`; maps and tables want `(lat, lon)`.
//! The struct stores named fields so neither ordering leaks implicitly.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lon: f64,
    pub lat: f64,
}

impl Coordinate {
    pub const fn from_lon_lat(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    pub const fn from_lat_lon(lat: f64, lon: f64) -> Self {
        Self { lon, lat }
    }

    /// Service ordering, as sent to OpenRouteService and OSRM.
    pub fn lon_lat(&self) -> [f64; 2] {
        [self.lon, self.lat]
    }

    /// Display ordering.
    pub fn lat_lon(&self) -> (f64, f64) {
        (self.lat, self.lon)
    }

    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon)
    }
}
