//! New York delivery addresses with fixed coordinates.
//!
//! Coordinates are neighbourhood centroids, close enough for haversine
//! distances to give a stable stop order.

use std::cell::RefCell;
use std::collections::HashMap;

use milk_run::error::{GeocodingError, MatrixError};
use milk_run::traits::{DistanceMatrixProvider, Geocoder};
use milk_run::{Coordinate, DistanceMatrix};

/// A named address with coordinates.
#[derive(Debug, Clone)]
pub struct Location {
    pub address: &'static str,
    pub lat: f64,
    pub lon: f64,
}

impl Location {
    pub const fn new(address: &'static str, lat: f64, lon: f64) -> Self {
        Self { address, lat, lon }
    }

    pub fn coordinate(&self) -> Coordinate {
        Coordinate::from_lat_lon(self.lat, self.lon)
    }
}

pub const WAREHOUSE: Location =
    Location::new("Warehouse, 123 Main St, New York, NY", 40.7128, -74.0060);
pub const BROOKLYN: Location = Location::new("456 Elm St, Brooklyn, NY", 40.6782, -73.9442);
pub const QUEENS: Location = Location::new("789 Pine Rd, Queens, NY", 40.7282, -73.7949);
pub const MANHATTAN: Location = Location::new("321 Oak Ave, Manhattan, NY", 40.7831, -73.9712);

pub const DEFAULT_ROUTE: &[Location] = &[WAREHOUSE, BROOKLYN, QUEENS, MANHATTAN];

pub fn addresses(locations: &[Location]) -> Vec<String> {
    locations.iter().map(|location| location.address.to_string()).collect()
}

// ============================================================================
// In-memory service doubles
// ============================================================================

/// Geocoder backed by a fixed table. Records every lookup.
pub struct TableGeocoder {
    table: HashMap<String, Coordinate>,
    pub lookups: RefCell<Vec<String>>,
}

impl TableGeocoder {
    pub fn new(locations: &[Location]) -> Self {
        Self {
            table: locations
                .iter()
                .map(|location| (location.address.to_string(), location.coordinate()))
                .collect(),
            lookups: RefCell::new(Vec::new()),
        }
    }
}

impl Geocoder for TableGeocoder {
    fn geocode(&self, address: &str) -> Result<Coordinate, GeocodingError> {
        self.lookups.borrow_mut().push(address.to_string());
        self.table
            .get(address)
            .copied()
            .ok_or_else(|| GeocodingError::NoResult(address.to_string()))
    }
}

/// Returns a fixed matrix regardless of the requested locations.
pub struct FixedMatrix(pub Vec<Vec<f64>>);

impl DistanceMatrixProvider for FixedMatrix {
    fn matrix_for(&self, _locations: &[Coordinate]) -> Result<DistanceMatrix, MatrixError> {
        Ok(DistanceMatrix::from_rows(self.0.clone())?)
    }
}

/// Always fails, and counts how often it was asked.
pub struct FailingMatrix {
    pub calls: RefCell<usize>,
}

impl FailingMatrix {
    pub fn new() -> Self {
        Self { calls: RefCell::new(0) }
    }
}

impl DistanceMatrixProvider for FailingMatrix {
    fn matrix_for(&self, _locations: &[Coordinate]) -> Result<DistanceMatrix, MatrixError> {
        *self.calls.borrow_mut() += 1;
        Err(MatrixError::Unreachable { from: 0, to: 1 })
    }
}
