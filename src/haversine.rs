//! Haversine distance matrix provider (fallback when no routing service is
//! reachable).
//!
//! Uses great-circle distance scaled by a detour factor. Less accurate than
//! road distances but needs no network.

use rayon::prelude::*;

use crate::coordinate::Coordinate;
use crate::error::MatrixError;
use crate::matrix::DistanceMatrix;
use crate::traits::{trivial_matrix, DistanceMatrixProvider};

/// Earth radius in meters.
const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Straight-line distance matrix provider.
#[derive(Debug, Clone)]
pub struct HaversineMatrix {
    /// Multiplier applied to straight-line distance to approximate road
    /// circuity. 1.0 means as the crow flies.
    pub detour_factor: f64,
}

impl Default for HaversineMatrix {
    fn default() -> Self {
        Self { detour_factor: 1.0 }
    }
}

impl HaversineMatrix {
    pub fn new(detour_factor: f64) -> Self {
        Self { detour_factor }
    }

    /// Great-circle distance between two points in meters.
    pub fn haversine_m(from: Coordinate, to: Coordinate) -> f64 {
        let lat1_rad = from.lat.to_radians();
        let lat2_rad = to.lat.to_radians();
        let delta_lat = (to.lat - from.lat).to_radians();
        let delta_lon = (to.lon - from.lon).to_radians();

        let a = (delta_lat / 2.0).sin().powi(2)
            + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().asin();

        EARTH_RADIUS_M * c
    }
}

impl DistanceMatrixProvider for HaversineMatrix {
    fn matrix_for(&self, locations: &[Coordinate]) -> Result<DistanceMatrix, MatrixError> {
        if let Some(matrix) = trivial_matrix(locations)? {
            return Ok(matrix);
        }

        let rows: Vec<Vec<f64>> = locations
            .par_iter()
            .enumerate()
            .map(|(i, from)| {
                locations
                    .iter()
                    .enumerate()
                    .map(|(j, to)| {
                        if i == j {
                            0.0
                        } else {
                            Self::haversine_m(*from, *to) * self.detour_factor
                        }
                    })
                    .collect::<Vec<f64>>()
            })
            .collect();

        Ok(DistanceMatrix::from_rows(rows)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_haversine_same_point() {
        let point = Coordinate::from_lat_lon(40.7128, -74.006);
        let dist = HaversineMatrix::haversine_m(point, point);
        assert!(dist < 0.001, "Same point should have ~0 distance");
    }

    #[test]
    fn test_haversine_known_distance() {
        // Manhattan (40.78, -73.97) to Brooklyn (40.68, -73.94): roughly 11.4 km
        let dist = HaversineMatrix::haversine_m(
            Coordinate::from_lat_lon(40.78, -73.97),
            Coordinate::from_lat_lon(40.68, -73.94),
        );
        assert!(dist > 10_500.0 && dist < 12_500.0, "got {}", dist);
    }

    #[test]
    fn test_matrix_diagonal_is_zero() {
        let provider = HaversineMatrix::default();
        let locations = vec![
            Coordinate::from_lat_lon(40.71, -74.0),
            Coordinate::from_lat_lon(40.68, -73.94),
            Coordinate::from_lat_lon(40.72, -73.79),
        ];
        let matrix = provider.matrix_for(&locations).expect("matrix");

        for i in 0..locations.len() {
            assert_eq!(matrix.get(i, i), 0.0, "Diagonal should be zero");
        }
    }

    #[test]
    fn test_matrix_symmetric() {
        let provider = HaversineMatrix::default();
        let locations = vec![
            Coordinate::from_lat_lon(40.71, -74.0),
            Coordinate::from_lat_lon(40.68, -73.94),
        ];
        let matrix = provider.matrix_for(&locations).expect("matrix");

        assert!(matrix.is_symmetric(1e-6), "Matrix should be symmetric");
    }

    #[test]
    fn test_detour_factor_scales() {
        let locations = vec![
            Coordinate::from_lat_lon(40.71, -74.0),
            Coordinate::from_lat_lon(40.68, -73.94),
        ];
        let straight = HaversineMatrix::default().matrix_for(&locations).expect("matrix");
        let road = HaversineMatrix::new(1.3).matrix_for(&locations).expect("matrix");
        assert!((road.get(0, 1) - straight.get(0, 1) * 1.3).abs() < 1e-6);
    }

    #[test]
    fn test_degenerate_inputs() {
        let provider = HaversineMatrix::default();
        assert!(matches!(provider.matrix_for(&[]), Err(MatrixError::NoLocations)));

        let matrix = provider
            .matrix_for(&[Coordinate::from_lat_lon(40.71, -74.0)])
            .expect("1x1");
        assert_eq!(matrix.to_rows(), vec![vec![0.0]]);
    }
}
