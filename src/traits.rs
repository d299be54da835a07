//! Service seams for the route planner.
//!
//! Geocoding and distance lookup are external collaborators. Concrete
//! adapters (OpenRouteService, OSRM, haversine) implement these traits;
//! tests implement them with fixed data.

use crate::coordinate::Coordinate;
use crate::error::{GeocodingError, MatrixError};
use crate::matrix::DistanceMatrix;

/// Resolves free-text addresses into coordinates.
pub trait Geocoder {
    fn geocode(&self, address: &str) -> Result<Coordinate, GeocodingError>;

    /// Geocodes a batch in order. The first unresolvable address fails the
    /// whole batch.
    fn geocode_all<S: AsRef<str>>(&self, addresses: &[S]) -> Result<Vec<Coordinate>, GeocodingError>
    where
        Self: Sized,
    {
        addresses
            .iter()
            .map(|address| {
                let address = address.as_ref();
                if address.trim().is_empty() {
                    return Err(GeocodingError::EmptyAddress);
                }
                self.geocode(address)
            })
            .collect()
    }
}

/// Provides a distance matrix (meters) for a set of locations.
///
/// The matrix is indexed by the provided location order.
pub trait DistanceMatrixProvider {
    fn matrix_for(&self, locations: &[Coordinate]) -> Result<DistanceMatrix, MatrixError>;
}

impl<T: Geocoder + ?Sized> Geocoder for &T {
    fn geocode(&self, address: &str) -> Result<Coordinate, GeocodingError> {
        (**self).geocode(address)
    }
}

impl<T: DistanceMatrixProvider + ?Sized> DistanceMatrixProvider for &T {
    fn matrix_for(&self, locations: &[Coordinate]) -> Result<DistanceMatrix, MatrixError> {
        (**self).matrix_for(locations)
    }
}

impl<T: DistanceMatrixProvider + ?Sized> DistanceMatrixProvider for Box<T> {
    fn matrix_for(&self, locations: &[Coordinate]) -> Result<DistanceMatrix, MatrixError> {
        (**self).matrix_for(locations)
    }
}

/// Handles the inputs every provider treats the same way: nothing to route
/// is an error, a lone location is a 1x1 zero matrix.
pub(crate) fn trivial_matrix(
    locations: &[Coordinate],
) -> Result<Option<DistanceMatrix>, MatrixError> {
    match locations.len() {
        0 => Err(MatrixError::NoLocations),
        1 => Ok(Some(DistanceMatrix::zeros(1))),
        _ => Ok(None),
    }
}
