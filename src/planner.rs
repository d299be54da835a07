//! End-to-end route planning: geocode, build the matrix, optimize, resolve.

use serde::Serialize;
use tracing::{debug, info};

use crate::coordinate::Coordinate;
use crate::error::{MatrixError, RouteError};
use crate::solver::{optimize, SolveOptions, SolveStats, Tour};
use crate::traits::{DistanceMatrixProvider, Geocoder};

/// A depot plus at least one delivery stop.
pub const MIN_ADDRESSES: usize = 2;

/// Splits free text into addresses: one per line, trimmed, blanks dropped.
pub fn parse_addresses(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// A tour resolved back into caller-facing values.
#[derive(Debug, Clone, Serialize)]
pub struct RouteResult {
    /// Addresses in visiting order, depot first and last.
    pub addresses: Vec<String>,
    /// Meters.
    pub total_distance: f64,
    /// Coordinates in visiting order, same length as `addresses`.
    pub coordinates: Vec<Coordinate>,
    pub tour: Tour,
    pub stats: SolveStats,
}

impl RouteResult {
    /// `(latitude, longitude)` pairs for map display.
    pub fn lat_lon_points(&self) -> Vec<(f64, f64)> {
        self.coordinates.iter().map(Coordinate::lat_lon).collect()
    }

    pub fn delivery_count(&self) -> usize {
        self.tour.deliveries().len()
    }
}

pub struct RoutePlanner<G, M> {
    geocoder: G,
    matrix_provider: M,
    options: SolveOptions,
}

impl<G, M> RoutePlanner<G, M>
where
    G: Geocoder,
    M: DistanceMatrixProvider,
{
    pub fn new(geocoder: G, matrix_provider: M, options: SolveOptions) -> Self {
        Self {
            geocoder,
            matrix_provider,
            options,
        }
    }

    /// Plans a closed route from the first address through all others.
    ///
    /// Any stage failure aborts the attempt; no partial route is returned.
    pub fn plan<S: AsRef<str>>(&self, addresses: &[S]) -> Result<RouteResult, RouteError> {
        if addresses.len() < MIN_ADDRESSES {
            return Err(RouteError::TooFewAddresses {
                found: addresses.len(),
            });
        }

        let coordinates = self.geocoder.geocode_all(addresses)?;
        debug!("geocoded {} addresses", coordinates.len());

        let matrix = self.matrix_provider.matrix_for(&coordinates)?;
        if matrix.size() != coordinates.len() {
            return Err(MatrixError::Malformed(format!(
                "expected {} locations, got {}",
                coordinates.len(),
                matrix.size()
            ))
            .into());
        }

        let solution = optimize(&matrix, &self.options)?;

        let stops = solution.tour.stops();
        let result = RouteResult {
            addresses: stops
                .iter()
                .map(|&i| addresses[i].as_ref().trim().to_string())
                .collect(),
            total_distance: solution.total_distance,
            coordinates: stops.iter().map(|&i| coordinates[i]).collect(),
            tour: solution.tour,
            stats: solution.stats,
        };

        info!(
            "planned route: {} deliveries, {:.0} m",
            result.delivery_count(),
            result.total_distance
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_addresses() {
        let text = "  Warehouse, 123 Main St, New York, NY \n\n456 Elm St, Brooklyn, NY\n   \n789 Pine Rd, Queens, NY\n";
        assert_eq!(
            parse_addresses(text),
            vec![
                "Warehouse, 123 Main St, New York, NY",
                "456 Elm St, Brooklyn, NY",
                "789 Pine Rd, Queens, NY",
            ]
        );
    }

    #[test]
    fn test_parse_addresses_handles_crlf_and_empty() {
        assert_eq!(parse_addresses("a\r\nb\r\n"), vec!["a", "b"]);
        assert!(parse_addresses("\n  \n").is_empty());
    }
}
