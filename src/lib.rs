//! milk-run: single-vehicle delivery route planning.
//!
//! Geocodes a depot and delivery addresses, fetches a road distance matrix
//! and solves the closed tour with a greedy construction plus local search.

pub mod config;
pub mod coordinate;
pub mod error;
pub mod export;
pub mod haversine;
pub mod matrix;
pub mod ors;
pub mod osrm;
pub mod planner;
pub mod retry;
pub mod solver;
pub mod traits;

pub use coordinate::Coordinate;
pub use error::{
    FailureKind, GeocodingError, InvalidMatrixError, MatrixError, RouteError, SolveError,
};
pub use matrix::DistanceMatrix;
pub use planner::{parse_addresses, RoutePlanner, RouteResult};
pub use solver::{optimize, optimize_rows, Solution, SolveOptions, Tour};
