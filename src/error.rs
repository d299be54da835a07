//! Error taxonomy for every stage of route planning.

use thiserror::Error;

/// Failure talking to a remote routing or geocoding service.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("API error: {status} - {message}")]
    Status { status: u16, message: String },

    /// A successful HTTP response whose body reports failure.
    #[error("service rejected request: {code} - {message}")]
    Rejected { code: String, message: String },
}

impl ServiceError {
    /// Whether retrying the same request may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            ServiceError::Transport(err) => err.is_timeout() || err.is_connect(),
            ServiceError::Status { status, .. } => matches!(status, 429 | 500 | 502 | 503 | 504),
            ServiceError::Rejected { .. } => false,
        }
    }

    pub fn kind(&self) -> FailureKind {
        match self {
            ServiceError::Status { status: 401 | 403, .. } => FailureKind::Credentials,
            ServiceError::Status { status: 400 | 404, .. } => FailureKind::Addresses,
            _ => FailureKind::ServiceUnavailable,
        }
    }
}

#[derive(Debug, Error)]
pub enum GeocodingError {
    #[error("address must not be empty")]
    EmptyAddress,

    #[error("geocoding failed for: {0}")]
    NoResult(String),

    #[error("geocoding request for {address:?} failed: {source}")]
    Service {
        address: String,
        #[source]
        source: ServiceError,
    },
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum InvalidMatrixError {
    #[error("distance matrix is empty")]
    Empty,

    #[error("distance matrix row {row} has {found} entries, expected {expected}")]
    NotSquare {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("distance matrix entry ({row}, {col}) is negative: {value}")]
    Negative { row: usize, col: usize, value: f64 },

    #[error("distance matrix entry ({row}, {col}) is not finite")]
    NonFinite { row: usize, col: usize },

    #[error("distance matrix diagonal entry {index} is {value}, expected 0")]
    NonZeroDiagonal { index: usize, value: f64 },
}

#[derive(Debug, Error)]
pub enum MatrixError {
    #[error("no locations supplied")]
    NoLocations,

    #[error("no route between location {from} and location {to}")]
    Unreachable { from: usize, to: usize },

    #[error("malformed matrix response: {0}")]
    Malformed(String),

    #[error(transparent)]
    Invalid(#[from] InvalidMatrixError),

    #[error("distance matrix request failed: {0}")]
    Service(#[from] ServiceError),
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SolveError {
    #[error(transparent)]
    InvalidMatrix(#[from] InvalidMatrixError),

    #[error("no feasible tour found")]
    NotFound,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("environment variable {0} is not set")]
    MissingApiKey(&'static str),

    #[error("invalid value for {var}: {value:?}")]
    InvalidValue { var: &'static str, value: String },
}

/// Any failure of a full planning attempt.
#[derive(Debug, Error)]
pub enum RouteError {
    #[error("need at least 2 addresses (depot + delivery), got {found}")]
    TooFewAddresses { found: usize },

    #[error(transparent)]
    Geocoding(#[from] GeocodingError),

    #[error(transparent)]
    Matrix(#[from] MatrixError),

    #[error(transparent)]
    Solve(#[from] SolveError),
}

/// What a user should check after a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Credentials,
    Addresses,
    ServiceUnavailable,
    Solver,
}

impl RouteError {
    pub fn kind(&self) -> FailureKind {
        match self {
            RouteError::TooFewAddresses { .. } => FailureKind::Addresses,
            RouteError::Geocoding(GeocodingError::Service { source, .. }) => source.kind(),
            RouteError::Geocoding(_) => FailureKind::Addresses,
            RouteError::Matrix(MatrixError::Service(source)) => source.kind(),
            RouteError::Matrix(MatrixError::NoLocations | MatrixError::Unreachable { .. }) => {
                FailureKind::Addresses
            }
            RouteError::Matrix(_) => FailureKind::ServiceUnavailable,
            RouteError::Solve(_) => FailureKind::Solver,
        }
    }
}
