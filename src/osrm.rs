//! OSRM HTTP adapter for distance matrices.

use serde::Deserialize;
use tracing::info;

use crate::coordinate::Coordinate;
use crate::error::{MatrixError, ServiceError};
use crate::matrix::DistanceMatrix;
use crate::ors::distances_to_matrix;
use crate::retry::RetryPolicy;
use crate::traits::{trivial_matrix, DistanceMatrixProvider};

#[derive(Debug, Clone)]
pub struct OsrmConfig {
    pub base_url: String,
    pub profile: String,
    pub timeout_secs: u64,
    pub retry: RetryPolicy,
}

impl Default for OsrmConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            profile: "car".to_string(),
            timeout_secs: 20,
            retry: RetryPolicy::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct OsrmClient {
    config: OsrmConfig,
    client: reqwest::blocking::Client,
}

impl OsrmClient {
    pub fn new(config: OsrmConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }

    fn table_url(&self, locations: &[Coordinate]) -> String {
        let coords = locations
            .iter()
            .map(|coord| format!("{:.6},{:.6}", coord.lon, coord.lat))
            .collect::<Vec<_>>()
            .join(";");

        format!(
            "{}/table/v1/{}/{}?annotations=distance",
            self.config.base_url.trim_end_matches('/'),
            self.config.profile,
            coords
        )
    }
}

impl DistanceMatrixProvider for OsrmClient {
    fn matrix_for(&self, locations: &[Coordinate]) -> Result<DistanceMatrix, MatrixError> {
        if let Some(matrix) = trivial_matrix(locations)? {
            return Ok(matrix);
        }

        let url = self.table_url(locations);
        let body = self
            .config
            .retry
            .send("osrm table", || self.client.get(&url))?
            .json::<OsrmTableResponse>()
            .map_err(ServiceError::from)?;

        if body.code != "Ok" {
            return Err(ServiceError::Rejected {
                code: body.code,
                message: body.message.unwrap_or_default(),
            }
            .into());
        }

        let matrix = distances_to_matrix(body.distances, locations.len())?;
        info!("osrm table: {} locations, profile {}", matrix.size(), self.config.profile);
        Ok(matrix)
    }
}

#[derive(Debug, Deserialize)]
struct OsrmTableResponse {
    code: String,
    message: Option<String>,
    distances: Option<Vec<Vec<Option<f64>>>>,
}
