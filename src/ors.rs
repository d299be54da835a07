//! OpenRouteService HTTP adapter for geocoding and distance matrices.

use reqwest::header::AUTHORIZATION;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::ServiceConfig;
use crate::coordinate::Coordinate;
use crate::error::{GeocodingError, MatrixError, ServiceError};
use crate::matrix::DistanceMatrix;
use crate::traits::{trivial_matrix, DistanceMatrixProvider, Geocoder};

pub const ORS_GEOCODE_PATH: &str = "/geocode/search";
pub const ORS_MATRIX_PATH: &str = "/v2/matrix";

#[derive(Debug, Clone)]
pub struct OrsClient {
    config: ServiceConfig,
    client: reqwest::blocking::Client,
}

impl OrsClient {
    pub fn new(config: ServiceConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::blocking::Client::builder()
            .timeout(config.timeout)
            .build()?;

        Ok(Self { config, client })
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }
}

impl Geocoder for OrsClient {
    fn geocode(&self, address: &str) -> Result<Coordinate, GeocodingError> {
        let address = address.trim();
        if address.is_empty() {
            return Err(GeocodingError::EmptyAddress);
        }

        let url = self.url(ORS_GEOCODE_PATH);
        let mut query = vec![("text", address), ("size", "1")];
        if let Some(country) = &self.config.country {
            query.push(("boundary.country", country.as_str()));
        }

        let body = self
            .config
            .retry
            .send("ors geocode", || {
                self.client
                    .get(&url)
                    .header(AUTHORIZATION, &self.config.api_key)
                    .query(&query)
            })
            .and_then(|response| response.json::<GeocodeResponse>().map_err(ServiceError::from))
            .map_err(|source| GeocodingError::Service {
                address: address.to_string(),
                source,
            })?;

        let coordinate = first_coordinate(&body)
            .ok_or_else(|| GeocodingError::NoResult(address.to_string()))?;
        debug!("geocoded {:?} to {:?}", address, coordinate);
        Ok(coordinate)
    }
}

impl DistanceMatrixProvider for OrsClient {
    fn matrix_for(&self, locations: &[Coordinate]) -> Result<DistanceMatrix, MatrixError> {
        if let Some(matrix) = trivial_matrix(locations)? {
            return Ok(matrix);
        }

        let url = format!("{}/{}", self.url(ORS_MATRIX_PATH), self.config.profile);
        let request = MatrixRequestBody {
            locations: locations.iter().map(Coordinate::lon_lat).collect(),
            metrics: vec!["distance"],
            resolve_locations: true,
        };

        let body = self
            .config
            .retry
            .send("ors matrix", || {
                self.client
                    .post(&url)
                    .header(AUTHORIZATION, &self.config.api_key)
                    .json(&request)
            })?
            .json::<MatrixResponse>()
            .map_err(ServiceError::from)?;

        let matrix = distances_to_matrix(body.distances, locations.len())?;
        info!(
            "ors matrix: {} locations, profile {}",
            matrix.size(),
            self.config.profile
        );
        Ok(matrix)
    }
}

#[derive(Debug, Serialize)]
struct MatrixRequestBody {
    /// `[lon, lat]` pairs.
    locations: Vec<[f64; 2]>,
    metrics: Vec<&'static str>,
    resolve_locations: bool,
}

#[derive(Debug, Deserialize)]
struct MatrixResponse {
    /// Meters; `null` where no route exists.
    distances: Option<Vec<Vec<Option<f64>>>>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    #[serde(default)]
    features: Vec<GeocodeFeature>,
}

#[derive(Debug, Deserialize)]
struct GeocodeFeature {
    geometry: Option<GeocodeGeometry>,
}

#[derive(Debug, Deserialize)]
struct GeocodeGeometry {
    /// GeoJSON order: `[lon, lat]`.
    #[serde(default)]
    coordinates: Vec<f64>,
}

fn first_coordinate(body: &GeocodeResponse) -> Option<Coordinate> {
    let geometry = body.features.first()?.geometry.as_ref()?;
    let [lon, lat] = geometry.coordinates.get(..2)? else {
        return None;
    };
    let coordinate = Coordinate::from_lon_lat(*lon, *lat);
    coordinate.is_valid().then_some(coordinate)
}

/// Converts a distance grid from a routing service into a validated matrix.
pub(crate) fn distances_to_matrix(
    distances: Option<Vec<Vec<Option<f64>>>>,
    expected: usize,
) -> Result<DistanceMatrix, MatrixError> {
    let distances = distances
        .ok_or_else(|| MatrixError::Malformed("response has no distances".to_string()))?;
    if distances.len() != expected {
        return Err(MatrixError::Malformed(format!(
            "expected {} rows, got {}",
            expected,
            distances.len()
        )));
    }

    let rows = distances
        .into_iter()
        .enumerate()
        .map(|(from, row)| {
            row.into_iter()
                .enumerate()
                .map(|(to, value)| value.ok_or(MatrixError::Unreachable { from, to }))
                .collect::<Result<Vec<f64>, MatrixError>>()
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(DistanceMatrix::from_rows(rows)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::InvalidMatrixError;

    fn parse_geocode(json: &str) -> Option<Coordinate> {
        let body: GeocodeResponse = serde_json::from_str(json).expect("valid json");
        first_coordinate(&body)
    }

    #[test]
    fn test_first_feature_is_lon_lat() {
        let json = r#"{
            "type": "FeatureCollection",
            "features": [
                {"type": "Feature", "geometry": {"type": "Point", "coordinates": [-73.9442, 40.6782]}},
                {"type": "Feature", "geometry": {"type": "Point", "coordinates": [-74.0, 40.7]}}
            ]
        }"#;
        let coord = parse_geocode(json).expect("coordinate");
        assert_eq!(coord.lon, -73.9442);
        assert_eq!(coord.lat, 40.6782);
    }

    #[test]
    fn test_empty_features_is_no_result() {
        assert_eq!(parse_geocode(r#"{"type": "FeatureCollection", "features": []}"#), None);
        assert_eq!(parse_geocode(r#"{"type": "FeatureCollection"}"#), None);
    }

    #[test]
    fn test_malformed_geometry_is_no_result() {
        assert_eq!(parse_geocode(r#"{"features": [{"geometry": {"coordinates": [1.0]}}]}"#), None);
        assert_eq!(parse_geocode(r#"{"features": [{"geometry": null}]}"#), None);
        assert_eq!(
            parse_geocode(r#"{"features": [{"geometry": {"coordinates": [200.0, 95.0]}}]}"#),
            None
        );
    }

    #[test]
    fn test_matrix_request_body_shape() {
        let body = MatrixRequestBody {
            locations: vec![Coordinate::from_lat_lon(40.7, -74.0).lon_lat()],
            metrics: vec!["distance"],
            resolve_locations: true,
        };
        let json = serde_json::to_value(&body).expect("serialize");
        assert_eq!(
            json,
            serde_json::json!({
                "locations": [[-74.0, 40.7]],
                "metrics": ["distance"],
                "resolve_locations": true
            })
        );
    }

    #[test]
    fn test_distances_to_matrix() {
        let body: MatrixResponse =
            serde_json::from_str(r#"{"distances": [[0.0, 1200.5], [1310.2, 0.0]], "metadata": {}}"#)
                .expect("valid json");
        let matrix = distances_to_matrix(body.distances, 2).expect("matrix");
        assert_eq!(matrix.get(0, 1), 1200.5);
        assert_eq!(matrix.get(1, 0), 1310.2);
    }

    #[test]
    fn test_null_distance_is_unreachable() {
        let body: MatrixResponse =
            serde_json::from_str(r#"{"distances": [[0.0, null], [5.0, 0.0]]}"#)
                .expect("valid json");
        let err = distances_to_matrix(body.distances, 2).unwrap_err();
        assert!(matches!(err, MatrixError::Unreachable { from: 0, to: 1 }));
    }

    #[test]
    fn test_missing_or_misshapen_distances() {
        let err = distances_to_matrix(None, 2).unwrap_err();
        assert!(matches!(err, MatrixError::Malformed(_)));

        let err = distances_to_matrix(Some(vec![vec![Some(0.0)]]), 2).unwrap_err();
        assert!(matches!(err, MatrixError::Malformed(_)));

        let negative = vec![vec![Some(0.0), Some(-3.0)], vec![Some(1.0), Some(0.0)]];
        let err = distances_to_matrix(Some(negative), 2).unwrap_err();
        assert!(matches!(
            err,
            MatrixError::Invalid(InvalidMatrixError::Negative { row: 0, col: 1, .. })
        ));
    }

    #[test]
    fn test_single_location_skips_network() {
        let mut config = ServiceConfig::new("unused");
        config.base_url = "http://127.0.0.1:9".to_string();
        let client = OrsClient::new(config).expect("client");

        let matrix = client
            .matrix_for(&[Coordinate::from_lat_lon(40.7, -74.0)])
            .expect("1x1 matrix");
        assert_eq!(matrix.size(), 1);
        assert_eq!(matrix.get(0, 0), 0.0);

        assert!(matches!(client.matrix_for(&[]), Err(MatrixError::NoLocations)));
    }
}
