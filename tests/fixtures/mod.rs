//! Test fixtures for milk-run.
//!
//! Provides:
//! - New York delivery addresses with approximate coordinates
//! - In-memory geocoder and matrix providers

pub mod nyc_locations;

pub use nyc_locations::*;
