//! Tabular route export.
//!
//! A route becomes rows of `(Stop, Address, Type)` with the depot as the
//! first row and the return leg as the last, serializable to CSV.

use std::fmt;
use std::io::{self, Write};

use serde::Serialize;

use crate::planner::RouteResult;

/// Rough driving time band shown alongside the distance, minutes per km.
const MINUTES_PER_KM: (f64, f64) = (2.0, 3.0);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StopKind {
    Depot,
    Delivery,
    Return,
}

impl fmt::Display for StopKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                StopKind::Depot => "Depot",
                StopKind::Delivery => "Delivery",
                StopKind::Return => "Return",
            }
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteRow {
    /// 1-based.
    #[serde(rename = "Stop")]
    pub stop: usize,
    #[serde(rename = "Address")]
    pub address: String,
    #[serde(rename = "Type")]
    pub kind: StopKind,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteTable {
    pub rows: Vec<RouteRow>,
}

impl RouteTable {
    pub fn from_result(result: &RouteResult) -> Self {
        Self::from_addresses(&result.addresses)
    }

    /// Builds rows for addresses already in visiting order (depot first and
    /// last).
    pub fn from_addresses<S: AsRef<str>>(addresses: &[S]) -> Self {
        let last = addresses.len().saturating_sub(1);
        let rows = addresses
            .iter()
            .enumerate()
            .map(|(i, address)| RouteRow {
                stop: i + 1,
                address: address.as_ref().to_string(),
                kind: match i {
                    0 => StopKind::Depot,
                    i if i == last => StopKind::Return,
                    _ => StopKind::Delivery,
                },
            })
            .collect();

        Self { rows }
    }

    /// Writes a `Stop,Address,Type` header followed by one record per row.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), csv::Error> {
        let mut writer = csv::Writer::from_writer(writer);
        for row in &self.rows {
            writer.serialize(row)?;
        }
        writer.flush()?;
        Ok(())
    }

    pub fn to_csv(&self) -> Result<String, csv::Error> {
        let mut buffer = Vec::new();
        self.write_csv(&mut buffer)?;
        String::from_utf8(buffer)
            .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err).into())
    }
}

/// Headline figures for a planned route.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteSummary {
    pub total_km: f64,
    pub delivery_stops: usize,
    /// `(low, high)` minutes.
    pub estimated_minutes: (f64, f64),
}

impl RouteSummary {
    pub fn from_result(result: &RouteResult) -> Self {
        let total_km = result.total_distance / 1000.0;
        Self {
            total_km,
            delivery_stops: result.delivery_count(),
            estimated_minutes: (total_km * MINUTES_PER_KM.0, total_km * MINUTES_PER_KM.1),
        }
    }
}

impl fmt::Display for RouteSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Total distance: {:.2} km | Delivery stops: {} | Estimated time: {:.0}-{:.0} min",
            self.total_km, self.delivery_stops, self.estimated_minutes.0, self.estimated_minutes.1
        )
    }
}
