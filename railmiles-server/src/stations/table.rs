//! The station reference table.

use std::collections::HashMap;

use serde::Deserialize;
use tracing::debug;

use crate::domain::Crs;

use super::error::StationError;

/// One entry of the station data file, keyed by CRS code.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct StationRecord {
    name: String,
    lat: f32,
    lon: f32,
}

/// What is known about a station.
#[derive(Debug, Clone, PartialEq)]
pub struct StationDetail {
    pub name: String,
    pub lat: f32,
    pub lon: f32,
}

impl StationDetail {
    /// Position as a GeoJSON `[lon, lat]` pair.
    pub fn position(&self) -> [f32; 2] {
        [self.lon, self.lat]
    }
}

/// CRS code → station detail.
#[derive(Debug, Clone, Default)]
pub struct StationTable {
    stations: HashMap<Crs, StationDetail>,
}

impl StationTable {
    /// Parse the `{"KGX": {"Name": ..., "Lat": ..., "Lon": ...}}` format.
    ///
    /// Entries whose key isn't a valid CRS code are skipped.
    pub fn from_json(json: &str) -> Result<Self, StationError> {
        let records: HashMap<String, StationRecord> =
            serde_json::from_str(json).map_err(|e| StationError::Json {
                message: e.to_string(),
            })?;

        let stations = records
            .into_iter()
            .filter_map(|(code, record)| match Crs::parse_normalized(&code) {
                Ok(crs) => Some((
                    crs,
                    StationDetail {
                        name: record.name,
                        lat: record.lat,
                        lon: record.lon,
                    },
                )),
                Err(_) => {
                    debug!(%code, "skipping station with invalid code");
                    None
                }
            })
            .collect();

        Ok(Self { stations })
    }

    /// Full name of a station, or its code if it isn't known.
    pub fn name(&self, crs: &Crs) -> String {
        self.stations
            .get(crs)
            .map(|s| s.name.clone())
            .unwrap_or_else(|| crs.to_string())
    }

    pub fn detail(&self, crs: &Crs) -> Option<&StationDetail> {
        self.stations.get(crs)
    }

    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }
}

impl FromIterator<(Crs, StationDetail)> for StationTable {
    fn from_iter<I: IntoIterator<Item = (Crs, StationDetail)>>(iter: I) -> Self {
        Self {
            stations: iter.into_iter().collect(),
        }
    }
}
