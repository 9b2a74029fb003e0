//! RTT API response DTOs and the transient records built from them.
//!
//! The DTOs map directly to the RTT JSON search API. They use `Option`
//! liberally because RTT omits fields, and sends `null` for `services`
//! when nothing runs between the two locations.

use chrono::NaiveDate;
use serde::Deserialize;

use crate::domain::{CHAINS_PER_MILE, Crs, Mileage, ServiceUid};

/// Response from `/api/v1/json/search/{from}/to/{to}/{yyyy}/{mm}/{dd}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    /// Services calling at both locations, in RTT's order.
    pub services: Option<Vec<SearchService>>,
}

/// One service in a location search.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchService {
    /// RTT's UID for the schedule (e.g. "P12345").
    pub service_uid: String,

    /// The date the service started running, as "YYYY-MM-DD".
    ///
    /// Overnight services are listed under the following day's search
    /// while keeping their original run date.
    pub run_date: String,

    /// Whether this is a passenger service (as opposed to ECS or freight).
    #[serde(default)]
    pub is_passenger: bool,

    /// Detail at the searched location.
    pub location_detail: Option<LocationDetail>,
}

/// Per-location detail of a service.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationDetail {
    /// How the call is displayed, e.g. "CALL", "ORIGIN", "CANCELLED_CALL".
    pub display_as: Option<String>,
}

/// A service that might have carried the user between two stations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateService {
    pub uid: ServiceUid,
    pub run_date: NaiveDate,
    pub is_passenger: bool,
    pub is_cancelled: bool,
}

impl CandidateService {
    /// Whether this service can be used for a leg travelled on `date`.
    pub fn is_usable_on(&self, date: NaiveDate) -> bool {
        self.run_date == date && !self.is_cancelled && self.is_passenger
    }
}

/// A row of a service's detailed calling-point table.
///
/// Mileage is kept as scraped text: only the rows a leg starts and ends
/// at are ever parsed, so a malformed row elsewhere does no harm.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Waypoint {
    pub station: Crs,
    pub miles: Option<String>,
    pub chains: Option<String>,
}

/// Mileage text on a waypoint that is present but not a valid position.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("malformed mileage at {station}: miles {miles:?}, chains {chains:?}")]
pub struct MalformedMileage {
    pub station: Crs,
    pub miles: String,
    pub chains: String,
}

impl Waypoint {
    pub fn new(station: Crs, miles: Option<&str>, chains: Option<&str>) -> Self {
        let clean = |s: Option<&str>| {
            s.map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };
        Self {
            station,
            miles: clean(miles),
            chains: clean(chains),
        }
    }

    /// The cumulative mileage at this waypoint.
    ///
    /// `Ok(None)` when the page carries no distance for this row.
    pub fn mileage(&self) -> Result<Option<Mileage>, MalformedMileage> {
        let (Some(miles), Some(chains)) = (&self.miles, &self.chains) else {
            return Ok(None);
        };
        let malformed = || MalformedMileage {
            station: self.station,
            miles: miles.clone(),
            chains: chains.clone(),
        };
        let miles = miles.parse().map_err(|_| malformed())?;
        let chains: u32 = chains.parse().map_err(|_| malformed())?;
        if chains as f32 >= CHAINS_PER_MILE {
            return Err(malformed());
        }
        Ok(Some(Mileage::new(miles, chains)))
    }
}
