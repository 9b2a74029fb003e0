//! RealTimeTrains (RTT) timetable access.
//!
//! RTT is the only readily available source of per-service mileage.
//! This module provides:
//! - a JSON API client for finding services between two stations
//! - a scraper for the detailed service page, which carries cumulative
//!   miles and chains for every calling point
//! - the `Timetable` trait the distance resolver is written against

use std::future::Future;

use chrono::NaiveDate;

use crate::domain::{Crs, ServiceUid};

mod client;
mod convert;
mod error;
#[cfg(test)]
pub mod mock;
mod scrape;
mod types;

pub use client::{RttClient, RttConfig};
pub use error::RttError;
pub use scrape::extract_waypoints;
pub use types::{
    CandidateService, LocationDetail, MalformedMileage, SearchResponse, SearchService, Waypoint,
};

/// Source of candidate services and their calling-point tables.
///
/// This abstraction allows the resolver to be tested with mock data.
pub trait Timetable: Send + Sync {
    /// Services calling at `from` and later at `to` around `date`, in the
    /// source's relevance order. No filtering is applied.
    fn search(
        &self,
        from: &Crs,
        to: &Crs,
        date: NaiveDate,
    ) -> impl Future<Output = Result<Vec<CandidateService>, RttError>> + Send;

    /// The ordered waypoint table of a service running on `date`.
    fn waypoints(
        &self,
        uid: &ServiceUid,
        date: NaiveDate,
    ) -> impl Future<Output = Result<Vec<Waypoint>, RttError>> + Send;
}
