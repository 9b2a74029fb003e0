//! Mock timetable for testing without network access.
//!
//! Serves canned search results and waypoint tables, and records every
//! request so tests can check what was fetched and in which order.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use parking_lot::Mutex;

use crate::domain::{Crs, ServiceUid};

use super::Timetable;
use super::error::RttError;
use super::types::{CandidateService, Waypoint};

/// A page fetch outcome the mock should produce.
#[derive(Debug, Clone)]
enum PageResponse {
    Waypoints(Vec<Waypoint>),
    Timeout,
}

/// A request the mock has served.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockRequest {
    Search { from: Crs, to: Crs },
    Page { uid: String },
}

/// In-memory `Timetable`.
#[derive(Debug, Clone, Default)]
pub struct MockTimetable {
    searches: HashMap<(Crs, Crs), Vec<CandidateService>>,
    pages: HashMap<String, PageResponse>,
    requests: Arc<Mutex<Vec<MockRequest>>>,
}

impl MockTimetable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register search results for services from `from` to `to`.
    pub fn with_search(mut self, from: Crs, to: Crs, services: Vec<CandidateService>) -> Self {
        self.searches.insert((from, to), services);
        self
    }

    /// Register the waypoint table for a service.
    pub fn with_page(mut self, uid: &str, waypoints: Vec<Waypoint>) -> Self {
        self.pages
            .insert(uid.to_string(), PageResponse::Waypoints(waypoints));
        self
    }

    /// Make fetching a service page time out.
    pub fn with_page_timeout(mut self, uid: &str) -> Self {
        self.pages.insert(uid.to_string(), PageResponse::Timeout);
        self
    }

    /// Requests served so far, in order.
    pub fn requests(&self) -> Vec<MockRequest> {
        self.requests.lock().clone()
    }

    /// UIDs of the service pages fetched so far, in order.
    pub fn pages_fetched(&self) -> Vec<String> {
        self.requests()
            .into_iter()
            .filter_map(|r| match r {
                MockRequest::Page { uid } => Some(uid),
                MockRequest::Search { .. } => None,
            })
            .collect()
    }
}

impl Timetable for MockTimetable {
    async fn search(
        &self,
        from: &Crs,
        to: &Crs,
        _date: NaiveDate,
    ) -> Result<Vec<CandidateService>, RttError> {
        self.requests.lock().push(MockRequest::Search {
            from: *from,
            to: *to,
        });
        Ok(self
            .searches
            .get(&(*from, *to))
            .cloned()
            .unwrap_or_default())
    }

    async fn waypoints(&self, uid: &ServiceUid, _date: NaiveDate) -> Result<Vec<Waypoint>, RttError> {
        self.requests.lock().push(MockRequest::Page {
            uid: uid.as_str().to_string(),
        });
        match self.pages.get(uid.as_str()) {
            Some(PageResponse::Waypoints(waypoints)) => Ok(waypoints.clone()),
            Some(PageResponse::Timeout) => Err(RttError::Timeout {
                what: "service page fetch",
                after: Duration::from_secs(10),
            }),
            None => Err(RttError::NotFound),
        }
    }
}

/// Build a passenger candidate running on `date`.
pub fn candidate(uid: &str, date: NaiveDate) -> CandidateService {
    CandidateService {
        uid: ServiceUid::parse(uid).unwrap_or_else(|_| panic!("invalid test UID {uid}")),
        run_date: date,
        is_passenger: true,
        is_cancelled: false,
    }
}

/// Build a waypoint from a code and optional (miles, chains).
pub fn waypoint(code: &str, mileage: Option<(u32, u32)>) -> Waypoint {
    let station = Crs::parse(code).unwrap_or_else(|_| panic!("invalid test CRS {code}"));
    match mileage {
        Some((miles, chains)) => Waypoint::new(
            station,
            Some(&miles.to_string()),
            Some(&chains.to_string()),
        ),
        None => Waypoint::new(station, None, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    fn crs(s: &str) -> Crs {
        Crs::parse(s).unwrap()
    }

    #[tokio::test]
    async fn serves_registered_data_and_records_requests() {
        let mock = MockTimetable::new()
            .with_search(crs("KGX"), crs("YRK"), vec![candidate("P11111", date())])
            .with_page("P11111", vec![waypoint("KGX", Some((0, 0)))]);

        let found = mock.search(&crs("KGX"), &crs("YRK"), date()).await.unwrap();
        assert_eq!(found.len(), 1);

        let uid = ServiceUid::parse("P11111").unwrap();
        let page = mock.waypoints(&uid, date()).await.unwrap();
        assert_eq!(page.len(), 1);

        assert_eq!(
            mock.requests(),
            vec![
                MockRequest::Search {
                    from: crs("KGX"),
                    to: crs("YRK")
                },
                MockRequest::Page {
                    uid: "P11111".to_string()
                },
            ]
        );
    }

    #[tokio::test]
    async fn unknown_search_is_empty_and_unknown_page_not_found() {
        let mock = MockTimetable::new();
        assert!(mock.search(&crs("AAA"), &crs("BBB"), date()).await.unwrap().is_empty());

        let uid = ServiceUid::parse("Z99999").unwrap();
        assert!(matches!(
            mock.waypoints(&uid, date()).await,
            Err(RttError::NotFound)
        ));
    }
}
