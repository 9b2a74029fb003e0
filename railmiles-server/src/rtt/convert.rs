//! Conversion from RTT DTOs to candidate services.

use chrono::NaiveDate;
use tracing::debug;

use crate::domain::ServiceUid;

use super::types::{CandidateService, SearchResponse, SearchService};

/// `displayAs` value for a call that will not happen.
const CANCELLED_CALL: &str = "CANCELLED_CALL";

/// Error during DTO to candidate conversion.
#[derive(Debug, Clone, thiserror::Error)]
enum ConversionError {
    /// Failed to parse a service UID
    #[error("invalid service UID: {0}")]
    InvalidUid(String),

    /// Failed to parse a run date
    #[error("invalid run date: {0}")]
    InvalidRunDate(String),
}

/// Convert a search response into candidate services, keeping RTT's order.
///
/// Services that fail conversion are skipped rather than failing the whole
/// search; they could never be scraped anyway.
pub fn convert_search_response(response: SearchResponse) -> Vec<CandidateService> {
    response
        .services
        .unwrap_or_default()
        .into_iter()
        .filter_map(|service| match convert_service(&service) {
            Ok(candidate) => Some(candidate),
            Err(e) => {
                debug!(uid = %service.service_uid, error = %e, "skipping search result");
                None
            }
        })
        .collect()
}

/// Convert a single search result.
fn convert_service(service: &SearchService) -> Result<CandidateService, ConversionError> {
    let uid = ServiceUid::parse(&service.service_uid)
        .map_err(|_| ConversionError::InvalidUid(service.service_uid.clone()))?;

    let run_date = NaiveDate::parse_from_str(&service.run_date, "%Y-%m-%d")
        .map_err(|_| ConversionError::InvalidRunDate(service.run_date.clone()))?;

    let is_cancelled = service
        .location_detail
        .as_ref()
        .and_then(|d| d.display_as.as_deref())
        .is_some_and(|d| d.eq_ignore_ascii_case(CANCELLED_CALL));

    Ok(CandidateService {
        uid,
        run_date,
        is_passenger: service.is_passenger,
        is_cancelled,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rtt::types::LocationDetail;

    fn service(uid: &str, run_date: &str, display_as: Option<&str>) -> SearchService {
        SearchService {
            service_uid: uid.to_string(),
            run_date: run_date.to_string(),
            is_passenger: true,
            location_detail: Some(LocationDetail {
                display_as: display_as.map(str::to_string),
            }),
        }
    }

    #[test]
    fn converts_in_order() {
        let response = SearchResponse {
            services: Some(vec![
                service("P11111", "2024-06-01", Some("CALL")),
                service("P22222", "2024-05-31", Some("CALL")),
            ]),
        };
        let candidates = convert_search_response(response);
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].uid.as_str(), "P11111");
        assert_eq!(
            candidates[1].run_date,
            NaiveDate::from_ymd_opt(2024, 5, 31).unwrap()
        );
    }

    #[test]
    fn detects_cancelled_call_case_insensitively() {
        let c = convert_service(&service("P11111", "2024-06-01", Some("cancelled_call"))).unwrap();
        assert!(c.is_cancelled);
        let c = convert_service(&service("P11111", "2024-06-01", None)).unwrap();
        assert!(!c.is_cancelled);
    }

    #[test]
    fn skips_unconvertible_services() {
        let response = SearchResponse {
            services: Some(vec![
                service("", "2024-06-01", None),
                service("P22222", "01/06/2024", None),
                service("P33333", "2024-06-01", None),
            ]),
        };
        let candidates = convert_search_response(response);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].uid.as_str(), "P33333");
    }

    #[test]
    fn null_services_is_empty() {
        assert!(convert_search_response(SearchResponse { services: None }).is_empty());
    }
}
