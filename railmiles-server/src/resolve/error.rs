//! Distance resolution errors.

use crate::domain::Crs;
use crate::rtt::{MalformedMileage, RttError};

/// Why a journey's distance could not be resolved.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    /// The request itself is unusable
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The timetable has no usable service for a leg
    #[error("no services found between {from} and {to}")]
    NoRouteFound { from: Crs, to: Crs },

    /// No candidate service publishes mileage for a leg
    #[error("no mileage available between {from} and {to}, please enter the distance manually")]
    ManualDistanceRequired { from: Crs, to: Crs },

    /// A service page lists the leg's stations an unexpected number of times
    #[error("expected {from} and {to} once each on the service, found {found} matching calls")]
    UnexpectedWaypointCount { from: Crs, to: Crs, found: usize },

    /// A service page reaches the destination before the departure
    #[error("service reaches {to} before {from}")]
    MalformedRoute { from: Crs, to: Crs },

    /// Mileage text on a service page could not be parsed
    #[error(transparent)]
    MalformedMileage(#[from] MalformedMileage),

    /// The timetable could not be queried
    #[error("timetable error: {0}")]
    Timetable(#[from] RttError),
}

impl ResolveError {
    /// Whether the user can act on this error, e.g. by entering a distance.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            ResolveError::InvalidRequest(_)
                | ResolveError::NoRouteFound { .. }
                | ResolveError::ManualDistanceRequired { .. }
        )
    }
}
