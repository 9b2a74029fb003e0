//! Domain error types.
//!
//! These errors represent validation failures in a journey request. They
//! are user errors: the message is shown to the user verbatim.

use super::Crs;

/// Domain-level errors for request validation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DomainError {
    /// A journey needs at least an origin and a destination
    #[error("a journey needs at least two stops (got {0})")]
    TooFewStops(usize),

    /// Journeys can only be recorded once they have happened
    #[error("invalid date: occurs in the future")]
    FutureDate,

    /// Manual distances must be positive miles
    #[error("invalid manual distance: {0}")]
    InvalidDistance(f32),

    /// Past journeys can't be found by timetable search
    #[error(
        "a service UID is required for {from} -> {to} as the journey was not made today"
    )]
    MissingServiceUid { from: Crs, to: Crs },
}
