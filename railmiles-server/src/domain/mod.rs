//! Domain types for journey tracking.
//!
//! This module contains the core domain model types that represent
//! validated rail data. All types enforce their invariants at construction
//! time, so code that receives these types can trust their validity.

mod error;
mod journey;
mod mileage;
mod service_uid;
mod station;

pub use error::DomainError;
pub use journey::{Journey, JourneyId, JourneyPlan};
pub use mileage::{CHAINS_PER_MILE, DistanceWithRoute, Mileage, chains_to_miles};
pub use service_uid::{InvalidServiceUid, ServiceUid};
pub use station::{Crs, InvalidCrs};
