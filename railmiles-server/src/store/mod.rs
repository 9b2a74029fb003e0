//! Persistence of journeys and the routes they took.
//!
//! Routes are stored per journey rather than per station pair, so two
//! journeys between the same stations can record different lines.

mod error;
mod since;
mod sqlite;

pub use error::StoreError;
pub use since::{JourneyStats, Since};
pub use sqlite::JourneyStore;
