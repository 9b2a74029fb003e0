//! Distance resolution.
//!
//! There is no API that says how far a train travels between two
//! stations. RTT's detailed service pages do list cumulative mileage at
//! each calling point, so distances are found by locating a service that
//! ran each leg and reading the mileage off its page.

mod error;
mod fallback;
mod pipeline;

pub use error::ResolveError;
pub use fallback::{Attempt, FallbackError, first_success};
pub use pipeline::{Resolver, ResolverConfig, leg_between};
