//! Web layer for railmiles.
//!
//! A JSON API for recording journeys, following their distance lookup
//! as server-sent events, and fetching journeys with their maps.

mod dto;
mod routes;
mod state;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::AppState;
