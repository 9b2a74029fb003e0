//! Station reference data.
//!
//! Maps CRS codes to full names and coordinates, loaded at startup from a
//! JSON data file.

mod error;
mod lookup;
mod table;

pub use error::StationError;
pub use lookup::StationLookup;
pub use table::{StationDetail, StationTable};
