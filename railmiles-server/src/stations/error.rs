//! Station data error types.

use std::path::PathBuf;

/// Errors that can occur when loading station data.
#[derive(Debug, thiserror::Error)]
pub enum StationError {
    /// The data file could not be read
    #[error("failed to read station data from {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The data is not a station table
    #[error("JSON parse error: {message}")]
    Json { message: String },
}
