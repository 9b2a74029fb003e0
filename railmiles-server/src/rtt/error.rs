//! RTT client error types.

use std::time::Duration;

/// Errors from the RTT HTTP client.
#[derive(Debug, thiserror::Error)]
pub enum RttError {
    /// HTTP request failed (network error, connection reset, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The request did not complete in time and was abandoned
    #[error("{what} timed out after {}s", after.as_secs())]
    Timeout { what: &'static str, after: Duration },

    /// JSON deserialization failed
    #[error("JSON parse error: {message}")]
    Json {
        message: String,
        body: Option<String>,
    },

    /// API returned an error status code
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// No such service on that date
    #[error("service not found")]
    NotFound,

    /// Rate limited by RTT
    #[error("rate limited by RealTimeTrains")]
    RateLimited,

    /// Bad or missing API credentials
    #[error("unauthorized: check RTT_USERNAME and RTT_PASSWORD")]
    Unauthorized,

    /// Client could not be built from the configuration
    #[error("invalid configuration: {0}")]
    Config(String),
}
