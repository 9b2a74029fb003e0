//! Server configuration from the environment.

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

/// Errors reading configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// A required variable is unset or empty
    #[error("{0} must be set")]
    Missing(&'static str),

    /// A variable is set to something unusable
    #[error("invalid {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}

/// Everything the server needs to start.
#[derive(Debug, Clone)]
pub struct Config {
    /// RTT API username
    pub rtt_username: String,
    /// RTT API password
    pub rtt_password: String,
    /// Address to listen on
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// SQLite database file
    pub database_path: PathBuf,
    /// Station data JSON file
    pub stations_path: PathBuf,
}

impl Config {
    /// Read configuration from process environment variables.
    ///
    /// `RTT_USERNAME` and `RTT_PASSWORD` are required. `RAILMILES_HOST`,
    /// `RAILMILES_PORT`, `RAILMILES_DB` and `RAILMILES_STATIONS` default to
    /// `127.0.0.1`, `8080`, `railmiles.db` and `stationData.json`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read configuration through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
        let required = |name: &'static str| var(name).ok_or(ConfigError::Missing(name));

        let host = match var("RAILMILES_HOST") {
            Some(value) => value.trim().parse().map_err(|_| ConfigError::Invalid {
                name: "RAILMILES_HOST",
                value,
            })?,
            None => IpAddr::from([127, 0, 0, 1]),
        };
        let port = match var("RAILMILES_PORT") {
            Some(value) => value.trim().parse().map_err(|_| ConfigError::Invalid {
                name: "RAILMILES_PORT",
                value,
            })?,
            None => 8080,
        };

        Ok(Self {
            rtt_username: required("RTT_USERNAME")?,
            rtt_password: required("RTT_PASSWORD")?,
            host,
            port,
            database_path: var("RAILMILES_DB")
                .unwrap_or_else(|| "railmiles.db".to_string())
                .into(),
            stations_path: var("RAILMILES_STATIONS")
                .unwrap_or_else(|| "stationData.json".to_string())
                .into(),
        })
    }

    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}
