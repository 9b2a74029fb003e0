use std::error::Error;
use std::time::Duration;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use railmiles_server::cache::{CacheConfig, CachedTimetable};
use railmiles_server::config::Config;
use railmiles_server::resolve::{Resolver, ResolverConfig};
use railmiles_server::rtt::{RttClient, RttConfig};
use railmiles_server::stations::StationLookup;
use railmiles_server::store::JourneyStore;
use railmiles_server::web::{AppState, create_router};

/// How often to re-read the station file (24 hours).
const STATION_RELOAD_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("railmiles_server=info,tower_http=info")),
        )
        .init();

    let config = Config::from_env()?;

    let rtt = RttClient::new(RttConfig::new(&config.rtt_username, &config.rtt_password))?;
    let timetable = CachedTimetable::new(rtt, &CacheConfig::default());
    let resolver = Resolver::new(timetable, ResolverConfig::default());

    let store = JourneyStore::open(&config.database_path)?;
    info!(path = %config.database_path.display(), "opened journey database");

    // Fail fast if the station file is unusable
    let stations = StationLookup::load(&config.stations_path).await?;
    info!(count = stations.len().await, "loaded stations");

    let stations_reload = stations.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(STATION_RELOAD_INTERVAL);
        interval.tick().await; // First tick is immediate, skip it
        loop {
            interval.tick().await;
            match stations_reload.reload().await {
                Ok(count) => info!(count, "reloaded stations"),
                Err(e) => error!(error = %e, "failed to reload stations"),
            }
        }
    });

    let state = AppState::new(resolver, store, stations);
    let app = create_router(state);

    let addr = config.listen_addr();
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "railmiles listening");

    axum::serve(listener, app).await?;
    Ok(())
}
