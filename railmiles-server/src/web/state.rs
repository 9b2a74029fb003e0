//! Application state for the web layer.

use std::sync::Arc;

use crate::cache::CachedTimetable;
use crate::progress::ProcessorRegistry;
use crate::resolve::Resolver;
use crate::stations::StationLookup;
use crate::store::JourneyStore;

/// Shared application state.
///
/// Contains all the services needed to handle requests.
pub struct AppState<T = CachedTimetable> {
    /// Distance resolution against RTT
    pub resolver: Arc<Resolver<T>>,

    /// Journey and route persistence
    pub store: Arc<JourneyStore>,

    /// Station names and coordinates
    pub stations: StationLookup,

    /// In-flight journey creations
    pub processors: Arc<ProcessorRegistry>,
}

impl<T> AppState<T> {
    /// Create a new app state.
    pub fn new(resolver: Resolver<T>, store: JourneyStore, stations: StationLookup) -> Self {
        Self {
            resolver: Arc::new(resolver),
            store: Arc::new(store),
            stations,
            processors: Arc::new(ProcessorRegistry::new()),
        }
    }
}

impl<T> Clone for AppState<T> {
    fn clone(&self) -> Self {
        Self {
            resolver: self.resolver.clone(),
            store: self.store.clone(),
            stations: self.stations.clone(),
            processors: self.processors.clone(),
        }
    }
}
