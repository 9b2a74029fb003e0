//! Caching layer for RTT responses.
//!
//! Recording a return journey, or a journey that shares a leg with one
//! recorded earlier the same day, asks RTT the same questions again. Search
//! results and scraped waypoint tables are cached so repeat resolutions
//! don't hit the network.
//!
//! Searches are keyed by (from, to, date); waypoint tables by (uid, date).

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use moka::future::Cache as MokaCache;
use tracing::trace;

use crate::domain::{Crs, ServiceUid};
use crate::rtt::{CandidateService, RttClient, RttError, Timetable, Waypoint};

type SearchKey = (Crs, Crs, NaiveDate);
type PageKey = (ServiceUid, NaiveDate);

/// Configuration for the cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// TTL for cached search results.
    pub search_ttl: Duration,

    /// TTL for cached waypoint tables.
    pub page_ttl: Duration,

    /// Maximum number of cached entries, per cache.
    pub max_capacity: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            search_ttl: Duration::from_secs(5 * 60),
            page_ttl: Duration::from_secs(60 * 60),
            max_capacity: 1000,
        }
    }
}

/// A `Timetable` with caching.
///
/// Only successful responses are cached; errors always go back to the
/// inner timetable on the next request.
pub struct CachedTimetable<T = RttClient> {
    inner: T,
    searches: MokaCache<SearchKey, Arc<Vec<CandidateService>>>,
    pages: MokaCache<PageKey, Arc<Vec<Waypoint>>>,
}

impl<T: Timetable> CachedTimetable<T> {
    /// Create a new cached timetable.
    pub fn new(inner: T, config: &CacheConfig) -> Self {
        let searches = MokaCache::builder()
            .time_to_live(config.search_ttl)
            .max_capacity(config.max_capacity)
            .build();
        let pages = MokaCache::builder()
            .time_to_live(config.page_ttl)
            .max_capacity(config.max_capacity)
            .build();

        Self {
            inner,
            searches,
            pages,
        }
    }

    /// Access the underlying timetable for operations that bypass cache.
    pub fn inner(&self) -> &T {
        &self.inner
    }
}

impl<T: Timetable> Timetable for CachedTimetable<T> {
    async fn search(
        &self,
        from: &Crs,
        to: &Crs,
        date: NaiveDate,
    ) -> Result<Vec<CandidateService>, RttError> {
        let key = (*from, *to, date);

        if let Some(cached) = self.searches.get(&key).await {
            trace!(%from, %to, %date, "search cache hit");
            return Ok(cached.as_ref().clone());
        }

        let services = self.inner.search(from, to, date).await?;
        self.searches
            .insert(key, Arc::new(services.clone()))
            .await;

        Ok(services)
    }

    async fn waypoints(&self, uid: &ServiceUid, date: NaiveDate) -> Result<Vec<Waypoint>, RttError> {
        let key = (uid.clone(), date);

        if let Some(cached) = self.pages.get(&key).await {
            trace!(%uid, %date, "page cache hit");
            return Ok(cached.as_ref().clone());
        }

        let waypoints = self.inner.waypoints(uid, date).await?;
        self.pages.insert(key, Arc::new(waypoints.clone())).await;

        Ok(waypoints)
    }
}
