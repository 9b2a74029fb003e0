//! Shared, reloadable station lookup.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::info;

use crate::domain::Crs;

use super::error::StationError;
use super::table::{StationDetail, StationTable};

/// Thread-safe station lookup backed by a JSON data file.
///
/// Readers take a snapshot of the current table; `reload` swaps in a
/// fresh one without disturbing snapshots already handed out.
#[derive(Clone)]
pub struct StationLookup {
    inner: Arc<RwLock<Arc<StationTable>>>,
    path: Option<PathBuf>,
}

impl StationLookup {
    /// Load the station data file at `path`.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, StationError> {
        let path = path.as_ref().to_path_buf();
        let table = read_table(&path)?;
        info!(path = %path.display(), stations = table.len(), "loaded station data");

        Ok(Self {
            inner: Arc::new(RwLock::new(Arc::new(table))),
            path: Some(path),
        })
    }

    /// A lookup over a fixed table, for tests.
    pub fn from_table(table: StationTable) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Arc::new(table))),
            path: None,
        }
    }

    /// The current table.
    pub async fn snapshot(&self) -> Arc<StationTable> {
        self.inner.read().await.clone()
    }

    /// Full name of a station, or its code if it isn't known.
    pub async fn name(&self, crs: &Crs) -> String {
        self.inner.read().await.name(crs)
    }

    pub async fn detail(&self, crs: &Crs) -> Option<StationDetail> {
        self.inner.read().await.detail(crs).cloned()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }

    /// Re-read the data file.
    ///
    /// On failure the current table is kept and the error returned.
    pub async fn reload(&self) -> Result<usize, StationError> {
        let Some(path) = &self.path else {
            return Ok(self.len().await);
        };
        let table = read_table(path)?;
        let count = table.len();

        *self.inner.write().await = Arc::new(table);

        Ok(count)
    }
}

fn read_table(path: &Path) -> Result<StationTable, StationError> {
    let json = std::fs::read_to_string(path).map_err(|source| StationError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    StationTable::from_json(&json)
}
