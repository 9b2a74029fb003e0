//! Data transfer objects for web requests and responses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{Crs, Journey, JourneyId};
use crate::geojson::Feature;
use crate::progress::ProcessorId;
use crate::stations::StationTable;
use crate::store::JourneyStats;

/// Request to record a journey.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewJourneyRequest {
    /// When the journey was made
    pub date: DateTime<Utc>,

    /// `[station, service UID]` per stop; the UID is the service taken
    /// from that stop to the next, and may be empty
    pub route: Vec<Vec<String>>,

    /// Distance in miles, to skip looking it up
    #[serde(default)]
    pub manual_distance: Option<f32>,

    /// Also record the return journey
    #[serde(default)]
    pub is_return: bool,
}

/// Response to a journey creation request.
#[derive(Debug, Serialize)]
pub struct ProcessorResponse {
    #[serde(rename = "processorID")]
    pub processor_id: ProcessorId,
}

/// Response to creating a return journey.
#[derive(Debug, Serialize)]
pub struct CreatedResponse {
    pub id: JourneyId,
}

/// A station code with its full name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationName {
    pub shortcode: Crs,
    pub full: String,
}

impl StationName {
    pub fn new(crs: Crs, stations: &StationTable) -> Self {
        Self {
            shortcode: crs,
            full: stations.name(&crs),
        }
    }
}

/// A journey with full station names.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JourneyView {
    pub id: JourneyId,
    pub from: StationName,
    pub to: StationName,
    pub via: Vec<StationName>,
    pub distance: f32,
    pub date: DateTime<Utc>,
    #[serde(rename = "returnID")]
    pub return_id: Option<JourneyId>,
}

impl JourneyView {
    pub fn new(journey: &Journey, stations: &StationTable) -> Self {
        Self {
            id: journey.id,
            from: StationName::new(journey.from, stations),
            to: StationName::new(journey.to, stations),
            via: journey
                .via
                .iter()
                .map(|crs| StationName::new(*crs, stations))
                .collect(),
            distance: journey.distance,
            date: journey.date,
            return_id: journey.return_id,
        }
    }
}

/// Journey totals over three windows.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub last_month: JourneyStats,
    pub ytd: JourneyStats,
    pub all_time: JourneyStats,
}

/// Response for the dashboard.
#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    #[serde(rename = "geoJSON")]
    pub geo_json: Vec<Feature>,
    pub stats: DashboardStats,
    /// Journeys in the last month, most recent first
    pub journeys: Vec<JourneyView>,
}

/// Response listing journeys.
#[derive(Debug, Serialize)]
pub struct JourneyListResponse {
    pub data: Vec<JourneyView>,
}

/// Response for a single journey.
#[derive(Debug, Serialize)]
pub struct JourneyResponse {
    #[serde(rename = "geoJSON")]
    pub geo_json: Vec<Feature>,
    pub data: JourneyView,
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
}
