//! HTTP route handlers.

use std::convert::Infallible;

use axum::{
    Json, Router,
    body::Body,
    extract::{Path, State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use futures::StreamExt;
use tower_http::trace::TraceLayer;
use tracing::{debug, error};

use crate::domain::{Crs, Journey, JourneyId, JourneyPlan, ServiceUid};
use crate::geojson::{RoutedJourney, features};
use crate::progress::{ProcessorId, RegistryError, spawn_journey_creation};
use crate::rtt::Timetable;
use crate::store::{JourneyStore, Since, StoreError};

use super::dto::*;
use super::state::AppState;

/// Create the application router.
pub fn create_router<T: Timetable + 'static>(state: AppState<T>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/dashboard", get(dashboard::<T>))
        .route(
            "/api/journeys",
            get(list_journeys::<T>).post(new_journey::<T>),
        )
        .route("/api/journeys/processor/:id", get(processor_stream::<T>))
        .route(
            "/api/journeys/:id",
            get(get_journey::<T>).delete(delete_journey::<T>),
        )
        .route("/api/journeys/:id/return", post(create_return::<T>))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Stats, plus last month's journeys and their map.
async fn dashboard<T: Timetable + 'static>(
    State(state): State<AppState<T>>,
) -> Result<Json<DashboardResponse>, AppError> {
    let stats = DashboardStats {
        last_month: state.store.stats(Since::LastMonth)?,
        ytd: state.store.stats(Since::YearToDate)?,
        all_time: state.store.stats(Since::AllTime)?,
    };
    let routed = with_routes(&state.store, state.store.journeys(Since::LastMonth)?)?;
    let stations = state.stations.snapshot().await;

    Ok(Json(DashboardResponse {
        geo_json: features(&routed, false, &stations),
        stats,
        journeys: routed
            .iter()
            .map(|r| JourneyView::new(&r.journey, &stations))
            .collect(),
    }))
}

/// Every journey, most recent first.
async fn list_journeys<T: Timetable + 'static>(
    State(state): State<AppState<T>>,
) -> Result<Json<JourneyListResponse>, AppError> {
    let journeys = state.store.journeys(Since::AllTime)?;
    let stations = state.stations.snapshot().await;

    Ok(Json(JourneyListResponse {
        data: journeys
            .iter()
            .map(|j| JourneyView::new(j, &stations))
            .collect(),
    }))
}

/// Start recording a journey.
///
/// The distance is looked up in the background; the response carries a
/// token for following progress at `/api/journeys/processor/{id}`.
async fn new_journey<T: Timetable + 'static>(
    State(state): State<AppState<T>>,
    payload: Result<Json<NewJourneyRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ProcessorResponse>), AppError> {
    let Json(request) = payload.map_err(|e| AppError::BadRequest {
        message: e.body_text(),
    })?;
    let plan = plan_from_request(request, Utc::now())?;

    let processor_id = spawn_journey_creation(
        state.processors.clone(),
        state.resolver.clone(),
        state.store.clone(),
        plan,
    )
    .await;
    debug!(processor = %processor_id, "started journey creation");

    Ok((StatusCode::ACCEPTED, Json(ProcessorResponse { processor_id })))
}

/// Progress of a journey creation as server-sent events.
async fn processor_stream<T: Timetable + 'static>(
    State(state): State<AppState<T>>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let id: ProcessorId = id.parse().map_err(|_| AppError::NotFound {
        message: format!("no processor with id {id}"),
    })?;
    let stream = state.processors.attach(id).await?;

    let frames = stream
        .into_stream()
        .map(|event| Ok::<_, Infallible>(event.to_sse_frame()));

    Ok((
        [
            (header::CONTENT_TYPE, "text/event-stream"),
            (header::CACHE_CONTROL, "no-cache"),
        ],
        Body::from_stream(frames),
    )
        .into_response())
}

/// One journey and its map.
async fn get_journey<T: Timetable + 'static>(
    State(state): State<AppState<T>>,
    Path(id): Path<String>,
) -> Result<Json<JourneyResponse>, AppError> {
    let id = parse_journey_id(&id)?;
    let journey = state.store.journey(id)?.ok_or(StoreError::NotFound(id))?;
    let route = state.store.route(id)?;
    let stations = state.stations.snapshot().await;

    let data = JourneyView::new(&journey, &stations);
    Ok(Json(JourneyResponse {
        geo_json: features(&[RoutedJourney { journey, route }], true, &stations),
        data,
    }))
}

/// Record the return leg of an existing journey.
async fn create_return<T: Timetable + 'static>(
    State(state): State<AppState<T>>,
    Path(id): Path<String>,
) -> Result<(StatusCode, Json<CreatedResponse>), AppError> {
    let id = parse_journey_id(&id)?;
    let return_id = state.store.create_return(id)?;
    Ok((StatusCode::CREATED, Json(CreatedResponse { id: return_id })))
}

async fn delete_journey<T: Timetable + 'static>(
    State(state): State<AppState<T>>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let id = parse_journey_id(&id)?;
    state.store.delete_journey(id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Validate a journey request into a plan.
fn plan_from_request(
    request: NewJourneyRequest,
    now: DateTime<Utc>,
) -> Result<JourneyPlan, AppError> {
    let bad_request = |message: String| AppError::BadRequest { message };

    let mut stops = Vec::with_capacity(request.route.len());
    let mut services = Vec::with_capacity(request.route.len());
    for entry in &request.route {
        let code = entry
            .first()
            .ok_or_else(|| bad_request("each route entry needs a station code".to_string()))?;
        let crs = Crs::parse_normalized(code).map_err(|e| bad_request(e.to_string()))?;
        let uid = ServiceUid::parse_optional(entry.get(1).map_or("", String::as_str))
            .map_err(|e| bad_request(e.to_string()))?;
        stops.push(crs);
        services.push(uid);
    }

    JourneyPlan::new(
        stops,
        services,
        request.date,
        request.manual_distance,
        request.is_return,
        now,
    )
    .map_err(|e| bad_request(e.to_string()))
}

/// Journey ids that don't parse can't exist, so they are not found.
fn parse_journey_id(raw: &str) -> Result<JourneyId, AppError> {
    raw.parse().map_err(|_| AppError::NotFound {
        message: format!("journey {raw} not found"),
    })
}

fn with_routes(
    store: &JourneyStore,
    journeys: Vec<Journey>,
) -> Result<Vec<RoutedJourney>, StoreError> {
    journeys
        .into_iter()
        .map(|journey| {
            let route = store.route(journey.id)?;
            Ok(RoutedJourney { journey, route })
        })
        .collect()
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    NotFound { message: String },
    Conflict { message: String },
    Internal { message: String },
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(_) => AppError::NotFound {
                message: e.to_string(),
            },
            StoreError::ReturnAlreadyExists(_) => AppError::Conflict {
                message: e.to_string(),
            },
            _ => AppError::Internal {
                message: e.to_string(),
            },
        }
    }
}

impl From<RegistryError> for AppError {
    fn from(e: RegistryError) -> Self {
        AppError::NotFound {
            message: e.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message),
            AppError::NotFound { message } => (StatusCode::NOT_FOUND, message),
            AppError::Conflict { message } => (StatusCode::CONFLICT, message),
            AppError::Internal { message } => {
                error!(%message, "internal error handling request");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error".to_string(),
                )
            }
        };

        debug!(%status, %message, "request failed");

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}
