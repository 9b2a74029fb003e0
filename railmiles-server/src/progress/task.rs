//! Background journey creation.

use std::sync::Arc;

use tracing::{error, info, warn};

use crate::domain::{DistanceWithRoute, JourneyId, JourneyPlan};
use crate::resolve::{ResolveError, Resolver};
use crate::rtt::Timetable;
use crate::store::{JourneyStore, StoreError};

use super::registry::{ProcessorId, ProcessorRegistry, ProgressSender};

/// Why a background journey creation failed.
#[derive(Debug, thiserror::Error)]
pub enum CreationError {
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl CreationError {
    /// The message to put in the terminal error event.
    fn user_message(&self) -> Option<String> {
        match self {
            CreationError::Resolve(err) if err.is_user_error() => {
                Some(format!("Unable to fetch distance: {err}"))
            }
            _ => None,
        }
    }
}

/// Start recording `plan` in the background.
///
/// Returns the token under which progress can be followed. The stream
/// ends with a `finished` event carrying the new journey's id, or an
/// `error` event.
pub async fn spawn_journey_creation<T>(
    registry: Arc<ProcessorRegistry>,
    resolver: Arc<Resolver<T>>,
    store: Arc<JourneyStore>,
    plan: JourneyPlan,
) -> ProcessorId
where
    T: Timetable + 'static,
{
    let (id, sender) = registry.register().await;

    tokio::spawn(async move {
        match create_journey(&resolver, &store, plan, &sender).await {
            Ok(journey) => {
                info!(processor = %id, %journey, "journey created");
                sender.finish(journey.to_string()).await;
            }
            Err(err) => match err.user_message() {
                Some(message) => {
                    warn!(processor = %id, error = %err, "journey creation failed");
                    sender.fail(message).await;
                }
                None => {
                    error!(processor = %id, error = %err, "journey creation failed");
                    sender.fail("Internal Server Error").await;
                }
            },
        }
        registry.remove(id).await;
    });

    id
}

async fn create_journey<T: Timetable>(
    resolver: &Resolver<T>,
    store: &JourneyStore,
    plan: JourneyPlan,
    progress: &ProgressSender,
) -> Result<JourneyId, CreationError> {
    let resolved = match plan.manual_distance() {
        Some(distance) => DistanceWithRoute::manual(distance),
        None => {
            resolver
                .resolve(
                    plan.stops(),
                    plan.services(),
                    plan.date().date_naive(),
                    progress,
                )
                .await?
        }
    };

    let with_return = plan.with_return();
    let journey = plan.into_journey(JourneyId::new(), resolved.distance);

    if with_return {
        progress.status("Recording return journey").await;
        store.insert_journey_with_return(&journey, &resolved.route, JourneyId::new())?;
    } else {
        store.insert_journey_with_route(&journey, &resolved.route)?;
    }

    Ok(journey.id)
}
