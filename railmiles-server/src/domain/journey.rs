//! Journey types.
//!
//! A `Journey` is a persisted trip the user has taken: two endpoints, the
//! stops they changed at, and the distance travelled. A `JourneyPlan` is
//! the validated request to record a new one, before its distance is known.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Crs, DomainError, ServiceUid};

/// Opaque journey identity.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JourneyId(Uuid);

impl JourneyId {
    /// Generate a fresh random id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for JourneyId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for JourneyId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl FromStr for JourneyId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

impl fmt::Debug for JourneyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "JourneyId({})", self.0)
    }
}

impl fmt::Display for JourneyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// A recorded journey.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Journey {
    pub id: JourneyId,
    pub from: Crs,
    pub to: Crs,
    /// Stops between `from` and `to` where the user changed, in order.
    pub via: Vec<Crs>,
    /// Miles travelled.
    pub distance: f32,
    pub date: DateTime<Utc>,
    /// The mirrored journey, if a return has been recorded.
    #[serde(rename = "returnID")]
    pub return_id: Option<JourneyId>,
}

impl Journey {
    /// Build the return leg of this journey under a new id.
    ///
    /// The mirror owns a reversed copy of `via`; `self` is left untouched.
    /// The mirror links back to `self`; linking `self` forward is the
    /// caller's job.
    pub fn mirrored(&self, id: JourneyId) -> Journey {
        let via = self.via.iter().rev().copied().collect();
        Journey {
            id,
            from: self.to,
            to: self.from,
            via,
            distance: self.distance,
            date: self.date,
            return_id: Some(self.id),
        }
    }
}

/// A validated request to record a journey.
#[derive(Debug, Clone, PartialEq)]
pub struct JourneyPlan {
    stops: Vec<Crs>,
    services: Vec<Option<ServiceUid>>,
    date: DateTime<Utc>,
    manual_distance: Option<f32>,
    with_return: bool,
}

impl JourneyPlan {
    /// Validate a journey request.
    ///
    /// `services[i]` is the known service for the leg from `stops[i]` to
    /// `stops[i + 1]`; extra trailing entries are ignored and missing ones
    /// are treated as unknown. When the journey was not made today, the
    /// timetable search cannot find it, so every leg needs a service UID
    /// unless a manual distance is given.
    pub fn new(
        stops: Vec<Crs>,
        mut services: Vec<Option<ServiceUid>>,
        date: DateTime<Utc>,
        manual_distance: Option<f32>,
        with_return: bool,
        now: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        if stops.len() < 2 {
            return Err(DomainError::TooFewStops(stops.len()));
        }
        if date > now {
            return Err(DomainError::FutureDate);
        }
        let manual_distance = manual_distance.filter(|d| *d != 0.0);
        if let Some(distance) = manual_distance
            && !(distance.is_finite() && distance > 0.0)
        {
            return Err(DomainError::InvalidDistance(distance));
        }

        services.resize(stops.len() - 1, None);

        if manual_distance.is_none()
            && date.date_naive() != now.date_naive()
            && let Some(leg) = services.iter().position(Option::is_none)
        {
            return Err(DomainError::MissingServiceUid {
                from: stops[leg],
                to: stops[leg + 1],
            });
        }

        Ok(Self {
            stops,
            services,
            date,
            manual_distance,
            with_return,
        })
    }

    pub fn stops(&self) -> &[Crs] {
        &self.stops
    }

    /// Known services, one per leg.
    pub fn services(&self) -> &[Option<ServiceUid>] {
        &self.services
    }

    pub fn date(&self) -> DateTime<Utc> {
        self.date
    }

    pub fn manual_distance(&self) -> Option<f32> {
        self.manual_distance
    }

    pub fn with_return(&self) -> bool {
        self.with_return
    }

    /// Build the journey record once the distance is known.
    pub fn into_journey(self, id: JourneyId, distance: f32) -> Journey {
        let last = self.stops.len() - 1;
        Journey {
            id,
            from: self.stops[0],
            to: self.stops[last],
            via: self.stops[1..last].to_vec(),
            distance,
            date: self.date,
            return_id: None,
        }
    }
}
