//! SQLite-backed journey and route storage.

use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use parking_lot::Mutex;
use rusqlite::{Connection, OptionalExtension, params};
use tracing::{debug, info};

use crate::domain::{Crs, Journey, JourneyId};

use super::error::StoreError;
use super::since::{JourneyStats, Since};

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS journeys (
      id TEXT PRIMARY KEY,
      from_crs TEXT NOT NULL,
      to_crs TEXT NOT NULL,
      via TEXT NOT NULL,
      distance REAL NOT NULL,
      date TEXT NOT NULL,
      return_id TEXT
    );

    CREATE INDEX IF NOT EXISTS journeys_date ON journeys(date);

    CREATE TABLE IF NOT EXISTS routes (
      journey_id TEXT NOT NULL,
      sequence INTEGER NOT NULL,
      station TEXT NOT NULL,
      PRIMARY KEY (journey_id, sequence)
    );
"#;

/// Persistent store of journeys and their routes.
///
/// A single connection serialises all access; every multi-row write runs
/// in one transaction.
#[derive(Debug)]
pub struct JourneyStore {
    conn: Mutex<Connection>,
}

impl JourneyStore {
    /// Open (creating if needed) the database at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        info!(path = %path.display(), "opened journey store");
        Self::with_connection(conn)
    }

    /// A throwaway store, for tests.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Calling points recorded for a journey, empty if none were.
    pub fn route(&self, id: JourneyId) -> Result<Vec<Crs>, StoreError> {
        select_route(&self.conn.lock(), id)
    }

    /// Replace the calling points recorded for a journey.
    pub fn put_route(&self, id: JourneyId, route: &[Crs]) -> Result<(), StoreError> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;
        tx.execute(
            "DELETE FROM routes WHERE journey_id = ?1",
            params![id.to_string()],
        )?;
        insert_route(&tx, id, route)?;
        tx.commit()?;
        Ok(())
    }

    /// Record a new journey together with its calling points.
    pub fn insert_journey_with_route(
        &self,
        journey: &Journey,
        route: &[Crs],
    ) -> Result<(), StoreError> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;
        insert_journey(&tx, journey)?;
        insert_route(&tx, journey.id, route)?;
        tx.commit()?;
        debug!(journey = %journey.id, stops = route.len(), "inserted journey");
        Ok(())
    }

    pub fn journey(&self, id: JourneyId) -> Result<Option<Journey>, StoreError> {
        select_journey(&self.conn.lock(), id)
    }

    /// Journeys within `since`, most recent first.
    pub fn journeys(&self, since: Since) -> Result<Vec<Journey>, StoreError> {
        let cutoff = cutoff_text(since);
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            r#"
            SELECT id, from_crs, to_crs, via, distance, date, return_id
            FROM journeys
            WHERE ?1 IS NULL OR date > ?1
            ORDER BY date DESC
            "#,
        )?;
        let rows = stmt
            .query_map(params![cutoff], JourneyRow::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        rows.into_iter().map(JourneyRow::into_journey).collect()
    }

    /// Number of journeys and miles travelled within `since`.
    pub fn stats(&self, since: Since) -> Result<JourneyStats, StoreError> {
        let cutoff = cutoff_text(since);
        let (count, miles): (i64, Option<f64>) = self.conn.lock().query_row(
            "SELECT count(*), sum(distance) FROM journeys WHERE ?1 IS NULL OR date > ?1",
            params![cutoff],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;
        Ok(JourneyStats {
            count: count as usize,
            miles: miles.unwrap_or_default() as f32,
        })
    }

    /// Record the mirror image of a journey as its return leg.
    ///
    /// The two journeys are linked through their `return_id`s. Fails if the
    /// source is missing or already has a return.
    pub fn create_return(&self, source_id: JourneyId) -> Result<JourneyId, StoreError> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;

        let source = select_journey(&tx, source_id)?.ok_or(StoreError::NotFound(source_id))?;
        if source.return_id.is_some() {
            return Err(StoreError::ReturnAlreadyExists(source_id));
        }

        let mirror = source.mirrored(JourneyId::new());
        let route = select_route(&tx, source_id)?;

        insert_mirror(&tx, &mirror, &route)?;
        tx.execute(
            "UPDATE journeys SET return_id = ?1 WHERE id = ?2",
            params![mirror.id.to_string(), source_id.to_string()],
        )?;
        tx.commit()?;

        info!(source = %source_id, mirror = %mirror.id, "created return journey");
        Ok(mirror.id)
    }

    /// Record a new journey and its return leg, stored as `mirror_id`.
    ///
    /// Either both journeys are stored, linked to each other, or neither is.
    pub fn insert_journey_with_return(
        &self,
        journey: &Journey,
        route: &[Crs],
        mirror_id: JourneyId,
    ) -> Result<(), StoreError> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;

        let outbound = Journey {
            return_id: Some(mirror_id),
            ..journey.clone()
        };
        insert_journey(&tx, &outbound)?;
        insert_route(&tx, outbound.id, route)?;
        insert_mirror(&tx, &outbound.mirrored(mirror_id), route)?;
        tx.commit()?;

        info!(journey = %journey.id, mirror = %mirror_id, "inserted journey with return");
        Ok(())
    }

    /// Delete a journey, its route, and any return link pointing at it.
    ///
    /// Returns whether the journey existed.
    pub fn delete_journey(&self, id: JourneyId) -> Result<bool, StoreError> {
        let id_text = id.to_string();
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;

        let deleted = tx.execute("DELETE FROM journeys WHERE id = ?1", params![id_text])?;
        tx.execute(
            "UPDATE journeys SET return_id = NULL WHERE return_id = ?1",
            params![id_text],
        )?;
        tx.execute("DELETE FROM routes WHERE journey_id = ?1", params![id_text])?;
        tx.commit()?;

        debug!(journey = %id, existed = deleted > 0, "deleted journey");
        Ok(deleted > 0)
    }
}

/// Fixed-width RFC 3339, so text order is time order.
fn date_text(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn cutoff_text(since: Since) -> Option<String> {
    since.cutoff(Utc::now()).map(date_text)
}

fn insert_journey(conn: &Connection, journey: &Journey) -> Result<(), StoreError> {
    let via = serde_json::to_string(&journey.via).map_err(|e| StoreError::Corrupt {
        id: journey.id.to_string(),
        message: e.to_string(),
    })?;
    conn.execute(
        r#"
        INSERT INTO journeys(id, from_crs, to_crs, via, distance, date, return_id)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        "#,
        params![
            journey.id.to_string(),
            journey.from.as_str(),
            journey.to.as_str(),
            via,
            journey.distance as f64,
            date_text(journey.date),
            journey.return_id.map(|id| id.to_string()),
        ],
    )?;
    Ok(())
}

/// Insert `mirror` with the reverse of its source's `route`.
fn insert_mirror(conn: &Connection, mirror: &Journey, route: &[Crs]) -> Result<(), StoreError> {
    let reversed: Vec<Crs> = route.iter().rev().copied().collect();
    insert_journey(conn, mirror)?;
    insert_route(conn, mirror.id, &reversed)
}

fn insert_route(conn: &Connection, id: JourneyId, route: &[Crs]) -> Result<(), StoreError> {
    let mut stmt =
        conn.prepare("INSERT INTO routes(journey_id, sequence, station) VALUES (?1, ?2, ?3)")?;
    let id = id.to_string();
    for (sequence, station) in route.iter().enumerate() {
        stmt.execute(params![id, sequence as i64, station.as_str()])?;
    }
    Ok(())
}

fn select_journey(conn: &Connection, id: JourneyId) -> Result<Option<Journey>, StoreError> {
    conn.query_row(
        r#"
        SELECT id, from_crs, to_crs, via, distance, date, return_id
        FROM journeys WHERE id = ?1
        "#,
        params![id.to_string()],
        JourneyRow::from_row,
    )
    .optional()?
    .map(JourneyRow::into_journey)
    .transpose()
}

fn select_route(conn: &Connection, id: JourneyId) -> Result<Vec<Crs>, StoreError> {
    let id = id.to_string();
    let mut stmt =
        conn.prepare("SELECT station FROM routes WHERE journey_id = ?1 ORDER BY sequence")?;
    let stations = stmt
        .query_map(params![id], |row| row.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?;
    stations
        .iter()
        .map(|code| {
            Crs::parse(code).map_err(|e| StoreError::Corrupt {
                id: id.clone(),
                message: e.to_string(),
            })
        })
        .collect()
}

/// A `journeys` row as stored, before validation.
struct JourneyRow {
    id: String,
    from: String,
    to: String,
    via: String,
    distance: f64,
    date: String,
    return_id: Option<String>,
}

impl JourneyRow {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            from: row.get(1)?,
            to: row.get(2)?,
            via: row.get(3)?,
            distance: row.get(4)?,
            date: row.get(5)?,
            return_id: row.get(6)?,
        })
    }

    fn into_journey(self) -> Result<Journey, StoreError> {
        let corrupt = |message: String| StoreError::Corrupt {
            id: self.id.clone(),
            message,
        };
        let id = self.id.parse().map_err(|e: uuid::Error| corrupt(e.to_string()))?;
        let return_id = self
            .return_id
            .as_deref()
            .map(str::parse)
            .transpose()
            .map_err(|e: uuid::Error| corrupt(e.to_string()))?;

        Ok(Journey {
            id,
            from: Crs::parse(&self.from).map_err(|e| corrupt(e.to_string()))?,
            to: Crs::parse(&self.to).map_err(|e| corrupt(e.to_string()))?,
            via: serde_json::from_str(&self.via).map_err(|e| corrupt(e.to_string()))?,
            distance: self.distance as f32,
            date: DateTime::parse_from_rfc3339(&self.date)
                .map_err(|e| corrupt(e.to_string()))?
                .with_timezone(&Utc),
            return_id,
        })
    }
}
