//! Embedded SQLite persistence for desks, reservations, and actor
//! profiles. Slot exclusivity and actor exclusivity are enforced here by
//! unique indexes, so a check-then-insert race always has one winner.

mod actors;
mod desks;
mod reservations;

use std::path::Path;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use rusqlite::{Connection, ErrorCode, Transaction};

use crate::error::{CoreError, CoreResult};

/// Shared handle over one SQLite connection. Clones are cheap and
/// serialize access through the same connection.
#[derive(Clone)]
pub struct Store {
    conn: Arc<Mutex<Connection>>,
}

impl Store {
    pub fn open<P: AsRef<Path>>(path: P) -> CoreResult<Self> {
        Self::from_connection(Connection::open(path)?)
    }

    pub fn open_in_memory() -> CoreResult<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> CoreResult<Self> {
        conn.pragma_update(None, "foreign_keys", "ON")?;
        init_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub(crate) fn with_conn<T>(
        &self,
        f: impl FnOnce(&Connection) -> CoreResult<T>,
    ) -> CoreResult<T> {
        let guard = self.conn.lock().map_err(|_| CoreError::Internal {
            message: "store lock poisoned".to_string(),
        })?;
        f(&guard)
    }

    /// Runs `f` inside a transaction; commits on `Ok`, rolls back on `Err`.
    pub(crate) fn with_tx<T>(
        &self,
        f: impl FnOnce(&Transaction<'_>) -> CoreResult<T>,
    ) -> CoreResult<T> {
        let mut guard = self.conn.lock().map_err(|_| CoreError::Internal {
            message: "store lock poisoned".to_string(),
        })?;
        let tx = guard.transaction()?;
        let out = f(&tx)?;
        tx.commit()?;
        Ok(out)
    }

    /// Empties every table. Used by seed tooling before a fresh load.
    pub fn clear(&self) -> CoreResult<()> {
        self.with_tx(|tx| {
            tx.execute_batch(
                "DELETE FROM desk_reservations; DELETE FROM desks; DELETE FROM actors;",
            )?;
            Ok(())
        })
    }
}

fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS desks (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            tag TEXT NOT NULL,
            desk_type TEXT NOT NULL,
            included_resource TEXT NOT NULL DEFAULT '',
            available INTEGER NOT NULL DEFAULT 1
        )",
        [],
    )?;
    conn.execute(
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_desks_tag ON desks(tag)",
        [],
    )?;
    conn.execute(
        "CREATE TABLE IF NOT EXISTS actors (
            id INTEGER PRIMARY KEY,
            handle TEXT NOT NULL,
            display_name TEXT NOT NULL DEFAULT ''
        )",
        [],
    )?;
    conn.execute(
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_actors_handle ON actors(handle)",
        [],
    )?;
    conn.execute(
        "CREATE TABLE IF NOT EXISTS desk_reservations (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            date INTEGER NOT NULL,
            desk_id INTEGER REFERENCES desks(id) ON DELETE SET NULL,
            actor_id INTEGER REFERENCES actors(id) ON DELETE SET NULL
        )",
        [],
    )?;
    // One reservation per (desk, slot) and per (actor, slot). NULL desk or
    // actor references never collide, so nullified history rows keep no
    // slot claimed.
    conn.execute(
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_reservations_desk_slot \
         ON desk_reservations(desk_id, date)",
        [],
    )?;
    conn.execute(
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_reservations_actor_slot \
         ON desk_reservations(actor_id, date)",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_reservations_date ON desk_reservations(date)",
        [],
    )?;
    Ok(())
}

/// Extracts the violation message when `err` is a UNIQUE (or other
/// constraint) failure, for mapping onto the Conflict family.
pub(super) fn constraint_message(err: &rusqlite::Error) -> Option<&str> {
    match err {
        rusqlite::Error::SqliteFailure(e, Some(msg))
            if e.code == ErrorCode::ConstraintViolation =>
        {
            Some(msg.as_str())
        }
        _ => None,
    }
}

pub(super) fn ts(date: DateTime<Utc>) -> i64 {
    date.timestamp()
}

pub(super) fn date_from_ts(secs: i64) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp(secs, 0).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            0,
            rusqlite::types::Type::Integer,
            format!("timestamp {secs} out of range").into(),
        )
    })
}
