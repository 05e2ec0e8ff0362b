use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension};

use super::actors::actor_at;
use super::desks::desk_at;
use super::{constraint_message, date_from_ts, ts, Store};
use crate::error::{CoreError, CoreResult};
use crate::models::{ActorProfile, Desk, Reservation};

fn reservation_at(row: &rusqlite::Row<'_>, at: usize) -> rusqlite::Result<Reservation> {
    Ok(Reservation {
        id: row.get(at)?,
        desk_id: row.get(at + 1)?,
        actor_id: row.get(at + 2)?,
        date: date_from_ts(row.get(at + 3)?)?,
    })
}

fn reservation_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Reservation> {
    reservation_at(row, 0)
}

fn map_insert_conflict(
    err: rusqlite::Error,
    desk_id: i64,
    actor_id: i64,
    slot: DateTime<Utc>,
) -> CoreError {
    match constraint_message(&err) {
        Some(msg) if msg.contains("desk_reservations.desk_id") => CoreError::SlotConflict {
            desk_id,
            date: slot,
        },
        Some(msg) if msg.contains("desk_reservations.actor_id") => CoreError::ActorSlotConflict {
            actor_id,
            date: slot,
        },
        _ => err.into(),
    }
}

impl Store {
    /// Books `slot` on a desk. The desk must exist and be available and
    /// the actor profile must exist; both unique indexes decide conflicts,
    /// so a concurrent create for the same slot loses cleanly.
    pub fn insert_reservation(
        &self,
        desk_id: i64,
        actor_id: i64,
        slot: DateTime<Utc>,
    ) -> CoreResult<Reservation> {
        self.with_tx(|tx| {
            let available: Option<bool> = tx
                .query_row(
                    "SELECT available FROM desks WHERE id = ?1",
                    params![desk_id],
                    |row| row.get(0),
                )
                .optional()?;
            match available {
                None => return Err(CoreError::not_found("desk", desk_id)),
                Some(false) => return Err(CoreError::DeskUnavailable { desk_id }),
                Some(true) => {}
            }
            let actor_exists: Option<i64> = tx
                .query_row(
                    "SELECT id FROM actors WHERE id = ?1",
                    params![actor_id],
                    |row| row.get(0),
                )
                .optional()?;
            if actor_exists.is_none() {
                return Err(CoreError::not_found("actor", actor_id));
            }
            let inserted = tx.execute(
                "INSERT INTO desk_reservations (date, desk_id, actor_id) VALUES (?1, ?2, ?3)",
                params![ts(slot), desk_id, actor_id],
            );
            if let Err(err) = inserted {
                return Err(map_insert_conflict(err, desk_id, actor_id, slot));
            }
            Ok(Reservation {
                id: tx.last_insert_rowid(),
                desk_id: Some(desk_id),
                actor_id: Some(actor_id),
                date: slot,
            })
        })
    }

    pub fn get_reservation(&self, id: i64) -> CoreResult<Option<Reservation>> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT id, desk_id, actor_id, date FROM desk_reservations WHERE id = ?1",
                params![id],
                reservation_from_row,
            )
            .optional()
            .map_err(CoreError::from)
        })
    }

    /// Deletes a reservation and returns its final snapshot, or `None`
    /// when it was already gone.
    pub fn delete_reservation(&self, id: i64) -> CoreResult<Option<Reservation>> {
        self.with_tx(|tx| {
            let existing = tx
                .query_row(
                    "SELECT id, desk_id, actor_id, date FROM desk_reservations WHERE id = ?1",
                    params![id],
                    reservation_from_row,
                )
                .optional()?;
            let Some(reservation) = existing else {
                return Ok(None);
            };
            tx.execute("DELETE FROM desk_reservations WHERE id = ?1", params![id])?;
            Ok(Some(reservation))
        })
    }

    pub fn list_reservations_by_desk(
        &self,
        desk_id: i64,
        cutoff: DateTime<Utc>,
    ) -> CoreResult<Vec<Reservation>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, desk_id, actor_id, date FROM desk_reservations \
                 WHERE desk_id = ?1 AND date >= ?2 ORDER BY date ASC",
            )?;
            let rows = stmt.query_map(params![desk_id, ts(cutoff)], reservation_from_row)?;
            rows.collect::<rusqlite::Result<Vec<_>>>()
                .map_err(CoreError::from)
        })
    }

    pub fn list_reservations_by_actor(
        &self,
        actor_id: i64,
        cutoff: DateTime<Utc>,
    ) -> CoreResult<Vec<(Reservation, Desk)>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT r.id, r.desk_id, r.actor_id, r.date, \
                        d.id, d.tag, d.desk_type, d.included_resource, d.available \
                 FROM desk_reservations r \
                 JOIN desks d ON d.id = r.desk_id \
                 WHERE r.actor_id = ?1 AND r.date >= ?2 \
                 ORDER BY r.date ASC",
            )?;
            let rows = stmt.query_map(params![actor_id, ts(cutoff)], |row| {
                Ok((reservation_at(row, 0)?, desk_at(row, 4)?))
            })?;
            rows.collect::<rusqlite::Result<Vec<_>>>()
                .map_err(CoreError::from)
        })
    }

    pub fn list_future_reservations(
        &self,
        cutoff: DateTime<Utc>,
    ) -> CoreResult<Vec<(Reservation, Desk, ActorProfile)>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT r.id, r.desk_id, r.actor_id, r.date, \
                        d.id, d.tag, d.desk_type, d.included_resource, d.available, \
                        a.id, a.handle, a.display_name \
                 FROM desk_reservations r \
                 JOIN desks d ON d.id = r.desk_id \
                 JOIN actors a ON a.id = r.actor_id \
                 WHERE r.date >= ?1 \
                 ORDER BY r.date ASC",
            )?;
            let rows = stmt.query_map(params![ts(cutoff)], |row| {
                Ok((reservation_at(row, 0)?, desk_at(row, 4)?, actor_at(row, 9)?))
            })?;
            rows.collect::<rusqlite::Result<Vec<_>>>()
                .map_err(CoreError::from)
        })
    }

    pub fn list_past_reservations(
        &self,
        cutoff: DateTime<Utc>,
    ) -> CoreResult<Vec<(Reservation, Desk, ActorProfile)>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT r.id, r.desk_id, r.actor_id, r.date, \
                        d.id, d.tag, d.desk_type, d.included_resource, d.available, \
                        a.id, a.handle, a.display_name \
                 FROM desk_reservations r \
                 JOIN desks d ON d.id = r.desk_id \
                 JOIN actors a ON a.id = r.actor_id \
                 WHERE r.date < ?1 \
                 ORDER BY r.date ASC",
            )?;
            let rows = stmt.query_map(params![ts(cutoff)], |row| {
                Ok((reservation_at(row, 0)?, desk_at(row, 4)?, actor_at(row, 9)?))
            })?;
            rows.collect::<rusqlite::Result<Vec<_>>>()
                .map_err(CoreError::from)
        })
    }

    /// Drops every reservation dated strictly before `cutoff`; returns the
    /// number removed.
    pub fn purge_reservations_before(&self, cutoff: DateTime<Utc>) -> CoreResult<usize> {
        self.with_conn(|conn| {
            conn.execute(
                "DELETE FROM desk_reservations WHERE date < ?1",
                params![ts(cutoff)],
            )
            .map_err(CoreError::from)
        })
    }
}
