use rusqlite::{params, OptionalExtension, Transaction};

use super::{constraint_message, Store};
use crate::error::{CoreError, CoreResult};
use crate::models::{Desk, DeskDraft, DeskPatch};

/// Maps desk columns starting at `at`; queries must select
/// `id, tag, desk_type, included_resource, available` in that order.
pub(super) fn desk_at(row: &rusqlite::Row<'_>, at: usize) -> rusqlite::Result<Desk> {
    Ok(Desk {
        id: row.get(at)?,
        tag: row.get(at + 1)?,
        desk_type: row.get(at + 2)?,
        included_resource: row.get(at + 3)?,
        available: row.get(at + 4)?,
    })
}

fn desk_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Desk> {
    desk_at(row, 0)
}

fn get_desk_tx(tx: &Transaction<'_>, id: i64) -> CoreResult<Option<Desk>> {
    tx.query_row(
        "SELECT id, tag, desk_type, included_resource, available FROM desks WHERE id = ?1",
        params![id],
        desk_from_row,
    )
    .optional()
    .map_err(CoreError::from)
}

impl Store {
    pub fn insert_desk(&self, draft: &DeskDraft) -> CoreResult<Desk> {
        self.with_tx(|tx| {
            let inserted = tx.execute(
                "INSERT INTO desks (tag, desk_type, included_resource, available) \
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    draft.tag,
                    draft.desk_type,
                    draft.included_resource,
                    draft.available
                ],
            );
            if let Err(err) = inserted {
                if constraint_message(&err).is_some_and(|m| m.contains("desks.tag")) {
                    return Err(CoreError::TagConflict {
                        tag: draft.tag.clone(),
                    });
                }
                return Err(err.into());
            }
            Ok(Desk {
                id: tx.last_insert_rowid(),
                tag: draft.tag.clone(),
                desk_type: draft.desk_type.clone(),
                included_resource: draft.included_resource.clone(),
                available: draft.available,
            })
        })
    }

    pub fn get_desk(&self, id: i64) -> CoreResult<Option<Desk>> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT id, tag, desk_type, included_resource, available \
                 FROM desks WHERE id = ?1",
                params![id],
                desk_from_row,
            )
            .optional()
            .map_err(CoreError::from)
        })
    }

    pub fn list_desks(&self) -> CoreResult<Vec<Desk>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, tag, desk_type, included_resource, available \
                 FROM desks ORDER BY id ASC",
            )?;
            let rows = stmt.query_map([], desk_from_row)?;
            rows.collect::<rusqlite::Result<Vec<_>>>()
                .map_err(CoreError::from)
        })
    }

    pub fn list_available_desks(&self) -> CoreResult<Vec<Desk>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, tag, desk_type, included_resource, available \
                 FROM desks WHERE available = 1 ORDER BY id ASC",
            )?;
            let rows = stmt.query_map([], desk_from_row)?;
            rows.collect::<rusqlite::Result<Vec<_>>>()
                .map_err(CoreError::from)
        })
    }

    /// Applies a partial update; returns the updated row, or `None` when
    /// the desk does not exist. Never touches reservations.
    pub fn update_desk(&self, id: i64, patch: &DeskPatch) -> CoreResult<Option<Desk>> {
        self.with_tx(|tx| {
            let Some(mut desk) = get_desk_tx(tx, id)? else {
                return Ok(None);
            };
            if let Some(desk_type) = &patch.desk_type {
                desk.desk_type = desk_type.clone();
            }
            if let Some(included_resource) = &patch.included_resource {
                desk.included_resource = included_resource.clone();
            }
            if let Some(available) = patch.available {
                desk.available = available;
            }
            tx.execute(
                "UPDATE desks SET desk_type = ?1, included_resource = ?2, available = ?3 \
                 WHERE id = ?4",
                params![desk.desk_type, desk.included_resource, desk.available, id],
            )?;
            Ok(Some(desk))
        })
    }

    /// Deletes the desk and returns its final snapshot. Reservation rows
    /// that referenced it have `desk_id` nullified by the foreign key.
    pub fn delete_desk(&self, id: i64) -> CoreResult<Option<Desk>> {
        self.with_tx(|tx| {
            let Some(desk) = get_desk_tx(tx, id)? else {
                return Ok(None);
            };
            tx.execute("DELETE FROM desks WHERE id = ?1", params![id])?;
            Ok(Some(desk))
        })
    }

    /// Flips the availability flag. When the desk lands on unavailable,
    /// drops every reservation on it dated `cutoff` or later inside the
    /// same transaction; returns the new snapshot and the dropped count.
    pub fn toggle_desk(
        &self,
        id: i64,
        cutoff: chrono::DateTime<chrono::Utc>,
    ) -> CoreResult<Option<(Desk, usize)>> {
        self.with_tx(|tx| {
            let Some(mut desk) = get_desk_tx(tx, id)? else {
                return Ok(None);
            };
            desk.available = !desk.available;
            tx.execute(
                "UPDATE desks SET available = ?1 WHERE id = ?2",
                params![desk.available, id],
            )?;
            let dropped = if desk.available {
                0
            } else {
                tx.execute(
                    "DELETE FROM desk_reservations WHERE desk_id = ?1 AND date >= ?2",
                    params![id, super::ts(cutoff)],
                )?
            };
            Ok(Some((desk, dropped)))
        })
    }
}
