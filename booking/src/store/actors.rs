use rusqlite::{params, OptionalExtension};

use super::{constraint_message, Store};
use crate::error::{CoreError, CoreResult};
use crate::models::ActorProfile;

pub(super) fn actor_at(row: &rusqlite::Row<'_>, at: usize) -> rusqlite::Result<ActorProfile> {
    Ok(ActorProfile {
        id: row.get(at)?,
        handle: row.get(at + 1)?,
        display_name: row.get(at + 2)?,
    })
}

impl Store {
    /// Inserts or refreshes an actor profile keyed by id. A handle held by
    /// a different id is a conflict.
    pub fn upsert_actor(&self, profile: &ActorProfile) -> CoreResult<()> {
        self.with_conn(|conn| {
            let result = conn.execute(
                "INSERT INTO actors (id, handle, display_name) VALUES (?1, ?2, ?3) \
                 ON CONFLICT(id) DO UPDATE SET \
                   handle = excluded.handle, display_name = excluded.display_name",
                params![profile.id, profile.handle, profile.display_name],
            );
            if let Err(err) = result {
                if constraint_message(&err).is_some_and(|m| m.contains("actors.handle")) {
                    return Err(CoreError::HandleConflict {
                        handle: profile.handle.clone(),
                    });
                }
                return Err(err.into());
            }
            Ok(())
        })
    }

    pub fn get_actor(&self, id: i64) -> CoreResult<Option<ActorProfile>> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT id, handle, display_name FROM actors WHERE id = ?1",
                params![id],
                |row| actor_at(row, 0),
            )
            .optional()
            .map_err(CoreError::from)
        })
    }
}
