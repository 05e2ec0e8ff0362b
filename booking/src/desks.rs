use std::sync::Arc;

use grants::Evaluator;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::info;

use crate::clock::{hour_floor, Clock};
use crate::error::{CoreError, CoreResult};
use crate::models::{Actor, Desk, DeskDraft, DeskPatch};
use crate::store::Store;
use crate::{ADMIN_ACTION, DESK_RESOURCE};

static TAG_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9_-]{0,31}$").expect("tag pattern"));

fn validate_tag(tag: &str) -> CoreResult<()> {
    if TAG_PATTERN.is_match(tag) {
        Ok(())
    } else {
        Err(CoreError::validation(
            "tag",
            format!("'{tag}' must be 1-32 alphanumeric, '-' or '_' characters"),
        ))
    }
}

/// Desk registry operations. Mutations require the `admin/ desk` grant;
/// availability reads are public.
#[derive(Clone)]
pub struct DeskService {
    store: Store,
    grants: Arc<Evaluator>,
    clock: Arc<dyn Clock>,
}

impl DeskService {
    pub fn new(store: Store, grants: Arc<Evaluator>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            grants,
            clock,
        }
    }

    pub fn list_all(&self, actor: &Actor) -> CoreResult<Vec<Desk>> {
        self.grants
            .enforce(&actor.roles, ADMIN_ACTION, DESK_RESOURCE)?;
        self.store.list_desks()
    }

    pub fn list_available(&self) -> CoreResult<Vec<Desk>> {
        self.store.list_available_desks()
    }

    pub fn get(&self, id: i64) -> CoreResult<Desk> {
        self.store
            .get_desk(id)?
            .ok_or_else(|| CoreError::not_found("desk", id))
    }

    pub fn create(&self, actor: &Actor, draft: DeskDraft) -> CoreResult<Desk> {
        self.grants
            .enforce(&actor.roles, ADMIN_ACTION, DESK_RESOURCE)?;
        validate_tag(&draft.tag)?;
        let desk = self.store.insert_desk(&draft)?;
        info!(desk = desk.id, tag = %desk.tag, actor = actor.id, "desk created");
        Ok(desk)
    }

    pub fn remove(&self, actor: &Actor, id: i64) -> CoreResult<Desk> {
        self.grants
            .enforce(&actor.roles, ADMIN_ACTION, DESK_RESOURCE)?;
        let desk = self
            .store
            .delete_desk(id)?
            .ok_or_else(|| CoreError::not_found("desk", id))?;
        info!(desk = desk.id, tag = %desk.tag, actor = actor.id, "desk removed");
        Ok(desk)
    }

    pub fn update(&self, actor: &Actor, id: i64, patch: DeskPatch) -> CoreResult<Desk> {
        self.grants
            .enforce(&actor.roles, ADMIN_ACTION, DESK_RESOURCE)?;
        let desk = self
            .store
            .update_desk(id, &patch)?
            .ok_or_else(|| CoreError::not_found("desk", id))?;
        info!(desk = desk.id, actor = actor.id, "desk updated");
        Ok(desk)
    }

    /// Flips availability. Landing on unavailable drops the desk's
    /// now-or-future reservations in the same transaction.
    pub fn toggle_availability(&self, actor: &Actor, id: i64) -> CoreResult<Desk> {
        self.grants
            .enforce(&actor.roles, ADMIN_ACTION, DESK_RESOURCE)?;
        let cutoff = hour_floor(self.clock.now());
        let (desk, dropped) = self
            .store
            .toggle_desk(id, cutoff)?
            .ok_or_else(|| CoreError::not_found("desk", id))?;
        if desk.available {
            info!(desk = desk.id, actor = actor.id, "desk enabled");
        } else {
            info!(
                desk = desk.id,
                actor = actor.id,
                dropped,
                "desk disabled; upcoming reservations dropped"
            );
        }
        Ok(desk)
    }
}
