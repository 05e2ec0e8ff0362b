use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use grants::Evaluator;
use tracing::info;

use crate::clock::{hour_floor, Clock};
use crate::error::{CoreError, CoreResult};
use crate::models::{Actor, ActorProfile, Desk, Reservation};
use crate::store::Store;
use crate::{ADMIN_ACTION, RESERVATION_RESOURCE};

/// Default retention window for the purge operations, in days.
pub const RETENTION_DAYS: i64 = 30;

/// Reservation ledger operations. Self-service calls trust the supplied
/// actor identity; the `-all` listings and the purge require the
/// `admin/ desk_reservation` grant.
#[derive(Clone)]
pub struct ReservationService {
    store: Store,
    grants: Arc<Evaluator>,
    clock: Arc<dyn Clock>,
}

impl ReservationService {
    pub fn new(store: Store, grants: Arc<Evaluator>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            grants,
            clock,
        }
    }

    /// Upcoming occupancy of one desk, date ascending. Unknown or removed
    /// desk ids yield an empty list rather than an error.
    pub fn list_by_desk(&self, desk_id: i64) -> CoreResult<Vec<Reservation>> {
        let cutoff = hour_floor(self.clock.now());
        self.store.list_reservations_by_desk(desk_id, cutoff)
    }

    /// The caller's own upcoming reservations, each with its desk.
    pub fn list_by_actor(&self, actor: &Actor) -> CoreResult<Vec<(Reservation, Desk)>> {
        let cutoff = hour_floor(self.clock.now());
        self.store.list_reservations_by_actor(actor.id, cutoff)
    }

    pub fn list_future_all(
        &self,
        actor: &Actor,
    ) -> CoreResult<Vec<(Reservation, Desk, ActorProfile)>> {
        self.grants
            .enforce(&actor.roles, ADMIN_ACTION, RESERVATION_RESOURCE)?;
        let cutoff = hour_floor(self.clock.now());
        self.store.list_future_reservations(cutoff)
    }

    pub fn list_past_all(
        &self,
        actor: &Actor,
    ) -> CoreResult<Vec<(Reservation, Desk, ActorProfile)>> {
        self.grants
            .enforce(&actor.roles, ADMIN_ACTION, RESERVATION_RESOURCE)?;
        let cutoff = hour_floor(self.clock.now());
        self.store.list_past_reservations(cutoff)
    }

    /// Books a desk for the slot containing `date`. The requested date is
    /// floored to the hour, so the stored value is the slot itself.
    pub fn create(&self, actor: &Actor, desk_id: i64, date: DateTime<Utc>) -> CoreResult<Reservation> {
        let slot = hour_floor(date);
        let reservation = self.store.insert_reservation(desk_id, actor.id, slot)?;
        info!(
            reservation = reservation.id,
            desk = desk_id,
            actor = actor.id,
            slot = %slot,
            "reservation created"
        );
        Ok(reservation)
    }

    /// Cancels a reservation. The original actor may cancel their own;
    /// anyone else needs the reservation-admin grant.
    pub fn remove(&self, actor: &Actor, reservation_id: i64) -> CoreResult<Reservation> {
        let existing = self
            .store
            .get_reservation(reservation_id)?
            .ok_or_else(|| CoreError::not_found("reservation", reservation_id))?;
        if existing.actor_id != Some(actor.id) {
            self.grants
                .enforce(&actor.roles, ADMIN_ACTION, RESERVATION_RESOURCE)?;
        }
        let removed = self
            .store
            .delete_reservation(reservation_id)?
            .ok_or_else(|| CoreError::not_found("reservation", reservation_id))?;
        info!(
            reservation = removed.id,
            actor = actor.id,
            "reservation removed"
        );
        Ok(removed)
    }

    /// Drops reservations dated strictly before now minus `days`. The
    /// cutoff uses the raw clock reading; hour flooring only applies to
    /// future/past partitioning.
    pub fn purge_older_than(&self, actor: &Actor, days: i64) -> CoreResult<usize> {
        self.grants
            .enforce(&actor.roles, ADMIN_ACTION, RESERVATION_RESOURCE)?;
        if days < 0 {
            return Err(CoreError::validation("days", "must be non-negative"));
        }
        let window = Duration::try_days(days)
            .ok_or_else(|| CoreError::validation("days", "out of range"))?;
        let cutoff = self
            .clock
            .now()
            .checked_sub_signed(window)
            .ok_or_else(|| CoreError::validation("days", "out of range"))?;
        let purged = self.store.purge_reservations_before(cutoff)?;
        info!(purged, days, actor = actor.id, "reservation retention purge");
        Ok(purged)
    }
}
