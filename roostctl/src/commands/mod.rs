//! Command implementations for roostctl.

pub mod desk;
pub mod reservations;
pub mod seed;
pub mod sweep;

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::debug;

use booking::clock::SystemClock;
use booking::{Actor, DeskService, ReservationService, Store};
use grants::{Evaluator, GrantsConfig};

/// Services plus the synthetic operator identity the CLI acts as.
/// roostctl talks straight to the database, so it carries the root
/// grant rather than a token.
pub struct CliContext {
    pub desks: DeskService,
    pub reservations: ReservationService,
    pub store: Store,
    pub actor: Actor,
}

pub fn open_context(db: &str) -> Result<CliContext> {
    let store =
        Store::open(db).with_context(|| format!("failed to open reservation database {db}"))?;
    debug!("Opened reservation database at {}", db);
    let evaluator = Arc::new(Evaluator::new(GrantsConfig::root_only()));
    let clock = Arc::new(SystemClock);
    Ok(CliContext {
        desks: DeskService::new(store.clone(), Arc::clone(&evaluator), clock.clone()),
        reservations: ReservationService::new(store.clone(), evaluator, clock),
        store,
        actor: Actor::new(0, vec!["root".to_string()]),
    })
}
