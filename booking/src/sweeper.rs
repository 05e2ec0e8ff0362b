//! Background retention sweep: periodically drops reservations older than
//! the retention window. Runs as the system, directly against the store;
//! the grant-checked purge lives on `ReservationService`.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tracing::{error, info};

use crate::clock::Clock;
use crate::error::{CoreError, CoreResult};
use crate::reservations::RETENTION_DAYS;
use crate::store::Store;

static SWEPT: AtomicU64 = AtomicU64::new(0);
static FAILED: AtomicU64 = AtomicU64::new(0);

#[derive(Clone, Debug)]
pub struct SweeperConfig {
    pub interval: Duration,  // default: 1h
    pub retention_days: i64, // default: 30
}

impl Default for SweeperConfig {
    fn default() -> Self {
        Self {
            interval: std::env::var("ROOST_SWEEP_INTERVAL")
                .ok()
                .and_then(|s| humantime::parse_duration(&s).ok())
                .unwrap_or(Duration::from_secs(3600)),
            retention_days: std::env::var("ROOST_RETENTION_DAYS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(RETENTION_DAYS),
        }
    }
}

pub fn counters() -> (u64, u64) {
    (SWEPT.load(Ordering::Relaxed), FAILED.load(Ordering::Relaxed))
}

pub fn reset_counters() {
    SWEPT.store(0, Ordering::Relaxed);
    FAILED.store(0, Ordering::Relaxed);
}

/// Runs one retention pass; returns how many reservations were dropped.
pub fn sweep_once(store: &Store, clock: &dyn Clock, retention_days: i64) -> CoreResult<usize> {
    if retention_days < 0 {
        return Err(CoreError::validation(
            "retention_days",
            "must be non-negative",
        ));
    }
    let window = chrono::Duration::try_days(retention_days)
        .ok_or_else(|| CoreError::validation("retention_days", "out of range"))?;
    let cutoff = clock
        .now()
        .checked_sub_signed(window)
        .ok_or_else(|| CoreError::validation("retention_days", "out of range"))?;
    let purged = store.purge_reservations_before(cutoff)?;
    if purged > 0 {
        SWEPT.fetch_add(purged as u64, Ordering::Relaxed);
        info!(purged, retention_days, "sweeper: dropped expired reservations");
    }
    Ok(purged)
}

pub async fn run_loop(store: Store, clock: Arc<dyn Clock>, cfg: SweeperConfig) -> Result<()> {
    info!(?cfg, "sweeper: starting");
    let mut ticker = tokio::time::interval(cfg.interval);
    loop {
        ticker.tick().await;
        let store = store.clone();
        let clock = Arc::clone(&clock);
        let days = cfg.retention_days;
        match tokio::task::spawn_blocking(move || sweep_once(&store, clock.as_ref(), days)).await {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => {
                FAILED.fetch_add(1, Ordering::Relaxed);
                error!(error = %e, "sweeper: pass failed");
            }
            Err(e) => {
                FAILED.fetch_add(1, Ordering::Relaxed);
                error!(error = %e, "sweeper: pass panicked");
            }
        }
    }
}
