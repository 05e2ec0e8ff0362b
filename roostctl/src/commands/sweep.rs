//! One-shot retention purge

use anyhow::Result;
use clap::Args;
use tracing::info;

use super::CliContext;

#[derive(Args, Debug)]
pub struct SweepArgs {
    /// Retention window in days; rows dated before now minus this are dropped
    #[arg(long, default_value_t = booking::RETENTION_DAYS)]
    pub days: i64,
}

pub fn run(ctx: &CliContext, args: SweepArgs) -> Result<()> {
    info!("Purging reservations older than {} days", args.days);
    let purged = ctx.reservations.purge_older_than(&ctx.actor, args.days)?;
    println!(
        "✓ Purged {} reservation(s) older than {} days",
        purged, args.days
    );
    Ok(())
}
