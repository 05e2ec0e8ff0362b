//! Seed the database from a YAML fixture

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use clap::Args;
use serde::Deserialize;
use tracing::{debug, info};

use booking::{Actor, ActorProfile, DeskDraft};

use super::CliContext;

#[derive(Args, Debug)]
pub struct SeedArgs {
    /// Path to the seed YAML
    #[arg(long, short = 'f', value_name = "FILE")]
    pub file: PathBuf,

    /// Empty all tables before loading
    #[arg(long)]
    pub reset: bool,
}

#[derive(Debug, Deserialize)]
struct SeedFile {
    #[serde(default)]
    actors: Vec<ActorProfile>,
    #[serde(default)]
    desks: Vec<DeskDraft>,
    #[serde(default)]
    reservations: Vec<SeedReservation>,
}

/// Reservations reference desks by tag so fixtures stay readable.
#[derive(Debug, Deserialize)]
struct SeedReservation {
    desk_tag: String,
    actor_id: i64,
    date: DateTime<Utc>,
}

pub fn run(ctx: &CliContext, args: SeedArgs) -> Result<()> {
    info!("Seeding database from {}", args.file.display());

    let content = fs::read_to_string(&args.file)
        .with_context(|| format!("Failed to read seed file: {}", args.file.display()))?;
    let seed: SeedFile = serde_yaml::from_str(&content).context("Failed to parse seed YAML")?;

    debug!(
        "Parsed seed: actors={}, desks={}, reservations={}",
        seed.actors.len(),
        seed.desks.len(),
        seed.reservations.len()
    );

    if args.reset {
        ctx.store.clear()?;
    }

    for profile in &seed.actors {
        ctx.store.upsert_actor(profile)?;
    }

    let mut desk_ids: HashMap<String, i64> = HashMap::new();
    for draft in seed.desks {
        let tag = draft.tag.clone();
        let desk = ctx.desks.create(&ctx.actor, draft)?;
        desk_ids.insert(tag, desk.id);
    }

    let mut booked = 0usize;
    for entry in &seed.reservations {
        let desk_id = match desk_ids.get(&entry.desk_tag) {
            Some(id) => *id,
            None => bail!(
                "reservation references desk tag '{}' not defined in the seed file",
                entry.desk_tag
            ),
        };
        // Booked as the referenced actor, so ownership rules hold for
        // seeded rows too.
        let holder = Actor::new(entry.actor_id, vec![]);
        ctx.reservations.create(&holder, desk_id, entry.date)?;
        booked += 1;
    }

    println!("✓ Seeded from {}", args.file.display());
    println!("  Actors: {}", seed.actors.len());
    println!("  Desks: {}", desk_ids.len());
    println!("  Reservations: {}", booked);

    Ok(())
}
