//! Desk registry commands

use anyhow::Result;
use clap::{Args, Subcommand};
use tabled::{settings::style::Style, Table, Tabled};
use tracing::info;

use booking::{Desk, DeskDraft, DeskPatch};

use super::CliContext;

#[derive(Args, Debug)]
pub struct DeskArgs {
    #[command(subcommand)]
    pub cmd: DeskCommand,
}

#[derive(Subcommand, Debug)]
pub enum DeskCommand {
    /// List desks open for booking
    List {
        /// Include desks closed for booking
        #[arg(long)]
        all: bool,

        /// Output machine-readable JSON
        #[arg(long)]
        json: bool,
    },

    /// Register a new desk
    Create {
        /// Unique desk tag, e.g. CD1
        #[arg(long)]
        tag: String,

        /// Desk type label, e.g. "Computer Desk"
        #[arg(long = "desk-type")]
        desk_type: String,

        /// Equipment that comes with the desk
        #[arg(long, default_value = "")]
        resource: String,

        /// Register the desk closed for booking
        #[arg(long)]
        unavailable: bool,
    },

    /// Remove a desk and its upcoming reservations
    Rm {
        #[arg(value_name = "DESK_ID")]
        desk_id: i64,
    },

    /// Flip a desk between available and unavailable
    Toggle {
        #[arg(value_name = "DESK_ID")]
        desk_id: i64,
    },

    /// Update desk fields; omitted fields stay untouched
    Update {
        #[arg(value_name = "DESK_ID")]
        desk_id: i64,

        #[arg(long = "desk-type")]
        desk_type: Option<String>,

        #[arg(long)]
        resource: Option<String>,

        #[arg(long)]
        available: Option<bool>,
    },
}

#[derive(Debug, Tabled)]
struct DeskRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "TAG")]
    tag: String,
    #[tabled(rename = "TYPE")]
    desk_type: String,
    #[tabled(rename = "RESOURCE")]
    resource: String,
    #[tabled(rename = "AVAILABLE")]
    available: String,
}

impl From<&Desk> for DeskRow {
    fn from(desk: &Desk) -> Self {
        Self {
            id: desk.id,
            tag: desk.tag.clone(),
            desk_type: desk.desk_type.clone(),
            resource: desk.included_resource.clone(),
            available: if desk.available { "yes" } else { "no" }.to_string(),
        }
    }
}

pub fn run(ctx: &CliContext, args: DeskArgs) -> Result<()> {
    match args.cmd {
        DeskCommand::List { all, json } => list(ctx, all, json),
        DeskCommand::Create {
            tag,
            desk_type,
            resource,
            unavailable,
        } => {
            info!("Creating desk '{}'", tag);
            let desk = ctx.desks.create(
                &ctx.actor,
                DeskDraft {
                    tag,
                    desk_type,
                    included_resource: resource,
                    available: !unavailable,
                },
            )?;
            println!("✓ Created desk {} ({})", desk.id, desk.tag);
            Ok(())
        }
        DeskCommand::Rm { desk_id } => {
            info!("Removing desk {}", desk_id);
            let desk = ctx.desks.remove(&ctx.actor, desk_id)?;
            println!("✓ Removed desk {} ({})", desk.id, desk.tag);
            Ok(())
        }
        DeskCommand::Toggle { desk_id } => {
            info!("Toggling desk {}", desk_id);
            let desk = ctx.desks.toggle_availability(&ctx.actor, desk_id)?;
            if desk.available {
                println!("✓ Desk {} ({}) is now available", desk.id, desk.tag);
            } else {
                println!("✓ Desk {} ({}) is now unavailable", desk.id, desk.tag);
            }
            Ok(())
        }
        DeskCommand::Update {
            desk_id,
            desk_type,
            resource,
            available,
        } => {
            info!("Updating desk {}", desk_id);
            let desk = ctx.desks.update(
                &ctx.actor,
                desk_id,
                DeskPatch {
                    desk_type,
                    included_resource: resource,
                    available,
                },
            )?;
            println!("✓ Updated desk {} ({})", desk.id, desk.tag);
            Ok(())
        }
    }
}

fn list(ctx: &CliContext, all: bool, json: bool) -> Result<()> {
    let desks = if all {
        ctx.desks.list_all(&ctx.actor)?
    } else {
        ctx.desks.list_available()?
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&desks)?);
        return Ok(());
    }

    if desks.is_empty() {
        println!("No desks found.");
        return Ok(());
    }

    let rows: Vec<DeskRow> = desks.iter().map(DeskRow::from).collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{}", table);

    Ok(())
}
