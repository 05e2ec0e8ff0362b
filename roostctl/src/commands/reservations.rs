//! Reservation listing command

use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::Args;
use serde_json::{json, Value};
use tabled::{settings::style::Style, Table, Tabled};

use booking::Actor;

use super::CliContext;

#[derive(Args, Debug)]
pub struct ReservationsArgs {
    /// Show one desk's upcoming occupancy instead of the full listing
    #[arg(long, value_name = "DESK_ID", conflicts_with_all = ["actor", "past"])]
    pub desk: Option<i64>,

    /// Show one actor's upcoming reservations instead of the full listing
    #[arg(long, value_name = "ACTOR_ID", conflicts_with = "past")]
    pub actor: Option<i64>,

    /// Show elapsed reservations instead of upcoming ones
    #[arg(long)]
    pub past: bool,

    /// Output machine-readable JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Tabled)]
struct ReservationRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "DATE")]
    date: String,
    #[tabled(rename = "DESK")]
    desk: String,
    #[tabled(rename = "HOLDER")]
    holder: String,
}

fn slot(date: DateTime<Utc>) -> String {
    date.format("%Y-%m-%d %H:%M").to_string()
}

pub fn run(ctx: &CliContext, args: ReservationsArgs) -> Result<()> {
    let (rows, entries): (Vec<ReservationRow>, Vec<Value>) = if let Some(desk_id) = args.desk {
        let list = ctx.reservations.list_by_desk(desk_id)?;
        (
            list.iter()
                .map(|r| ReservationRow {
                    id: r.id,
                    date: slot(r.date),
                    desk: desk_id.to_string(),
                    holder: r.actor_id.map_or("-".to_string(), |id| id.to_string()),
                })
                .collect(),
            list.iter().map(|r| json!({ "reservation": r })).collect(),
        )
    } else if let Some(actor_id) = args.actor {
        let holder = Actor::new(actor_id, vec![]);
        let list = ctx.reservations.list_by_actor(&holder)?;
        (
            list.iter()
                .map(|(r, d)| ReservationRow {
                    id: r.id,
                    date: slot(r.date),
                    desk: d.tag.clone(),
                    holder: actor_id.to_string(),
                })
                .collect(),
            list.iter()
                .map(|(r, d)| json!({ "reservation": r, "desk": d }))
                .collect(),
        )
    } else {
        let list = if args.past {
            ctx.reservations.list_past_all(&ctx.actor)?
        } else {
            ctx.reservations.list_future_all(&ctx.actor)?
        };
        (
            list.iter()
                .map(|(r, d, a)| ReservationRow {
                    id: r.id,
                    date: slot(r.date),
                    desk: d.tag.clone(),
                    holder: a.handle.clone(),
                })
                .collect(),
            list.iter()
                .map(|(r, d, a)| json!({ "reservation": r, "desk": d, "actor": a }))
                .collect(),
        )
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if rows.is_empty() {
        println!("No reservations.");
        return Ok(());
    }

    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{}", table);

    Ok(())
}
