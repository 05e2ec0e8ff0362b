use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

mod commands;

use commands::{desk, reservations, seed, sweep};

#[derive(Parser)]
#[command(name = "roostctl", version)]
struct Cli {
    /// Path to the reservation database
    #[arg(
        long,
        global = true,
        env = "ROOST_DB_PATH",
        default_value = "roost.db"
    )]
    db: String,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage the desk registry
    Desk(desk::DeskArgs),
    /// List reservations
    Reservations(reservations::ReservationsArgs),
    /// Purge reservations past the retention window
    Sweep(sweep::SweepArgs),
    /// Load actors, desks and reservations from a YAML file
    Seed(seed::SeedArgs),
    /// Print version and exit
    Version,
}

fn init_tracing() {
    let _ = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .try_init();
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.cmd {
        Commands::Desk(args) => desk::run(&commands::open_context(&cli.db)?, args),
        Commands::Reservations(args) => {
            reservations::run(&commands::open_context(&cli.db)?, args)
        }
        Commands::Sweep(args) => sweep::run(&commands::open_context(&cli.db)?, args),
        Commands::Seed(args) => seed::run(&commands::open_context(&cli.db)?, args),
        Commands::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
