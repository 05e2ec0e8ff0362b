use std::sync::Arc;

use booking::clock::SystemClock;
use booking::store::Store;
use booking::sweeper::{run_loop, SweeperConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    let enabled = std::env::var("ROOST_SWEEP_ENABLED").unwrap_or_else(|_| "0".to_string()) == "1";
    if !enabled {
        println!("retention sweeper disabled (set ROOST_SWEEP_ENABLED=1 to start)");
        return Ok(());
    }
    let db_path = std::env::var("ROOST_DB_PATH").unwrap_or_else(|_| "roost.db".to_string());
    let store = Store::open(&db_path)?;
    run_loop(store, Arc::new(SystemClock), SweeperConfig::default()).await
}
