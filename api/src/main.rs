use anyhow::Result;
use roost_api::{create_app, AppState};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing with JSON output
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,roost_api=debug")),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    info!("Starting roost-api service");

    let state = AppState::from_env()?;
    let app = create_app(state);

    let bind_addr = std::env::var("ROOST_BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
    info!("roost-api listening on {}", bind_addr);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
