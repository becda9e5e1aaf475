//! supply-desk server.
//!
//! Run from repo root: `cargo run -p supply-desk-server`
//! Configuration comes from the environment or a `.env` file (see `Config::from_env`).

use supply_desk::{app_with_assets, AppState, Config};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("supply_desk=info,tower_http=info")),
        )
        .init();

    let config = Config::from_env()?;
    let state = AppState::from_config(&config)?;
    let app = app_with_assets(state, &config.static_dir);

    let listener = TcpListener::bind(config.server_addr()).await?;
    tracing::info!("supply-desk listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
