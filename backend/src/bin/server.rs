//! Top-50 dashboard HTTP server.
//!
//! Loads the chart dataset and the genre-space reference data, then serves
//! the page layouts and the reactive event endpoint.
//!
//! # Usage
//!
//! ```bash
//! TOP50_DATA_DIR=./data cargo run --bin top50-server
//! ```
//!
//! # Environment Variables
//!
//! - `HOST`: Server host (default: 0.0.0.0)
//! - `PORT`: Server port (default: 8080)
//! - `TOP50_DATA_DIR`: Directory holding the dataset files
//! - `SPOTIFY_CLIENT_ID` / `SPOTIFY_CLIENT_SECRET`: Enable playlist submission
//! - `RUST_LOG`: Log level (default: info)

use std::env;
use std::net::SocketAddr;

use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use top50_rust::bindings::{Dashboard, MemoCache};
use top50_rust::config::DashboardConfig;
use top50_rust::db::RepositoryFactory;
use top50_rust::http::{create_router, AppState};
use top50_rust::playlist::resolver_from_settings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    FmtSubscriber::builder()
        .with_max_level(
            env::var("RUST_LOG")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(Level::INFO),
        )
        .with_target(true)
        .with_thread_ids(true)
        .init();

    info!("Starting Top-50 dashboard server");

    let config = DashboardConfig::from_default_location()?.with_env_overrides()?;

    let repository = RepositoryFactory::from_settings(&config.data)?;
    info!("Dataset loaded from {}", config.data.dir.display());

    let resolver = resolver_from_settings(&config.playlist)?;
    let dashboard = Dashboard::new(repository, resolver, MemoCache::new(config.cache.capacity));

    let app = create_router(AppState::new(dashboard));

    let addr: SocketAddr = config.bind_address().parse()?;
    info!("Server listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
