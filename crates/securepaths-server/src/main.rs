//! SecurePaths Server - route search and safety reporting backend

use anyhow::{Context, Result};
use securepaths_maps::OlaMapsClient;
use securepaths_server::config::Config;
use securepaths_server::state::AppState;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env()
            .add_directive("securepaths_server=debug".parse()?))
        .init();

    tracing::info!("Starting SecurePaths server...");

    let config = Config::from_env();
    if config.api_key.is_empty() {
        tracing::warn!("SECUREPATHS_API_KEY is not set; every /api request will be rejected");
    }
    if config.maps_api_key.is_empty() {
        tracing::warn!("OLA_MAPS_API_KEY is not set; route search will serve mock routes");
    }

    let maps = OlaMapsClient::new(
        config.maps_base_url.clone(),
        config.maps_api_key.clone(),
        config.geocoding_api_key.clone(),
        config.upstream_timeout(),
    )?;
    let state = Arc::new(AppState::new(config.clone(), Arc::new(maps)));
    let app = securepaths_server::build_app(&config, state)?;

    let addr: SocketAddr = format!("{}:{}", config.host, config.server_port)
        .parse()
        .context("Invalid SECUREPATHS_HOST/SECUREPATHS_PORT")?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
