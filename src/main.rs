// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{anyhow, Result};
use clap::Parser;
use fabstir_adventure_cache::{
    api::{start_server, AppState},
    cli::Cli,
    config::AppConfig,
    version,
};
use std::env;
use tokio::signal;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file if it exists
    dotenv::dotenv().ok();

    // Initialize tracing subscriber for logging
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    tracing_subscriber::fmt::init();

    info!("Starting {}", version::get_version_string());

    let config = Cli::parse().apply(AppConfig::from_env());
    config.validate().map_err(|e| anyhow!("invalid configuration: {}", e))?;
    let addr = config.bind_addr().map_err(|e| anyhow!(e))?;

    let state = AppState::open(&config).await?;

    let served = start_server(state.clone(), addr, shutdown_signal()).await;

    // Close store handles whether or not the server exited cleanly
    if let Err(e) = state.close().await {
        error!("Failed to close continuation store: {}", e);
    }
    served?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    match signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => error!("Failed to listen for shutdown signal: {}", e),
    }
}
