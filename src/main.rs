// =============================================================================
// Pulse Indicator Service — Main Entry Point
// =============================================================================

use std::sync::Arc;

use anyhow::Context;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use pulse_engine::api;
use pulse_engine::app_state::AppState;
use pulse_engine::runtime_config::{EngineConfig, BIND_ADDR_ENV};

const CONFIG_PATH: &str = "pulse_config.json";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Environment & config ──────────────────────────────────────────
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Pulse indicator service starting");

    let config = EngineConfig::load(CONFIG_PATH).unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        EngineConfig::default()
    });

    // The env override applies to this process only; the stored config keeps
    // its own bind_addr so shutdown and settings saves never persist it.
    let bind_addr = config.effective_bind_addr(std::env::var(BIND_ADDR_ENV).ok());

    info!(
        bind_addr = %bind_addr,
        settings = ?config.settings,
        "Indicator settings"
    );

    // ── 2. Shared state ──────────────────────────────────────────────────
    let state = Arc::new(AppState::new(config, CONFIG_PATH));

    // ── 3. API server ────────────────────────────────────────────────────
    let app = api::router(state.clone());
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind API server on {bind_addr}"))?;
    info!(addr = %bind_addr, "API server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!(error = %e, "failed to listen for shutdown signal");
            }
            warn!("Shutdown signal received — stopping gracefully");
        })
        .await
        .context("API server failed")?;

    // ── 4. Persist settings ──────────────────────────────────────────────
    if let Err(e) = state.save_config() {
        error!(error = %e, "Failed to save config on shutdown");
    }

    info!("Pulse indicator service shut down complete.");
    Ok(())
}
