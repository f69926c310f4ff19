// =============================================================================
// PairLens — Relative Performance Analyzer — Main Entry Point
// =============================================================================
//
// Single-binary web service answering one question: given two tickers, which
// is likely to outperform the other? Fetches aligned daily closes, analyzes
// the price ratio, and fuses statistics, technicals, and an external advisory
// judgment into a 0-100 conviction score.
// =============================================================================

// ── Module declarations ──────────────────────────────────────────────────────
mod advisory;
mod analysis;
mod api;
mod app_state;
mod error;
mod indicators;
mod market_data;
mod runtime_config;
mod series;
mod signals;
mod stats;
mod types;

use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::app_state::AppState;
use crate::runtime_config::RuntimeConfig;

const CONFIG_PATH: &str = "pairlens_config.json";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Environment & config ──────────────────────────────────────────
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("╔══════════════════════════════════════════════════════════╗");
    info!("║        PairLens — Relative Performance Analyzer          ║");
    info!("╚══════════════════════════════════════════════════════════╝");

    let config = RuntimeConfig::load(CONFIG_PATH).unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        RuntimeConfig::default()
    });

    info!(
        ma_short = config.ma_short,
        ma_long = config.ma_long,
        zscore_window = config.zscore_window,
        momentum_window = config.momentum_window,
        advisory_model = %config.advisory_model,
        "Analysis parameters configured"
    );

    if std::env::var("ANTHROPIC_API_KEY").unwrap_or_default().is_empty() {
        warn!("ANTHROPIC_API_KEY is not set; advisory recommendations will be unavailable");
    }

    // ── 2. Build shared state ────────────────────────────────────────────
    let state = Arc::new(AppState::new(config));

    // ── 3. Start the API server ──────────────────────────────────────────
    let bind_addr =
        std::env::var("PAIRLENS_BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8060".into());

    let app = api::rest::router(state.clone());
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind API server on {bind_addr}"))?;
    info!(addr = %bind_addr, "API server listening");

    // ── 4. Serve until shutdown ──────────────────────────────────────────
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            warn!("Shutdown signal received — stopping gracefully");
        })
        .await
        .context("API server failed")?;

    if let Err(e) = state.runtime_config.read().save(CONFIG_PATH) {
        warn!(error = %e, "Failed to save runtime config on shutdown");
    }

    info!("PairLens shut down complete.");
    Ok(())
}
