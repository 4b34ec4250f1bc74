/*!
 * Healthwatch Dashboard
 *
 * Renders current service state from the monitor's webhook notifications.
 *
 * Endpoints:
 * - POST /api/login        -> Bearer JWT (HS256)
 * - GET  /api/services     -> service map + dashboard title (JWT)
 * - POST /api/tob/webhook  -> status ingest (X-Tob-Token)
 * - GET  /                 -> static frontend, SPA fallback
 */

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::{info, warn};

use healthwatch_config::Config;
use healthwatch_dashboard::{router, DashboardState};

/// Status dashboard for the healthwatch monitor.
#[derive(Parser, Debug)]
#[command(name = "healthwatch-dashboard")]
struct Cli {
    /// Configuration file (.json) - the same file the monitor reads
    #[arg(short = 'c', long = "config", default_value = "config.json")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    healthwatch_common::init_tracing(false);

    info!("🚀 Starting healthwatch dashboard");

    let configs =
        Config::from_path(&cli.config).context("failed to load configuration file")?;
    let state = Arc::new(
        DashboardState::from_config(&configs).context("failed to build dashboard state")?,
    );

    let addr = format!("0.0.0.0:{}", state.http_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind dashboard server to {addr}"))?;

    info!("✅ Dashboard listening on http://{addr}");
    info!("   - POST /api/login");
    info!("   - GET  /api/services");
    info!("   - POST /api/tob/webhook");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("dashboard server failed")?;

    info!("👋 Dashboard stopped");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            warn!("Received Ctrl+C, shutting down...");
        },
        _ = terminate => {
            warn!("Received terminate signal, shutting down...");
        },
    }
}
