/*!
 * Healthwatch Monitor
 *
 * Probes a configured set of external dependencies on independent
 * schedules, detects UP/DOWN transitions and fans out notifications.
 *
 * ## Architecture
 *
 * ```text
 * Main Process
 *     │
 *     ├──> Runner
 *     │       ├──> probe loop (billing-db):   tick → ping → dispatch
 *     │       ├──> probe loop (orders-kafka): tick → ping → dispatch
 *     │       └──> probe loop (shop-ssl):     tick → ping → dispatch
 *     │
 *     └──> signal task: SIGINT/SIGTERM → cancel → loops drain → exit
 * ```
 *
 * Exit codes: 0 on a clean run, 1 on argument, config, notifier-factory or
 * service-init errors.
 */

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use healthwatch_config::Config;
use healthwatch_monitor::Runner;
use healthwatch_monitor::cli::Cli;
use healthwatch_notifiers::build_notifiers;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.version {
        println!("healthwatch version {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    healthwatch_common::init_tracing(cli.verbose);

    info!("🚀 Starting healthwatch monitor");

    let configs =
        Config::from_path(&cli.config).context("failed to load configuration file")?;

    let notifiers = build_notifiers(&configs).context("failed to build notifiers")?;
    info!("📋 Configuration loaded:");
    info!("   - Config file: {}", cli.config.display());
    info!("   - Notifiers: {}", notifiers.len());
    for notifier in notifiers.iter() {
        info!(
            "       {} (enabled: {})",
            notifier.provider(),
            notifier.is_enabled()
        );
    }

    let mut runner = Runner::new(configs, notifiers, cli.verbose);
    runner
        .init_services()
        .await
        .context("failed to initialize services")?;

    // SIGINT/SIGTERM cancel the runner's context
    let ctx = CancellationToken::new();
    let signal_ctx = ctx.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        signal_ctx.cancel();
    });

    info!("✅ healthwatch is running - press Ctrl+C to shut down gracefully");

    runner.run(ctx).await;

    info!("👋 healthwatch stopped");
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
