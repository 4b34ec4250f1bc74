//! Logging and tracing setup
//!
//! Structured logging configuration using tracing, shared by the monitor,
//! the dashboard and the disk agent binaries.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize tracing/logging for the application
///
/// The default level is `info`; the monitor's `-V` verbose flag lowers it to
/// `debug`. `RUST_LOG` always wins when set:
///
/// ```text
/// RUST_LOG=debug healthwatch            -> debug and higher
/// RUST_LOG=healthwatch_probes=trace ... -> trace for the probes crate only
/// ```
pub fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_level(true)
                .compact(),
        )
        .init();
}

/// Initialize tracing with JSON output, for log aggregation systems.
pub fn init_tracing_json(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_target(true)
                .with_level(true)
                .with_current_span(true),
        )
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::{info, warn};

    #[test]
    fn test_tracing_init() {
        // Only one subscriber can be installed per process; swallow the
        // second-install panic when the full suite runs.
        let _result = std::panic::catch_unwind(|| {
            init_tracing(true);
        });

        info!("test log message");
        warn!(count = 42, "warning with structured data");
    }
}
