//! Command-line interface for the monitor binary.

use std::path::PathBuf;

use clap::Parser;

/// Service-health monitor and alert dispatcher.
#[derive(Parser, Debug)]
#[command(name = "healthwatch", disable_version_flag = true)]
pub struct Cli {
    /// Configuration file (.json)
    #[arg(short = 'c', long = "config", default_value = "config.json")]
    pub config: PathBuf,

    /// Show version and exit
    #[arg(short = 'v', long = "version")]
    pub version: bool,

    /// Verbose mode (per-tick results at info level)
    #[arg(
        short = 'V',
        long = "verbose",
        default_value_t = true,
        num_args = 0..=1,
        default_missing_value = "true",
        action = clap::ArgAction::Set
    )]
    pub verbose: bool,
}
