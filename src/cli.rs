//! Command-line interface parsing for the horocache daemon
//!
//! This module handles parsing of CLI arguments using clap, covering the
//! data-file location, the synchronization interval, and the single-pass
//! update mode.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use thiserror::Error;

/// Error types for CLI argument validation
#[derive(Debug, Error)]
pub enum CliError {
    /// The synchronization interval must be at least one minute
    #[error("Invalid interval: {0} minutes. The interval must be at least 1 minute")]
    InvalidInterval(u64),
}

/// horocache - cache daily horoscopes with staleness detection and repair
#[derive(Parser, Debug)]
#[command(name = "horocache")]
#[command(about = "Horoscope cache daemon with staleness detection and repair")]
#[command(version)]
pub struct Cli {
    /// Path of the JSON data file (defaults to the platform data directory)
    #[arg(long, value_name = "PATH")]
    pub data_file: Option<PathBuf>,

    /// Minutes between synchronization passes
    #[arg(long, value_name = "MINUTES", default_value_t = 30)]
    pub interval_mins: u64,

    /// Run a single synchronization pass and exit
    #[arg(long)]
    pub once: bool,

    /// Warm the HTTP response cache for every known URL before syncing
    #[arg(long)]
    pub precache: bool,
}

/// Configuration derived from CLI arguments for application startup
#[derive(Debug, Clone)]
pub struct StartupConfig {
    /// Explicit data file path, if given
    pub data_file: Option<PathBuf>,
    /// Interval between synchronization passes
    pub interval: Duration,
    /// Whether to exit after the initial pass
    pub run_once: bool,
    /// Whether to warm the response cache at startup
    pub precache: bool,
}

impl StartupConfig {
    /// Creates a StartupConfig from parsed CLI arguments.
    ///
    /// # Returns
    /// * `Ok(StartupConfig)` with validated settings
    /// * `Err(CliError)` if the interval is out of range
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        if cli.interval_mins == 0 {
            return Err(CliError::InvalidInterval(cli.interval_mins));
        }
        Ok(StartupConfig {
            data_file: cli.data_file.clone(),
            interval: Duration::from_secs(cli.interval_mins * 60),
            run_once: cli.once,
            precache: cli.precache,
        })
    }
}
