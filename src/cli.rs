use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use tracing::warn;

use crate::config;
use crate::error::{Error, Result};
use crate::models::SimConfig;

#[derive(Parser, Debug)]
#[command(name = "qnet-sim", about = "Discrete-event service network simulator")]
pub struct Args {
    /// TOML or JSON simulation config; omit for the built-in cafe network
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Override the configured simulation end time
    #[arg(long, allow_negative_numbers = true)]
    pub end_time: Option<f64>,
    /// Base seed for every sampler; omit for entropy seeding
    #[arg(long)]
    pub seed: Option<u64>,
    /// Per-cycle pacing delay in milliseconds (paced mode only)
    #[arg(long)]
    pub delay_ms: Option<u64>,
    /// Run on a worker thread with the pause/step control surface
    #[arg(long)]
    pub paced: bool,
    #[arg(long, value_enum, default_value_t = FormatArg::Human)]
    pub format: FormatArg,
    /// Write a semicolon-delimited statistics report to this path
    #[arg(long)]
    pub report: Option<PathBuf>,
    /// Append a one-line run record to this history log
    #[arg(long)]
    pub history: Option<PathBuf>,
}

#[derive(ValueEnum, Clone, Debug)]
pub enum FormatArg {
    Human,
    Summary,
    Json,
}

pub fn parse_args() -> Result<Args> {
    Args::try_parse().map_err(|e| Error::Cli(e.to_string()))
}

/// Resolves the effective config: file (or defaults), then CLI overrides,
/// then validation. An unreadable config file degrades to defaults with a
/// warning; a malformed or invalid one aborts.
pub fn build_config(args: &Args) -> Result<SimConfig> {
    let mut config = match &args.config {
        Some(path) => match config::load_config(path) {
            Ok(config) => config,
            Err(Error::ConfigIo(msg)) => {
                warn!("{}; falling back to defaults", msg);
                SimConfig::default()
            }
            Err(err) => return Err(err),
        },
        None => SimConfig::default(),
    };

    if let Some(end_time) = args.end_time {
        config.end_time = end_time;
    }
    if let Some(seed) = args.seed {
        config.seed = Some(seed);
    }
    if let Some(delay_ms) = args.delay_ms {
        config.delay_ms = delay_ms;
    }
    config.validate()?;
    Ok(config)
}
