//! Swath ingester.
//!
//! Converts one satellite swath NetCDF file into an observation set and
//! writes it as JSON for the assimilation system.

mod output;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use ingestion::{ConversionOutcome, Converter, ConverterConfig};

#[derive(Parser, Debug)]
#[command(name = "swath-ingester")]
#[command(about = "Convert satellite swath files into observation sets")]
struct Args {
    /// Configuration file path
    #[arg(short, long, env = "SWATH_INGESTER_CONFIG")]
    config: PathBuf,

    /// Swath NetCDF file to convert
    #[arg(short, long)]
    input: PathBuf,

    /// Output JSON file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize tracing
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    // Logs go to stderr so stdout stays free for the JSON hand-off
    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_writer(std::io::stderr);
    if args.json_logs {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }

    info!(config = %args.config.display(), "Starting swath ingester");

    let config = ConverterConfig::from_file(&args.config)
        .with_context(|| format!("Failed to load config {}", args.config.display()))?;
    let converter = Converter::new(&config).context("Invalid converter configuration")?;

    let outcome = converter
        .convert(&args.input)
        .with_context(|| format!("Failed to convert {}", args.input.display()))?;

    if let ConversionOutcome::Skipped { path, reason } = &outcome {
        warn!(path = %path.display(), reason = %reason, "Input skipped, writing empty observation set");
    }

    let obs = outcome.into_observations();
    let summary = obs.summary();
    info!(
        n_locs = summary.n_locs,
        n_chans = summary.n_chans,
        n_values = summary.n_values,
        n_flagged = summary.n_flagged,
        time_range = ?summary.time_range,
        "Conversion complete"
    );

    output::write_observations(&obs, args.output.as_deref())?;
    Ok(())
}
