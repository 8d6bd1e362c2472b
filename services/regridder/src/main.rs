//! Restart field regridder.
//!
//! Reads the raw binary restart fields of a finished LES run and writes
//! them on a finer (or otherwise different) horizontal grid using
//! nearest-neighbour interpolation, ready to start a new run from.

mod config;

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use regrid_core::FieldDriver;

#[derive(Parser, Debug, Default)]
#[command(name = "regridder")]
#[command(about = "Nearest-neighbour horizontal regridding of LES restart fields")]
pub struct Args {
    /// Configuration file path (YAML)
    #[arg(short, long, env = "REGRID_CONFIG")]
    pub config: Option<PathBuf>,

    /// System profile (eddy, snellius, ecmwf, lumi)
    #[arg(long)]
    pub system: Option<String>,

    /// Directory with the source fields
    #[arg(long)]
    pub path_in: Option<PathBuf>,

    /// Directory for the regridded fields
    #[arg(long)]
    pub path_out: Option<PathBuf>,

    /// Timestamp of the source files
    #[arg(long)]
    pub time_in: Option<u64>,

    /// Timestamp for the output files
    #[arg(long)]
    pub time_out: Option<u64>,

    /// Only regrid these variables (repeatable; default: all configured)
    #[arg(short, long = "variable")]
    pub variables: Vec<String>,

    /// Log failures and continue with the remaining variables
    #[arg(long)]
    pub skip_failed: bool,

    /// Regrid independent variables concurrently
    #[arg(long)]
    pub parallel_variables: bool,

    /// Worker threads (0 = one per core)
    #[arg(long)]
    pub threads: Option<usize>,

    /// Write a JSON run summary to this path
    #[arg(long)]
    pub summary: Option<PathBuf>,

    /// Print the resolved configuration as YAML and exit
    #[arg(long)]
    pub print_config: bool,

    /// Log level
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

fn main() -> Result<()> {
    // Load environment from .env file if present
    dotenvy::dotenv().ok();

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

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_thread_ids(true)
        .json()
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let config = config::load(&args)?;

    if args.print_config {
        print!("{}", serde_yaml::to_string(&config)?);
        return Ok(());
    }

    config.validate().context("invalid configuration")?;

    if config.threads > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(config.threads)
            .build_global()
            .context("failed to configure thread pool")?;
    }

    info!(
        system = config.system.as_deref().unwrap_or("none"),
        threads = rayon::current_num_threads(),
        "Starting restart regridder"
    );

    let table = if args.variables.is_empty() {
        config.variables.clone()
    } else {
        config.variables.select(&args.variables)?
    };

    let driver = FieldDriver::new(&config)?;
    let summary = driver.run(&table)?;

    if let Some(path) = &args.summary {
        let json = serde_json::to_string_pretty(&summary)?;
        std::fs::write(path, json)
            .with_context(|| format!("failed to write summary to {}", path.display()))?;
        info!(path = %path.display(), "Wrote run summary");
    }

    if !summary.is_complete() {
        for failure in &summary.failed {
            warn!(variable = %failure.variable, error = %failure.error, "Variable not regridded");
        }
        bail!(
            "{} of {} variables failed",
            summary.failed.len(),
            summary.failed.len() + summary.succeeded.len()
        );
    }

    Ok(())
}
