//! Command-line front end for the risk graph engine.
//!
//! Loads one graph snapshot, runs a single query against it and prints the
//! result as JSON on stdout. Logs go to stderr.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use saferoute_core::{EngineConfig, RiskEngine};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod commands;
mod output;

#[derive(Parser)]
#[command(name = "saferoute")]
#[command(version, about = "Risk-aware routing over a zone graph snapshot")]
struct Cli {
    /// Graph snapshot (JSON with `nodes` and `edges`)
    #[arg(long, value_name = "FILE")]
    graph: PathBuf,

    /// Engine configuration (TOML)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log filter, e.g. `debug` or `saferoute_core=trace`; overrides RUST_LOG
    #[arg(long, value_name = "FILTER")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Node and edge risk statistics
    Stats,
    /// Node and edge counts per risk band
    Distribution,
    /// Safest route, or ranked alternatives with --alternatives
    Route {
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
        /// Number of alternative routes to rank
        #[arg(long, value_name = "K")]
        alternatives: Option<usize>,
    },
    /// Nodes reachable within a cumulative risk ceiling
    Reachable {
        #[arg(long)]
        from: String,
        #[arg(long)]
        max_risk: f64,
        /// Only answer whether this node is reachable
        #[arg(long)]
        to: Option<String>,
    },
    /// Interpolated risk at a coordinate
    Interpolate {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,
        /// Nearest nodes to use; defaults to the configured value
        #[arg(long)]
        k: Option<usize>,
        /// Distance exponent; defaults to the configured value
        #[arg(long)]
        power: Option<f64>,
    },
    /// Nodes and edges at or above a risk threshold
    Bottlenecks {
        #[arg(long)]
        threshold: f64,
    },
    /// Risk-adjusted travel time along the safest route
    TravelTime {
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
        /// Base speed in meters per second
        #[arg(long)]
        speed: f64,
    },
    /// Safe or dangerous zones by threshold
    Zones(ZoneArgs),
}

#[derive(Args)]
#[group(required = true, multiple = false)]
struct ZoneArgs {
    /// Zones with risk at or below this value
    #[arg(long)]
    safe: Option<f64>,
    /// Zones with risk at or above this value
    #[arg(long)]
    danger: Option<f64>,
}

fn init_logging(filter: Option<&str>) -> Result<()> {
    let filter = match filter {
        Some(directives) => EnvFilter::try_new(directives)
            .with_context(|| format!("invalid log filter '{directives}'"))?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    let Some(path) = path else {
        return Ok(EngineConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let config: EngineConfig =
        toml::from_str(&text).with_context(|| format!("invalid config {}", path.display()))?;
    Ok(config)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_level.as_deref())?;

    let config = load_config(cli.config.as_deref())?;
    let engine = RiskEngine::with_config(config).context("invalid engine configuration")?;
    let snapshot = engine
        .load_json_file(&cli.graph)
        .with_context(|| format!("failed to load graph {}", cli.graph.display()))?;
    info!(
        nodes = snapshot.node_count,
        edges = snapshot.edge_count,
        "Loaded {}",
        cli.graph.display()
    );

    commands::run(&engine, cli.command)
}
