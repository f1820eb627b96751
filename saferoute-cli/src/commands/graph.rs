//! Whole-graph queries: statistics, bottlenecks, zones, interpolation.

use anyhow::{Context, Result, bail};
use saferoute_core::{
    Position, RiskEngine, RiskNode, SnapshotInfo, algo, model::RiskStats,
};
use serde::Serialize;

use crate::output::print_json;

#[derive(Serialize)]
struct StatsOutput {
    snapshot: SnapshotInfo,
    risk: RiskStats,
}

pub fn stats(engine: &RiskEngine) -> Result<()> {
    let snapshot = engine.snapshot();
    let risk = snapshot.get_stats().context("no statistics for this graph")?;
    print_json(&StatsOutput {
        snapshot: snapshot.info(),
        risk,
    })
}

pub fn distribution(engine: &RiskEngine) -> Result<()> {
    print_json(&engine.risk_distribution())
}

pub fn interpolate(
    engine: &RiskEngine,
    lat: f64,
    lon: f64,
    k: Option<usize>,
    power: Option<f64>,
) -> Result<()> {
    let config = engine.config();
    let k = k.unwrap_or(config.interpolation_k);
    let power = power.unwrap_or(config.interpolation_power);
    let result = algo::interpolate(&engine.snapshot(), &Position::new(lat, lon), k, power)
        .with_context(|| format!("cannot interpolate at ({lat}, {lon})"))?;
    print_json(&result)
}

pub fn bottlenecks(engine: &RiskEngine, threshold: f64) -> Result<()> {
    print_json(&engine.bottlenecks(threshold))
}

#[derive(Serialize)]
struct ZonesOutput {
    kind: &'static str,
    threshold: f64,
    zones: Vec<RiskNode>,
}

pub fn zones(engine: &RiskEngine, safe: Option<f64>, danger: Option<f64>) -> Result<()> {
    let output = match (safe, danger) {
        (Some(threshold), None) => ZonesOutput {
            kind: "safe",
            threshold,
            zones: engine.safe_zones(threshold),
        },
        (None, Some(threshold)) => ZonesOutput {
            kind: "danger",
            threshold,
            zones: engine.danger_zones(threshold),
        },
        _ => bail!("pass exactly one of --safe or --danger"),
    };
    print_json(&output)
}
