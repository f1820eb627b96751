//! Command dispatch.

use anyhow::Result;
use saferoute_core::RiskEngine;

use crate::Command;

mod graph;
mod route;

pub fn run(engine: &RiskEngine, command: Command) -> Result<()> {
    match command {
        Command::Stats => graph::stats(engine),
        Command::Distribution => graph::distribution(engine),
        Command::Route {
            from,
            to,
            alternatives,
        } => route::route(engine, &from, &to, alternatives),
        Command::Reachable { from, max_risk, to } => {
            route::reachable(engine, &from, max_risk, to.as_deref())
        }
        Command::Interpolate { lat, lon, k, power } => {
            graph::interpolate(engine, lat, lon, k, power)
        }
        Command::Bottlenecks { threshold } => graph::bottlenecks(engine, threshold),
        Command::TravelTime { from, to, speed } => route::travel_time(engine, &from, &to, speed),
        Command::Zones(zones) => graph::zones(engine, zones.safe, zones.danger),
    }
}
