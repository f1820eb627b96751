//! Route queries between two zones.

use anyhow::{Context, Result};
use saferoute_core::{
    RiskEngine,
    analysis::{RankedRoute, RouteSafetyReport, analyze_route_safety, compare_routes},
    routing::Route,
};
use serde::Serialize;

use crate::output::print_json;

#[derive(Serialize)]
struct RouteOutput {
    route: Route,
    safety: RouteSafetyReport,
}

#[derive(Serialize)]
struct AlternativesOutput {
    routes: Vec<Route>,
    ranking: Vec<RankedRoute>,
}

pub fn route(engine: &RiskEngine, from: &str, to: &str, alternatives: Option<usize>) -> Result<()> {
    match alternatives {
        None => {
            let route = engine
                .safest_path(from, to)
                .with_context(|| format!("no safest route from {from} to {to}"))?;
            let safety = analyze_route_safety(&route);
            print_json(&RouteOutput { route, safety })
        }
        Some(k) => {
            let routes = engine
                .k_safest_paths(from, to, k)
                .with_context(|| format!("no alternatives from {from} to {to}"))?;
            let ranking = compare_routes(&routes);
            print_json(&AlternativesOutput { routes, ranking })
        }
    }
}

#[derive(Serialize)]
struct ReachabilityOutput<'a> {
    from: &'a str,
    to: &'a str,
    max_risk: f64,
    reachable: bool,
}

pub fn reachable(engine: &RiskEngine, from: &str, max_risk: f64, to: Option<&str>) -> Result<()> {
    match to {
        Some(to) => {
            let reachable = engine
                .is_reachable(from, to, max_risk)
                .with_context(|| format!("reachability check {from} -> {to} failed"))?;
            print_json(&ReachabilityOutput {
                from,
                to,
                max_risk,
                reachable,
            })
        }
        None => {
            let nodes = engine
                .reachable_nodes(from, max_risk)
                .with_context(|| format!("reachability search from {from} failed"))?;
            print_json(&nodes)
        }
    }
}

pub fn travel_time(engine: &RiskEngine, from: &str, to: &str, speed: f64) -> Result<()> {
    let estimate = engine
        .travel_time(from, to, speed)
        .with_context(|| format!("no travel time estimate from {from} to {to}"))?;
    print_json(&estimate)
}
