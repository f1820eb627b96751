use serde::Serialize;

use crate::{RiskBand, routing::Route};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedRoute {
    /// 1 for the best route
    pub rank: usize,
    /// Position of the route in the input slice
    pub index: usize,
    pub nodes: Vec<String>,
    pub total_risk: f64,
    pub total_distance: f64,
    /// Band of the distance-weighted segment risk, as in route safety reports
    pub band: RiskBand,
}

/// Ranks routes by total risk, then total distance.
///
/// The sort is stable: exact ties keep their input order and receive
/// adjacent ranks.
pub fn compare_routes(routes: &[Route]) -> Vec<RankedRoute> {
    let mut order: Vec<usize> = (0..routes.len()).collect();
    order.sort_by(|&a, &b| {
        routes[a]
            .total_risk
            .total_cmp(&routes[b].total_risk)
            .then(routes[a].total_distance.total_cmp(&routes[b].total_distance))
    });

    order
        .into_iter()
        .enumerate()
        .map(|(position, index)| {
            let route = &routes[index];
            RankedRoute {
                rank: position + 1,
                index,
                nodes: route.nodes.clone(),
                total_risk: route.total_risk,
                total_distance: route.total_distance,
                band: RiskBand::from_risk(route.weighted_risk()),
            }
        })
        .collect()
}
