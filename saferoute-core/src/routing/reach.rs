//! Bounded reachability: what can be reached without exceeding a risk ceiling

use itertools::Itertools;
use serde::Serialize;

use crate::{
    Error, Result, RiskGraph,
    routing::{
        SearchBudget,
        dijkstra::{Restrictions, risk_dijkstra},
    },
};

/// Node reached within a risk ceiling
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReachableNode {
    pub id: String,
    /// Lowest cumulative risk of any route to this node
    pub risk: f64,
    /// Distance of that route in meters
    pub distance: f64,
}

fn validate_ceiling(max_risk: f64) -> Result<()> {
    if max_risk.is_finite() && max_risk >= 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidData(format!(
            "max_risk must be a non-negative number, got {max_risk}"
        )))
    }
}

/// True if some route from `start` to `end` keeps cumulative risk <= `max_risk`
///
/// The ceiling is compared with a relative tolerance of 1e-9, so a route
/// whose edge risks add up to `max_risk` in decimal is accepted despite
/// floating-point rounding. A ceiling of 0 admits zero-risk edges only.
///
/// # Errors
///
/// `NodeNotFound` for an unknown endpoint, `InvalidData` for a negative or
/// non-finite ceiling
pub fn is_reachable(graph: &RiskGraph, start: &str, end: &str, max_risk: f64) -> Result<bool> {
    is_reachable_with_budget(graph, start, end, max_risk, SearchBudget::default())
}

pub fn is_reachable_with_budget(
    graph: &RiskGraph,
    start: &str,
    end: &str,
    max_risk: f64,
    budget: SearchBudget,
) -> Result<bool> {
    validate_ceiling(max_risk)?;
    let source = graph.index_of(start)?;
    let target = graph.index_of(end)?;
    let mut tracker = budget.tracker(graph, 1);

    let restrictions = Restrictions {
        max_risk: Some(max_risk),
        ..Restrictions::default()
    };
    let tree = risk_dijkstra(graph, source, Some(target), &restrictions, &mut tracker)?;
    Ok(tree.label(target).is_some())
}

/// Every node reachable from `start` with cumulative risk <= `max_risk`,
/// ordered by risk, then id. The start node is included at risk 0.
///
/// The ceiling carries the same rounding tolerance as [`is_reachable`].
///
/// # Errors
///
/// `NodeNotFound` for an unknown start, `InvalidData` for a negative or
/// non-finite ceiling
pub fn get_reachable_nodes(
    graph: &RiskGraph,
    start: &str,
    max_risk: f64,
) -> Result<Vec<ReachableNode>> {
    get_reachable_nodes_with_budget(graph, start, max_risk, SearchBudget::default())
}

pub fn get_reachable_nodes_with_budget(
    graph: &RiskGraph,
    start: &str,
    max_risk: f64,
    budget: SearchBudget,
) -> Result<Vec<ReachableNode>> {
    validate_ceiling(max_risk)?;
    let source = graph.index_of(start)?;
    let mut tracker = budget.tracker(graph, 1);

    let restrictions = Restrictions {
        max_risk: Some(max_risk),
        ..Restrictions::default()
    };
    let tree = risk_dijkstra(graph, source, None, &restrictions, &mut tracker)?;

    Ok(tree
        .labels()
        .map(|(node, label)| ReachableNode {
            id: graph.id_at(node).to_string(),
            risk: label.risk,
            distance: label.distance,
        })
        .sorted_by(|a, b| a.risk.total_cmp(&b.risk).then_with(|| a.id.cmp(&b.id)))
        .collect())
}
