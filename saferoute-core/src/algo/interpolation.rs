//! Risk estimate at arbitrary positions by inverse-distance weighting
//! over the nearest graph nodes.

use rayon::prelude::*;
use serde::Serialize;

use crate::{Error, Position, Result, RiskGraph};

/// One node's share of an interpolated value
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Contribution {
    pub id: String,
    /// Meters from the query position
    pub distance: f64,
    /// Normalized weight, all weights sum to 1
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Interpolation {
    pub risk: f64,
    /// Set when the position coincides with a node
    pub exact_match: Option<String>,
    pub contributors: Vec<Contribution>,
}

/// Interpolated risk at `position` from the `k` nearest nodes
///
/// # Errors
///
/// `EmptyGraph` if there are no nodes, `InvalidData` for `k == 0`, a
/// negative or non-finite `power`, or an invalid position
pub fn get_interpolated_risk(
    graph: &RiskGraph,
    position: &Position,
    k: usize,
    power: f64,
) -> Result<f64> {
    interpolate(graph, position, k, power).map(|result| result.risk)
}

/// Like [`get_interpolated_risk`], reporting which nodes contributed
pub fn interpolate(
    graph: &RiskGraph,
    position: &Position,
    k: usize,
    power: f64,
) -> Result<Interpolation> {
    if graph.is_empty() {
        return Err(Error::EmptyGraph);
    }
    if k == 0 {
        return Err(Error::InvalidData("k must be at least 1".to_string()));
    }
    if !power.is_finite() || power < 0.0 {
        return Err(Error::InvalidData(format!(
            "power must be a non-negative number, got {power}"
        )));
    }
    position.validate()?;

    let nearest = graph.nearest_nodes(position, k);
    let Some(&(closest, min_distance)) = nearest.first() else {
        return Err(Error::EmptyGraph);
    };

    if min_distance == 0.0 {
        let node = &graph.graph[closest];
        return Ok(Interpolation {
            risk: node.risk,
            exact_match: Some(node.id.clone()),
            contributors: vec![Contribution {
                id: node.id.clone(),
                distance: 0.0,
                weight: 1.0,
            }],
        });
    }

    // (d_min / d_i)^p is proportional to 1 / d_i^p and never exceeds 1
    let raw: Vec<f64> = nearest
        .iter()
        .map(|&(_, distance)| (min_distance / distance).powf(power))
        .collect();
    let total: f64 = raw.iter().sum();

    let contributors: Vec<Contribution> = nearest
        .iter()
        .zip(&raw)
        .map(|(&(idx, distance), &w)| Contribution {
            id: graph.id_at(idx).to_string(),
            distance,
            weight: w / total,
        })
        .collect();
    let risk = nearest
        .iter()
        .zip(&contributors)
        .map(|(&(idx, _), c)| graph.graph[idx].risk * c.weight)
        .sum::<f64>()
        .clamp(0.0, 1.0);

    Ok(Interpolation {
        risk,
        exact_match: None,
        contributors,
    })
}

/// Interpolates a batch of positions in parallel; results keep input order
pub fn interpolate_many(
    graph: &RiskGraph,
    positions: &[Position],
    k: usize,
    power: f64,
) -> Vec<Result<f64>> {
    positions
        .par_iter()
        .map(|position| get_interpolated_risk(graph, position, k, power))
        .collect()
}
