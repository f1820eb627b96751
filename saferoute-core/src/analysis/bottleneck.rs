use std::cmp::Ordering;

use serde::Serialize;

use crate::{RiskBand, RiskGraph};

/// Node or connector whose risk reaches the bottleneck threshold
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Bottleneck {
    Node {
        id: String,
        risk: f64,
        band: RiskBand,
    },
    Edge {
        from: String,
        to: String,
        risk: f64,
        band: RiskBand,
        directed: bool,
    },
}

impl Bottleneck {
    pub fn risk(&self) -> f64 {
        match self {
            Bottleneck::Node { risk, .. } | Bottleneck::Edge { risk, .. } => *risk,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Bottleneck::Node { .. } => "node",
            Bottleneck::Edge { .. } => "edge",
        }
    }

    fn sort_key(&self) -> (u8, &str, &str) {
        match self {
            Bottleneck::Node { id, .. } => (0, id.as_str(), ""),
            Bottleneck::Edge { from, to, .. } => (1, from.as_str(), to.as_str()),
        }
    }
}

/// Nodes and edges with risk `>= threshold`, riskiest first.
///
/// Equal risks list nodes before edges, then order by id. An undirected
/// connector is reported once.
pub fn find_bottlenecks(graph: &RiskGraph, threshold: f64) -> Vec<Bottleneck> {
    let nodes = graph
        .nodes()
        .filter(|n| n.risk >= threshold)
        .map(|n| Bottleneck::Node {
            id: n.id.clone(),
            risk: n.risk,
            band: n.band(),
        });
    let edges = graph
        .edges()
        .filter(|e| e.edge.risk >= threshold)
        .map(|e| Bottleneck::Edge {
            from: e.from.to_string(),
            to: e.to.to_string(),
            risk: e.edge.risk,
            band: e.edge.band(),
            directed: e.edge.directed,
        });

    let mut found: Vec<Bottleneck> = nodes.chain(edges).collect();
    found.sort_by(|a, b| match b.risk().total_cmp(&a.risk()) {
        Ordering::Equal => a.sort_key().cmp(&b.sort_key()),
        other => other,
    });
    found
}
