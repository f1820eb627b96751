use itertools::Itertools;
use petgraph::graph::NodeIndex;
use serde::Serialize;

use crate::{Error, Result, RiskGraph};

/// Traversal of one edge
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteSegment {
    pub from: String,
    pub to: String,
    /// Meters
    pub distance: f64,
    /// Edge risk
    pub risk: f64,
    /// Sum of segment risks up to and including this one
    pub cumulative_risk: f64,
    pub cumulative_distance: f64,
}

/// Ordered sequence of segments from a start node to an end node
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Route {
    pub nodes: Vec<String>,
    pub segments: Vec<RouteSegment>,
    pub total_risk: f64,
    pub total_distance: f64,
}

impl Route {
    /// First node id; falls back to the first segment, or `""` for a
    /// hand-built route with neither
    pub fn start(&self) -> &str {
        self.nodes
            .first()
            .or_else(|| self.segments.first().map(|s| &s.from))
            .map_or("", String::as_str)
    }

    pub fn end(&self) -> &str {
        self.nodes
            .last()
            .or_else(|| self.segments.last().map(|s| &s.to))
            .map_or("", String::as_str)
    }

    /// Number of segments
    pub fn hops(&self) -> usize {
        self.segments.len()
    }

    /// Segment risks weighted by segment distance; the plain mean when the
    /// route has no length, 0 without segments
    #[allow(clippy::cast_precision_loss)]
    pub fn weighted_risk(&self) -> f64 {
        if self.segments.is_empty() {
            return 0.0;
        }
        let length: f64 = self.segments.iter().map(|s| s.distance).sum();
        if length > 0.0 {
            self.segments.iter().map(|s| s.risk * s.distance).sum::<f64>() / length
        } else {
            self.segments.iter().map(|s| s.risk).sum::<f64>() / self.segments.len() as f64
        }
    }

    /// Builds a route over an explicit node sequence
    ///
    /// # Errors
    ///
    /// `NodeNotFound` for unknown ids, `EdgeNotFound` when two consecutive
    /// nodes are not connected in travel direction, `InvalidData` for an
    /// empty sequence
    pub fn from_node_ids<S: AsRef<str>>(graph: &RiskGraph, ids: &[S]) -> Result<Self> {
        let indices = ids
            .iter()
            .map(|id| graph.index_of(id.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        Self::from_indices(graph, &indices)
    }

    pub(crate) fn from_indices(graph: &RiskGraph, path: &[NodeIndex]) -> Result<Self> {
        if path.is_empty() {
            return Err(Error::InvalidData("route without nodes".to_string()));
        }

        let mut segments = Vec::with_capacity(path.len() - 1);
        let mut cumulative_risk = 0.0;
        let mut cumulative_distance = 0.0;

        for (&a, &b) in path.iter().tuple_windows() {
            let edge = graph.edge_between(a, b).ok_or_else(|| Error::EdgeNotFound {
                from: graph.id_at(a).to_string(),
                to: graph.id_at(b).to_string(),
            })?;
            cumulative_risk += edge.risk;
            cumulative_distance += edge.distance;
            segments.push(RouteSegment {
                from: graph.id_at(a).to_string(),
                to: graph.id_at(b).to_string(),
                distance: edge.distance,
                risk: edge.risk,
                cumulative_risk,
                cumulative_distance,
            });
        }

        Ok(Self {
            nodes: path.iter().map(|&idx| graph.id_at(idx).to_string()).collect(),
            segments,
            total_risk: cumulative_risk,
            total_distance: cumulative_distance,
        })
    }
}
