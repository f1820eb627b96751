//! Shared engine: publishes immutable graph snapshots to concurrent readers.
//!
//! `load` validates and builds the replacement graph without holding any
//! lock, then swaps it in under a short write lock. Each query clones the
//! current `Arc` once and runs entirely against that snapshot.

use std::{ops::Deref, path::Path, sync::Arc};

use chrono::{DateTime, Utc};
use log::{info, warn};
use parking_lot::RwLock;
use serde::Serialize;

use crate::{
    EngineConfig, Position, Result, RiskGraph, RiskNode,
    algo::{Interpolation, interpolate, interpolate_many},
    analysis::{
        Bottleneck, RankedRoute, RouteSafetyReport, TravelTimeEstimate, TravelTimeModel,
        analyze_route_safety, compare_routes, estimate_travel_time_with, find_bottlenecks,
    },
    model::{GraphData, Neighbor, RiskDistribution, RiskStats},
    routing::{
        ReachableNode, Route, dijkstra_safest_path_with_budget, find_k_safest_paths_with_budget,
        get_reachable_nodes_with_budget, is_reachable_with_budget,
    },
};

/// One published graph together with its load metadata
#[derive(Debug)]
pub struct Snapshot {
    graph: RiskGraph,
    generation: u64,
    loaded_at: DateTime<Utc>,
}

impl Snapshot {
    pub fn graph(&self) -> &RiskGraph {
        &self.graph
    }

    /// 0 for the initial empty graph, incremented by every successful load
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    pub fn info(&self) -> SnapshotInfo {
        SnapshotInfo {
            generation: self.generation,
            node_count: self.graph.node_count(),
            edge_count: self.graph.edge_count(),
            loaded_at: self.loaded_at,
        }
    }
}

impl Deref for Snapshot {
    type Target = RiskGraph;

    fn deref(&self) -> &RiskGraph {
        &self.graph
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SnapshotInfo {
    pub generation: u64,
    pub node_count: usize,
    pub edge_count: usize,
    pub loaded_at: DateTime<Utc>,
}

/// Risk graph service shared between threads
#[derive(Debug)]
pub struct RiskEngine {
    config: EngineConfig,
    current: RwLock<Arc<Snapshot>>,
}

impl Default for RiskEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl RiskEngine {
    /// Engine with the default configuration and an empty graph
    pub fn new() -> Self {
        Self {
            config: EngineConfig::default(),
            current: RwLock::new(Arc::new(Snapshot {
                graph: RiskGraph::new(),
                generation: 0,
                loaded_at: Utc::now(),
            })),
        }
    }

    /// # Errors
    ///
    /// `InvalidData` if the configuration does not validate
    pub fn with_config(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            ..Self::new()
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Current snapshot; stays valid after later loads
    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.current.read().clone()
    }

    pub fn info(&self) -> SnapshotInfo {
        self.snapshot().info()
    }

    /// Replaces the graph with one built from `data`.
    ///
    /// # Errors
    ///
    /// Any validation error; the published snapshot is left untouched
    pub fn load(&self, data: &GraphData) -> Result<SnapshotInfo> {
        let graph = RiskGraph::from_data(data)?;
        Ok(self.publish(graph))
    }

    pub fn load_json_file(&self, path: &Path) -> Result<SnapshotInfo> {
        let data = GraphData::from_json_file(path).inspect_err(|e| {
            warn!("Failed to read graph snapshot {}: {e}", path.display());
        })?;
        self.load(&data)
    }

    fn publish(&self, graph: RiskGraph) -> SnapshotInfo {
        let mut current = self.current.write();
        let snapshot = Arc::new(Snapshot {
            graph,
            generation: current.generation + 1,
            loaded_at: Utc::now(),
        });
        *current = Arc::clone(&snapshot);
        drop(current);

        let info = snapshot.info();
        info!(
            "Published graph generation {} ({} nodes, {} edges)",
            info.generation, info.node_count, info.edge_count
        );
        info
    }

    pub fn node_risk(&self, id: &str) -> Result<f64> {
        self.snapshot().get_node_risk(id)
    }

    pub fn edge_risk(&self, from: &str, to: &str) -> Result<f64> {
        self.snapshot().get_edge_risk(from, to)
    }

    pub fn connected_nodes(&self, id: &str) -> Result<Vec<String>> {
        let snapshot = self.snapshot();
        let ids = snapshot.get_connected_nodes(id)?;
        Ok(ids.into_iter().map(str::to_string).collect())
    }

    pub fn safest_neighbor(&self, id: &str) -> Result<Option<Neighbor>> {
        self.snapshot().get_safest_neighbor(id)
    }

    pub fn stats(&self) -> Result<RiskStats> {
        self.snapshot().get_stats()
    }

    pub fn risk_distribution(&self) -> RiskDistribution {
        self.snapshot().get_risk_distribution()
    }

    pub fn safe_zones(&self, threshold: f64) -> Vec<RiskNode> {
        self.snapshot()
            .find_safe_zones(threshold)
            .into_iter()
            .cloned()
            .collect()
    }

    pub fn danger_zones(&self, threshold: f64) -> Vec<RiskNode> {
        self.snapshot()
            .find_danger_zones(threshold)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Nodes within `radius_m` meters, nearest first, with their distances
    pub fn nodes_within_radius(
        &self,
        position: &Position,
        radius_m: f64,
    ) -> Result<Vec<(RiskNode, f64)>> {
        let snapshot = self.snapshot();
        let nearby = snapshot.nodes_within_radius(position, radius_m)?;
        Ok(nearby
            .into_iter()
            .map(|n| (n.node.clone(), n.distance))
            .collect())
    }

    /// Interpolated risk using the configured `k` and power
    pub fn interpolated_risk(&self, position: &Position) -> Result<f64> {
        self.interpolate(position).map(|result| result.risk)
    }

    pub fn interpolate(&self, position: &Position) -> Result<Interpolation> {
        interpolate(
            &self.snapshot(),
            position,
            self.config.interpolation_k,
            self.config.interpolation_power,
        )
    }

    pub fn interpolate_many(&self, positions: &[Position]) -> Vec<Result<f64>> {
        interpolate_many(
            &self.snapshot(),
            positions,
            self.config.interpolation_k,
            self.config.interpolation_power,
        )
    }

    pub fn safest_path(&self, start: &str, end: &str) -> Result<Route> {
        dijkstra_safest_path_with_budget(&self.snapshot(), start, end, self.config.search_budget())
    }

    pub fn k_safest_paths(&self, start: &str, end: &str, k: usize) -> Result<Vec<Route>> {
        find_k_safest_paths_with_budget(
            &self.snapshot(),
            start,
            end,
            k,
            self.config.search_budget(),
        )
    }

    pub fn is_reachable(&self, start: &str, end: &str, max_risk: f64) -> Result<bool> {
        is_reachable_with_budget(
            &self.snapshot(),
            start,
            end,
            max_risk,
            self.config.search_budget(),
        )
    }

    pub fn reachable_nodes(&self, start: &str, max_risk: f64) -> Result<Vec<ReachableNode>> {
        get_reachable_nodes_with_budget(
            &self.snapshot(),
            start,
            max_risk,
            self.config.search_budget(),
        )
    }

    /// Safety report for the safest route between two nodes
    pub fn route_safety(&self, start: &str, end: &str) -> Result<RouteSafetyReport> {
        self.safest_path(start, end)
            .map(|route| analyze_route_safety(&route))
    }

    /// Up to `k` alternatives, ranked; all searched on one snapshot
    pub fn ranked_alternatives(
        &self,
        start: &str,
        end: &str,
        k: usize,
    ) -> Result<Vec<RankedRoute>> {
        self.k_safest_paths(start, end, k).map(|routes| compare_routes(&routes))
    }

    pub fn bottlenecks(&self, threshold: f64) -> Vec<Bottleneck> {
        find_bottlenecks(&self.snapshot(), threshold)
    }

    /// Travel time along the safest route using the configured slowdown model
    pub fn travel_time(
        &self,
        start: &str,
        end: &str,
        base_speed: f64,
    ) -> Result<TravelTimeEstimate> {
        let route = self.safest_path(start, end)?;
        estimate_travel_time_with(&route, base_speed, &TravelTimeModel::from(&self.config))
    }
}
