// Core types
pub use crate::{EngineConfig, Error, Position, Result, RiskBand, RiskEdge, RiskGraph, RiskNode};
pub use crate::{RiskEngine, Snapshot, SnapshotInfo};

// Input snapshot
pub use crate::model::{EdgeData, GraphData, NodeData};

// Path search
pub use crate::routing::{
    ReachableNode, Route, RouteSegment, SearchBudget, dijkstra_safest_path, find_k_safest_paths,
    get_reachable_nodes, is_reachable,
};

// Interpolation and heatmap zones
pub use crate::algo::{
    HeatmapZone, ScoredIncident, aggregate_zones, get_interpolated_risk, interpolate_many,
};

// Route analysis
pub use crate::analysis::{
    Bottleneck, RankedRoute, RouteSafetyReport, TravelTimeEstimate, analyze_route_safety,
    compare_routes, estimate_travel_time, find_bottlenecks,
};
