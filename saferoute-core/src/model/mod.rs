//! Data model for risk-aware routing
//!
//! Contains types and structures for representing a graph of zones and
//! connectors carrying risk scores.

pub mod components;
pub mod data;
pub mod graph;
pub mod stats;

pub use components::{Position, RiskBand, RiskEdge, RiskNode};
pub use data::{EdgeData, GraphData, NodeData};
pub use graph::{EdgeRecord, IndexedPoint, NearbyNode, Neighbor, RiskGraph};
pub use stats::{BandCounts, RiskDistribution, RiskStats};
