//! Risk-aware graph engine.
//!
//! A [`RiskGraph`] holds geographic zones (nodes) and connectors (edges),
//! each scored with a risk in `[0, 1]`. On top of it the crate answers
//! safest-path and alternative-route queries, bounded reachability, spatial
//! risk interpolation, and route-level analysis. [`RiskEngine`] shares one
//! graph between threads and replaces it atomically on reload.

pub mod algo;
pub mod analysis;
pub mod config;
pub mod engine;
pub mod error;
pub mod loading;
pub mod model;
pub mod prelude;
pub mod routing;

pub use config::EngineConfig;
pub use engine::{RiskEngine, Snapshot, SnapshotInfo};
pub use error::{Error, Result};
pub use model::{Position, RiskBand, RiskEdge, RiskGraph, RiskNode};
