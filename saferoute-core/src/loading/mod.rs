//! This module is responsible for validating graph snapshots supplied by
//! an external loader and building the indexed risk graph from them.

mod builder;

pub use builder::build_graph;
