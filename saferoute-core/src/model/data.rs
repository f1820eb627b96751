//! Graph snapshot payload accepted by the loader

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use crate::Error;

/// Full graph snapshot as supplied by an external loader
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphData {
    #[serde(default)]
    pub nodes: Vec<NodeData>,
    #[serde(default)]
    pub edges: Vec<EdgeData>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeData {
    pub id: String,
    pub lat: f64,
    pub lon: f64,
    pub risk: f64,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub metadata: Map<String, JsonValue>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EdgeData {
    pub from: String,
    pub to: String,
    pub distance: f64,
    pub risk: f64,
    #[serde(default)]
    pub directed: bool,
}

impl NodeData {
    pub fn new(id: impl Into<String>, lat: f64, lon: f64, risk: f64) -> Self {
        Self {
            id: id.into(),
            lat,
            lon,
            risk,
            metadata: Map::new(),
        }
    }
}

impl EdgeData {
    pub fn undirected(
        from: impl Into<String>,
        to: impl Into<String>,
        distance: f64,
        risk: f64,
    ) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            distance,
            risk,
            directed: false,
        }
    }

    pub fn directed(
        from: impl Into<String>,
        to: impl Into<String>,
        distance: f64,
        risk: f64,
    ) -> Self {
        Self {
            directed: true,
            ..Self::undirected(from, to, distance, risk)
        }
    }
}

impl GraphData {
    pub fn from_json_str(json: &str) -> Result<Self, Error> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: &Path) -> Result<Self, Error> {
        let file = File::open(path).map_err(|e| {
            std::io::Error::new(
                e.kind(),
                format!("Failed to open file '{}': {}", path.display(), e),
            )
        })?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }
}
