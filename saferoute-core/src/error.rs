use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Node not found: {0}")]
    NodeNotFound(String),
    #[error("Edge not found: {from} -> {to}")]
    EdgeNotFound { from: String, to: String },
    #[error("No route from {from} to {to}")]
    Unreachable { from: String, to: String },
    #[error("Invalid risk value {value} on {subject}, expected a number in [0, 1]")]
    InvalidRiskValue { subject: String, value: f64 },
    #[error("Graph has no nodes")]
    EmptyGraph,
    #[error("Duplicate node id: {0}")]
    DuplicateNode(String),
    #[error("Duplicate edge: {from} -> {to}")]
    DuplicateEdge { from: String, to: String },
    #[error("Edge {from} -> {to} references unknown node {missing}")]
    DanglingEdge {
        from: String,
        to: String,
        missing: String,
    },
    #[error("Invalid data: {0}")]
    InvalidData(String),
    #[error("Search budget exceeded after expanding {expanded} nodes")]
    SearchBudgetExceeded { expanded: usize },
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
    /// True for the "no result" outcomes of a query, as opposed to bad input.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Error::NodeNotFound(_) | Error::EdgeNotFound { .. } | Error::Unreachable { .. }
        )
    }
}
