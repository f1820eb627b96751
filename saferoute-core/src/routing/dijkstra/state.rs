use std::cmp::Ordering;

use petgraph::graph::NodeIndex;

/// Best known way of reaching a node
#[derive(Copy, Clone, Debug, PartialEq)]
pub(crate) struct Label {
    pub(crate) risk: f64,
    pub(crate) distance: f64,
}

impl Label {
    pub(crate) const ORIGIN: Label = Label {
        risk: 0.0,
        distance: 0.0,
    };

    /// Cumulative risk first, shorter distance on equal risk
    pub(crate) fn cmp_cost(&self, other: &Label) -> Ordering {
        self.risk
            .total_cmp(&other.risk)
            .then(self.distance.total_cmp(&other.distance))
    }
}

#[derive(Copy, Clone, Debug)]
pub(super) struct State {
    pub(super) label: Label,
    pub(super) node: NodeIndex,
}

impl PartialEq for State {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for State {}

// Implement Ord for State to use in BinaryHeap
impl Ord for State {
    fn cmp(&self, other: &Self) -> Ordering {
        // Min-heap by cost (reversed from standard Rust BinaryHeap)
        other
            .label
            .cmp_cost(&self.label)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for State {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
