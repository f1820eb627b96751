use std::{cmp::Ordering, collections::BinaryHeap};

use fixedbitset::FixedBitSet;
use hashbrown::{HashMap, HashSet, hash_map::Entry};
use petgraph::graph::NodeIndex;

use super::state::{Label, State};
use crate::{Result, RiskGraph, routing::budget::BudgetTracker};

/// Relative slack on a risk ceiling, absorbing rounding in summed edge risks.
/// A zero ceiling stays exact.
const RISK_CEILING_TOLERANCE: f64 = 1e-9;

/// Parts of the graph a search may not use
#[derive(Default)]
pub(crate) struct Restrictions<'a> {
    /// Nodes that cannot be entered
    pub(crate) excluded_nodes: Option<&'a FixedBitSet>,
    /// Directed traversals that cannot be taken
    pub(crate) excluded_edges: Option<&'a HashSet<(NodeIndex, NodeIndex)>>,
    /// Ceiling on cumulative risk of any reached node
    pub(crate) max_risk: Option<f64>,
}

impl Restrictions<'_> {
    fn exceeds_ceiling(&self, risk: f64) -> bool {
        self.max_risk.is_some_and(|max| risk > max * (1.0 + RISK_CEILING_TOLERANCE))
    }

    fn allows(&self, from: NodeIndex, to: NodeIndex) -> bool {
        !self
            .excluded_nodes
            .is_some_and(|nodes| nodes.contains(to.index()))
            && !self
                .excluded_edges
                .is_some_and(|edges| edges.contains(&(from, to)))
    }
}

/// Shortest-path tree produced by [`risk_dijkstra`]
#[derive(Debug)]
pub(crate) struct SearchTree {
    start: NodeIndex,
    labels: HashMap<NodeIndex, Label>,
    predecessors: HashMap<NodeIndex, NodeIndex>,
}

impl SearchTree {
    pub(crate) fn label(&self, node: NodeIndex) -> Option<Label> {
        self.labels.get(&node).copied()
    }

    pub(crate) fn labels(&self) -> impl Iterator<Item = (NodeIndex, Label)> + '_ {
        self.labels.iter().map(|(&node, &label)| (node, label))
    }

    /// Node sequence from the start to `target`, if it was reached
    pub(crate) fn path_to(&self, target: NodeIndex) -> Option<Vec<NodeIndex>> {
        self.labels.contains_key(&target).then(|| {
            trace(&self.predecessors, self.start, target)
        })
    }
}

/// Follow predecessors backward from `node` to `start`
fn trace(
    predecessors: &HashMap<NodeIndex, NodeIndex>,
    start: NodeIndex,
    node: NodeIndex,
) -> Vec<NodeIndex> {
    let mut path = vec![node];
    let mut current = node;
    while current != start {
        match predecessors.get(&current) {
            Some(&prev) => {
                path.push(prev);
                current = prev;
            }
            None => break,
        }
    }
    path.reverse();
    path
}

/// Lexical comparison of the id sequences leading to `a` and `b`
fn cmp_paths(
    graph: &RiskGraph,
    predecessors: &HashMap<NodeIndex, NodeIndex>,
    start: NodeIndex,
    a: NodeIndex,
    b: NodeIndex,
) -> Ordering {
    let pa = trace(predecessors, start, a);
    let pb = trace(predecessors, start, b);
    pa.iter()
        .map(|&n| graph.id_at(n))
        .cmp(pb.iter().map(|&n| graph.id_at(n)))
}

/// Dijkstra's algorithm over edge risk.
///
/// Labels are ordered by cumulative risk, then cumulative distance. Exact
/// ties keep the predecessor whose path is lexically smaller by node id,
/// so results do not depend on adjacency order. Edge distances are
/// strictly positive, so a node's label can only tie with a candidate
/// coming from an already settled node.
///
/// With a `target`, the search stops once the target is settled; labels
/// of other nodes may then be tentative.
pub(crate) fn risk_dijkstra(
    graph: &RiskGraph,
    start: NodeIndex,
    target: Option<NodeIndex>,
    restrictions: &Restrictions<'_>,
    tracker: &mut BudgetTracker,
) -> Result<SearchTree> {
    let estimated_nodes = graph.node_count().min(1000);
    let mut labels: HashMap<NodeIndex, Label> = HashMap::with_capacity(estimated_nodes);
    let mut predecessors: HashMap<NodeIndex, NodeIndex> = HashMap::with_capacity(estimated_nodes);
    let mut settled = FixedBitSet::with_capacity(graph.node_count());
    let mut heap = BinaryHeap::with_capacity(estimated_nodes / 4);

    labels.insert(start, Label::ORIGIN);
    heap.push(State {
        label: Label::ORIGIN,
        node: start,
    });

    while let Some(State { label, node }) = heap.pop() {
        // Stale heap entry for a node that already has its final label
        if settled.put(node.index()) {
            continue;
        }
        tracker.expand()?;

        if target == Some(node) {
            break;
        }

        for (next, edge) in graph.outgoing(node) {
            if settled.contains(next.index()) || !restrictions.allows(node, next) {
                continue;
            }

            let next_label = Label {
                risk: label.risk + edge.risk,
                distance: label.distance + edge.distance,
            };
            if restrictions.exceeds_ceiling(next_label.risk) {
                continue;
            }

            match labels.entry(next) {
                Entry::Vacant(entry) => {
                    entry.insert(next_label);
                    predecessors.insert(next, node);
                    heap.push(State {
                        label: next_label,
                        node: next,
                    });
                }
                Entry::Occupied(mut entry) => match next_label.cmp_cost(entry.get()) {
                    Ordering::Less => {
                        *entry.get_mut() = next_label;
                        predecessors.insert(next, node);
                        heap.push(State {
                            label: next_label,
                            node: next,
                        });
                    }
                    Ordering::Equal => {
                        if let Some(&current) = predecessors.get(&next) {
                            if cmp_paths(graph, &predecessors, start, node, current)
                                == Ordering::Less
                            {
                                predecessors.insert(next, node);
                            }
                        }
                    }
                    Ordering::Greater => {}
                },
            }
        }
    }

    log::trace!(
        "Risk search from {} reached {} nodes after {} expansions",
        graph.id_at(start),
        labels.len(),
        tracker.expanded()
    );

    Ok(SearchTree {
        start,
        labels,
        predecessors,
    })
}
