use hashbrown::{HashMap, hash_map::Entry};
use log::{debug, info, warn};
use petgraph::graph::{DiGraph, NodeIndex};
use rstar::RTree;

use crate::model::{
    GraphData, IndexedPoint, Position, RiskEdge, RiskGraph, RiskNode, components::validate_risk,
};
use crate::{Error, Result};

/// Validates a snapshot payload and builds a complete graph from it.
///
/// Nothing outside the returned value is touched, so a rejected payload
/// cannot leave a half-built graph behind.
///
/// # Errors
///
/// Returns the first validation problem found: duplicate node ids,
/// dangling or duplicate edges, risks outside [0, 1], invalid distances
/// or coordinates
pub fn build_graph(data: &GraphData) -> Result<RiskGraph> {
    build_inner(data).inspect_err(|e| warn!("Rejected graph snapshot: {e}"))
}

fn build_inner(data: &GraphData) -> Result<RiskGraph> {
    let mut graph: DiGraph<RiskNode, RiskEdge> =
        DiGraph::with_capacity(data.nodes.len(), data.edges.len() * 2);
    let mut id_index: HashMap<String, NodeIndex> = HashMap::with_capacity(data.nodes.len());

    for node in &data.nodes {
        if node.id.is_empty() {
            return Err(Error::InvalidData("node with empty id".to_string()));
        }
        validate_risk(|| format!("node {}", node.id), node.risk)?;
        let position = Position::new(node.lat, node.lon);
        position.validate().map_err(|e| match e {
            Error::InvalidData(msg) => Error::InvalidData(format!("node {}: {msg}", node.id)),
            other => other,
        })?;

        match id_index.entry(node.id.clone()) {
            Entry::Occupied(_) => return Err(Error::DuplicateNode(node.id.clone())),
            Entry::Vacant(entry) => {
                let idx = graph.add_node(RiskNode {
                    id: node.id.clone(),
                    position,
                    risk: node.risk,
                    metadata: node.metadata.clone(),
                });
                entry.insert(idx);
            }
        }
    }

    let mut edge_index = HashMap::with_capacity(data.edges.len() * 2);
    for edge in &data.edges {
        let resolve = |id: &str| {
            id_index.get(id).copied().ok_or_else(|| Error::DanglingEdge {
                from: edge.from.clone(),
                to: edge.to.clone(),
                missing: id.to_string(),
            })
        };
        let source = resolve(&edge.from)?;
        let target = resolve(&edge.to)?;

        if source == target {
            return Err(Error::InvalidData(format!("self-loop edge on {}", edge.from)));
        }
        validate_risk(|| format!("edge {} -> {}", edge.from, edge.to), edge.risk)?;
        if !edge.distance.is_finite() || edge.distance <= 0.0 {
            return Err(Error::InvalidData(format!(
                "edge {} -> {} has invalid distance {}",
                edge.from, edge.to, edge.distance
            )));
        }

        let weight = RiskEdge {
            distance: edge.distance,
            risk: edge.risk,
            directed: edge.directed,
        };
        let mut traversals = vec![(source, target, &edge.from, &edge.to)];
        if !edge.directed {
            traversals.push((target, source, &edge.to, &edge.from));
        }

        for (a, b, from, to) in traversals {
            match edge_index.entry((a, b)) {
                Entry::Occupied(_) => {
                    return Err(Error::DuplicateEdge {
                        from: from.clone(),
                        to: to.clone(),
                    });
                }
                Entry::Vacant(entry) => {
                    entry.insert(graph.add_edge(a, b, weight));
                }
            }
        }
    }

    let points: Vec<IndexedPoint> = graph
        .node_indices()
        .map(|idx| {
            let position = graph[idx].position;
            IndexedPoint::new([position.lon, position.lat], idx)
        })
        .collect();
    let rtree = RTree::bulk_load(points);
    debug!("Spatial index built over {} nodes", graph.node_count());

    info!(
        "Graph snapshot built: {} nodes, {} edges ({} traversals)",
        graph.node_count(),
        data.edges.len(),
        graph.edge_count()
    );

    Ok(RiskGraph {
        graph,
        id_index,
        edge_index,
        rtree,
        edge_count: data.edges.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{EdgeData, NodeData};

    fn nodes() -> Vec<NodeData> {
        vec![
            NodeData::new("a", 0.0, 0.0, 0.1),
            NodeData::new("b", 0.0, 0.01, 0.2),
        ]
    }

    #[test]
    fn test_builds_both_traversals_for_undirected_edge() {
        let data = GraphData {
            nodes: nodes(),
            edges: vec![EdgeData::undirected("a", "b", 10.0, 0.3)],
        };
        let g = build_graph(&data).unwrap();
        assert_eq!(g.graph.edge_count(), 2);
        assert_eq!(g.edge_count(), 1);
    }

    #[test]
    fn test_rejects_duplicate_node() {
        let mut n = nodes();
        n.push(NodeData::new("a", 1.0, 1.0, 0.5));
        let data = GraphData { nodes: n, edges: vec![] };
        assert!(matches!(build_graph(&data), Err(Error::DuplicateNode(id)) if id == "a"));
    }

    #[test]
    fn test_rejects_dangling_edge() {
        let data = GraphData {
            nodes: nodes(),
            edges: vec![EdgeData::directed("a", "ghost", 10.0, 0.3)],
        };
        match build_graph(&data) {
            Err(Error::DanglingEdge { missing, .. }) => assert_eq!(missing, "ghost"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_rejects_out_of_range_risks() {
        let mut n = nodes();
        n[1].risk = -0.1;
        let data = GraphData { nodes: n, edges: vec![] };
        assert!(matches!(build_graph(&data), Err(Error::InvalidRiskValue { .. })));

        let data = GraphData {
            nodes: nodes(),
            edges: vec![EdgeData::directed("a", "b", 10.0, 1.2)],
        };
        assert!(matches!(build_graph(&data), Err(Error::InvalidRiskValue { .. })));
    }

    #[test]
    fn test_rejects_bad_distance_and_self_loop() {
        let data = GraphData {
            nodes: nodes(),
            edges: vec![EdgeData::directed("a", "b", 0.0, 0.2)],
        };
        assert!(matches!(build_graph(&data), Err(Error::InvalidData(_))));

        let data = GraphData {
            nodes: nodes(),
            edges: vec![EdgeData::directed("a", "a", 5.0, 0.2)],
        };
        assert!(matches!(build_graph(&data), Err(Error::InvalidData(_))));
    }

    #[test]
    fn test_rejects_overlapping_edges() {
        let data = GraphData {
            nodes: nodes(),
            edges: vec![
                EdgeData::undirected("a", "b", 10.0, 0.2),
                EdgeData::directed("b", "a", 12.0, 0.4),
            ],
        };
        assert!(matches!(
            build_graph(&data),
            Err(Error::DuplicateEdge { from, to }) if from == "b" && to == "a"
        ));
    }

    #[test]
    fn test_opposite_directed_edges_are_distinct() {
        let data = GraphData {
            nodes: nodes(),
            edges: vec![
                EdgeData::directed("a", "b", 10.0, 0.2),
                EdgeData::directed("b", "a", 12.0, 0.4),
            ],
        };
        let g = build_graph(&data).unwrap();
        assert_eq!(g.get_edge_risk("b", "a").unwrap(), 0.4);
        assert_eq!(g.edge_count(), 2);
    }

    #[test]
    fn test_empty_payload_is_valid() {
        let g = build_graph(&GraphData::default()).unwrap();
        assert!(g.is_empty());
    }
}
