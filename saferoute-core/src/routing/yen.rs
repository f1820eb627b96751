//! Alternative routes: k safest loopless paths (Yen's algorithm)

use fixedbitset::FixedBitSet;
use hashbrown::HashSet;
use log::debug;
use petgraph::graph::NodeIndex;

use crate::{
    Result, RiskGraph,
    routing::{
        Route, SearchBudget,
        dijkstra::{Label, Restrictions, risk_dijkstra},
    },
};

/// Path kept in the result set or the candidate pool
struct Candidate {
    nodes: Vec<NodeIndex>,
    route: Route,
}

impl Candidate {
    fn new(graph: &RiskGraph, nodes: Vec<NodeIndex>) -> Result<Self> {
        let route = Route::from_indices(graph, &nodes)?;
        Ok(Self { nodes, route })
    }

    fn label(&self) -> Label {
        Label {
            risk: self.route.total_risk,
            distance: self.route.total_distance,
        }
    }
}

/// Finds up to `k` distinct loopless routes from `start` to `end` in
/// non-decreasing order of total risk.
///
/// Uses Yen's algorithm with the risk Dijkstra as the spur search. Fewer
/// than `k` routes are returned when fewer exist. The number of spur
/// searches is capped at `k * node_count`; when the cap is hit the routes
/// found so far are returned.
///
/// # Errors
///
/// `NodeNotFound` for an unknown endpoint, `Unreachable` if no route exists
/// at all, `SearchBudgetExceeded` if the budget runs out
pub fn find_k_safest_paths(
    graph: &RiskGraph,
    start: &str,
    end: &str,
    k: usize,
) -> Result<Vec<Route>> {
    find_k_safest_paths_with_budget(graph, start, end, k, SearchBudget::default())
}

pub fn find_k_safest_paths_with_budget(
    graph: &RiskGraph,
    start: &str,
    end: &str,
    k: usize,
    budget: SearchBudget,
) -> Result<Vec<Route>> {
    let source = graph.index_of(start)?;
    let target = graph.index_of(end)?;
    if k == 0 {
        return Ok(Vec::new());
    }

    let max_spur_searches = k.saturating_mul(graph.node_count());
    let mut tracker = budget.tracker(graph, max_spur_searches.max(1));

    // A[0]: the safest route
    let first_tree = risk_dijkstra(
        graph,
        source,
        Some(target),
        &Restrictions::default(),
        &mut tracker,
    )?;
    let first = first_tree
        .path_to(target)
        .ok_or_else(|| crate::Error::Unreachable {
            from: start.to_string(),
            to: end.to_string(),
        })?;

    let mut result: Vec<Candidate> = vec![Candidate::new(graph, first)?];
    let mut candidates: Vec<Candidate> = Vec::new();
    let mut spur_searches = 0usize;

    'rounds: for ki in 1..k {
        let prev_nodes = result[ki - 1].nodes.clone();

        // Every node of the previous route except the last can be a spur node
        for spur_idx in 0..prev_nodes.len().saturating_sub(1) {
            if spur_searches >= max_spur_searches {
                debug!("Spur search cap of {max_spur_searches} reached");
                break 'rounds;
            }
            spur_searches += 1;
            tracker.check_deadline()?;

            let spur_node = prev_nodes[spur_idx];
            let root = &prev_nodes[..=spur_idx];

            // Block the next hop of every selected route sharing this root
            let excluded_edges: HashSet<(NodeIndex, NodeIndex)> = result
                .iter()
                .filter(|path| path.nodes.len() > spur_idx + 1 && path.nodes[..=spur_idx] == *root)
                .map(|path| (path.nodes[spur_idx], path.nodes[spur_idx + 1]))
                .collect();

            // Root nodes other than the spur node keep the route loopless
            let mut excluded_nodes = FixedBitSet::with_capacity(graph.node_count());
            for node in &root[..spur_idx] {
                excluded_nodes.insert(node.index());
            }

            let restrictions = Restrictions {
                excluded_nodes: Some(&excluded_nodes),
                excluded_edges: Some(&excluded_edges),
                max_risk: None,
            };
            let tree = risk_dijkstra(graph, spur_node, Some(target), &restrictions, &mut tracker)?;
            let Some(spur_path) = tree.path_to(target) else {
                continue;
            };

            let mut nodes = root.to_vec();
            nodes.extend(spur_path.into_iter().skip(1));

            let is_dup = result
                .iter()
                .chain(candidates.iter())
                .any(|c| c.nodes == nodes);
            if !is_dup {
                candidates.push(Candidate::new(graph, nodes)?);
            }
        }

        debug!(
            "Round {ki}: {} candidate routes after {spur_searches} spur searches",
            candidates.len()
        );

        // Pick the safest candidate; equal cost goes to the lexically smaller route
        let Some(best) = candidates
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| {
                a.label()
                    .cmp_cost(&b.label())
                    .then_with(|| a.route.nodes.cmp(&b.route.nodes))
            })
            .map(|(i, _)| i)
        else {
            break;
        };
        result.push(candidates.swap_remove(best));
    }

    Ok(result.into_iter().map(|c| c.route).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use crate::model::{EdgeData, GraphData, NodeData};

    /// Three parallel corridors of increasing risk plus a cross link
    fn corridors() -> RiskGraph {
        RiskGraph::from_data(&GraphData {
            nodes: vec![
                NodeData::new("s", 0.0, 0.0, 0.0),
                NodeData::new("a", 0.001, 0.001, 0.0),
                NodeData::new("b", 0.0, 0.001, 0.0),
                NodeData::new("c", -0.001, 0.001, 0.0),
                NodeData::new("t", 0.0, 0.002, 0.0),
            ],
            edges: vec![
                EdgeData::undirected("s", "a", 100.0, 0.125),
                EdgeData::undirected("a", "t", 100.0, 0.125),
                EdgeData::undirected("s", "b", 100.0, 0.25),
                EdgeData::undirected("b", "t", 100.0, 0.25),
                EdgeData::undirected("s", "c", 100.0, 0.5),
                EdgeData::undirected("c", "t", 100.0, 0.5),
                EdgeData::undirected("a", "b", 50.0, 0.0625),
            ],
        })
        .unwrap()
    }

    fn ids(route: &Route) -> Vec<&str> {
        route.nodes.iter().map(String::as_str).collect()
    }

    #[test]
    fn test_first_route_is_safest() {
        let g = corridors();
        let routes = find_k_safest_paths(&g, "s", "t", 1).unwrap();
        assert_eq!(routes.len(), 1);
        assert_eq!(ids(&routes[0]), vec!["s", "a", "t"]);
    }

    #[test]
    fn test_routes_sorted_and_distinct() {
        let g = corridors();
        let routes = find_k_safest_paths(&g, "s", "t", 6).unwrap();
        assert!(routes.len() >= 4);
        // s-a-b-t and s-b-a-t tie on risk and distance; ids decide
        assert_eq!(routes[1].total_risk, 0.4375);
        for pair in routes.windows(2) {
            assert!(pair[0].total_risk <= pair[1].total_risk + 1e-12);
        }
        for (i, a) in routes.iter().enumerate() {
            for b in &routes[i + 1..] {
                assert_ne!(a.nodes, b.nodes);
            }
            let mut seen = a.nodes.clone();
            seen.sort();
            seen.dedup();
            assert_eq!(seen.len(), a.nodes.len(), "route has a loop: {:?}", a.nodes);
        }
        assert_eq!(ids(&routes[1]), vec!["s", "a", "b", "t"]);
    }

    #[test]
    fn test_exhausts_small_graph() {
        let g = RiskGraph::from_data(&GraphData {
            nodes: vec![
                NodeData::new("s", 0.0, 0.0, 0.0),
                NodeData::new("m", 0.0, 0.001, 0.0),
                NodeData::new("t", 0.0, 0.002, 0.0),
            ],
            edges: vec![
                EdgeData::directed("s", "m", 10.0, 0.1),
                EdgeData::directed("m", "t", 10.0, 0.1),
                EdgeData::directed("s", "t", 30.0, 0.5),
            ],
        })
        .unwrap();
        let routes = find_k_safest_paths(&g, "s", "t", 10).unwrap();
        assert_eq!(routes.len(), 2);
        assert_eq!(ids(&routes[1]), vec!["s", "t"]);
    }

    #[test]
    fn test_zero_k_and_errors() {
        let g = corridors();
        assert!(find_k_safest_paths(&g, "s", "t", 0).unwrap().is_empty());
        assert!(matches!(
            find_k_safest_paths(&g, "s", "zz", 3),
            Err(Error::NodeNotFound(_))
        ));
    }
}
