//! Safest-path search between two nodes

use crate::{
    Error, Result, RiskGraph,
    routing::{
        Route, SearchBudget,
        dijkstra::{Restrictions, risk_dijkstra},
    },
};

/// Finds the route from `start` to `end` with the lowest total edge risk.
///
/// Equal-risk routes are ordered by total distance, then by their node ids
/// in sequence. `start == end` yields a route without segments.
///
/// # Errors
///
/// `NodeNotFound` for an unknown endpoint, `Unreachable` if `end` cannot be
/// reached from `start`, `SearchBudgetExceeded` if the default budget runs out
pub fn dijkstra_safest_path(graph: &RiskGraph, start: &str, end: &str) -> Result<Route> {
    dijkstra_safest_path_with_budget(graph, start, end, SearchBudget::default())
}

pub fn dijkstra_safest_path_with_budget(
    graph: &RiskGraph,
    start: &str,
    end: &str,
    budget: SearchBudget,
) -> Result<Route> {
    let source = graph.index_of(start)?;
    let target = graph.index_of(end)?;
    let mut tracker = budget.tracker(graph, 1);

    let tree = risk_dijkstra(
        graph,
        source,
        Some(target),
        &Restrictions::default(),
        &mut tracker,
    )?;
    let path = tree.path_to(target).ok_or_else(|| Error::Unreachable {
        from: start.to_string(),
        to: end.to_string(),
    })?;

    Route::from_indices(graph, &path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{EdgeData, GraphData, NodeData};

    fn diamond() -> RiskGraph {
        RiskGraph::from_data(&GraphData {
            nodes: vec![
                NodeData::new("START", 0.0, 0.0, 0.1),
                NodeData::new("A", 0.001, 0.001, 0.1),
                NodeData::new("B", -0.001, 0.001, 0.5),
                NodeData::new("END", 0.0, 0.002, 0.1),
                NodeData::new("ISLAND", 0.01, 0.01, 0.0),
            ],
            edges: vec![
                EdgeData::directed("START", "A", 150.0, 0.1),
                EdgeData::directed("A", "END", 150.0, 0.1),
                EdgeData::directed("START", "B", 100.0, 0.5),
                EdgeData::directed("B", "END", 100.0, 0.1),
            ],
        })
        .unwrap()
    }

    #[test]
    fn test_prefers_low_risk_over_short() {
        let route = dijkstra_safest_path(&diamond(), "START", "END").unwrap();
        assert_eq!(route.nodes, vec!["START", "A", "END"]);
        assert!((route.total_risk - 0.2).abs() < 1e-9);
        assert_eq!(route.total_distance, 300.0);
        assert_eq!(route.segments.len(), 2);
    }

    #[test]
    fn test_unreachable_and_missing() {
        let g = diamond();
        assert!(matches!(
            dijkstra_safest_path(&g, "START", "ISLAND"),
            Err(Error::Unreachable { .. })
        ));
        // Directed edges only lead away from START
        assert!(matches!(
            dijkstra_safest_path(&g, "END", "START"),
            Err(Error::Unreachable { .. })
        ));
        assert!(matches!(
            dijkstra_safest_path(&g, "START", "NOWHERE"),
            Err(Error::NodeNotFound(id)) if id == "NOWHERE"
        ));
    }

    #[test]
    fn test_same_start_and_end() {
        let route = dijkstra_safest_path(&diamond(), "A", "A").unwrap();
        assert_eq!(route.nodes, vec!["A"]);
        assert_eq!(route.total_risk, 0.0);
    }

    #[test]
    fn test_equal_risk_prefers_shorter_distance() {
        let g = RiskGraph::from_data(&GraphData {
            nodes: vec![
                NodeData::new("s", 0.0, 0.0, 0.0),
                NodeData::new("long", 0.0, 0.001, 0.0),
                NodeData::new("short", 0.0, 0.002, 0.0),
                NodeData::new("t", 0.0, 0.003, 0.0),
            ],
            edges: vec![
                EdgeData::undirected("s", "long", 500.0, 0.25),
                EdgeData::undirected("long", "t", 500.0, 0.25),
                EdgeData::undirected("s", "short", 100.0, 0.25),
                EdgeData::undirected("short", "t", 100.0, 0.25),
            ],
        })
        .unwrap();
        let route = dijkstra_safest_path(&g, "s", "t").unwrap();
        assert_eq!(route.nodes, vec!["s", "short", "t"]);
    }

    #[test]
    fn test_full_tie_prefers_lexical_path() {
        let g = RiskGraph::from_data(&GraphData {
            nodes: vec![
                NodeData::new("s", 0.0, 0.0, 0.0),
                NodeData::new("y", 0.0, 0.001, 0.0),
                NodeData::new("x", 0.0, 0.002, 0.0),
                NodeData::new("t", 0.0, 0.003, 0.0),
            ],
            edges: vec![
                EdgeData::undirected("s", "y", 100.0, 0.25),
                EdgeData::undirected("y", "t", 100.0, 0.25),
                EdgeData::undirected("s", "x", 100.0, 0.25),
                EdgeData::undirected("x", "t", 100.0, 0.25),
            ],
        })
        .unwrap();
        let route = dijkstra_safest_path(&g, "s", "t").unwrap();
        assert_eq!(route.nodes, vec!["s", "x", "t"]);
    }

    #[test]
    fn test_budget_exhaustion() {
        let err = dijkstra_safest_path_with_budget(
            &diamond(),
            "START",
            "END",
            SearchBudget::with_max_expansions(1),
        )
        .unwrap_err();
        assert!(matches!(err, Error::SearchBudgetExceeded { .. }));
    }
}
