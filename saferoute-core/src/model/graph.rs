//! Risk graph: zones, connectors and lookup indices over one snapshot

use std::path::Path;

use hashbrown::HashMap;
use itertools::Itertools;
use petgraph::{
    Direction,
    graph::{DiGraph, EdgeIndex, NodeIndex},
    visit::EdgeRef,
};
use rstar::{AABB, RTree, primitives::GeomWithData};
use serde::Serialize;

use super::components::{Position, RiskEdge, RiskNode};
use super::data::GraphData;
use super::stats::{BandCounts, RiskDistribution, RiskStats};
use crate::{Error, Result, loading::build_graph};

/// Node position in the spatial index (`[lon, lat]`)
pub type IndexedPoint = GeomWithData<[f64; 2], NodeIndex>;

/// Meters per degree of latitude on the mean-radius sphere
pub(crate) const METERS_PER_DEGREE: f64 = 111_195.08;

/// Immutable risk graph snapshot
///
/// Nodes live in a `petgraph` arena; string ids resolve to arena indices
/// through `id_index`, and every directed traversal resolves through
/// `edge_index`, so point lookups are O(1).
#[derive(Debug, Clone)]
pub struct RiskGraph {
    pub(crate) graph: DiGraph<RiskNode, RiskEdge>,
    pub(crate) id_index: HashMap<String, NodeIndex>,
    pub(crate) edge_index: HashMap<(NodeIndex, NodeIndex), EdgeIndex>,
    pub(crate) rtree: RTree<IndexedPoint>,
    /// Logical edge count, undirected connectors counted once
    pub(crate) edge_count: usize,
}

/// Outgoing neighbor of a node
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Neighbor {
    pub id: String,
    pub edge_risk: f64,
    pub distance: f64,
}

/// Node found by a proximity query
#[derive(Debug, Clone, Serialize)]
pub struct NearbyNode<'a> {
    pub node: &'a RiskNode,
    /// Meters from the query position
    pub distance: f64,
}

/// Logical edge with resolved endpoint ids
#[derive(Debug, Clone, Copy, Serialize)]
pub struct EdgeRecord<'a> {
    pub from: &'a str,
    pub to: &'a str,
    #[serde(flatten)]
    pub edge: &'a RiskEdge,
}

impl Default for RiskGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl RiskGraph {
    /// Empty graph
    pub fn new() -> Self {
        Self {
            graph: DiGraph::new(),
            id_index: HashMap::new(),
            edge_index: HashMap::new(),
            rtree: RTree::new(),
            edge_count: 0,
        }
    }

    /// Validates `data` and builds a new graph from it
    ///
    /// # Errors
    ///
    /// Returns a validation error describing the first problem found
    pub fn from_data(data: &GraphData) -> Result<Self> {
        build_graph(data)
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        Self::from_data(&GraphData::from_json_str(json)?)
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        Self::from_data(&GraphData::from_json_file(path)?)
    }

    /// Replaces this graph with one built from `data`.
    /// On error the current contents stay untouched.
    pub fn load(&mut self, data: &GraphData) -> Result<()> {
        let fresh = Self::from_data(data)?;
        *self = fresh;
        Ok(())
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    pub fn node(&self, id: &str) -> Option<&RiskNode> {
        self.id_index.get(id).map(|&idx| &self.graph[idx])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.id_index.contains_key(id)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &RiskNode> {
        self.graph.node_weights()
    }

    /// Logical edges; an undirected connector is yielded once
    pub fn edges(&self) -> impl Iterator<Item = EdgeRecord<'_>> {
        self.graph
            .edge_references()
            .filter(|e| e.weight().directed || e.source() < e.target())
            .map(|e| EdgeRecord {
                from: &self.graph[e.source()].id,
                to: &self.graph[e.target()].id,
                edge: e.weight(),
            })
    }

    pub(crate) fn index_of(&self, id: &str) -> Result<NodeIndex> {
        self.id_index
            .get(id)
            .copied()
            .ok_or_else(|| Error::NodeNotFound(id.to_string()))
    }

    pub(crate) fn id_at(&self, idx: NodeIndex) -> &str {
        &self.graph[idx].id
    }

    /// Outgoing traversals of a node: (target, edge weight)
    pub(crate) fn outgoing(
        &self,
        idx: NodeIndex,
    ) -> impl Iterator<Item = (NodeIndex, &RiskEdge)> {
        self.graph
            .edges_directed(idx, Direction::Outgoing)
            .map(|e| (e.target(), e.weight()))
    }

    pub(crate) fn edge_between(&self, from: NodeIndex, to: NodeIndex) -> Option<&RiskEdge> {
        self.edge_index.get(&(from, to)).map(|&e| &self.graph[e])
    }

    /// Risk score of a node
    ///
    /// # Errors
    ///
    /// `NodeNotFound` if no node carries this id
    pub fn get_node_risk(&self, id: &str) -> Result<f64> {
        self.node(id)
            .map(|node| node.risk)
            .ok_or_else(|| Error::NodeNotFound(id.to_string()))
    }

    /// Risk score of the traversal `from -> to`
    ///
    /// # Errors
    ///
    /// `NodeNotFound` for an unknown endpoint, `EdgeNotFound` if both
    /// nodes exist but are not connected in this direction
    pub fn get_edge_risk(&self, from: &str, to: &str) -> Result<f64> {
        let source = self.index_of(from)?;
        let target = self.index_of(to)?;
        self.edge_between(source, target)
            .map(|edge| edge.risk)
            .ok_or_else(|| Error::EdgeNotFound {
                from: from.to_string(),
                to: to.to_string(),
            })
    }

    /// Ids of nodes reachable over one outgoing traversal, sorted
    pub fn get_connected_nodes(&self, id: &str) -> Result<Vec<&str>> {
        let idx = self.index_of(id)?;
        Ok(self
            .outgoing(idx)
            .map(|(target, _)| self.id_at(target))
            .sorted_unstable()
            .collect())
    }

    /// Neighbor reached over the lowest-risk outgoing edge.
    /// Ties go to the shorter edge, then to the smaller id.
    pub fn get_safest_neighbor(&self, id: &str) -> Result<Option<Neighbor>> {
        let idx = self.index_of(id)?;
        let best = self.outgoing(idx).min_by(|(a, ea), (b, eb)| {
            ea.risk
                .total_cmp(&eb.risk)
                .then(ea.distance.total_cmp(&eb.distance))
                .then_with(|| self.id_at(*a).cmp(self.id_at(*b)))
        });

        Ok(best.map(|(target, edge)| Neighbor {
            id: self.id_at(target).to_string(),
            edge_risk: edge.risk,
            distance: edge.distance,
        }))
    }

    /// Min/max/mean/std-dev of node risks
    ///
    /// # Errors
    ///
    /// `EmptyGraph` when no nodes are loaded
    pub fn get_stats(&self) -> Result<RiskStats> {
        let risks: Vec<f64> = self.nodes().map(|n| n.risk).collect();
        RiskStats::from_risks(&risks, self.edge_count).ok_or(Error::EmptyGraph)
    }

    pub fn get_risk_distribution(&self) -> RiskDistribution {
        RiskDistribution {
            nodes: self.nodes().map(|n| n.risk).collect::<BandCounts>(),
            edges: self.edges().map(|e| e.edge.risk).collect::<BandCounts>(),
        }
    }

    /// Nodes with risk <= `threshold`, safest first
    pub fn find_safe_zones(&self, threshold: f64) -> Vec<&RiskNode> {
        self.nodes()
            .filter(|n| n.risk <= threshold)
            .sorted_by(|a, b| a.risk.total_cmp(&b.risk).then_with(|| a.id.cmp(&b.id)))
            .collect()
    }

    /// Nodes with risk >= `threshold`, most dangerous first
    pub fn find_danger_zones(&self, threshold: f64) -> Vec<&RiskNode> {
        self.nodes()
            .filter(|n| n.risk >= threshold)
            .sorted_by(|a, b| b.risk.total_cmp(&a.risk).then_with(|| a.id.cmp(&b.id)))
            .collect()
    }

    /// Nodes within `radius_m` meters of `position`, nearest first
    pub fn nodes_within_radius(
        &self,
        position: &Position,
        radius_m: f64,
    ) -> Result<Vec<NearbyNode<'_>>> {
        position.validate()?;
        if !radius_m.is_finite() || radius_m < 0.0 {
            return Err(Error::InvalidData(format!("invalid radius {radius_m}")));
        }

        Ok(self
            .candidates_within(position, radius_m)
            .map(|point| {
                let node = &self.graph[point.data];
                NearbyNode {
                    node,
                    distance: position.distance_to(&node.position),
                }
            })
            .filter(|nearby| nearby.distance <= radius_m)
            .sorted_by(|a, b| {
                a.distance
                    .total_cmp(&b.distance)
                    .then_with(|| a.node.id.cmp(&b.node.id))
            })
            .collect())
    }

    /// Up to `count` nodes nearest to `position` by great-circle distance.
    ///
    /// The R-tree orders by planar degree distance, which shrinks east-west
    /// spans away from the equator. The planar nearest only seed a search
    /// radius; the final ranking covers every node inside that radius.
    pub(crate) fn nearest_nodes(&self, position: &Position, count: usize) -> Vec<(NodeIndex, f64)> {
        if count == 0 || self.rtree.size() == 0 {
            return Vec::new();
        }

        let seed_radius = self
            .rtree
            .nearest_neighbor_iter(&[position.lon, position.lat])
            .take(count)
            .map(|point| position.distance_to(&self.graph[point.data].position))
            .fold(0.0, f64::max);

        self.candidates_within(position, seed_radius)
            .map(|point| (point.data, position.distance_to(&self.graph[point.data].position)))
            .sorted_by(|(a, da), (b, db)| {
                da.total_cmp(db)
                    .then_with(|| self.id_at(*a).cmp(self.id_at(*b)))
            })
            .take(count)
            .collect()
    }

    /// Indexed points whose degree box may hold nodes within `radius_m`
    /// meters of `position`; callers refine by haversine.
    fn candidates_within<'a>(
        &'a self,
        position: &Position,
        radius_m: f64,
    ) -> impl Iterator<Item = &'a IndexedPoint> + 'a {
        let (dlat, dlon) = degree_extent(position.lat, radius_m);
        // Boxes past the antimeridian are shifted back into [-180, 180]
        let shifts: &[f64] = if dlon >= 180.0 {
            &[0.0]
        } else if position.lon - dlon < -180.0 {
            &[0.0, 360.0]
        } else if position.lon + dlon > 180.0 {
            &[0.0, -360.0]
        } else {
            &[0.0]
        };
        let envelopes = shifts
            .iter()
            .map(|shift| {
                let lon = position.lon + shift;
                AABB::from_corners(
                    [lon - dlon, position.lat - dlat],
                    [lon + dlon, position.lat + dlat],
                )
            })
            .collect_vec();

        envelopes
            .into_iter()
            .flat_map(move |envelope| self.rtree.locate_in_envelope(&envelope))
            .unique_by(|point| point.data)
    }
}

/// Half-widths in degrees of a box containing every point within `radius_m`
/// meters of latitude `lat`.
///
/// hav(d) >= hav(dlat) bounds the latitude span; hav(d) >= cos²(lat_max)
/// hav(dlon) bounds the longitude span, with `lat_max` the most poleward
/// latitude in the band.
fn degree_extent(lat: f64, radius_m: f64) -> (f64, f64) {
    let angle = radius_m / METERS_PER_DEGREE;
    let dlat = angle * 1.01 + 1e-9;
    let lat_max = (lat.abs() + dlat).min(90.0);
    let half_sin = (angle.to_radians() / 2.0).min(std::f64::consts::FRAC_PI_2).sin();
    let cos_max = lat_max.to_radians().cos();
    let dlon = if half_sin >= cos_max {
        360.0
    } else {
        ((half_sin / cos_max).asin() * 2.0).to_degrees() * 1.01 + 1e-9
    };
    (dlat, dlon.min(360.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{EdgeData, NodeData};

    fn sample() -> RiskGraph {
        let data = GraphData {
            nodes: vec![
                NodeData::new("a", 0.0, 0.0, 0.1),
                NodeData::new("b", 0.0, 0.001, 0.5),
                NodeData::new("c", 0.001, 0.0, 0.9),
                NodeData::new("d", 0.001, 0.001, 0.3),
            ],
            edges: vec![
                EdgeData::undirected("a", "b", 100.0, 0.2),
                EdgeData::undirected("a", "c", 100.0, 0.2),
                EdgeData::directed("a", "d", 50.0, 0.4),
                EdgeData::directed("b", "d", 80.0, 0.85),
            ],
        };
        RiskGraph::from_data(&data).unwrap()
    }

    #[test]
    fn test_lookup_node_risk() {
        let g = sample();
        assert_eq!(g.get_node_risk("c").unwrap(), 0.9);
        assert!(matches!(g.get_node_risk("zz"), Err(Error::NodeNotFound(id)) if id == "zz"));
    }

    #[test]
    fn test_lookup_edge_risk_directions() {
        let g = sample();
        assert_eq!(g.get_edge_risk("a", "b").unwrap(), 0.2);
        assert_eq!(g.get_edge_risk("b", "a").unwrap(), 0.2);
        assert_eq!(g.get_edge_risk("a", "d").unwrap(), 0.4);
        assert!(matches!(g.get_edge_risk("d", "a"), Err(Error::EdgeNotFound { .. })));
        assert!(matches!(g.get_edge_risk("a", "zz"), Err(Error::NodeNotFound(_))));
    }

    #[test]
    fn test_counts() {
        let g = sample();
        assert_eq!(g.node_count(), 4);
        assert_eq!(g.edge_count(), 4);
        assert_eq!(g.edges().count(), 4);
    }

    #[test]
    fn test_connected_nodes() {
        let g = sample();
        assert_eq!(g.get_connected_nodes("a").unwrap(), vec!["b", "c", "d"]);
        assert_eq!(g.get_connected_nodes("c").unwrap(), vec!["a"]);
        assert!(g.get_connected_nodes("d").unwrap().is_empty());
    }

    #[test]
    fn test_safest_neighbor_tie_breaks() {
        let g = sample();
        // b and c tie on risk and distance, b wins on id
        let n = g.get_safest_neighbor("a").unwrap().unwrap();
        assert_eq!(n.id, "b");
        assert_eq!(g.get_safest_neighbor("d").unwrap(), None);
    }

    #[test]
    fn test_safest_neighbor_prefers_shorter_on_risk_tie() {
        let data = GraphData {
            nodes: vec![
                NodeData::new("s", 0.0, 0.0, 0.0),
                NodeData::new("a", 0.0, 0.1, 0.0),
                NodeData::new("z", 0.1, 0.0, 0.0),
            ],
            edges: vec![
                EdgeData::directed("s", "a", 200.0, 0.3),
                EdgeData::directed("s", "z", 100.0, 0.3),
            ],
        };
        let g = RiskGraph::from_data(&data).unwrap();
        assert_eq!(g.get_safest_neighbor("s").unwrap().unwrap().id, "z");
    }

    #[test]
    fn test_stats_and_empty_graph() {
        let g = sample();
        let stats = g.get_stats().unwrap();
        assert_eq!(stats.node_count, 4);
        assert!((stats.min - 0.1).abs() < 1e-12);
        assert!((stats.max - 0.9).abs() < 1e-12);
        assert!((stats.mean - 0.45).abs() < 1e-12);

        assert!(matches!(RiskGraph::new().get_stats(), Err(Error::EmptyGraph)));
    }

    #[test]
    fn test_distribution() {
        let d = sample().get_risk_distribution();
        assert_eq!(d.nodes.safe, 1);
        assert_eq!(d.nodes.low, 1);
        assert_eq!(d.nodes.medium, 1);
        assert_eq!(d.nodes.critical, 1);
        assert_eq!(d.edges.low, 2);
        assert_eq!(d.edges.medium, 1);
        assert_eq!(d.edges.critical, 1);
        assert_eq!(d.edges.total(), 4);
    }

    #[test]
    fn test_safe_and_danger_zones() {
        let g = sample();
        let safe: Vec<&str> = g.find_safe_zones(0.3).iter().map(|n| n.id.as_str()).collect();
        assert_eq!(safe, vec!["a", "d"]);
        let danger: Vec<&str> = g.find_danger_zones(0.5).iter().map(|n| n.id.as_str()).collect();
        assert_eq!(danger, vec!["c", "b"]);
    }

    #[test]
    fn test_nodes_within_radius() {
        let g = sample();
        let near = g.nodes_within_radius(&Position::new(0.0, 0.0), 120.0).unwrap();
        let ids: Vec<&str> = near.iter().map(|n| n.node.id.as_str()).collect();
        // b and c are ~111 m away, d ~157 m
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert_eq!(near[0].distance, 0.0);
        assert!(g.nodes_within_radius(&Position::new(0.0, 0.0), -1.0).is_err());
    }

    #[test]
    fn test_nearest_nodes_orders_by_distance() {
        let g = sample();
        let nearest = g.nearest_nodes(&Position::new(0.0009, 0.0009), 2);
        assert_eq!(nearest.len(), 2);
        assert_eq!(g.id_at(nearest[0].0), "d");
        assert!(nearest[0].1 <= nearest[1].1);
    }

    #[test]
    fn test_nearest_nodes_at_high_latitude() {
        // At 60°N the eastern node is nearer than the ring of nodes north and
        // south, although it is farther in raw degrees.
        let mut nodes = vec![NodeData::new("east", 60.0, 0.015, 1.0)];
        for i in 0..10 {
            let lon = -0.0045 + i as f64 * 0.001;
            nodes.push(NodeData::new(format!("n{i}"), 60.01, lon, 0.0));
            nodes.push(NodeData::new(format!("s{i}"), 59.99, lon, 0.0));
        }
        let g = RiskGraph::from_data(&GraphData { nodes, edges: vec![] }).unwrap();

        let nearest = g.nearest_nodes(&Position::new(60.0, 0.0), 1);
        assert_eq!(g.id_at(nearest[0].0), "east");
        assert!((nearest[0].1 - 834.0).abs() < 2.0, "got {}", nearest[0].1);
    }

    #[test]
    fn test_nearest_nodes_match_haversine_ranking() {
        let mut nodes = Vec::new();
        let mut seed: u64 = 7;
        for i in 0..200 {
            seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            let dlat = ((seed >> 33) % 2000) as f64 / 1000.0 - 1.0;
            seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            let dlon = ((seed >> 33) % 8000) as f64 / 1000.0 - 4.0;
            nodes.push(NodeData::new(format!("p{i:03}"), 70.0 + dlat, 20.0 + dlon, 0.5));
        }
        let g = RiskGraph::from_data(&GraphData { nodes, edges: vec![] }).unwrap();

        for query in [
            Position::new(70.0, 20.0),
            Position::new(70.9, 23.5),
            Position::new(69.2, 16.1),
        ] {
            let expected: Vec<&str> = g
                .nodes()
                .map(|n| (n.id.as_str(), query.distance_to(&n.position)))
                .sorted_by(|(a, da), (b, db)| da.total_cmp(db).then_with(|| a.cmp(b)))
                .take(5)
                .map(|(id, _)| id)
                .collect();
            let got: Vec<&str> = g
                .nearest_nodes(&query, 5)
                .into_iter()
                .map(|(idx, _)| g.id_at(idx))
                .collect();
            assert_eq!(got, expected);
        }
    }

    #[test]
    fn test_nodes_within_radius_across_antimeridian() {
        let data = GraphData {
            nodes: vec![
                NodeData::new("west", 0.0, 179.9995, 0.2),
                NodeData::new("east", 0.0, -179.9995, 0.4),
            ],
            edges: vec![],
        };
        let g = RiskGraph::from_data(&data).unwrap();
        let near = g.nodes_within_radius(&Position::new(0.0, 179.9999), 200.0).unwrap();
        let ids: Vec<&str> = near.iter().map(|n| n.node.id.as_str()).collect();
        assert_eq!(ids, vec!["west", "east"]);
    }

    #[test]
    fn test_load_failure_keeps_previous_graph() {
        let mut g = sample();
        let bad = GraphData {
            nodes: vec![NodeData::new("x", 0.0, 0.0, 1.5)],
            edges: vec![],
        };
        assert!(matches!(g.load(&bad), Err(Error::InvalidRiskValue { .. })));
        assert_eq!(g.node_count(), 4);
        assert!(g.contains("a"));
    }
}
