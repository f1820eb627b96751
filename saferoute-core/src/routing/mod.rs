//! Risk-weighted path search: safest path, alternatives, bounded reachability

mod budget;
pub(crate) mod dijkstra;
pub mod reach;
mod route;
pub mod safest;
pub mod yen;

pub use budget::SearchBudget;
pub use reach::{
    ReachableNode, get_reachable_nodes, get_reachable_nodes_with_budget, is_reachable,
    is_reachable_with_budget,
};
pub use route::{Route, RouteSegment};
pub use safest::{dijkstra_safest_path, dijkstra_safest_path_with_budget};
pub use yen::{find_k_safest_paths, find_k_safest_paths_with_budget};
