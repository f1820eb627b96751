mod search;
mod state;

pub(crate) use search::{Restrictions, SearchTree, risk_dijkstra};
pub(crate) use state::Label;
