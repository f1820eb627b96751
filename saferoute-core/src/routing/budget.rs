use std::time::{Duration, Instant};

use crate::{Error, Result, RiskGraph};

/// Expansions allowed per graph element when no explicit cap is set
const DEFAULT_EXPANSIONS_PER_ELEMENT: usize = 64;

/// How often the deadline clock is sampled
const DEADLINE_CHECK_INTERVAL: usize = 256;

/// Limits on the work a single query may perform
///
/// The default has no explicit cap: the expansion limit is derived from
/// the size of the graph being searched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchBudget {
    max_expansions: Option<usize>,
    deadline: Option<Instant>,
}

impl SearchBudget {
    pub fn with_max_expansions(max_expansions: usize) -> Self {
        Self {
            max_expansions: Some(max_expansions),
            deadline: None,
        }
    }

    #[must_use]
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    #[must_use]
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    pub fn max_expansions(&self) -> Option<usize> {
        self.max_expansions
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Starts tracking against `graph`; `rounds` scales the derived limit
    /// for queries made of several searches
    pub(crate) fn tracker(&self, graph: &RiskGraph, rounds: usize) -> BudgetTracker {
        let limit = self.max_expansions.unwrap_or_else(|| {
            (graph.node_count() + graph.edge_count() + 1)
                .saturating_mul(DEFAULT_EXPANSIONS_PER_ELEMENT)
                .saturating_mul(rounds.max(1))
        });
        BudgetTracker {
            limit,
            expanded: 0,
            deadline: self.deadline,
        }
    }
}

#[derive(Debug)]
pub(crate) struct BudgetTracker {
    limit: usize,
    expanded: usize,
    deadline: Option<Instant>,
}

impl BudgetTracker {
    /// Records one node expansion
    pub(crate) fn expand(&mut self) -> Result<()> {
        self.expanded += 1;
        if self.expanded > self.limit {
            return Err(self.exceeded());
        }
        if self.expanded % DEADLINE_CHECK_INTERVAL == 0 {
            self.check_deadline()?;
        }
        Ok(())
    }

    pub(crate) fn check_deadline(&self) -> Result<()> {
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Err(self.exceeded()),
            _ => Ok(()),
        }
    }

    pub(crate) fn expanded(&self) -> usize {
        self.expanded
    }

    fn exceeded(&self) -> Error {
        log::warn!(
            "Search stopped after {} expansions (limit {})",
            self.expanded,
            self.limit
        );
        Error::SearchBudgetExceeded {
            expanded: self.expanded,
        }
    }
}
