//! Engine configuration

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{Error, Result, routing::SearchBudget};

/// Tunables shared by the query operations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Number of nearest nodes used for interpolation
    pub interpolation_k: usize,
    /// Inverse-distance weighting exponent
    pub interpolation_power: f64,
    /// Fraction of speed lost at risk 1.0
    pub slowdown_factor: f64,
    /// Lower bound for effective speed as a fraction of the base speed
    pub min_speed_ratio: f64,
    /// Node expansion cap per search; derived from graph size when unset
    pub max_expansions: Option<usize>,
    /// Wall-clock limit per search in milliseconds
    pub deadline_ms: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            interpolation_k: 3,
            interpolation_power: 2.0,
            slowdown_factor: 0.5,
            min_speed_ratio: 0.1,
            max_expansions: None,
            deadline_ms: None,
        }
    }
}

impl EngineConfig {
    /// # Errors
    ///
    /// `InvalidData` naming the first out-of-range field
    pub fn validate(&self) -> Result<()> {
        if self.interpolation_k == 0 {
            return Err(Error::InvalidData(
                "interpolation_k must be at least 1".to_string(),
            ));
        }
        if !self.interpolation_power.is_finite() || self.interpolation_power < 0.0 {
            return Err(Error::InvalidData(format!(
                "interpolation_power must be a non-negative number, got {}",
                self.interpolation_power
            )));
        }
        if !(0.0..=1.0).contains(&self.slowdown_factor) {
            return Err(Error::InvalidData(format!(
                "slowdown_factor must be in [0, 1], got {}",
                self.slowdown_factor
            )));
        }
        if !(self.min_speed_ratio > 0.0 && self.min_speed_ratio <= 1.0) {
            return Err(Error::InvalidData(format!(
                "min_speed_ratio must be in (0, 1], got {}",
                self.min_speed_ratio
            )));
        }
        if self.max_expansions == Some(0) {
            return Err(Error::InvalidData(
                "max_expansions must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Search budget for one query, starting its deadline clock now
    pub fn search_budget(&self) -> SearchBudget {
        let mut budget = match self.max_expansions {
            Some(limit) => SearchBudget::with_max_expansions(limit),
            None => SearchBudget::default(),
        };
        if let Some(ms) = self.deadline_ms {
            budget = budget.with_timeout(Duration::from_millis(ms));
        }
        budget
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let cfg: EngineConfig =
            serde_json::from_str(r#"{"interpolation_k": 5, "deadline_ms": 250}"#).unwrap();
        assert_eq!(cfg.interpolation_k, 5);
        assert_eq!(cfg.interpolation_power, 2.0);
        assert_eq!(cfg.deadline_ms, Some(250));
        assert!(cfg.search_budget().deadline().is_some());
    }

    #[test]
    fn test_rejects_unknown_field() {
        assert!(serde_json::from_str::<EngineConfig>(r#"{"interp_k": 5}"#).is_err());
    }

    #[test]
    fn test_validation() {
        let cfg = EngineConfig {
            interpolation_k: 0,
            ..EngineConfig::default()
        };
        assert!(cfg.validate().is_err());

        let cfg = EngineConfig {
            slowdown_factor: 1.5,
            ..EngineConfig::default()
        };
        assert!(cfg.validate().is_err());

        let cfg = EngineConfig {
            min_speed_ratio: 0.0,
            ..EngineConfig::default()
        };
        assert!(cfg.validate().is_err());
    }
}
