//! Risk graph components - positions, zones, connectors and risk bands

use std::fmt;

use geo::{Distance, Haversine, Point};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use crate::{Error, Result};

/// WGS84 coordinate in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub lat: f64,
    pub lon: f64,
}

impl Position {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Position as a `geo` point (x = longitude, y = latitude)
    pub fn point(&self) -> Point<f64> {
        Point::new(self.lon, self.lat)
    }

    /// Great-circle distance in meters
    pub fn distance_to(&self, other: &Position) -> f64 {
        Haversine.distance(self.point(), other.point())
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if !self.lat.is_finite() || !self.lon.is_finite() {
            return Err(Error::InvalidData(format!(
                "non-finite coordinates ({}, {})",
                self.lat, self.lon
            )));
        }
        if !(-90.0..=90.0).contains(&self.lat) || !(-180.0..=180.0).contains(&self.lon) {
            return Err(Error::InvalidData(format!(
                "coordinates out of range ({}, {})",
                self.lat, self.lon
            )));
        }
        Ok(())
    }
}

impl From<Point<f64>> for Position {
    fn from(point: Point<f64>) -> Self {
        Self::new(point.y(), point.x())
    }
}

/// Discretization of a continuous risk score
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskBand {
    Safe,
    Low,
    Medium,
    High,
    Critical,
}

impl RiskBand {
    pub const ALL: [RiskBand; 5] = [
        RiskBand::Safe,
        RiskBand::Low,
        RiskBand::Medium,
        RiskBand::High,
        RiskBand::Critical,
    ];

    /// Band for a risk score, lower bounds inclusive
    pub fn from_risk(risk: f64) -> Self {
        if risk < 0.2 {
            RiskBand::Safe
        } else if risk < 0.4 {
            RiskBand::Low
        } else if risk < 0.6 {
            RiskBand::Medium
        } else if risk < 0.8 {
            RiskBand::High
        } else {
            RiskBand::Critical
        }
    }

    /// HIGH or CRITICAL
    pub fn is_elevated(self) -> bool {
        self >= RiskBand::High
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RiskBand::Safe => "SAFE",
            RiskBand::Low => "LOW",
            RiskBand::Medium => "MEDIUM",
            RiskBand::High => "HIGH",
            RiskBand::Critical => "CRITICAL",
        }
    }
}

impl fmt::Display for RiskBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Risk graph node (geographic zone)
#[derive(Debug, Clone, Serialize)]
pub struct RiskNode {
    pub id: String,
    pub position: Position,
    /// Risk score in [0, 1]
    pub risk: f64,
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub metadata: Map<String, JsonValue>,
}

impl RiskNode {
    pub fn band(&self) -> RiskBand {
        RiskBand::from_risk(self.risk)
    }
}

/// Risk graph edge (connector between zones)
///
/// An undirected connector is stored as two traversals sharing the same
/// weight, both with `directed == false`.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct RiskEdge {
    /// Physical length in meters
    pub distance: f64,
    /// Risk score in [0, 1]
    pub risk: f64,
    pub directed: bool,
}

impl RiskEdge {
    pub fn band(&self) -> RiskBand {
        RiskBand::from_risk(self.risk)
    }
}

pub(crate) fn validate_risk(subject: impl FnOnce() -> String, risk: f64) -> Result<()> {
    if risk.is_finite() && (0.0..=1.0).contains(&risk) {
        Ok(())
    } else {
        Err(Error::InvalidRiskValue {
            subject: subject(),
            value: risk,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_band_boundaries() {
        assert_eq!(RiskBand::from_risk(0.0), RiskBand::Safe);
        assert_eq!(RiskBand::from_risk(0.199), RiskBand::Safe);
        assert_eq!(RiskBand::from_risk(0.2), RiskBand::Low);
        assert_eq!(RiskBand::from_risk(0.4), RiskBand::Medium);
        assert_eq!(RiskBand::from_risk(0.6), RiskBand::High);
        assert_eq!(RiskBand::from_risk(0.8), RiskBand::Critical);
        assert_eq!(RiskBand::from_risk(1.0), RiskBand::Critical);
    }

    #[test]
    fn test_band_elevated() {
        assert!(!RiskBand::Medium.is_elevated());
        assert!(RiskBand::High.is_elevated());
        assert!(RiskBand::Critical.is_elevated());
    }

    #[test]
    fn test_distance_zero_for_same_position() {
        let p = Position::new(37.7749, -122.4194);
        assert_eq!(p.distance_to(&p), 0.0);
    }

    #[test]
    fn test_distance_one_degree_latitude() {
        let a = Position::new(0.0, 0.0);
        let b = Position::new(1.0, 0.0);
        let d = a.distance_to(&b);
        // ~111.2 km along a meridian
        assert!((d - 111_195.0).abs() < 200.0, "got {d}");
    }

    #[test]
    fn test_position_validation() {
        assert!(Position::new(45.0, 90.0).validate().is_ok());
        assert!(Position::new(91.0, 0.0).validate().is_err());
        assert!(Position::new(0.0, f64::NAN).validate().is_err());
    }

    #[test]
    fn test_validate_risk() {
        assert!(validate_risk(|| "n".into(), 0.0).is_ok());
        assert!(validate_risk(|| "n".into(), 1.0).is_ok());
        assert!(matches!(
            validate_risk(|| "n".into(), 1.01),
            Err(Error::InvalidRiskValue { .. })
        ));
        assert!(validate_risk(|| "n".into(), f64::NAN).is_err());
    }
}
