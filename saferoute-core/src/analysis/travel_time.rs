use serde::Serialize;

use crate::{EngineConfig, Error, Result, routing::Route};

/// How risk slows movement along a segment
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TravelTimeModel {
    /// Fraction of speed lost at risk 1.0
    pub slowdown_factor: f64,
    /// Effective speed never drops below `base_speed * min_speed_ratio`
    pub min_speed_ratio: f64,
}

impl Default for TravelTimeModel {
    fn default() -> Self {
        Self {
            slowdown_factor: 0.5,
            min_speed_ratio: 0.1,
        }
    }
}

impl From<&EngineConfig> for TravelTimeModel {
    fn from(config: &EngineConfig) -> Self {
        Self {
            slowdown_factor: config.slowdown_factor,
            min_speed_ratio: config.min_speed_ratio,
        }
    }
}

impl TravelTimeModel {
    pub fn effective_speed(&self, base_speed: f64, risk: f64) -> f64 {
        let floor = base_speed * self.min_speed_ratio;
        (base_speed * (1.0 - risk * self.slowdown_factor)).max(floor)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SegmentTime {
    pub from: String,
    pub to: String,
    pub distance: f64,
    pub risk: f64,
    /// Meters per second
    pub effective_speed: f64,
    pub seconds: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TravelTimeEstimate {
    pub base_speed: f64,
    pub segments: Vec<SegmentTime>,
    pub total_seconds: f64,
    pub total_distance: f64,
    /// Time at `base_speed` with no risk slowdown
    pub baseline_seconds: f64,
    pub delay_seconds: f64,
}

/// Risk-adjusted travel time with the default model
///
/// # Errors
///
/// `InvalidData` if `base_speed` (m/s) is not a positive number
pub fn estimate_travel_time(route: &Route, base_speed: f64) -> Result<TravelTimeEstimate> {
    estimate_travel_time_with(route, base_speed, &TravelTimeModel::default())
}

pub fn estimate_travel_time_with(
    route: &Route,
    base_speed: f64,
    model: &TravelTimeModel,
) -> Result<TravelTimeEstimate> {
    if !base_speed.is_finite() || base_speed <= 0.0 {
        return Err(Error::InvalidData(format!(
            "base_speed must be a positive number, got {base_speed}"
        )));
    }
    if !(model.min_speed_ratio > 0.0 && model.min_speed_ratio <= 1.0) {
        return Err(Error::InvalidData(format!(
            "min_speed_ratio must be in (0, 1], got {}",
            model.min_speed_ratio
        )));
    }

    let segments: Vec<SegmentTime> = route
        .segments
        .iter()
        .map(|s| {
            let effective_speed = model.effective_speed(base_speed, s.risk);
            SegmentTime {
                from: s.from.clone(),
                to: s.to.clone(),
                distance: s.distance,
                risk: s.risk,
                effective_speed,
                seconds: s.distance / effective_speed,
            }
        })
        .collect();

    let total_seconds: f64 = segments.iter().map(|s| s.seconds).sum();
    let baseline_seconds = route.total_distance / base_speed;

    Ok(TravelTimeEstimate {
        base_speed,
        segments,
        total_seconds,
        total_distance: route.total_distance,
        baseline_seconds,
        delay_seconds: total_seconds - baseline_seconds,
    })
}
