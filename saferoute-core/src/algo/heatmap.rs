//! Grid aggregation of scored incidents into heatmap zones.
//!
//! Incidents arrive already scored by the upstream detection pipeline;
//! this module only buckets them by location so the zones can be loaded
//! as graph nodes.

use hashbrown::HashMap;
use itertools::Itertools;
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use crate::{Error, Position, Result, model::NodeData};

/// Default grid step in degrees (roughly 200 m of latitude)
pub const DEFAULT_ZONE_STEP: f64 = 0.002;

/// Incident location with a score in [0, 1] assigned upstream
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoredIncident {
    pub lat: f64,
    pub lon: f64,
    pub score: f64,
}

/// Grid cell with the incidents that fell into it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeatmapZone {
    pub id: String,
    pub lat: f64,
    pub lon: f64,
    /// Sum of incident scores
    pub weight: f64,
    /// Mean incident score
    pub avg: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NearbyZone<'a> {
    #[serde(flatten)]
    pub zone: &'a HeatmapZone,
    /// Meters from the query position
    pub distance: f64,
}

impl HeatmapZone {
    pub fn position(&self) -> Position {
        Position::new(self.lat, self.lon)
    }

    /// Graph node for this zone, risk = mean score
    pub fn to_node(&self) -> NodeData {
        let mut metadata = Map::new();
        metadata.insert("incident_count".to_string(), JsonValue::from(self.count));
        metadata.insert("score_sum".to_string(), JsonValue::from(self.weight));
        NodeData {
            id: self.id.clone(),
            lat: self.lat,
            lon: self.lon,
            risk: self.avg.clamp(0.0, 1.0),
            metadata,
        }
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Snap a coordinate to the center of its grid cell
fn snap(value: f64, step: f64) -> f64 {
    round_to((value / step).round() * step, 6)
}

/// Buckets incidents into grid zones of `zone_step` degrees.
///
/// Incidents with non-finite coordinates are skipped, scores are clamped
/// to [0, 1]. Zones come back ordered by mean score, highest first.
///
/// # Errors
///
/// `InvalidData` if `zone_step` is not a positive number
pub fn aggregate_zones(incidents: &[ScoredIncident], zone_step: f64) -> Result<Vec<HeatmapZone>> {
    if !zone_step.is_finite() || zone_step <= 0.0 {
        return Err(Error::InvalidData(format!(
            "zone_step must be positive, got {zone_step}"
        )));
    }

    // zone id -> (lat, lon, score sum, count)
    let mut cells: HashMap<String, (f64, f64, f64, usize)> = HashMap::new();
    let mut skipped = 0usize;

    for incident in incidents {
        if !incident.lat.is_finite() || !incident.lon.is_finite() {
            skipped += 1;
            continue;
        }
        let score = if incident.score.is_finite() {
            incident.score.clamp(0.0, 1.0)
        } else {
            0.0
        };
        let lat = snap(incident.lat, zone_step);
        let lon = snap(incident.lon, zone_step);
        let cell = cells
            .entry(format!("{lat}:{lon}"))
            .or_insert((lat, lon, 0.0, 0));
        cell.2 += score;
        cell.3 += 1;
    }

    if skipped > 0 {
        debug!("Skipped {skipped} incidents without usable coordinates");
    }

    #[allow(clippy::cast_precision_loss)]
    let zones = cells
        .into_iter()
        .map(|(id, (lat, lon, sum, count))| HeatmapZone {
            id,
            lat,
            lon,
            weight: round_to(sum, 3),
            avg: round_to(sum / count as f64, 3),
            count,
        })
        .sorted_by(|a, b| b.avg.total_cmp(&a.avg).then_with(|| a.id.cmp(&b.id)))
        .collect();

    Ok(zones)
}

/// Zones within `radius_m` meters of `position`, nearest first,
/// heavier zones first at equal distance
pub fn zones_within<'a>(
    zones: &'a [HeatmapZone],
    position: &Position,
    radius_m: f64,
) -> Result<Vec<NearbyZone<'a>>> {
    position.validate()?;
    if !radius_m.is_finite() || radius_m < 0.0 {
        return Err(Error::InvalidData(format!("invalid radius {radius_m}")));
    }

    Ok(zones
        .iter()
        .map(|zone| NearbyZone {
            zone,
            distance: position.distance_to(&zone.position()),
        })
        .filter(|nearby| nearby.distance <= radius_m)
        .sorted_by(|a, b| {
            a.distance
                .total_cmp(&b.distance)
                .then(b.zone.weight.total_cmp(&a.zone.weight))
        })
        .collect())
}
