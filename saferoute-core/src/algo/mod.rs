pub mod heatmap;
pub mod interpolation;

pub use heatmap::{
    DEFAULT_ZONE_STEP, HeatmapZone, NearbyZone, ScoredIncident, aggregate_zones, zones_within,
};
pub use interpolation::{
    Contribution, Interpolation, get_interpolated_risk, interpolate, interpolate_many,
};
