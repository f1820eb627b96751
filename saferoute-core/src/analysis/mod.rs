//! Route-level reports built on top of the path finder

pub mod bottleneck;
pub mod ranking;
pub mod safety;
pub mod travel_time;

pub use bottleneck::{Bottleneck, find_bottlenecks};
pub use ranking::{RankedRoute, compare_routes};
pub use safety::{RouteSafetyReport, SegmentAssessment, analyze_route_safety};
pub use travel_time::{
    SegmentTime, TravelTimeEstimate, TravelTimeModel, estimate_travel_time,
    estimate_travel_time_with,
};
