use itertools::Itertools;
use serde::Serialize;

use crate::{RiskBand, routing::Route};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SegmentAssessment {
    pub from: String,
    pub to: String,
    pub distance: f64,
    pub risk: f64,
    pub band: RiskBand,
}

/// Route-level safety summary
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteSafetyReport {
    pub start: String,
    pub end: String,
    pub segments: Vec<SegmentAssessment>,
    pub total_risk: f64,
    pub total_distance: f64,
    pub average_segment_risk: f64,
    pub max_segment_risk: f64,
    /// Segment risks weighted by segment distance
    pub weighted_risk: f64,
    /// Band of `weighted_risk`
    pub band: RiskBand,
    /// Segments in the HIGH or CRITICAL band
    pub elevated_segments: usize,
    pub recommendations: Vec<String>,
}

/// Summarizes the risk along a route.
///
/// The route is classified by its distance-weighted mean risk, so a long
/// route through safe zones is not penalized for its length.
#[allow(clippy::cast_precision_loss)]
pub fn analyze_route_safety(route: &Route) -> RouteSafetyReport {
    let segments: Vec<SegmentAssessment> = route
        .segments
        .iter()
        .map(|s| SegmentAssessment {
            from: s.from.clone(),
            to: s.to.clone(),
            distance: s.distance,
            risk: s.risk,
            band: RiskBand::from_risk(s.risk),
        })
        .collect();

    let (average_segment_risk, max_segment_risk, weighted_risk) = if segments.is_empty() {
        (0.0, 0.0, 0.0)
    } else {
        let average = route.total_risk / segments.len() as f64;
        let max = segments.iter().map(|s| s.risk).fold(0.0, f64::max);
        (average, max, route.weighted_risk())
    };

    let band = RiskBand::from_risk(weighted_risk);
    let elevated_segments = segments.iter().filter(|s| s.band.is_elevated()).count();
    let recommendations = recommend(&segments, band);

    RouteSafetyReport {
        start: route.start().to_string(),
        end: route.end().to_string(),
        segments,
        total_risk: route.total_risk,
        total_distance: route.total_distance,
        average_segment_risk,
        max_segment_risk,
        weighted_risk,
        band,
        elevated_segments,
        recommendations,
    }
}

fn recommend(segments: &[SegmentAssessment], band: RiskBand) -> Vec<String> {
    if segments.is_empty() {
        return vec!["Start and destination are the same zone".to_string()];
    }

    let mut advice = vec![
        match band {
            RiskBand::Safe => "Route is safe; no special precautions needed",
            RiskBand::Low => "Route carries low risk; stay aware of your surroundings",
            RiskBand::Medium => "Moderate risk: prefer well-lit main streets and share your location",
            RiskBand::High => "High risk: consider an alternative route",
            RiskBand::Critical => "Critical risk: avoid this route unless no alternative exists",
        }
        .to_string(),
    ];

    let elevated = segments
        .iter()
        .filter(|s| s.band.is_elevated())
        .map(|s| format!("{} -> {}", s.from, s.to))
        .join(", ");
    if !elevated.is_empty() {
        advice.push(format!("Avoid or pass quickly through high-risk segments: {elevated}"));
    }

    if band < RiskBand::High {
        if let Some(worst) = segments.iter().find(|s| s.band == RiskBand::Critical) {
            advice.push(format!(
                "Overall risk is acceptable but {} -> {} is critical; look for a detour around it",
                worst.from, worst.to
            ));
        }
    }

    advice
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RiskGraph;
    use crate::model::{EdgeData, GraphData, NodeData};

    fn graph() -> RiskGraph {
        RiskGraph::from_data(&GraphData {
            nodes: vec![
                NodeData::new("a", 0.0, 0.0, 0.0),
                NodeData::new("b", 0.0, 0.01, 0.0),
                NodeData::new("c", 0.0, 0.02, 0.0),
                NodeData::new("d", 0.0, 0.03, 0.0),
            ],
            edges: vec![
                EdgeData::undirected("a", "b", 900.0, 0.1),
                EdgeData::undirected("b", "c", 100.0, 0.9),
                EdgeData::undirected("c", "d", 100.0, 0.6),
            ],
        })
        .unwrap()
    }

    #[test]
    fn test_metrics() {
        let g = graph();
        let route = Route::from_node_ids(&g, &["a", "b", "c"]).unwrap();
        let report = analyze_route_safety(&route);

        assert_eq!(report.segments.len(), 2);
        assert!((report.total_risk - 1.0).abs() < 1e-12);
        assert!((report.average_segment_risk - 0.5).abs() < 1e-12);
        assert_eq!(report.max_segment_risk, 0.9);
        // (0.1 * 900 + 0.9 * 100) / 1000
        assert!((report.weighted_risk - 0.18).abs() < 1e-12);
        assert_eq!(report.band, RiskBand::Safe);
        assert_eq!(report.elevated_segments, 1);
        assert_eq!(report.segments[1].band, RiskBand::Critical);
    }

    #[test]
    fn test_recommendations_flag_critical_segment() {
        let g = graph();
        let route = Route::from_node_ids(&g, &["a", "b", "c"]).unwrap();
        let report = analyze_route_safety(&route);
        assert_eq!(report.recommendations.len(), 3);
        assert!(report.recommendations[1].contains("b -> c"));
        assert!(report.recommendations[2].contains("critical"));
    }

    #[test]
    fn test_high_band_route() {
        let g = graph();
        let route = Route::from_node_ids(&g, &["b", "c", "d"]).unwrap();
        let report = analyze_route_safety(&route);
        assert_eq!(report.band, RiskBand::High);
        assert!(report.recommendations[0].contains("alternative"));
        assert_eq!(report.elevated_segments, 2);
    }

    #[test]
    fn test_hand_built_route_without_nodes() {
        let route = Route {
            nodes: Vec::new(),
            segments: Vec::new(),
            total_risk: 0.0,
            total_distance: 0.0,
        };
        let report = analyze_route_safety(&route);
        assert_eq!(report.start, "");
        assert_eq!(report.band, RiskBand::Safe);
    }

    #[test]
    fn test_trivial_route() {
        let g = graph();
        let route = Route::from_node_ids(&g, &["a"]).unwrap();
        let report = analyze_route_safety(&route);
        assert_eq!(report.band, RiskBand::Safe);
        assert_eq!(report.total_risk, 0.0);
        assert_eq!(report.recommendations.len(), 1);
    }
}
