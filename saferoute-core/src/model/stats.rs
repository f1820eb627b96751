//! Summary statistics over a graph snapshot

use serde::Serialize;

use super::components::RiskBand;

/// Node risk statistics
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RiskStats {
    pub node_count: usize,
    pub edge_count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    /// Population standard deviation
    pub std_dev: f64,
}

impl RiskStats {
    #[allow(clippy::cast_precision_loss)]
    pub(crate) fn from_risks(risks: &[f64], edge_count: usize) -> Option<Self> {
        if risks.is_empty() {
            return None;
        }
        let n = risks.len() as f64;
        let (min, max, sum) = risks.iter().fold(
            (f64::INFINITY, f64::NEG_INFINITY, 0.0),
            |(min, max, sum), &r| (min.min(r), max.max(r), sum + r),
        );
        let mean = sum / n;
        let variance = risks.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / n;

        Some(Self {
            node_count: risks.len(),
            edge_count,
            min,
            max,
            mean,
            std_dev: variance.sqrt(),
        })
    }
}

/// Counts per risk band
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BandCounts {
    pub safe: usize,
    pub low: usize,
    pub medium: usize,
    pub high: usize,
    pub critical: usize,
}

impl BandCounts {
    pub fn add(&mut self, risk: f64) {
        *self.slot(RiskBand::from_risk(risk)) += 1;
    }

    pub fn get(&self, band: RiskBand) -> usize {
        match band {
            RiskBand::Safe => self.safe,
            RiskBand::Low => self.low,
            RiskBand::Medium => self.medium,
            RiskBand::High => self.high,
            RiskBand::Critical => self.critical,
        }
    }

    pub fn total(&self) -> usize {
        RiskBand::ALL.iter().map(|&band| self.get(band)).sum()
    }

    fn slot(&mut self, band: RiskBand) -> &mut usize {
        match band {
            RiskBand::Safe => &mut self.safe,
            RiskBand::Low => &mut self.low,
            RiskBand::Medium => &mut self.medium,
            RiskBand::High => &mut self.high,
            RiskBand::Critical => &mut self.critical,
        }
    }
}

impl FromIterator<f64> for BandCounts {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        let mut counts = BandCounts::default();
        for risk in iter {
            counts.add(risk);
        }
        counts
    }
}

/// Node and edge counts per risk band
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RiskDistribution {
    pub nodes: BandCounts,
    pub edges: BandCounts,
}
