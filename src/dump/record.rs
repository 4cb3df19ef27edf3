//! Per-cluster state accumulated while a dump is read.

use crate::vector::SparseVector;

/// One cluster from a dump: its header fields plus running point statistics.
///
/// `sse`, `min` and `max` hold contributions after the aggregation exponent
/// has been applied, so they are directly comparable across measures.
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterRecord {
    pub label: String,
    pub centroid: SparseVector,
    /// Point count declared by the header.
    pub npoints: u64,
    /// Point-distance lines actually seen for this cluster.
    pub observed_points: u64,
    pub sse: f64,
    pub min: f64,
    pub max: f64,
}

impl ClusterRecord {
    pub fn new(label: impl Into<String>, centroid: SparseVector, npoints: u64) -> Self {
        Self {
            label: label.into(),
            centroid,
            npoints,
            observed_points: 0,
            sse: 0.0,
            min: f64::INFINITY,
            max: 0.0,
        }
    }

    /// Fold one point contribution into the running statistics.
    pub fn observe(&mut self, contribution: f64) {
        self.sse += contribution;
        self.observed_points += 1;
        if contribution < self.min {
            self.min = contribution;
        }
        if contribution > self.max {
            self.max = contribution;
        }
    }

    /// Smallest contribution seen, or `None` before the first point.
    pub fn min_distance(&self) -> Option<f64> {
        (self.observed_points > 0).then_some(self.min)
    }

    /// Largest contribution seen, or `None` before the first point.
    pub fn max_distance(&self) -> Option<f64> {
        (self.observed_points > 0).then_some(self.max)
    }
}
