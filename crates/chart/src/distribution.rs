//! Per-series percentage distributions over the eight directions

use landshift_core::{Direction, DirectionCounts, Error, Result};
use serde::{Deserialize, Serialize};

/// Directional counts rescaled so the eight entries sum to 100.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PercentDistribution([f64; 8]);

impl PercentDistribution {
    /// Normalize `counts` by its own total.
    ///
    /// `series` names the counts in the error when their total is zero.
    pub fn from_counts(counts: &DirectionCounts, series: &str) -> Result<Self> {
        let total = counts.total();
        if total == 0 {
            return Err(Error::EmptyDistribution {
                series: series.to_string(),
            });
        }
        Ok(Self::normalized(counts, total))
    }

    /// Like [`from_counts`](Self::from_counts), but an all-zero vector
    /// yields an all-zero distribution.
    pub fn from_counts_or_zero(counts: &DirectionCounts) -> Self {
        match counts.total() {
            0 => Self::default(),
            total => Self::normalized(counts, total),
        }
    }

    fn normalized(counts: &DirectionCounts, total: u64) -> Self {
        let total = total as f64;
        Self(counts.as_array().map(|c| c as f64 / total * 100.0))
    }

    pub fn get(&self, direction: Direction) -> f64 {
        self.0[direction.index()]
    }

    pub fn values(&self) -> &[f64; 8] {
        &self.0
    }

    /// Largest share
    pub fn max(&self) -> f64 {
        self.0.iter().copied().fold(0.0, f64::max)
    }

    /// Sum of all shares: 100, or 0 for an empty distribution
    pub fn total(&self) -> f64 {
        self.0.iter().sum()
    }

    /// (bearing, percent) pairs in table order with the first pair repeated
    /// at the end, so the polygon closes.
    pub fn closed_loop(&self) -> Vec<(f64, f64)> {
        let mut points: Vec<(f64, f64)> = Direction::ALL
            .iter()
            .map(|d| (d.bearing(), self.get(*d)))
            .collect();
        points.push(points[0]);
        points
    }
}
