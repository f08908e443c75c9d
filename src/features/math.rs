// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Numeric helpers shared by the extractors.
//!
//! Division by zero is not an error anywhere in the feature engine: it yields
//! 0. A row with an empty description gets 0 for every ratio involving that
//! description, never `inf` or `NaN`.

/// `numerator / denominator`, or 0 when the denominator is 0.
#[inline]
pub fn safe_divide(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

/// The five reductions of a position list.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionStats {
    pub min: i64,
    pub mean: f64,
    pub median: f64,
    pub max: i64,
    /// Population standard deviation.
    pub std: f64,
}

impl PositionStats {
    pub const ZERO: PositionStats = PositionStats {
        min: 0,
        mean: 0.0,
        median: 0.0,
        max: 0,
        std: 0.0,
    };

    /// Reduce a position list. An empty list reduces to all zeros, which is
    /// also what the `[0]` sentinel reduces to.
    pub fn from_positions(positions: &[usize]) -> Self {
        if positions.is_empty() {
            return Self::ZERO;
        }

        let n = positions.len() as f64;
        let mut min = usize::MAX;
        let mut max = 0usize;
        let mut sum = 0.0f64;
        for &p in positions {
            min = min.min(p);
            max = max.max(p);
            sum += p as f64;
        }
        let mean = sum / n;

        let variance = positions
            .iter()
            .map(|&p| {
                let d = p as f64 - mean;
                d * d
            })
            .sum::<f64>()
            / n;

        Self {
            min: min as i64,
            mean,
            median: median(positions),
            max: max as i64,
            std: variance.sqrt(),
        }
    }
}

/// Median; averages the two middle values for even lengths.
fn median(values: &[usize]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_unstable();
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] as f64 + sorted[mid] as f64) / 2.0
    } else {
        sorted[mid] as f64
    }
}
