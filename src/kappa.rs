// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Quadratic weighted kappa, the selection metric for relevance models.
//!
//! ```text
//!            Σ w_ij O_ij               (i - j)²
//! κ = 1 - ─────────────,   w_ij = ─────────────
//!            Σ w_ij E_ij            (N - 1)²
//! ```
//!
//! `O` is the observed confusion matrix, `E` the outer product of the two
//! rating histograms scaled to the same total. Both sums are normalized by the
//! number of items.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Median relevance ratings run from 1 to 4.
pub const RATING_RANGE: (i64, i64) = (1, 4);

/// Largest number of rating levels the confusion matrix is built for.
pub const MAX_RATING_LEVELS: usize = 1024;

/// Kappa between two raters over `range` (inclusive), or over the span of the
/// data when `range` is `None`.
///
/// When both raters give every item the same single rating the expected
/// disagreement is zero; that is perfect agreement and scores 1.0.
pub fn quadratic_weighted_kappa(a: &[i64], b: &[i64], range: Option<(i64, i64)>) -> Result<f64> {
    if a.len() != b.len() {
        return Err(Error::InvalidRatings(format!(
            "{} labels but {} predictions",
            a.len(),
            b.len()
        )));
    }
    if a.is_empty() {
        return Err(Error::InvalidRatings("no ratings".to_string()));
    }

    let (min, max) = match range {
        Some(r) => r,
        None => {
            let all = a.iter().chain(b);
            // Non-empty, checked above.
            let min = all.clone().copied().min().unwrap_or(0);
            let max = all.copied().max().unwrap_or(0);
            (min, max)
        }
    };
    if let Some(&bad) = a.iter().chain(b).find(|&&r| r < min || r > max) {
        return Err(Error::InvalidRatings(format!(
            "rating {bad} outside {min}..={max}"
        )));
    }

    let n = max
        .checked_sub(min)
        .and_then(|span| span.checked_add(1))
        .and_then(|levels| usize::try_from(levels).ok())
        .filter(|&levels| levels <= MAX_RATING_LEVELS)
        .ok_or_else(|| {
            Error::InvalidRatings(format!(
                "range {min}..={max} spans more than {MAX_RATING_LEVELS} levels"
            ))
        })?;
    let mut observed = vec![vec![0.0f64; n]; n];
    let mut hist_a = vec![0.0f64; n];
    let mut hist_b = vec![0.0f64; n];
    for (&x, &y) in a.iter().zip(b) {
        let (i, j) = ((x - min) as usize, (y - min) as usize);
        observed[i][j] += 1.0;
        hist_a[i] += 1.0;
        hist_b[j] += 1.0;
    }

    let items = a.len() as f64;
    let scale = if n > 1 { ((n - 1) * (n - 1)) as f64 } else { 1.0 };
    let mut numerator = 0.0;
    let mut denominator = 0.0;
    for i in 0..n {
        for j in 0..n {
            let weight = ((i as f64) - (j as f64)).powi(2) / scale;
            let expected = hist_a[i] * hist_b[j] / items;
            numerator += weight * observed[i][j] / items;
            denominator += weight * expected / items;
        }
    }

    if denominator == 0.0 {
        return Ok(1.0);
    }
    Ok(1.0 - numerator / denominator)
}

/// Mean and population standard deviation of per-fold kappas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KappaSummary {
    pub mean: f64,
    pub std: f64,
}

impl KappaSummary {
    pub fn from_scores(scores: &[f64]) -> Self {
        if scores.is_empty() {
            return Self { mean: 0.0, std: 0.0 };
        }
        let n = scores.len() as f64;
        let mean = scores.iter().sum::<f64>() / n;
        let variance = scores.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / n;
        Self {
            mean,
            std: variance.sqrt(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perfect_agreement() {
        let r = [1, 2, 3, 4, 4, 2];
        assert_eq!(quadratic_weighted_kappa(&r, &r, Some(RATING_RANGE)).unwrap(), 1.0);
    }

    #[test]
    fn test_constant_raters() {
        assert_eq!(quadratic_weighted_kappa(&[3, 3], &[3, 3], None).unwrap(), 1.0);
    }

    #[test]
    fn test_known_value() {
        // O = [[1,1],[0,1]], hist_a = [2,1], hist_b = [1,2]
        // numerator = 1/3, denominator = 4/9 + 1/9 = 5/9  →  κ = 1 - 3/5
        let k = quadratic_weighted_kappa(&[1, 1, 2], &[1, 2, 2], None).unwrap();
        assert!((k - 0.4).abs() < 1e-12);
    }

    #[test]
    fn test_full_disagreement_is_negative() {
        let k = quadratic_weighted_kappa(&[1, 4], &[4, 1], Some(RATING_RANGE)).unwrap();
        assert!(k < 0.0);
    }

    #[test]
    fn test_invalid_inputs() {
        assert!(matches!(
            quadratic_weighted_kappa(&[1, 2], &[1], None),
            Err(Error::InvalidRatings(_))
        ));
        assert!(matches!(
            quadratic_weighted_kappa(&[], &[], None),
            Err(Error::InvalidRatings(_))
        ));
        assert!(matches!(
            quadratic_weighted_kappa(&[1, 5], &[1, 2], Some(RATING_RANGE)),
            Err(Error::InvalidRatings(_))
        ));
    }

    #[test]
    fn test_extreme_span_rejected() {
        assert!(matches!(
            quadratic_weighted_kappa(&[i64::MIN, 0], &[0, i64::MAX], None),
            Err(Error::InvalidRatings(_))
        ));
        assert!(matches!(
            quadratic_weighted_kappa(&[0, 5000], &[0, 5000], None),
            Err(Error::InvalidRatings(_))
        ));
        assert!(matches!(
            quadratic_weighted_kappa(&[2], &[2], Some((4, 1))),
            Err(Error::InvalidRatings(_))
        ));
    }

    #[test]
    fn test_summary() {
        let s = KappaSummary::from_scores(&[0.5, 0.7]);
        assert!((s.mean - 0.6).abs() < 1e-12);
        assert!((s.std - 0.1).abs() < 1e-12);
    }
}
