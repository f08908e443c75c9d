// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Set-overlap distances between field pairs.
//!
//! Jaccard coefficient `|A ∩ B| / |A ∪ B|` and Dice `2|A ∩ B| / (|A| + |B|)`
//! over the n-gram *sets* of two fields. Both are symmetric, so only unordered
//! pairs are emitted, named in canonical field order (query < title <
//! description). Two empty fields give 0, not `NaN`.

use std::collections::HashSet;

use super::{map_rows, safe_divide, Columns, Extractor, FeatureSet};
use crate::error::Result;
use crate::schema::{DistanceMetric, FeatureKey, Field};
use crate::table::{ColumnValues, FeatureTable};
use crate::types::TokenizedRow;

fn as_set(tokens: &[String]) -> HashSet<&str> {
    tokens.iter().map(String::as_str).collect()
}

pub fn jaccard_coef(a: &[String], b: &[String]) -> f64 {
    let (a, b) = (as_set(a), as_set(b));
    let intersect = a.intersection(&b).count();
    let union = a.union(&b).count();
    safe_divide(intersect as f64, union as f64)
}

pub fn dice_dist(a: &[String], b: &[String]) -> f64 {
    let (a, b) = (as_set(a), as_set(b));
    let intersect = a.intersection(&b).count();
    safe_divide(2.0 * intersect as f64, (a.len() + b.len()) as f64)
}

pub fn distance(metric: DistanceMetric, a: &[String], b: &[String]) -> f64 {
    match metric {
        DistanceMetric::JaccardCoef => jaccard_coef(a, b),
        DistanceMetric::DiceDist => dice_dist(a, b),
    }
}

pub struct BasicDistance {
    set: FeatureSet,
}

impl BasicDistance {
    pub fn new(set: FeatureSet) -> Self {
        Self { set }
    }

    fn pairs(&self) -> Vec<(Field, Field)> {
        let mut fields = self.set.fields.clone();
        fields.sort();
        fields.dedup();
        let mut pairs = Vec::new();
        for (i, &a) in fields.iter().enumerate() {
            for &b in &fields[i + 1..] {
                pairs.push((a, b));
            }
        }
        pairs
    }
}

impl Extractor for BasicDistance {
    fn name(&self) -> &'static str {
        "basic_distance"
    }

    fn requires(&self) -> Vec<FeatureKey> {
        Vec::new()
    }

    fn produces(&self) -> Vec<FeatureKey> {
        let mut keys = Vec::new();
        for metric in DistanceMetric::ALL {
            for &gram in &self.set.grams {
                for (a, b) in self.pairs() {
                    keys.push(FeatureKey::Distance { metric, gram, a, b });
                }
            }
        }
        keys
    }

    fn extract(&self, rows: &[TokenizedRow], _table: &FeatureTable) -> Result<Columns> {
        let out = self
            .produces()
            .into_iter()
            .map(|key| {
                let FeatureKey::Distance { metric, gram, a, b } = key else {
                    unreachable!("basic distance only produces distance keys")
                };
                let values = map_rows(rows, |row| {
                    distance(metric, row.tokens(a, gram), row.tokens(b, gram))
                });
                (key, ColumnValues::Float(values))
            })
            .collect();
        Ok(out)
    }
}
