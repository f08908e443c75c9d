// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Basic counting: sizes of each field on its own.
//!
//! Per field and gram order: token count, distinct-token count and their ratio.
//! Per field: how many unigrams are purely numeric, and what share they are.
//! Plus a single `description_missing` flag.

use std::collections::HashSet;

use tracing::debug;

use super::{map_rows, safe_divide, Columns, Extractor, FeatureSet};
use crate::error::Result;
use crate::schema::{FeatureKey, Field, Gram};
use crate::table::{ColumnValues, FeatureTable};
use crate::types::TokenizedRow;

/// A token counts as a digit token when it is non-empty and every char is `0-9`.
pub fn is_digit_token(token: &str) -> bool {
    !token.is_empty() && token.bytes().all(|b| b.is_ascii_digit())
}

/// Number of distinct tokens.
pub fn unique_count(tokens: &[String]) -> usize {
    tokens.iter().map(String::as_str).collect::<HashSet<_>>().len()
}

pub struct BasicCounting {
    set: FeatureSet,
}

impl BasicCounting {
    pub fn new(set: FeatureSet) -> Self {
        Self { set }
    }
}

impl Extractor for BasicCounting {
    fn name(&self) -> &'static str {
        "basic_counting"
    }

    fn requires(&self) -> Vec<FeatureKey> {
        Vec::new()
    }

    fn produces(&self) -> Vec<FeatureKey> {
        let mut keys = Vec::new();
        for &field in &self.set.fields {
            for &gram in &self.set.grams {
                keys.push(FeatureKey::Count { field, gram });
                keys.push(FeatureKey::UniqueCount { field, gram });
                keys.push(FeatureKey::UniqueRatio { field, gram });
            }
            keys.push(FeatureKey::DigitCount { field });
            keys.push(FeatureKey::DigitRatio { field });
        }
        if self.set.has_field(Field::Description) {
            keys.push(FeatureKey::DescriptionMissing);
        }
        keys
    }

    fn extract(&self, rows: &[TokenizedRow], _table: &FeatureTable) -> Result<Columns> {
        let mut out: Columns = Vec::new();

        for &field in &self.set.fields {
            for &gram in &self.set.grams {
                let counts: Vec<(usize, usize)> = map_rows(rows, |row| {
                    let tokens = row.tokens(field, gram);
                    (tokens.len(), unique_count(tokens))
                });
                let ratio = counts
                    .iter()
                    .map(|&(n, u)| safe_divide(u as f64, n as f64))
                    .collect();

                out.push((
                    FeatureKey::Count { field, gram },
                    ColumnValues::Int(counts.iter().map(|&(n, _)| n as i64).collect()),
                ));
                out.push((
                    FeatureKey::UniqueCount { field, gram },
                    ColumnValues::Int(counts.iter().map(|&(_, u)| u as i64).collect()),
                ));
                out.push((
                    FeatureKey::UniqueRatio { field, gram },
                    ColumnValues::Float(ratio),
                ));
            }

            let digits: Vec<(usize, usize)> = map_rows(rows, |row| {
                let tokens = row.tokens(field, Gram::Unigram);
                let d = tokens.iter().filter(|t| is_digit_token(t)).count();
                (d, tokens.len())
            });
            out.push((
                FeatureKey::DigitCount { field },
                ColumnValues::Int(digits.iter().map(|&(d, _)| d as i64).collect()),
            ));
            out.push((
                FeatureKey::DigitRatio { field },
                ColumnValues::Float(
                    digits
                        .iter()
                        .map(|&(d, n)| safe_divide(d as f64, n as f64))
                        .collect(),
                ),
            ));
            debug!(field = %field, "basic counting columns computed");
        }

        if self.set.has_field(Field::Description) {
            let missing = map_rows(rows, |row| {
                i64::from(row.tokens(Field::Description, Gram::Unigram).is_empty())
            });
            out.push((FeatureKey::DescriptionMissing, ColumnValues::Int(missing)));
        }

        Ok(out)
    }
}
