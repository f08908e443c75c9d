// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Feature extractors.
//!
//! Each extractor is a pure function from token sequences (and columns produced
//! by earlier stages) to new columns. Extractors declare up front which columns
//! they read and which they write; the [`pipeline`](crate::pipeline) checks those
//! declarations when stages are composed, not when rows are processed.
//!
//! Every per-row computation is independent of every other row, so columns are
//! computed with `par_iter` when the `parallel` feature is on. Rayon's indexed
//! `collect` keeps row order, and each value is computed by the same sequential
//! code either way, so parallel output is bit-identical to sequential output.

pub mod basic;
pub mod distance;
pub mod intersect;
pub mod math;
pub mod position;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::error::Result;
use crate::schema::{Field, FeatureKey, Gram};
use crate::table::{ColumnValues, FeatureTable};
use crate::types::TokenizedRow;

pub use basic::BasicCounting;
pub use distance::BasicDistance;
pub use intersect::IntersectCounting;
pub use math::{safe_divide, PositionStats};
pub use position::{locate, IntersectPosition};

/// Which fields and gram orders a stage covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureSet {
    pub fields: Vec<Field>,
    pub grams: Vec<Gram>,
}

impl Default for FeatureSet {
    fn default() -> Self {
        Self {
            fields: Field::ALL.to_vec(),
            grams: Gram::ALL.to_vec(),
        }
    }
}

impl FeatureSet {
    pub fn new(fields: Vec<Field>, grams: Vec<Gram>) -> Self {
        Self { fields, grams }
    }

    pub fn has_field(&self, field: Field) -> bool {
        self.fields.contains(&field)
    }

    /// Ordered pairs of distinct configured fields, outer loop first.
    pub fn ordered_pairs(&self) -> Vec<(Field, Field)> {
        let mut pairs = Vec::new();
        for &outer in &self.fields {
            for &inner in &self.fields {
                if outer != inner {
                    pairs.push((outer, inner));
                }
            }
        }
        pairs
    }
}

/// Columns produced by one stage, in declaration order.
pub type Columns = Vec<(FeatureKey, ColumnValues)>;

/// One stage of the feature table builder.
pub trait Extractor: Send + Sync {
    /// Short stage name used in logs and dependency errors.
    fn name(&self) -> &'static str;

    /// Columns this stage reads from the table.
    fn requires(&self) -> Vec<FeatureKey>;

    /// Columns this stage writes, in output order.
    fn produces(&self) -> Vec<FeatureKey>;

    /// Compute every column listed in [`produces`](Extractor::produces).
    fn extract(&self, rows: &[TokenizedRow], table: &FeatureTable) -> Result<Columns>;
}

/// Map every row, in parallel when available. Output order is row order.
pub(crate) fn map_rows<T, F>(rows: &[TokenizedRow], f: F) -> Vec<T>
where
    T: Send,
    F: Fn(&TokenizedRow) -> T + Sync + Send,
{
    #[cfg(feature = "parallel")]
    {
        rows.par_iter().map(f).collect()
    }
    #[cfg(not(feature = "parallel"))]
    {
        rows.iter().map(f).collect()
    }
}

/// Element-wise safe division of two columns.
pub(crate) fn divide_columns(numerator: &ColumnValues, denominator: &ColumnValues) -> Vec<f64> {
    (0..numerator.len())
        .map(|i| safe_divide(numerator.f64_at(i), denominator.f64_at(i)))
        .collect()
}

#[cfg(test)]
pub(crate) mod test_rows {
    //! Row builders for extractor unit tests.

    use crate::schema::{Field, Gram};
    use crate::text::{bigrams, trigrams, DEFAULT_JOIN};
    use crate::types::TokenizedRow;

    pub fn words(s: &str) -> Vec<String> {
        s.split_whitespace().map(str::to_string).collect()
    }

    /// Row whose three fields are whitespace-split from the given strings.
    pub fn row(query: &str, title: &str, description: &str) -> TokenizedRow {
        let mut out = TokenizedRow::new(0, 0);
        for (field, text) in [
            (Field::Query, query),
            (Field::Title, title),
            (Field::Description, description),
        ] {
            let w = words(text);
            out = out
                .with_tokens(field, Gram::Bigram, bigrams(&w, DEFAULT_JOIN))
                .with_tokens(field, Gram::Trigram, trigrams(&w, DEFAULT_JOIN))
                .with_tokens(field, Gram::Unigram, w);
        }
        out
    }
}
