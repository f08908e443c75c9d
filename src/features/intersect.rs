// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Intersect counting: how much of one field shows up in another.
//!
//! `count_of_<obs>_<gram>_in_<target>` walks the observation's n-grams and
//! counts those present in the target's n-gram set. Repeats in the observation
//! count every time; repeats in the target don't matter. The count can never
//! exceed `count_of_<obs>_<gram>`, which is also its ratio's denominator.
//!
//! On top of that come four cross-ratios per gram order relating title and
//! description containment in the query to the query's own size and to the
//! query's containment in them.

use std::collections::{HashMap, HashSet};

use super::{divide_columns, map_rows, Columns, Extractor, FeatureSet};
use crate::error::{Error, Result};
use crate::schema::{CrossRatio, FeatureKey, Field};
use crate::table::{ColumnValues, FeatureTable};
use crate::types::TokenizedRow;

/// Number of `obs` tokens that are members of `target`.
pub fn containment_count(obs: &[String], target: &[String]) -> usize {
    if obs.is_empty() || target.is_empty() {
        return 0;
    }
    let target: HashSet<&str> = target.iter().map(String::as_str).collect();
    obs.iter().filter(|t| target.contains(t.as_str())).count()
}

pub struct IntersectCounting {
    set: FeatureSet,
}

impl IntersectCounting {
    pub fn new(set: FeatureSet) -> Self {
        Self { set }
    }

    /// Cross-ratios whose operands are all configured.
    fn cross_ratios(&self) -> Vec<CrossRatio> {
        if !self.set.has_field(Field::Query) {
            return Vec::new();
        }
        CrossRatio::ALL
            .into_iter()
            .filter(|kind| self.set.has_field(kind.field()))
            .collect()
    }
}

impl Extractor for IntersectCounting {
    fn name(&self) -> &'static str {
        "intersect_counting"
    }

    fn requires(&self) -> Vec<FeatureKey> {
        let mut keys = Vec::new();
        for &gram in &self.set.grams {
            for &field in &self.set.fields {
                keys.push(FeatureKey::Count { field, gram });
            }
        }
        keys
    }

    fn produces(&self) -> Vec<FeatureKey> {
        let mut keys = Vec::new();
        for &gram in &self.set.grams {
            for (obs, target) in self.set.ordered_pairs() {
                keys.push(FeatureKey::IntersectCount { obs, gram, target });
                keys.push(FeatureKey::IntersectRatio { obs, gram, target });
            }
            for kind in self.cross_ratios() {
                keys.push(FeatureKey::CrossRatio { kind, gram });
            }
        }
        keys
    }

    fn extract(&self, rows: &[TokenizedRow], table: &FeatureTable) -> Result<Columns> {
        let mut out: Columns = Vec::new();

        for &gram in &self.set.grams {
            let mut counts: HashMap<FeatureKey, ColumnValues> = HashMap::new();

            for (obs, target) in self.set.ordered_pairs() {
                let count_key = FeatureKey::IntersectCount { obs, gram, target };
                let count = ColumnValues::Int(map_rows(rows, |row| {
                    containment_count(row.tokens(obs, gram), row.tokens(target, gram)) as i64
                }));
                let obs_total = table.require(&FeatureKey::Count { field: obs, gram })?;
                let ratio = divide_columns(&count, obs_total);

                out.push((count_key, count.clone()));
                out.push((
                    FeatureKey::IntersectRatio { obs, gram, target },
                    ColumnValues::Float(ratio),
                ));
                counts.insert(count_key, count);
            }

            for kind in self.cross_ratios() {
                let numerator = lookup(&counts, table, &kind.numerator(gram))?;
                let denominator = lookup(&counts, table, &kind.denominator(gram))?;
                if numerator.len() != denominator.len() {
                    return Err(Error::RowCountMismatch {
                        column: kind.denominator(gram).name(),
                        expected: numerator.len(),
                        actual: denominator.len(),
                    });
                }
                out.push((
                    FeatureKey::CrossRatio { kind, gram },
                    ColumnValues::Float(divide_columns(numerator, denominator)),
                ));
            }
        }

        Ok(out)
    }
}

/// A column computed earlier in this stage, else one from the table.
fn lookup<'a>(
    own: &'a HashMap<FeatureKey, ColumnValues>,
    table: &'a FeatureTable,
    key: &FeatureKey,
) -> Result<&'a ColumnValues> {
    match own.get(key) {
        Some(values) => Ok(values),
        None => table.require(key),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::test_rows::{row, words};
    use crate::features::BasicCounting;
    use crate::schema::Gram;

    fn run(rows: &[TokenizedRow]) -> FeatureTable {
        let set = FeatureSet::default();
        let mut table = FeatureTable::new(rows.len());
        for (k, v) in BasicCounting::new(set.clone()).extract(rows, &table).unwrap() {
            table.insert(k, v).unwrap();
        }
        let cols = IntersectCounting::new(set).extract(rows, &table).unwrap();
        for (k, v) in cols {
            table.insert(k, v).unwrap();
        }
        table
    }

    #[test]
    fn test_containment_counts_repeats() {
        assert_eq!(containment_count(&words("a a b c"), &words("a c")), 3);
        assert_eq!(containment_count(&words("a b"), &words("a a a")), 1);
        assert_eq!(containment_count(&[], &words("a")), 0);
        assert_eq!(containment_count(&words("a"), &[]), 0);
    }

    #[test]
    fn test_count_and_ratio() {
        let table = run(&[row("red shoes", "red running shoes for men", "")]);
        let count = table
            .require(&FeatureKey::IntersectCount {
                obs: Field::Query,
                gram: Gram::Unigram,
                target: Field::Title,
            })
            .unwrap();
        assert_eq!(count, &ColumnValues::Int(vec![2]));

        let ratio = table
            .require(&FeatureKey::IntersectRatio {
                obs: Field::Title,
                gram: Gram::Unigram,
                target: Field::Query,
            })
            .unwrap();
        assert!((ratio.f64_at(0) - 0.4).abs() < 1e-12);
    }

    #[test]
    fn test_cross_ratios() {
        // title unigrams in query: "red", "shoes", "red" = 3; query count = 2;
        // query in title = 2
        let table = run(&[row("red shoes", "red shoes red", "")]);
        let get = |kind| {
            table
                .require(&FeatureKey::CrossRatio {
                    kind,
                    gram: Gram::Unigram,
                })
                .unwrap()
                .f64_at(0)
        };
        assert_eq!(get(CrossRatio::TitleInQueryDivQuery), 1.5);
        assert_eq!(get(CrossRatio::TitleInQueryDivQueryInTitle), 1.5);
        assert_eq!(get(CrossRatio::DescriptionInQueryDivQuery), 0.0);
        assert_eq!(get(CrossRatio::DescriptionInQueryDivQueryInDescription), 0.0);
    }

    #[test]
    fn test_cross_ratios_need_query() {
        let stage = IntersectCounting::new(FeatureSet::new(
            vec![Field::Title, Field::Description],
            vec![Gram::Unigram],
        ));
        assert!(stage
            .produces()
            .iter()
            .all(|k| !matches!(k, FeatureKey::CrossRatio { .. })));
    }

    #[test]
    fn test_missing_dependency_reported() {
        let rows = vec![row("a", "a", "a")];
        let stage = IntersectCounting::new(FeatureSet::default());
        let err = stage.extract(&rows, &FeatureTable::new(1)).unwrap_err();
        assert!(matches!(err, Error::MissingColumn(_)));
    }
}
