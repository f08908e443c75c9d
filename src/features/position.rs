// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Intersect positions: *where* one field's n-grams land inside another.
//!
//! For every ordered pair (target, observation) and gram order, each row gets
//! a position list from [`locate`], which is reduced to min / mean / median /
//! max / std. The same five values divided by the observation's own n-gram
//! count give the normalized variants.
//!
//! # The sentinel
//!
//! A row with no overlap (or an empty observation) gets the list `[0]`. Every
//! statistic of `[0]` is 0, so "no overlap" and "overlap at position 0" can't
//! be confused: real positions are 1-based.
//!
//! ```text
//! target      = [a, b, c]
//! observation = [x, a, y, c]
//!                   ^     ^
//! locate      = [2, 4]      min 2, max 4, mean 3.0, median 3.0, std 1.0
//! ```

use std::collections::HashSet;

use super::{map_rows, safe_divide, Columns, Extractor, FeatureSet, PositionStats};
use crate::error::Result;
use crate::schema::{FeatureKey, Stat};
use crate::table::{ColumnValues, FeatureTable};
use crate::types::TokenizedRow;

/// 1-based positions in `observation` of tokens that occur in `target`.
///
/// Returns `[0]` when `observation` is empty or nothing matches. The result is
/// never empty and is in ascending scan order.
pub fn locate(target: &[String], observation: &[String]) -> Vec<usize> {
    if observation.is_empty() {
        return vec![0];
    }
    let target: HashSet<&str> = target.iter().map(String::as_str).collect();
    let positions: Vec<usize> = observation
        .iter()
        .enumerate()
        .filter(|(_, token)| target.contains(token.as_str()))
        .map(|(i, _)| i + 1)
        .collect();
    if positions.is_empty() {
        vec![0]
    } else {
        positions
    }
}

pub struct IntersectPosition {
    set: FeatureSet,
}

impl IntersectPosition {
    pub fn new(set: FeatureSet) -> Self {
        Self { set }
    }
}

impl Extractor for IntersectPosition {
    fn name(&self) -> &'static str {
        "intersect_position"
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
            for (target, obs) in self.set.ordered_pairs() {
                for stat in Stat::ALL {
                    keys.push(FeatureKey::Position { obs, gram, target, stat });
                }
                for stat in Stat::ALL {
                    keys.push(FeatureKey::NormalizedPosition { obs, gram, target, stat });
                }
            }
        }
        keys
    }

    fn extract(&self, rows: &[TokenizedRow], table: &FeatureTable) -> Result<Columns> {
        let mut out: Columns = Vec::new();

        for &gram in &self.set.grams {
            for (target, obs) in self.set.ordered_pairs() {
                let stats: Vec<PositionStats> = map_rows(rows, |row| {
                    let pos = locate(row.tokens(target, gram), row.tokens(obs, gram));
                    PositionStats::from_positions(&pos)
                });
                // Normalized by the observation's own count, not the target's.
                let obs_total = table.require(&FeatureKey::Count { field: obs, gram })?;

                for stat in Stat::ALL {
                    out.push((
                        FeatureKey::Position { obs, gram, target, stat },
                        raw_column(&stats, stat),
                    ));
                }
                for stat in Stat::ALL {
                    let normalized = stats
                        .iter()
                        .enumerate()
                        .map(|(i, s)| safe_divide(stat_value(s, stat), obs_total.f64_at(i)))
                        .collect();
                    out.push((
                        FeatureKey::NormalizedPosition { obs, gram, target, stat },
                        ColumnValues::Float(normalized),
                    ));
                }
            }
        }

        Ok(out)
    }
}

fn stat_value(s: &PositionStats, stat: Stat) -> f64 {
    match stat {
        Stat::Min => s.min as f64,
        Stat::Mean => s.mean,
        Stat::Median => s.median,
        Stat::Max => s.max as f64,
        Stat::Std => s.std,
    }
}

fn raw_column(stats: &[PositionStats], stat: Stat) -> ColumnValues {
    match stat {
        Stat::Min => ColumnValues::Int(stats.iter().map(|s| s.min).collect()),
        Stat::Max => ColumnValues::Int(stats.iter().map(|s| s.max).collect()),
        _ => ColumnValues::Float(stats.iter().map(|s| stat_value(s, stat)).collect()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::test_rows::{row, words};
    use crate::features::BasicCounting;
    use crate::schema::{Field, Gram};

    fn run(rows: &[TokenizedRow]) -> FeatureTable {
        let set = FeatureSet::default();
        let mut table = FeatureTable::new(rows.len());
        for (k, v) in BasicCounting::new(set.clone()).extract(rows, &table).unwrap() {
            table.insert(k, v).unwrap();
        }
        for (k, v) in IntersectPosition::new(set).extract(rows, &table).unwrap() {
            table.insert(k, v).unwrap();
        }
        table
    }

    #[test]
    fn test_locate_scenario() {
        assert_eq!(locate(&words("a b c"), &words("x a y c")), vec![2, 4]);
    }

    #[test]
    fn test_locate_empty_observation() {
        assert_eq!(locate(&words("a b"), &[]), vec![0]);
    }

    #[test]
    fn test_locate_no_match() {
        assert_eq!(locate(&words("a b"), &words("c d")), vec![0]);
        assert_eq!(locate(&[], &words("c d")), vec![0]);
    }

    #[test]
    fn test_locate_duplicates_in_target_ignored() {
        assert_eq!(locate(&words("a a a"), &words("a b a")), vec![1, 3]);
    }

    #[test]
    fn test_position_stats_columns() {
        let table = run(&[row("x a y c", "a b c", "")]);
        let key = |stat| FeatureKey::Position {
            obs: Field::Query,
            gram: Gram::Unigram,
            target: Field::Title,
            stat,
        };
        assert_eq!(table.require(&key(Stat::Min)).unwrap(), &ColumnValues::Int(vec![2]));
        assert_eq!(table.require(&key(Stat::Max)).unwrap(), &ColumnValues::Int(vec![4]));
        assert_eq!(table.require(&key(Stat::Mean)).unwrap().f64_at(0), 3.0);
        assert_eq!(table.require(&key(Stat::Median)).unwrap().f64_at(0), 3.0);

        // divided by count_of_query_unigram = 4
        let norm = FeatureKey::NormalizedPosition {
            obs: Field::Query,
            gram: Gram::Unigram,
            target: Field::Title,
            stat: Stat::Max,
        };
        assert_eq!(table.require(&norm).unwrap().f64_at(0), 1.0);
    }

    #[test]
    fn test_sentinel_gives_zeros() {
        let table = run(&[row("a b", "c d", "")]);
        for stat in Stat::ALL {
            for (obs, target) in [
                (Field::Query, Field::Title),
                (Field::Description, Field::Query),
                (Field::Query, Field::Description),
            ] {
                let raw = FeatureKey::Position { obs, gram: Gram::Unigram, target, stat };
                let norm = FeatureKey::NormalizedPosition { obs, gram: Gram::Unigram, target, stat };
                assert_eq!(table.require(&raw).unwrap().f64_at(0), 0.0);
                assert_eq!(table.require(&norm).unwrap().f64_at(0), 0.0);
            }
        }
    }

    #[test]
    fn test_normalization_uses_observation_count() {
        // title (obs, 5 unigrams) in query (target): "shoes" at position 5
        let table = run(&[row("shoes", "a b c d shoes", "")]);
        let key = FeatureKey::NormalizedPosition {
            obs: Field::Title,
            gram: Gram::Unigram,
            target: Field::Query,
            stat: Stat::Min,
        };
        assert_eq!(table.require(&key).unwrap().f64_at(0), 1.0);
    }
}
