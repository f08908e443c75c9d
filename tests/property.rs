// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Property-based tests using proptest.
//!
//! Invariants that must hold for any token sequences, not just the fixtures.

mod common;

use proptest::prelude::*;
use relfeat::artifact::{decode, encode};
use relfeat::features::basic::unique_count;
use relfeat::features::distance::{dice_dist, jaccard_coef};
use relfeat::features::intersect::containment_count;
use relfeat::text::{ngrams, tokenize, DEFAULT_JOIN};
use relfeat::{
    locate, safe_divide, ColumnValues, FeatureBuilder, FeatureSet, PositionStats, TokenizedRow,
};

// ============================================================================
// STRATEGIES
// ============================================================================

/// Small alphabet so overlaps actually happen.
fn token_strategy() -> impl Strategy<Value = String> {
    prop::sample::select(vec!["a", "b", "c", "d", "e", "1", "22"]).prop_map(str::to_string)
}

fn tokens_strategy() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(token_strategy(), 0..12)
}

fn text_strategy() -> impl Strategy<Value = String> {
    tokens_strategy().prop_map(|t| t.join(" "))
}

// ============================================================================
// LOCATE
// ============================================================================

proptest! {
    #[test]
    fn prop_locate_sentinel_iff_no_overlap(target in tokens_strategy(), obs in tokens_strategy()) {
        let pos = locate(&target, &obs);
        let overlap = obs.iter().any(|t| target.contains(t));
        prop_assert!(!pos.is_empty());
        prop_assert_eq!(pos == vec![0], !overlap);
    }

    #[test]
    fn prop_locate_in_range_and_sorted(target in tokens_strategy(), obs in tokens_strategy()) {
        let pos = locate(&target, &obs);
        if pos != vec![0] {
            for p in &pos {
                prop_assert!(*p >= 1 && *p <= obs.len());
                prop_assert!(target.contains(&obs[p - 1]));
            }
            prop_assert!(pos.windows(2).all(|w| w[0] < w[1]));
        }
    }

    #[test]
    fn prop_position_stats_bounded(target in tokens_strategy(), obs in tokens_strategy()) {
        let pos = locate(&target, &obs);
        let s = PositionStats::from_positions(&pos);
        prop_assert!(s.min as f64 <= s.median && s.median <= s.max as f64);
        prop_assert!(s.min as f64 <= s.mean && s.mean <= s.max as f64 + 1e-9);
        prop_assert!(s.std >= 0.0);
    }
}

// ============================================================================
// COUNTING
// ============================================================================

proptest! {
    #[test]
    fn prop_unique_ratio_in_unit_interval(tokens in tokens_strategy()) {
        let ratio = safe_divide(unique_count(&tokens) as f64, tokens.len() as f64);
        prop_assert!((0.0..=1.0).contains(&ratio));

        let mut distinct = tokens.clone();
        distinct.sort();
        distinct.dedup();
        prop_assert_eq!(ratio == 1.0, !tokens.is_empty() && distinct.len() == tokens.len());
        if tokens.is_empty() {
            prop_assert_eq!(ratio, 0.0);
        }
    }

    #[test]
    fn prop_containment_bounded_by_observation(obs in tokens_strategy(), target in tokens_strategy()) {
        prop_assert!(containment_count(&obs, &target) <= obs.len());
    }

    #[test]
    fn prop_safe_divide_by_zero(x in any::<f64>()) {
        prop_assert_eq!(safe_divide(x, 0.0), 0.0);
    }

    #[test]
    fn prop_set_distances_in_unit_interval(a in tokens_strategy(), b in tokens_strategy()) {
        let j = jaccard_coef(&a, &b);
        let d = dice_dist(&a, &b);
        prop_assert!((0.0..=1.0).contains(&j));
        prop_assert!((0.0..=1.0).contains(&d));
        prop_assert_eq!(j, jaccard_coef(&b, &a));
        prop_assert!(d + 1e-12 >= j);
    }
}

// ============================================================================
// TABLE
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_table_finite_and_sentinel_consistent(
        texts in prop::collection::vec((text_strategy(), text_strategy(), text_strategy()), 1..6)
    ) {
        let rows: Vec<TokenizedRow> = texts
            .iter()
            .map(|(q, t, d)| common::tokenized(q, t, d))
            .collect();
        let builder = FeatureBuilder::counting(FeatureSet::default()).unwrap();
        let table = builder.build(&rows).unwrap();

        for column in table.columns() {
            for v in column.values.to_f64_vec() {
                prop_assert!(v.is_finite(), "{}", column.name);
            }
            if column.name.starts_with("ratio_of_unique") {
                for v in column.values.to_f64_vec() {
                    prop_assert!((0.0..=1.0).contains(&v));
                }
            }
        }
    }

    #[test]
    fn prop_artifact_decode_inverts_encode(values in prop::collection::vec(any::<i64>(), 0..64)) {
        let column = ColumnValues::Int(values);
        prop_assert_eq!(decode(&encode(&column).unwrap()).unwrap(), column);
    }

    #[test]
    fn prop_ngram_counts(text in text_strategy()) {
        let words = tokenize(&text);
        let bigrams = ngrams(&words, relfeat::Gram::Bigram, DEFAULT_JOIN);
        let trigrams = ngrams(&words, relfeat::Gram::Trigram, DEFAULT_JOIN);
        match words.len() {
            0 => {
                prop_assert!(bigrams.is_empty());
                prop_assert!(trigrams.is_empty());
            }
            1 => {
                prop_assert_eq!(bigrams.len(), 1);
                prop_assert_eq!(trigrams.len(), 1);
            }
            2 => {
                prop_assert_eq!(bigrams.len(), 1);
                prop_assert_eq!(trigrams.len(), 1);
            }
            n => {
                prop_assert_eq!(bigrams.len(), n - 1);
                prop_assert_eq!(trigrams.len(), n - 2);
            }
        }
    }
}
