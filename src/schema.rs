// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Feature naming, in one place.
//!
//! Downstream model code selects columns by substring (`"count" in name`,
//! `"pos_of" in name`), so the names are an interface. Every name is built from
//! a [`FeatureKey`] and nothing else; extractors never format strings
//! themselves. A typo in a key is a compile error instead of a silently empty
//! column.
//!
//! # Naming scheme
//!
//! ```text
//! count_of_<field>_<gram>                       basic
//! count_of_unique_<field>_<gram>
//! ratio_of_unique_<field>_<gram>
//! count_of_digit_in_<field>
//! ratio_of_digit_in_<field>
//! description_missing
//! count_of_<obs>_<gram>_in_<target>             intersect counting
//! ratio_of_<obs>_<gram>_in_<target>
//! title_<gram>_in_query_div_query_<gram>[_in_title]
//! description_<gram>_in_query_div_query_<gram>[_in_description]
//! pos_of_<obs>_<gram>_in_<target>_<stat>        intersect position
//! normalized_pos_of_<obs>_<gram>_in_<target>_<stat>
//! jaccard_coef_of_<gram>_between_<a>_<b>        distance
//! dice_dist_of_<gram>_between_<a>_<b>
//! ```

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::Error;

// ============================================================================
// FIELDS AND GRAMS
// ============================================================================

/// One of the three text fields of a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    Query,
    Title,
    Description,
}

impl Field {
    pub const ALL: [Field; 3] = [Field::Query, Field::Title, Field::Description];

    pub fn as_str(self) -> &'static str {
        match self {
            Field::Query => "query",
            Field::Title => "title",
            Field::Description => "description",
        }
    }

    /// Slot in per-row storage.
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }
}

impl FromStr for Field {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "query" => Ok(Field::Query),
            "title" => Ok(Field::Title),
            "description" => Ok(Field::Description),
            other => Err(Error::UnknownField(other.to_string())),
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// N-gram order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Gram {
    Unigram,
    Bigram,
    Trigram,
}

impl Gram {
    pub const ALL: [Gram; 3] = [Gram::Unigram, Gram::Bigram, Gram::Trigram];

    pub fn as_str(self) -> &'static str {
        match self {
            Gram::Unigram => "unigram",
            Gram::Bigram => "bigram",
            Gram::Trigram => "trigram",
        }
    }

    /// Number of unigrams joined into one token.
    pub fn order(self) -> usize {
        self as usize + 1
    }

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }
}

impl FromStr for Gram {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unigram" => Ok(Gram::Unigram),
            "bigram" => Ok(Gram::Bigram),
            "trigram" => Ok(Gram::Trigram),
            other => Err(Error::UnknownGram(other.to_string())),
        }
    }
}

impl fmt::Display for Gram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// Config files name fields and grams as plain strings. Going through FromStr
// keeps the error message identical to the one the CLI reports.
macro_rules! serde_via_str {
    ($ty:ty) => {
        impl Serialize for $ty {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = String::deserialize(deserializer)?;
                raw.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

serde_via_str!(Field);
serde_via_str!(Gram);

// ============================================================================
// STATISTICS AND DERIVED KINDS
// ============================================================================

/// Reduction applied to a position list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Stat {
    Min,
    Mean,
    Median,
    Max,
    Std,
}

impl Stat {
    pub const ALL: [Stat; 5] = [Stat::Min, Stat::Mean, Stat::Median, Stat::Max, Stat::Std];

    pub fn as_str(self) -> &'static str {
        match self {
            Stat::Min => "min",
            Stat::Mean => "mean",
            Stat::Median => "median",
            Stat::Max => "max",
            Stat::Std => "std",
        }
    }
}

/// The four containment cross-ratios of the intersect counting stage.
///
/// Each one divides "title (or description) n-grams found in the query" by
/// either the query's own n-gram count or the query's containment in that
/// field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CrossRatio {
    TitleInQueryDivQuery,
    TitleInQueryDivQueryInTitle,
    DescriptionInQueryDivQuery,
    DescriptionInQueryDivQueryInDescription,
}

impl CrossRatio {
    pub const ALL: [CrossRatio; 4] = [
        CrossRatio::TitleInQueryDivQuery,
        CrossRatio::TitleInQueryDivQueryInTitle,
        CrossRatio::DescriptionInQueryDivQuery,
        CrossRatio::DescriptionInQueryDivQueryInDescription,
    ];

    /// The field whose containment in the query is the numerator.
    pub fn field(self) -> Field {
        match self {
            CrossRatio::TitleInQueryDivQuery | CrossRatio::TitleInQueryDivQueryInTitle => {
                Field::Title
            }
            CrossRatio::DescriptionInQueryDivQuery
            | CrossRatio::DescriptionInQueryDivQueryInDescription => Field::Description,
        }
    }

    pub fn numerator(self, gram: Gram) -> FeatureKey {
        FeatureKey::IntersectCount {
            obs: self.field(),
            gram,
            target: Field::Query,
        }
    }

    pub fn denominator(self, gram: Gram) -> FeatureKey {
        match self {
            CrossRatio::TitleInQueryDivQuery | CrossRatio::DescriptionInQueryDivQuery => {
                FeatureKey::Count {
                    field: Field::Query,
                    gram,
                }
            }
            CrossRatio::TitleInQueryDivQueryInTitle
            | CrossRatio::DescriptionInQueryDivQueryInDescription => FeatureKey::IntersectCount {
                obs: Field::Query,
                gram,
                target: self.field(),
            },
        }
    }

    fn includes_target(self) -> bool {
        matches!(
            self,
            CrossRatio::TitleInQueryDivQueryInTitle
                | CrossRatio::DescriptionInQueryDivQueryInDescription
        )
    }
}

/// Set-overlap metric of the distance stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DistanceMetric {
    JaccardCoef,
    DiceDist,
}

impl DistanceMetric {
    pub const ALL: [DistanceMetric; 2] = [DistanceMetric::JaccardCoef, DistanceMetric::DiceDist];

    pub fn as_str(self) -> &'static str {
        match self {
            DistanceMetric::JaccardCoef => "jaccard_coef",
            DistanceMetric::DiceDist => "dice_dist",
        }
    }
}

// ============================================================================
// FEATURE KEYS
// ============================================================================

/// Storage type of a feature column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Int,
    Float,
}

/// Typed identity of one feature column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FeatureKey {
    Count { field: Field, gram: Gram },
    UniqueCount { field: Field, gram: Gram },
    UniqueRatio { field: Field, gram: Gram },
    DigitCount { field: Field },
    DigitRatio { field: Field },
    DescriptionMissing,
    IntersectCount { obs: Field, gram: Gram, target: Field },
    IntersectRatio { obs: Field, gram: Gram, target: Field },
    CrossRatio { kind: CrossRatio, gram: Gram },
    Position { obs: Field, gram: Gram, target: Field, stat: Stat },
    NormalizedPosition { obs: Field, gram: Gram, target: Field, stat: Stat },
    Distance { metric: DistanceMetric, gram: Gram, a: Field, b: Field },
}

impl FeatureKey {
    pub fn column_type(&self) -> ColumnType {
        match self {
            FeatureKey::Count { .. }
            | FeatureKey::UniqueCount { .. }
            | FeatureKey::DigitCount { .. }
            | FeatureKey::DescriptionMissing
            | FeatureKey::IntersectCount { .. } => ColumnType::Int,
            FeatureKey::Position { stat, .. } => match stat {
                Stat::Min | Stat::Max => ColumnType::Int,
                Stat::Mean | Stat::Median | Stat::Std => ColumnType::Float,
            },
            _ => ColumnType::Float,
        }
    }

    /// Column name as written to manifests and artifact filenames.
    pub fn name(&self) -> String {
        self.to_string()
    }

    /// Every key that any stage can produce, in a stable order.
    pub fn universe() -> Vec<FeatureKey> {
        let mut keys = Vec::new();
        for field in Field::ALL {
            for gram in Gram::ALL {
                keys.push(FeatureKey::Count { field, gram });
                keys.push(FeatureKey::UniqueCount { field, gram });
                keys.push(FeatureKey::UniqueRatio { field, gram });
            }
            keys.push(FeatureKey::DigitCount { field });
            keys.push(FeatureKey::DigitRatio { field });
        }
        keys.push(FeatureKey::DescriptionMissing);

        for gram in Gram::ALL {
            for obs in Field::ALL {
                for target in Field::ALL {
                    if obs == target {
                        continue;
                    }
                    keys.push(FeatureKey::IntersectCount { obs, gram, target });
                    keys.push(FeatureKey::IntersectRatio { obs, gram, target });
                    for stat in Stat::ALL {
                        keys.push(FeatureKey::Position { obs, gram, target, stat });
                        keys.push(FeatureKey::NormalizedPosition { obs, gram, target, stat });
                    }
                }
            }
            for kind in CrossRatio::ALL {
                keys.push(FeatureKey::CrossRatio { kind, gram });
            }
            for metric in DistanceMetric::ALL {
                for (i, a) in Field::ALL.iter().enumerate() {
                    for b in &Field::ALL[i + 1..] {
                        keys.push(FeatureKey::Distance { metric, gram, a: *a, b: *b });
                    }
                }
            }
        }
        keys
    }
}

impl fmt::Display for FeatureKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            FeatureKey::Count { field, gram } => write!(f, "count_of_{}_{}", field, gram),
            FeatureKey::UniqueCount { field, gram } => {
                write!(f, "count_of_unique_{}_{}", field, gram)
            }
            FeatureKey::UniqueRatio { field, gram } => {
                write!(f, "ratio_of_unique_{}_{}", field, gram)
            }
            FeatureKey::DigitCount { field } => write!(f, "count_of_digit_in_{}", field),
            FeatureKey::DigitRatio { field } => write!(f, "ratio_of_digit_in_{}", field),
            FeatureKey::DescriptionMissing => f.write_str("description_missing"),
            FeatureKey::IntersectCount { obs, gram, target } => {
                write!(f, "count_of_{}_{}_in_{}", obs, gram, target)
            }
            FeatureKey::IntersectRatio { obs, gram, target } => {
                write!(f, "ratio_of_{}_{}_in_{}", obs, gram, target)
            }
            FeatureKey::CrossRatio { kind, gram } => {
                write!(f, "{}_{}_in_query_div_query_{}", kind.field(), gram, gram)?;
                if kind.includes_target() {
                    write!(f, "_in_{}", kind.field())?;
                }
                Ok(())
            }
            FeatureKey::Position { obs, gram, target, stat } => {
                write!(f, "pos_of_{}_{}_in_{}_{}", obs, gram, target, stat.as_str())
            }
            FeatureKey::NormalizedPosition { obs, gram, target, stat } => write!(
                f,
                "normalized_pos_of_{}_{}_in_{}_{}",
                obs,
                gram,
                target,
                stat.as_str()
            ),
            FeatureKey::Distance { metric, gram, a, b } => {
                write!(f, "{}_of_{}_between_{}_{}", metric.as_str(), gram, a, b)
            }
        }
    }
}

/// Name → key lookup over [`FeatureKey::universe`], built on first use.
static NAME_INDEX: OnceLock<HashMap<String, FeatureKey>> = OnceLock::new();

impl FromStr for FeatureKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NAME_INDEX
            .get_or_init(|| {
                FeatureKey::universe()
                    .into_iter()
                    .map(|key| (key.name(), key))
                    .collect()
            })
            .get(s)
            .copied()
            .ok_or_else(|| Error::UnknownFeature(s.to_string()))
    }
}

// ============================================================================
// SCHEMA
// ============================================================================

/// Ordered list of feature columns with their storage types.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schema {
    entries: Vec<(FeatureKey, ColumnType)>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a key; a key already present keeps its original position.
    pub fn push(&mut self, key: FeatureKey) {
        if !self.contains(&key) {
            self.entries.push((key, key.column_type()));
        }
    }

    pub fn contains(&self, key: &FeatureKey) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &FeatureKey> {
        self.entries.iter().map(|(k, _)| k)
    }

    pub fn entries(&self) -> &[(FeatureKey, ColumnType)] {
        &self.entries
    }

    pub fn names(&self) -> Vec<String> {
        self.keys().map(FeatureKey::name).collect()
    }
}

impl FromIterator<FeatureKey> for Schema {
    fn from_iter<I: IntoIterator<Item = FeatureKey>>(iter: I) -> Self {
        let mut schema = Schema::new();
        for key in iter {
            schema.push(key);
        }
        schema
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_basic_names() {
        let key = FeatureKey::Count {
            field: Field::Query,
            gram: Gram::Unigram,
        };
        assert_eq!(key.name(), "count_of_query_unigram");
        assert_eq!(
            FeatureKey::DigitRatio {
                field: Field::Description
            }
            .name(),
            "ratio_of_digit_in_description"
        );
        assert_eq!(FeatureKey::DescriptionMissing.name(), "description_missing");
    }

    #[test]
    fn test_cross_ratio_names() {
        let names: Vec<String> = CrossRatio::ALL
            .iter()
            .map(|&kind| FeatureKey::CrossRatio { kind, gram: Gram::Bigram }.name())
            .collect();
        assert_eq!(
            names,
            vec![
                "title_bigram_in_query_div_query_bigram",
                "title_bigram_in_query_div_query_bigram_in_title",
                "description_bigram_in_query_div_query_bigram",
                "description_bigram_in_query_div_query_bigram_in_description",
            ]
        );
    }

    #[test]
    fn test_position_names() {
        let key = FeatureKey::NormalizedPosition {
            obs: Field::Title,
            gram: Gram::Trigram,
            target: Field::Query,
            stat: Stat::Median,
        };
        assert_eq!(key.name(), "normalized_pos_of_title_trigram_in_query_median");
    }

    #[test]
    fn test_universe_names_unique_and_parse_back() {
        let universe = FeatureKey::universe();
        let names: HashSet<String> = universe.iter().map(FeatureKey::name).collect();
        assert_eq!(names.len(), universe.len());
        for key in universe {
            assert_eq!(key.name().parse::<FeatureKey>().unwrap(), key);
        }
    }

    #[test]
    fn test_universe_size() {
        // 27 basic + 6 digit + 1 missing + 36 intersect + 12 cross
        // + 180 position + 18 distance
        assert_eq!(FeatureKey::universe().len(), 280);
    }

    #[test]
    fn test_unknown_names_rejected() {
        assert!(matches!(
            "count_of_querry_unigram".parse::<FeatureKey>(),
            Err(Error::UnknownFeature(_))
        ));
        assert!(matches!("titel".parse::<Field>(), Err(Error::UnknownField(_))));
        assert!(matches!("fourgram".parse::<Gram>(), Err(Error::UnknownGram(_))));
    }

    #[test]
    fn test_column_types() {
        let min = FeatureKey::Position {
            obs: Field::Query,
            gram: Gram::Unigram,
            target: Field::Title,
            stat: Stat::Min,
        };
        let std = FeatureKey::Position {
            obs: Field::Query,
            gram: Gram::Unigram,
            target: Field::Title,
            stat: Stat::Std,
        };
        assert_eq!(min.column_type(), ColumnType::Int);
        assert_eq!(std.column_type(), ColumnType::Float);
        assert_eq!(FeatureKey::DescriptionMissing.column_type(), ColumnType::Int);
    }

    #[test]
    fn test_schema_dedups() {
        let key = FeatureKey::DescriptionMissing;
        let schema: Schema = [key, key].into_iter().collect();
        assert_eq!(schema.len(), 1);
    }

    #[test]
    fn test_field_serde() {
        let fields: Vec<Field> = serde_json::from_str(r#"["query", "description"]"#).unwrap();
        assert_eq!(fields, vec![Field::Query, Field::Description]);
        assert!(serde_json::from_str::<Vec<Field>>(r#"["body"]"#).is_err());
    }
}
