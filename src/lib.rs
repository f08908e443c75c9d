// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Text-relevance feature engineering for query / product-title / product-description rows.
//!
//! Each row carries three text fields. The crate tokenizes them into unigram,
//! bigram and trigram sequences, derives counting, containment, position and
//! set-distance features from those sequences, and writes the resulting
//! columns per cross-validation fold for model training.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────┐     ┌──────────────┐     ┌──────────────────────────┐
//! │  types.rs  │────▶│   text.rs    │────▶│       pipeline.rs        │
//! │   (Row)    │     │ (tokenize,   │     │ basic → intersect →      │
//! │            │     │  n-grams)    │     │ position (→ distance)    │
//! └────────────┘     └──────────────┘     └──────────────────────────┘
//!                                                     │
//!                                                     ▼
//! ┌────────────┐     ┌──────────────┐     ┌──────────────────────────┐
//! │ manifest.rs│◀────│   build/     │◀────│        table.rs          │
//! │ (.feat_name│     │ (run_build)  │     │ (FeatureTable, typed     │
//! │  files)    │     │              │     │  named columns)          │
//! └────────────┘     └──────────────┘     └──────────────────────────┘
//!                           │
//!                           ▼
//!                    ┌──────────────┐     ┌──────────────────────────┐
//!                    │   split.rs   │────▶│       artifact.rs        │
//!                    │ (Run/Fold,   │     │ (RFEA header, CRC32      │
//!                    │  All)        │     │  footer)                 │
//!                    └──────────────┘     └──────────────────────────┘
//! ```
//!
//! Feature names are never assembled by hand: every column is a
//! [`FeatureKey`], and its name comes from one `Display` impl.
//!
//! # Usage
//!
//! ```
//! use relfeat::{locate, FeatureBuilder, FeatureSet};
//!
//! assert_eq!(locate(&["a".into(), "b".into()], &["x".into(), "a".into()]), vec![2]);
//!
//! let builder = FeatureBuilder::counting(FeatureSet::default()).unwrap();
//! assert!(builder.schema().names().contains(&"count_of_query_unigram".to_string()));
//! ```

pub mod artifact;
pub mod build;
pub mod config;
pub mod error;
pub mod features;
pub mod kappa;
pub mod manifest;
pub mod pipeline;
pub mod schema;
pub mod split;
pub mod table;
pub mod task;
pub mod text;
pub mod types;

pub use artifact::{read_artifact, write_artifact};
pub use build::{build_table, run_build, BuildSummary};
pub use config::{PipelineConfig, ResolvedConfig};
pub use error::{Error, Result};
pub use features::{
    locate, safe_divide, BasicCounting, BasicDistance, Extractor, FeatureSet, IntersectCounting,
    IntersectPosition, PositionStats,
};
pub use kappa::{quadratic_weighted_kappa, KappaSummary};
pub use pipeline::{FeatureBuilder, FeatureGroup};
pub use schema::{ColumnType, FeatureKey, Field, Gram, Schema, Stat};
pub use split::{materialize, plan_splits, FoldPartition, SplitPlan};
pub use table::{Column, ColumnValues, FeatureTable, Scalar};
pub use task::{Backend, Task};
pub use text::{DefaultTokenizer, Tokenizer};
pub use types::{Row, TokenizedRow};
