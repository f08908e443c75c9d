// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Error type for the orchestration boundary.
//!
//! Extractors never fail: empty inputs go through the `[0]` sentinel and safe
//! division. What can fail is everything around them: reading rows and folds,
//! resolving configured names, composing stages, and writing or reading split
//! artifacts. All of those stop the run.

use std::path::PathBuf;

use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("unknown field '{0}' (expected query, title or description)")]
    UnknownField(String),

    #[error("unknown gram order '{0}' (expected unigram, bigram or trigram)")]
    UnknownGram(String),

    #[error("unsupported task '{0}'")]
    UnknownTask(String),

    #[error("malformed feature name '{0}'")]
    UnknownFeature(String),

    #[error("feature column '{0}' is not present in the table")]
    MissingColumn(String),

    #[error("stage '{stage}' requires column '{column}' which no earlier stage produces")]
    UnsatisfiedDependency { stage: &'static str, column: String },

    #[error("column '{column}' has {actual} rows, table has {expected}")]
    RowCountMismatch {
        column: String,
        expected: usize,
        actual: usize,
    },

    #[error("row index {index} out of range for table with {rows} rows")]
    IndexOutOfRange { index: usize, rows: usize },

    #[error("invalid artifact: {0}")]
    InvalidArtifact(String),

    #[error("artifact checksum mismatch: stored {expected:08x}, computed {actual:08x}")]
    ChecksumMismatch { expected: u32, actual: u32 },

    #[error("invalid ratings: {0}")]
    InvalidRatings(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    pub fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Error::Json {
            path: path.into(),
            source,
        }
    }
}
