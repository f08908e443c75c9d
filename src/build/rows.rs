// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Row loading and tokenization.
//!
//! Rows arrive as a JSON array. Tokenizing is per-row and independent, so it
//! runs under `par_iter` with the `parallel` feature; indexed `collect` keeps
//! the input order.

use std::fs;
use std::path::Path;

#[cfg(feature = "parallel")]
use indicatif::ProgressBar;
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::text::Tokenizer;
use crate::types::{Row, TokenizedRow};

pub fn load_rows(path: &Path) -> Result<Vec<Row>> {
    let data = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    let rows: Vec<Row> = serde_json::from_str(&data).map_err(|e| Error::json(path, e))?;
    if rows.is_empty() {
        warn!(path = %path.display(), "row file is empty");
    }
    info!(path = %path.display(), rows = rows.len(), "rows loaded");
    Ok(rows)
}

/// Tokenize every row, ticking `progress` once per row.
pub fn tokenize_rows<T: Tokenizer + ?Sized>(
    rows: &[Row],
    tokenizer: &T,
    join: &str,
    #[cfg(feature = "parallel")] progress: &ProgressBar,
) -> Vec<TokenizedRow> {
    #[cfg(feature = "parallel")]
    {
        rows.par_iter()
            .map(|row| {
                let out = crate::text::tokenize_row(row, tokenizer, join);
                progress.inc(1);
                out
            })
            .collect()
    }

    #[cfg(not(feature = "parallel"))]
    {
        rows.iter()
            .map(|row| crate::text::tokenize_row(row, tokenizer, join))
            .collect()
    }
}
