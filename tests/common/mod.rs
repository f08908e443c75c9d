// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Shared test utilities and fixtures.

#![allow(dead_code)]

use std::fs;
use std::path::Path;

use relfeat::text::{tokenize_row, DEFAULT_JOIN};
use relfeat::{DefaultTokenizer, FoldPartition, PipelineConfig, Row, TokenizedRow};

pub fn make_row(id: u64, query: &str, title: &str, description: &str) -> Row {
    Row {
        id,
        qid: id / 2,
        query: query.to_string(),
        title: title.to_string(),
        description: description.to_string(),
        relevance: Some((id % 4 + 1) as u8),
    }
}

pub fn tokenized(query: &str, title: &str, description: &str) -> TokenizedRow {
    tokenize_row(
        &make_row(0, query, title, description),
        &DefaultTokenizer,
        DEFAULT_JOIN,
    )
}

/// Six training rows, two test rows.
pub fn train_rows() -> Vec<Row> {
    vec![
        make_row(1, "red shoes", "Red running shoes for men", "Comfortable red shoes."),
        make_row(2, "red shoes", "Blue winter hat", ""),
        make_row(3, "led tv 40", "Samsung 40\" LED TV", "Full HD LED television, 40 inch"),
        make_row(4, "led tv 40", "TV wall mount", "Fits 32 to 60 inch TVs"),
        make_row(5, "coffee maker", "Drip coffee maker 12 cup", "Makes 12 cups of coffee"),
        make_row(6, "coffee maker", "Espresso machine", ""),
    ]
}

pub fn test_rows() -> Vec<Row> {
    let mut rows = vec![
        make_row(7, "red shoes", "Red shoes size 9", ""),
        make_row(8, "coffee maker", "Coffee grinder", "Burr grinder for coffee beans"),
    ];
    for row in &mut rows {
        row.relevance = None;
    }
    rows
}

/// One run of two folds over the six training rows.
pub fn folds() -> Vec<Vec<FoldPartition>> {
    vec![vec![
        FoldPartition {
            fit: vec![0, 1, 2, 3],
            holdout: vec![4, 5],
        },
        FoldPartition {
            fit: vec![2, 3, 4, 5],
            holdout: vec![0, 1],
        },
    ]]
}

/// Write rows, folds and a config file under `dir`; returns the config path.
pub fn write_fixture(dir: &Path) -> std::path::PathBuf {
    fs::write(
        dir.join("train.json"),
        serde_json::to_string(&train_rows()).unwrap(),
    )
    .unwrap();
    fs::write(
        dir.join("test.json"),
        serde_json::to_string(&test_rows()).unwrap(),
    )
    .unwrap();
    fs::write(dir.join("folds.json"), serde_json::to_string(&folds()).unwrap()).unwrap();

    let config = PipelineConfig::new("train.json", "test.json", "folds.json", "feat");
    let path = dir.join("config.json");
    fs::write(&path, serde_json::to_string_pretty(&config).unwrap()).unwrap();
    path
}
