// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Row types.
//!
//! A [`Row`] is what the competition data gives us: an id, a query group, three
//! strings and (for training rows) a relevance label. A [`TokenizedRow`] is the
//! same row after tokenization and n-gram construction; every extractor reads
//! only this form. Token sequences are never mutated after construction.

use serde::{Deserialize, Serialize};

use crate::schema::{Field, Gram};

/// One raw example.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct Row {
    pub id: u64,
    /// Query group: rows sharing a query share a qid.
    pub qid: u64,
    pub query: String,
    #[serde(rename = "product_title")]
    pub title: String,
    /// Often absent in the data; treated as empty text.
    #[serde(rename = "product_description", default)]
    pub description: String,
    /// Ordinal label 1..=4 (training rows only).
    #[serde(rename = "median_relevance", default, skip_serializing_if = "Option::is_none")]
    pub relevance: Option<u8>,
}

impl Row {
    pub fn text(&self, field: Field) -> &str {
        match field {
            Field::Query => &self.query,
            Field::Title => &self.title,
            Field::Description => &self.description,
        }
    }
}

/// Token sequences of one row, indexed by field and gram order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TokenizedRow {
    pub id: u64,
    pub qid: u64,
    grams: [[Vec<String>; 3]; 3],
}

impl TokenizedRow {
    pub fn new(id: u64, qid: u64) -> Self {
        Self {
            id,
            qid,
            ..Self::default()
        }
    }

    /// Builder-style setter used by the tokenizer and by tests.
    pub fn with_tokens(mut self, field: Field, gram: Gram, tokens: Vec<String>) -> Self {
        self.grams[field.index()][gram.index()] = tokens;
        self
    }

    #[inline]
    pub fn tokens(&self, field: Field, gram: Gram) -> &[String] {
        &self.grams[field.index()][gram.index()]
    }
}
