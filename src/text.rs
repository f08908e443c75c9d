// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Tokenization and n-gram construction.
//!
//! The feature engine only ever sees token sequences. How text becomes tokens
//! is pluggable through [`Tokenizer`]; the default lowercases, strips
//! diacritics when the `unicode-normalization` feature is on, and splits on
//! anything that isn't alphanumeric.
//!
//! N-grams fall back to the next lower order when a sequence is too short:
//! a one-word title has that word as its only "bigram", and a two-word title
//! has its single bigram as its "trigram". This keeps short fields from
//! looking empty at higher orders.

#[cfg(feature = "unicode-normalization")]
use unicode_normalization::UnicodeNormalization;

use crate::schema::{Field, Gram};
use crate::types::{Row, TokenizedRow};

/// Default n-gram separator.
pub const DEFAULT_JOIN: &str = "_";

/// Turns a text field into an ordered token sequence.
pub trait Tokenizer: Sync {
    fn tokenize(&self, text: &str) -> Vec<String>;
}

/// Lowercase, accent-fold, split on non-alphanumerics.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultTokenizer;

impl Tokenizer for DefaultTokenizer {
    fn tokenize(&self, text: &str) -> Vec<String> {
        tokenize(text)
    }
}

/// Normalize a string: NFD decomposition, combining marks dropped, lowercased.
///
/// - "Café" → "cafe"
/// - "naïve" → "naive"
#[cfg(feature = "unicode-normalization")]
pub fn normalize(value: &str) -> String {
    value
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase()
}

/// Lowercase only; assumes input is ASCII or pre-normalized.
#[cfg(not(feature = "unicode-normalization"))]
pub fn normalize(value: &str) -> String {
    value.to_lowercase()
}

#[cfg(feature = "unicode-normalization")]
fn is_combining_mark(c: char) -> bool {
    matches!(c,
        '\u{0300}'..='\u{036F}' |  // Combining Diacritical Marks
        '\u{1AB0}'..='\u{1AFF}' |  // Combining Diacritical Marks Extended
        '\u{1DC0}'..='\u{1DFF}' |  // Combining Diacritical Marks Supplement
        '\u{20D0}'..='\u{20FF}' |  // Combining Diacritical Marks for Symbols
        '\u{FE20}'..='\u{FE2F}'    // Combining Half Marks
    )
}

/// Split normalized text into alphanumeric runs.
pub fn tokenize(text: &str) -> Vec<String> {
    normalize(text)
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Adjacent pairs joined with `join`; shorter inputs come back as unigrams.
pub fn bigrams(words: &[String], join: &str) -> Vec<String> {
    if words.len() > 1 {
        words
            .windows(2)
            .map(|w| format!("{}{}{}", w[0], join, w[1]))
            .collect()
    } else {
        words.to_vec()
    }
}

/// Adjacent triples joined with `join`; shorter inputs come back as bigrams.
pub fn trigrams(words: &[String], join: &str) -> Vec<String> {
    if words.len() > 2 {
        words
            .windows(3)
            .map(|w| format!("{}{}{}{}{}", w[0], join, w[1], join, w[2]))
            .collect()
    } else {
        bigrams(words, join)
    }
}

/// N-gram sequence of the given order.
pub fn ngrams(words: &[String], gram: Gram, join: &str) -> Vec<String> {
    match gram {
        Gram::Unigram => words.to_vec(),
        Gram::Bigram => bigrams(words, join),
        Gram::Trigram => trigrams(words, join),
    }
}

/// Tokenize all three fields of a row at every gram order.
pub fn tokenize_row<T: Tokenizer + ?Sized>(row: &Row, tokenizer: &T, join: &str) -> TokenizedRow {
    let mut out = TokenizedRow::new(row.id, row.qid);
    for field in Field::ALL {
        let words = tokenizer.tokenize(row.text(field));
        out = out
            .with_tokens(field, Gram::Bigram, bigrams(&words, join))
            .with_tokens(field, Gram::Trigram, trigrams(&words, join))
            .with_tokens(field, Gram::Unigram, words);
    }
    out
}
