// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Columnar feature table.
//!
//! Columns are keyed by [`FeatureKey`], typed as `i64` or `f64`, and all have
//! exactly `rows` entries. Inserting a key that already exists replaces the
//! column in place, so re-running a stage never accumulates duplicates and the
//! column order stays the order of first insertion.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::error::{Error, Result};
use crate::schema::{ColumnType, FeatureKey, Schema};

/// Values of a single column.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnValues {
    Int(Vec<i64>),
    Float(Vec<f64>),
}

/// One cell, for row-oriented views.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Scalar {
    Int(i64),
    Float(f64),
}

impl Scalar {
    pub fn as_f64(self) -> f64 {
        match self {
            Scalar::Int(v) => v as f64,
            Scalar::Float(v) => v,
        }
    }
}

impl ColumnValues {
    pub fn len(&self) -> usize {
        match self {
            ColumnValues::Int(v) => v.len(),
            ColumnValues::Float(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn column_type(&self) -> ColumnType {
        match self {
            ColumnValues::Int(_) => ColumnType::Int,
            ColumnValues::Float(_) => ColumnType::Float,
        }
    }

    #[inline]
    pub fn get(&self, row: usize) -> Option<Scalar> {
        match self {
            ColumnValues::Int(v) => v.get(row).copied().map(Scalar::Int),
            ColumnValues::Float(v) => v.get(row).copied().map(Scalar::Float),
        }
    }

    /// Value at `row` widened to `f64`. Panics if `row` is out of range.
    #[inline]
    pub fn f64_at(&self, row: usize) -> f64 {
        match self {
            ColumnValues::Int(v) => v[row] as f64,
            ColumnValues::Float(v) => v[row],
        }
    }

    pub fn to_f64_vec(&self) -> Vec<f64> {
        match self {
            ColumnValues::Int(v) => v.iter().map(|&x| x as f64).collect(),
            ColumnValues::Float(v) => v.clone(),
        }
    }

    /// Gather `indices` in the given order.
    pub fn take(&self, indices: &[usize]) -> Result<ColumnValues> {
        let rows = self.len();
        if let Some(&index) = indices.iter().find(|&&i| i >= rows) {
            return Err(Error::IndexOutOfRange { index, rows });
        }
        Ok(match self {
            ColumnValues::Int(v) => ColumnValues::Int(indices.iter().map(|&i| v[i]).collect()),
            ColumnValues::Float(v) => {
                ColumnValues::Float(indices.iter().map(|&i| v[i]).collect())
            }
        })
    }
}

/// A named, typed column.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub key: FeatureKey,
    pub name: String,
    pub values: ColumnValues,
}

/// Feature columns over a fixed number of rows.
#[derive(Debug, Clone, Default)]
pub struct FeatureTable {
    rows: usize,
    columns: Vec<Column>,
    by_key: HashMap<FeatureKey, usize>,
    by_name: HashMap<String, usize>,
}

impl FeatureTable {
    pub fn new(rows: usize) -> Self {
        Self {
            rows,
            ..Self::default()
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Insert or replace a column.
    pub fn insert(&mut self, key: FeatureKey, values: ColumnValues) -> Result<()> {
        let name = key.name();
        if values.len() != self.rows {
            return Err(Error::RowCountMismatch {
                column: name,
                expected: self.rows,
                actual: values.len(),
            });
        }
        debug_assert_eq!(
            values.column_type(),
            key.column_type(),
            "column {} stored with the wrong type",
            name
        );

        match self.by_key.get(&key) {
            Some(&idx) => self.columns[idx].values = values,
            None => {
                let idx = self.columns.len();
                self.by_key.insert(key, idx);
                self.by_name.insert(name.clone(), idx);
                self.columns.push(Column { key, name, values });
            }
        }
        Ok(())
    }

    pub fn get(&self, key: &FeatureKey) -> Option<&ColumnValues> {
        self.by_key.get(key).map(|&i| &self.columns[i].values)
    }

    pub fn contains(&self, key: &FeatureKey) -> bool {
        self.by_key.contains_key(key)
    }

    /// Column for `key`, or `MissingColumn`.
    pub fn require(&self, key: &FeatureKey) -> Result<&ColumnValues> {
        self.get(key)
            .ok_or_else(|| Error::MissingColumn(key.name()))
    }

    /// Column by its manifest name, or `MissingColumn`.
    pub fn column_by_name(&self, name: &str) -> Result<&Column> {
        self.by_name
            .get(name)
            .map(|&i| &self.columns[i])
            .ok_or_else(|| Error::MissingColumn(name.to_string()))
    }

    /// Columns for `names`, in that order. Fails on the first absent name.
    pub fn select<S: AsRef<str>>(&self, names: &[S]) -> Result<Vec<&Column>> {
        names
            .iter()
            .map(|name| self.column_by_name(name.as_ref()))
            .collect()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn schema(&self) -> Schema {
        self.columns.iter().map(|c| c.key).collect()
    }

    /// Column names in insertion order.
    pub fn names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    /// New table holding `indices` (in that order) of every column.
    pub fn take_rows(&self, indices: &[usize]) -> Result<FeatureTable> {
        let mut out = FeatureTable::new(indices.len());
        for column in &self.columns {
            out.insert(column.key, column.values.take(indices)?)?;
        }
        Ok(out)
    }

    /// Row-oriented view: feature name → value.
    pub fn row(&self, row: usize) -> Result<BTreeMap<String, Scalar>> {
        if row >= self.rows {
            return Err(Error::IndexOutOfRange {
                index: row,
                rows: self.rows,
            });
        }
        Ok(self
            .columns
            .iter()
            .filter_map(|c| c.values.get(row).map(|v| (c.name.clone(), v)))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Field, Gram};

    fn count_key() -> FeatureKey {
        FeatureKey::Count {
            field: Field::Query,
            gram: Gram::Unigram,
        }
    }

    #[test]
    fn test_insert_and_get() {
        let mut table = FeatureTable::new(3);
        table
            .insert(count_key(), ColumnValues::Int(vec![1, 2, 3]))
            .unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(
            table.get(&count_key()),
            Some(&ColumnValues::Int(vec![1, 2, 3]))
        );
        assert_eq!(
            table.column_by_name("count_of_query_unigram").unwrap().key,
            count_key()
        );
    }

    #[test]
    fn test_insert_overwrites() {
        let mut table = FeatureTable::new(2);
        table.insert(count_key(), ColumnValues::Int(vec![1, 1])).unwrap();
        table.insert(count_key(), ColumnValues::Int(vec![5, 6])).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.get(&count_key()), Some(&ColumnValues::Int(vec![5, 6])));
    }

    #[test]
    fn test_insert_wrong_length() {
        let mut table = FeatureTable::new(2);
        let err = table
            .insert(count_key(), ColumnValues::Int(vec![1]))
            .unwrap_err();
        assert!(matches!(err, Error::RowCountMismatch { expected: 2, actual: 1, .. }));
    }

    #[test]
    fn test_require_missing() {
        let table = FeatureTable::new(0);
        assert!(matches!(
            table.require(&count_key()),
            Err(Error::MissingColumn(name)) if name == "count_of_query_unigram"
        ));
        assert!(table.column_by_name("nope").is_err());
    }

    #[test]
    fn test_take_rows_preserves_order() {
        let mut table = FeatureTable::new(4);
        table
            .insert(count_key(), ColumnValues::Int(vec![10, 11, 12, 13]))
            .unwrap();
        let sub = table.take_rows(&[3, 0, 2]).unwrap();
        assert_eq!(sub.rows(), 3);
        assert_eq!(sub.get(&count_key()), Some(&ColumnValues::Int(vec![13, 10, 12])));
        assert!(matches!(
            table.take_rows(&[4]),
            Err(Error::IndexOutOfRange { index: 4, rows: 4 })
        ));
    }

    #[test]
    fn test_row_view() {
        let mut table = FeatureTable::new(1);
        table.insert(count_key(), ColumnValues::Int(vec![7])).unwrap();
        let row = table.row(0).unwrap();
        assert_eq!(row["count_of_query_unigram"], Scalar::Int(7));
        assert!(table.row(1).is_err());
    }
}
