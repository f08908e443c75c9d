// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Fold planning and split materialization.
//!
//! The feature table covers training rows followed by test rows. Each
//! cross-validation fold slices the training rows into a train part and a
//! `valid` part, written under `Run<r>/Fold<f>/`. The whole-dataset split uses
//! every training row against every test row, written under `All/` with the
//! label `test`.
//!
//! # Fold roles
//!
//! A fold partition has a larger `fit` side and a smaller `holdout` side. With
//! `swap_roles` on (the default), the holdout side is materialized as `train`
//! and the fit side as `valid`, which is how the downstream models were tuned.
//! Turn it off for the conventional assignment.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::artifact::{artifact_file_name, read_artifact, write_artifact};
use crate::error::{Error, Result};
use crate::table::{ColumnValues, FeatureTable};

/// Label of the per-fold other split.
pub const VALID_LABEL: &str = "valid";
/// Label of the whole-dataset other split.
pub const TEST_LABEL: &str = "test";
/// Label of the train slice in every split directory.
pub const TRAIN_LABEL: &str = "train";

/// One (run, fold) partition of the training rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FoldPartition {
    pub fit: Vec<usize>,
    pub holdout: Vec<usize>,
}

/// `[run][fold]` partitions.
pub type FoldTable = Vec<Vec<FoldPartition>>;

pub fn load_folds(path: &Path) -> Result<FoldTable> {
    let data = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    serde_json::from_str(&data).map_err(|e| Error::json(path, e))
}

/// One split to materialize: where, under which label, and which rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitPlan {
    pub dir: PathBuf,
    pub label: &'static str,
    pub train: Vec<usize>,
    pub other: Vec<usize>,
}

impl SplitPlan {
    /// `<feat_dir>/Run<run>/Fold<fold>` with 1-based run and fold numbers.
    pub fn fold_dir(feat_dir: &Path, run: usize, fold: usize) -> PathBuf {
        feat_dir
            .join(format!("Run{}", run + 1))
            .join(format!("Fold{}", fold + 1))
    }

    pub fn all_dir(feat_dir: &Path) -> PathBuf {
        feat_dir.join("All")
    }

    pub fn materialize(&self, table: &FeatureTable, names: &[String]) -> Result<Vec<PathBuf>> {
        materialize(table, names, &self.train, &self.other, self.label, &self.dir)
    }
}

/// Every fold split for the first `n_runs` runs, followed by the `All` split.
///
/// Fold indices refer to training rows, which occupy `0..n_train` of the table;
/// test rows occupy `n_train..n_train + n_test`.
pub fn plan_splits(
    feat_dir: &Path,
    folds: &[Vec<FoldPartition>],
    n_runs: usize,
    n_train: usize,
    n_test: usize,
    swap_roles: bool,
) -> Result<Vec<SplitPlan>> {
    if n_runs > folds.len() {
        return Err(Error::InvalidConfig(format!(
            "n_runs is {n_runs} but the folds file has {} runs",
            folds.len()
        )));
    }

    let mut plans = Vec::new();
    for (run, partitions) in folds.iter().take(n_runs).enumerate() {
        for (fold, partition) in partitions.iter().enumerate() {
            if let Some(&index) = partition
                .fit
                .iter()
                .chain(&partition.holdout)
                .find(|&&i| i >= n_train)
            {
                return Err(Error::IndexOutOfRange {
                    index,
                    rows: n_train,
                });
            }
            let (train, other) = if swap_roles {
                (partition.holdout.clone(), partition.fit.clone())
            } else {
                (partition.fit.clone(), partition.holdout.clone())
            };
            plans.push(SplitPlan {
                dir: SplitPlan::fold_dir(feat_dir, run, fold),
                label: VALID_LABEL,
                train,
                other,
            });
        }
    }

    plans.push(SplitPlan {
        dir: SplitPlan::all_dir(feat_dir),
        label: TEST_LABEL,
        train: (0..n_train).collect(),
        other: (n_train..n_train + n_test).collect(),
    });
    Ok(plans)
}

/// Write `train.<name>.feat` and `<label>.<name>.feat` for each named column.
///
/// Every name and row index is checked before anything is written, so a bad
/// request leaves the directory untouched. Slices keep the order of `train`
/// and `other`.
pub fn materialize(
    table: &FeatureTable,
    names: &[String],
    train: &[usize],
    other: &[usize],
    label: &str,
    dir: &Path,
) -> Result<Vec<PathBuf>> {
    let columns = table.select(names)?;
    let rows = table.rows();
    if let Some(&index) = train.iter().chain(other).find(|&&i| i >= rows) {
        return Err(Error::IndexOutOfRange { index, rows });
    }

    fs::create_dir_all(dir).map_err(|e| Error::io(dir, e))?;

    let mut written = Vec::with_capacity(columns.len() * 2);
    for column in columns {
        for (split, indices) in [(TRAIN_LABEL, train), (label, other)] {
            let path = dir.join(artifact_file_name(split, &column.name));
            write_artifact(&path, &column.values.take(indices)?)?;
            written.push(path);
        }
        debug!(column = %column.name, "materialized");
    }

    info!(
        dir = %dir.display(),
        label,
        columns = names.len(),
        train_rows = train.len(),
        other_rows = other.len(),
        "split written"
    );
    Ok(written)
}

/// Read back the (train, other) pair for one column.
pub fn load_split(dir: &Path, label: &str, name: &str) -> Result<(ColumnValues, ColumnValues)> {
    let train = read_artifact(&dir.join(artifact_file_name(TRAIN_LABEL, name)))?;
    let other = read_artifact(&dir.join(artifact_file_name(label, name)))?;
    Ok((train, other))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn folds() -> FoldTable {
        vec![
            vec![
                FoldPartition { fit: vec![0, 1, 2], holdout: vec![3] },
                FoldPartition { fit: vec![1, 2, 3], holdout: vec![0] },
            ],
            vec![FoldPartition { fit: vec![0, 2, 3], holdout: vec![1] }],
        ]
    }

    #[test]
    fn test_plan_layout() {
        let plans = plan_splits(Path::new("out"), &folds(), 2, 4, 2, true).unwrap();
        assert_eq!(plans.len(), 4);
        assert_eq!(plans[0].dir, Path::new("out/Run1/Fold1"));
        assert_eq!(plans[1].dir, Path::new("out/Run1/Fold2"));
        assert_eq!(plans[2].dir, Path::new("out/Run2/Fold1"));
        assert_eq!(plans[3].dir, Path::new("out/All"));
        assert_eq!(plans[3].label, TEST_LABEL);
        assert_eq!(plans[3].train, vec![0, 1, 2, 3]);
        assert_eq!(plans[3].other, vec![4, 5]);
    }

    #[test]
    fn test_swapped_roles() {
        let plans = plan_splits(Path::new("out"), &folds(), 1, 4, 0, true).unwrap();
        assert_eq!(plans[0].train, vec![3]);
        assert_eq!(plans[0].other, vec![0, 1, 2]);

        let plans = plan_splits(Path::new("out"), &folds(), 1, 4, 0, false).unwrap();
        assert_eq!(plans[0].train, vec![0, 1, 2]);
        assert_eq!(plans[0].other, vec![3]);
    }

    #[test]
    fn test_too_many_runs() {
        let err = plan_splits(Path::new("out"), &folds(), 3, 4, 0, true).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }

    #[test]
    fn test_fold_index_out_of_range() {
        let err = plan_splits(Path::new("out"), &folds(), 1, 3, 0, true).unwrap_err();
        assert!(matches!(err, Error::IndexOutOfRange { index: 3, rows: 3 }));
    }

    #[test]
    fn test_folds_json_shape() {
        let json = r#"[[{"fit": [0, 1], "holdout": [2]}]]"#;
        let parsed: FoldTable = serde_json::from_str(json).unwrap();
        assert_eq!(parsed[0][0].holdout, vec![2]);
    }
}
