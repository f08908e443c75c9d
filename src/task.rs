// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Model task names, resolved once from configuration.
//!
//! Downstream model code used to branch on the raw task string at every call
//! site. Here the string is parsed exactly once into a [`Task`]; an unknown
//! name fails configuration instead of silently matching nothing.

use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Model backend family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Backend {
    Gbdt,
    Sklearn,
    Keras,
    LibFm,
    Rgf,
}

impl Backend {
    pub fn as_str(self) -> &'static str {
        match self {
            Backend::Gbdt => "gbdt",
            Backend::Sklearn => "sklearn",
            Backend::Keras => "keras",
            Backend::LibFm => "libfm",
            Backend::Rgf => "rgf",
        }
    }
}

/// Gradient-boosted tree objectives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Objective {
    Regression,
    Ranking,
    Softmax,
    Softkappa,
    /// Extended binary classification.
    Ebc,
    /// Cost-sensitive ordinal classification by regression.
    Cocr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SklearnModel {
    RandomForest,
    ExtraTrees,
    GradientBoosting,
    LogisticRegression,
    Svr,
    Ridge,
    Lasso,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Task {
    Gbdt(Objective),
    Sklearn(SklearnModel),
    KerasDnn,
    LibFm,
    Rgf,
}

impl Task {
    pub const ALL: [Task; 16] = [
        Task::Gbdt(Objective::Regression),
        Task::Gbdt(Objective::Ranking),
        Task::Gbdt(Objective::Softmax),
        Task::Gbdt(Objective::Softkappa),
        Task::Gbdt(Objective::Ebc),
        Task::Gbdt(Objective::Cocr),
        Task::Sklearn(SklearnModel::RandomForest),
        Task::Sklearn(SklearnModel::ExtraTrees),
        Task::Sklearn(SklearnModel::GradientBoosting),
        Task::Sklearn(SklearnModel::LogisticRegression),
        Task::Sklearn(SklearnModel::Svr),
        Task::Sklearn(SklearnModel::Ridge),
        Task::Sklearn(SklearnModel::Lasso),
        Task::KerasDnn,
        Task::LibFm,
        Task::Rgf,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Task::Gbdt(Objective::Regression) => "regression",
            Task::Gbdt(Objective::Ranking) => "ranking",
            Task::Gbdt(Objective::Softmax) => "softmax",
            Task::Gbdt(Objective::Softkappa) => "softkappa",
            Task::Gbdt(Objective::Ebc) => "ebc",
            Task::Gbdt(Objective::Cocr) => "cocr",
            Task::Sklearn(SklearnModel::RandomForest) => "reg_skl_rf",
            Task::Sklearn(SklearnModel::ExtraTrees) => "reg_skl_etr",
            Task::Sklearn(SklearnModel::GradientBoosting) => "reg_skl_gbm",
            Task::Sklearn(SklearnModel::LogisticRegression) => "clf_skl_lr",
            Task::Sklearn(SklearnModel::Svr) => "reg_skl_svr",
            Task::Sklearn(SklearnModel::Ridge) => "reg_skl_ridge",
            Task::Sklearn(SklearnModel::Lasso) => "reg_skl_lasso",
            Task::KerasDnn => "reg_keras_dnn",
            Task::LibFm => "reg_libfm",
            Task::Rgf => "reg_rgf",
        }
    }

    pub fn backend(self) -> Backend {
        match self {
            Task::Gbdt(_) => Backend::Gbdt,
            Task::Sklearn(_) => Backend::Sklearn,
            Task::KerasDnn => Backend::Keras,
            Task::LibFm => Backend::LibFm,
            Task::Rgf => Backend::Rgf,
        }
    }

    /// Predicts class labels (or class probabilities) rather than a score.
    pub fn is_classification(self) -> bool {
        matches!(
            self,
            Task::Gbdt(Objective::Softmax)
                | Task::Gbdt(Objective::Ebc)
                | Task::Sklearn(SklearnModel::LogisticRegression)
        )
    }
}

impl FromStr for Task {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Task::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| Error::UnknownTask(s.to_string()))
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
