// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Pipeline configuration.
//!
//! Everything the build needs (paths, which fields and gram orders, which
//! feature groups, how folds are read) lives in one [`PipelineConfig`] passed
//! to [`run_build`](crate::build::run_build). Names stay strings in the file
//! and are resolved into typed values by [`PipelineConfig::validate`], so a
//! typo surfaces as `UnknownField` or `UnknownGram` rather than a missing
//! column three stages later.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::features::FeatureSet;
use crate::pipeline::FeatureGroup;
use crate::schema::{Field, Gram};
use crate::task::Task;
use crate::text::DEFAULT_JOIN;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PipelineConfig {
    /// JSON array of training rows.
    pub train_path: PathBuf,

    /// JSON array of test rows.
    pub test_path: PathBuf,

    /// `[run][fold]` partitions of the training rows.
    pub folds_path: PathBuf,

    /// Root of the `Run<r>/Fold<f>` and `All` trees.
    pub feat_dir: PathBuf,

    #[serde(default = "default_fields")]
    pub fields: Vec<String>,

    #[serde(default = "default_grams")]
    pub grams: Vec<String>,

    #[serde(default = "default_groups")]
    pub groups: Vec<FeatureGroup>,

    /// Separator between words of a bigram or trigram.
    #[serde(default = "default_join_str")]
    pub join_str: String,

    /// Runs to materialize. All runs in the folds file when absent.
    #[serde(default)]
    pub n_runs: Option<usize>,

    /// Materialize each fold's holdout side as `train`.
    #[serde(default = "default_swap_fold_roles")]
    pub swap_fold_roles: bool,

    /// Model task the features are built for.
    #[serde(default)]
    pub task: Option<String>,
}

/// A configuration with every name resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    pub feature_set: FeatureSet,
    pub groups: Vec<FeatureGroup>,
    pub task: Option<Task>,
}

impl PipelineConfig {
    /// Config with default options for the given paths.
    pub fn new(
        train_path: impl Into<PathBuf>,
        test_path: impl Into<PathBuf>,
        folds_path: impl Into<PathBuf>,
        feat_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            train_path: train_path.into(),
            test_path: test_path.into(),
            folds_path: folds_path.into(),
            feat_dir: feat_dir.into(),
            fields: default_fields(),
            grams: default_grams(),
            groups: default_groups(),
            join_str: default_join_str(),
            n_runs: None,
            swap_fold_roles: default_swap_fold_roles(),
            task: None,
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let mut config: PipelineConfig =
            serde_json::from_str(&data).map_err(|e| Error::json(path, e))?;
        config.resolve_relative_to(path.parent().unwrap_or(Path::new("")));
        Ok(config)
    }

    /// Make relative paths relative to the config file's directory.
    fn resolve_relative_to(&mut self, base: &Path) {
        for path in [
            &mut self.train_path,
            &mut self.test_path,
            &mut self.folds_path,
            &mut self.feat_dir,
        ] {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }
    }

    /// Resolve every name, failing on the first one that doesn't parse.
    pub fn validate(&self) -> Result<ResolvedConfig> {
        let fields = parse_unique::<Field>(&self.fields, "fields")?;
        let grams = parse_unique::<Gram>(&self.grams, "grams")?;

        if self.groups.is_empty() {
            return Err(Error::InvalidConfig("groups must not be empty".to_string()));
        }
        if self.join_str.is_empty() {
            return Err(Error::InvalidConfig("join_str must not be empty".to_string()));
        }
        if self.n_runs == Some(0) {
            return Err(Error::InvalidConfig("n_runs must be at least 1".to_string()));
        }
        let task = self.task.as_deref().map(str::parse::<Task>).transpose()?;

        Ok(ResolvedConfig {
            feature_set: FeatureSet::new(fields, grams),
            groups: self.groups.clone(),
            task,
        })
    }
}

fn parse_unique<T>(names: &[String], key: &str) -> Result<Vec<T>>
where
    T: std::str::FromStr<Err = Error> + PartialEq,
{
    if names.is_empty() {
        return Err(Error::InvalidConfig(format!("{key} must not be empty")));
    }
    let mut out: Vec<T> = Vec::with_capacity(names.len());
    for name in names {
        let value = name.parse::<T>()?;
        if out.contains(&value) {
            return Err(Error::InvalidConfig(format!("{key} lists '{name}' twice")));
        }
        out.push(value);
    }
    Ok(out)
}

fn default_fields() -> Vec<String> {
    Field::ALL.iter().map(|f| f.as_str().to_string()).collect()
}

fn default_grams() -> Vec<String> {
    Gram::ALL.iter().map(|g| g.as_str().to_string()).collect()
}

fn default_groups() -> Vec<FeatureGroup> {
    vec![FeatureGroup::Counting, FeatureGroup::Distance]
}

fn default_join_str() -> String {
    DEFAULT_JOIN.to_string()
}

fn default_swap_fold_roles() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal() -> PipelineConfig {
        PipelineConfig::new("train.json", "test.json", "folds.json", "feat")
    }

    #[test]
    fn test_defaults_from_json() {
        let json = r#"{
            "train_path": "train.json",
            "test_path": "test.json",
            "folds_path": "folds.json",
            "feat_dir": "feat"
        }"#;
        let config: PipelineConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config, minimal());
        assert!(config.swap_fold_roles);
        assert_eq!(config.join_str, "_");
    }

    #[test]
    fn test_default_is_valid() {
        let resolved = minimal().validate().unwrap();
        assert_eq!(resolved.feature_set, FeatureSet::default());
        assert_eq!(resolved.task, None);
    }

    #[test]
    fn test_unknown_names() {
        let mut config = minimal();
        config.fields = vec!["query".into(), "body".into()];
        assert!(matches!(config.validate(), Err(Error::UnknownField(_))));

        let mut config = minimal();
        config.grams = vec!["fourgram".into()];
        assert!(matches!(config.validate(), Err(Error::UnknownGram(_))));

        let mut config = minimal();
        config.task = Some("reg_xgb_magic".into());
        assert!(matches!(config.validate(), Err(Error::UnknownTask(_))));
    }

    #[test]
    fn test_duplicate_and_empty() {
        let mut config = minimal();
        config.grams = vec!["unigram".into(), "unigram".into()];
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));

        let mut config = minimal();
        config.fields.clear();
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_unknown_key_rejected() {
        let json = r#"{
            "train_path": "a", "test_path": "b", "folds_path": "c", "feat_dir": "d",
            "n_folds": 3
        }"#;
        assert!(serde_json::from_str::<PipelineConfig>(json).is_err());
    }

    #[test]
    fn test_task_resolved() {
        let mut config = minimal();
        config.task = Some("softkappa".into());
        let resolved = config.validate().unwrap();
        assert_eq!(resolved.task.map(|t| t.as_str()), Some("softkappa"));
    }
}
