// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! End-to-end feature build.
//!
//! 1. Validate the configuration (every name resolved up front).
//! 2. Load training rows, test rows and fold partitions.
//! 3. Tokenize training rows followed by test rows.
//! 4. Build one feature table over all of them.
//! 5. Write a manifest per feature group into the output root.
//! 6. Materialize every fold split and the `All` split.

pub mod rows;

use std::path::PathBuf;
use std::time::Instant;

#[cfg(feature = "parallel")]
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use tracing::info;

use crate::config::PipelineConfig;
use crate::error::{Error, Result};
use crate::features::FeatureSet;
use crate::manifest::write_group_manifest;
use crate::pipeline::{FeatureBuilder, FeatureGroup};
use crate::split::{load_folds, plan_splits};
use crate::table::FeatureTable;
use crate::task::Task;
use crate::text::{DefaultTokenizer, Tokenizer};
use crate::types::Row;

pub use rows::{load_rows, tokenize_rows};

/// What a build wrote.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildSummary {
    pub train_rows: usize,
    pub test_rows: usize,
    pub columns: usize,
    pub splits: usize,
    pub artifacts: usize,
    pub manifests: Vec<PathBuf>,
    /// Model task the features were built for, if one was configured.
    pub task: Option<Task>,
}

#[cfg(feature = "parallel")]
fn create_progress_style() -> ProgressStyle {
    ProgressStyle::with_template(
        "{spinner:.cyan} {prefix:<12} [{bar:40.cyan/dim}] {pos}/{len} {msg}",
    )
    .unwrap_or_else(|_| ProgressStyle::default_bar())
    .progress_chars("━━╸")
}

#[cfg(feature = "parallel")]
fn phase_bar(multi: &MultiProgress, len: usize, prefix: &'static str, msg: &'static str) -> ProgressBar {
    let pb = multi.add(ProgressBar::new(len as u64));
    pb.set_style(create_progress_style());
    pb.set_prefix(prefix);
    pb.set_message(msg);
    pb
}

/// Feature table for `rows` in input order.
pub fn build_table<T: Tokenizer + ?Sized>(
    rows: &[Row],
    tokenizer: &T,
    set: &FeatureSet,
    groups: &[FeatureGroup],
    join: &str,
) -> Result<FeatureTable> {
    let builder = FeatureBuilder::for_groups(groups, set)?;
    #[cfg(feature = "parallel")]
    let hidden = ProgressBar::hidden();
    let tokenized = tokenize_rows(
        rows,
        tokenizer,
        join,
        #[cfg(feature = "parallel")]
        &hidden,
    );
    builder.build(&tokenized)
}

pub fn run_build(config: &PipelineConfig) -> Result<BuildSummary> {
    let started = Instant::now();
    let resolved = config.validate()?;

    #[cfg(feature = "parallel")]
    let multi = MultiProgress::new();

    let train = load_rows(&config.train_path)?;
    let test = load_rows(&config.test_path)?;
    let folds = load_folds(&config.folds_path)?;
    if let Some(task) = resolved.task {
        // Every model backend trains on the relevance label.
        if let Some(row) = train.iter().find(|r| r.relevance.is_none()) {
            return Err(Error::InvalidConfig(format!(
                "task {task} needs relevance labels, but training row {} has none",
                row.id
            )));
        }
        info!(
            task = task.as_str(),
            backend = task.backend().as_str(),
            classification = task.is_classification(),
            "building features for task"
        );
    }
    let n_runs = config.n_runs.unwrap_or(folds.len());
    let plans = plan_splits(
        &config.feat_dir,
        &folds,
        n_runs,
        train.len(),
        test.len(),
        config.swap_fold_roles,
    )?;

    // Fail on a bad stage order before any tokenizing happens.
    let builder = FeatureBuilder::for_groups(&resolved.groups, &resolved.feature_set)?;

    let all_rows: Vec<Row> = train.iter().chain(&test).cloned().collect();

    #[cfg(feature = "parallel")]
    let tok_pb = phase_bar(&multi, all_rows.len(), "Tokenizing", "rows...");
    let tokenized = tokenize_rows(
        &all_rows,
        &DefaultTokenizer,
        &config.join_str,
        #[cfg(feature = "parallel")]
        &tok_pb,
    );
    #[cfg(feature = "parallel")]
    tok_pb.finish_with_message(format!("tokenized {} rows", tokenized.len()));

    #[cfg(feature = "parallel")]
    let extract_pb = phase_bar(&multi, builder.stage_names().len(), "Extracting", "stages...");
    let table = builder.build_with(&tokenized, |_stage| {
        #[cfg(feature = "parallel")]
        {
            extract_pb.set_message(_stage);
            extract_pb.inc(1);
        }
    })?;
    #[cfg(feature = "parallel")]
    extract_pb.finish_with_message(format!("{} columns", table.len()));
    info!(
        rows = table.rows(),
        columns = table.len(),
        "feature table built"
    );

    std::fs::create_dir_all(&config.feat_dir).map_err(|e| Error::io(&config.feat_dir, e))?;
    let all_names = table.names();
    let mut manifests = Vec::new();
    let mut selected: Vec<String> = Vec::new();
    for &group in &resolved.groups {
        let (path, names) = write_group_manifest(&config.feat_dir, group, &all_names)?;
        info!(group = group.as_str(), columns = names.len(), path = %path.display(), "manifest written");
        manifests.push(path);
        for name in names {
            if !selected.contains(&name) {
                selected.push(name);
            }
        }
    }

    #[cfg(feature = "parallel")]
    let write_pb = phase_bar(&multi, plans.len(), "Writing", "splits...");
    let mut artifacts = 0;
    for plan in &plans {
        artifacts += plan.materialize(&table, &selected)?.len();
        #[cfg(feature = "parallel")]
        {
            write_pb.set_message(plan.dir.display().to_string());
            write_pb.inc(1);
        }
    }
    #[cfg(feature = "parallel")]
    write_pb.finish_with_message("done");

    let summary = BuildSummary {
        train_rows: train.len(),
        test_rows: test.len(),
        columns: selected.len(),
        splits: plans.len(),
        artifacts,
        manifests,
        task: resolved.task,
    };
    info!(
        splits = summary.splits,
        artifacts = summary.artifacts,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "build complete"
    );
    Ok(summary)
}
