// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Feature table builder.
//!
//! Stages run in a fixed order: basic counting, intersect counting, intersect
//! positions (then distances, which depend on nothing). Later stages read
//! columns written by earlier ones, so [`FeatureBuilder::compose`] checks every
//! declared requirement against what earlier stages declare they produce
//! before a single row is touched.
//!
//! Building into an existing table overwrites columns with the same key, so a
//! second run over the same rows yields the same table, not a wider one.

use std::collections::HashSet;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::features::{
    BasicCounting, BasicDistance, Extractor, FeatureSet, IntersectCounting, IntersectPosition,
};
use crate::schema::{FeatureKey, Schema};
use crate::table::FeatureTable;
use crate::types::TokenizedRow;

/// A family of features persisted together under one manifest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeatureGroup {
    /// Basic, intersect counting and intersect position features.
    Counting,
    /// Jaccard / Dice between field pairs.
    Distance,
}

impl FeatureGroup {
    pub fn as_str(self) -> &'static str {
        match self {
            FeatureGroup::Counting => "counting",
            FeatureGroup::Distance => "distance",
        }
    }

    /// Manifest filename, e.g. `counting.feat_name`.
    pub fn manifest_file_name(self) -> String {
        format!("{}.feat_name", self.as_str())
    }

    /// Whether a column name belongs to this group.
    pub fn selects(self, name: &str) -> bool {
        match self {
            FeatureGroup::Counting => {
                name.contains("count")
                    || name.contains("ratio")
                    || name.contains("div")
                    || name.contains("pos_of")
                    || name == "description_missing"
            }
            FeatureGroup::Distance => name.contains("jaccard_coef") || name.contains("dice_dist"),
        }
    }

    fn stages(self, set: &FeatureSet) -> Vec<Box<dyn Extractor>> {
        match self {
            FeatureGroup::Counting => vec![
                Box::new(BasicCounting::new(set.clone())),
                Box::new(IntersectCounting::new(set.clone())),
                Box::new(IntersectPosition::new(set.clone())),
            ],
            FeatureGroup::Distance => vec![Box::new(BasicDistance::new(set.clone()))],
        }
    }
}

/// An ordered, dependency-checked list of extractors.
pub struct FeatureBuilder {
    stages: Vec<Box<dyn Extractor>>,
}

impl std::fmt::Debug for FeatureBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.stages.iter().map(|s| s.name()))
            .finish()
    }
}

impl FeatureBuilder {
    /// Compose stages, failing if any stage reads a column no earlier stage writes.
    pub fn compose(stages: Vec<Box<dyn Extractor>>) -> Result<Self> {
        let mut available: HashSet<FeatureKey> = HashSet::new();
        for stage in &stages {
            if let Some(missing) = stage.requires().into_iter().find(|k| !available.contains(k)) {
                return Err(Error::UnsatisfiedDependency {
                    stage: stage.name(),
                    column: missing.name(),
                });
            }
            available.extend(stage.produces());
        }
        Ok(Self { stages })
    }

    /// Basic counting → intersect counting → intersect position.
    pub fn counting(set: FeatureSet) -> Result<Self> {
        Self::for_groups(&[FeatureGroup::Counting], &set)
    }

    /// Stages for the given groups, in group order, each group once.
    pub fn for_groups(groups: &[FeatureGroup], set: &FeatureSet) -> Result<Self> {
        let mut seen = HashSet::new();
        let stages = groups
            .iter()
            .filter(|g| seen.insert(**g))
            .flat_map(|g| g.stages(set))
            .collect();
        Self::compose(stages)
    }

    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    /// Every column the builder writes, in output order.
    pub fn schema(&self) -> Schema {
        self.stages.iter().flat_map(|s| s.produces()).collect()
    }

    /// Build a fresh table for `rows`.
    pub fn build(&self, rows: &[TokenizedRow]) -> Result<FeatureTable> {
        self.build_with(rows, |_| {})
    }

    /// Like [`build`](Self::build), calling `on_stage` after each stage finishes.
    pub fn build_with<F>(&self, rows: &[TokenizedRow], on_stage: F) -> Result<FeatureTable>
    where
        F: FnMut(&'static str),
    {
        let mut table = FeatureTable::new(rows.len());
        self.apply_with(rows, &mut table, on_stage)?;
        Ok(table)
    }

    /// Run every stage over `rows`, inserting (or replacing) columns in `table`.
    pub fn apply(&self, rows: &[TokenizedRow], table: &mut FeatureTable) -> Result<()> {
        self.apply_with(rows, table, |_| {})
    }

    pub fn apply_with<F>(
        &self,
        rows: &[TokenizedRow],
        table: &mut FeatureTable,
        mut on_stage: F,
    ) -> Result<()>
    where
        F: FnMut(&'static str),
    {
        if rows.len() != table.rows() {
            return Err(Error::RowCountMismatch {
                column: "<rows>".to_string(),
                expected: table.rows(),
                actual: rows.len(),
            });
        }
        if rows.is_empty() {
            warn!("building features for an empty row set");
        }

        for stage in &self.stages {
            let started = Instant::now();
            let columns = stage.extract(rows, table)?;
            let produced = columns.len();
            for (key, values) in columns {
                table.insert(key, values)?;
            }
            info!(
                stage = stage.name(),
                columns = produced,
                rows = rows.len(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "stage complete"
            );
            on_stage(stage.name());
        }
        Ok(())
    }
}
