// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Feature-name manifests.
//!
//! A manifest is a plain text file with one column name per line, in the order
//! the columns were produced. Model code reads it to pick the same columns, in
//! the same order, on every fold.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::pipeline::FeatureGroup;
use crate::schema::FeatureKey;

/// Names in `names` that belong to `group`, order preserved.
pub fn select_group<S: AsRef<str>>(names: &[S], group: FeatureGroup) -> Vec<String> {
    names
        .iter()
        .map(AsRef::as_ref)
        .filter(|n| group.selects(n))
        .map(str::to_string)
        .collect()
}

pub fn write_manifest(path: &Path, names: &[String]) -> Result<()> {
    let mut body = names.join("\n");
    if !body.is_empty() {
        body.push('\n');
    }
    fs::write(path, body).map_err(|e| Error::io(path, e))
}

/// Read a manifest. Blank lines are skipped; every name must parse as a feature.
pub fn read_manifest(path: &Path) -> Result<Vec<String>> {
    let data = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    data.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| line.parse::<FeatureKey>().map(|_| line.to_string()))
        .collect()
}

/// Write `<dir>/<group>.feat_name` with the group's share of `names`.
pub fn write_group_manifest(
    dir: &Path,
    group: FeatureGroup,
    names: &[String],
) -> Result<(PathBuf, Vec<String>)> {
    let selected = select_group(names, group);
    let path = dir.join(group.manifest_file_name());
    write_manifest(&path, &selected)?;
    Ok((path, selected))
}
