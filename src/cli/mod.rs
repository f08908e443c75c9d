// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! CLI definitions for the relfeat command-line interface.
//!
//! Four subcommands: `build` runs the whole pipeline from a config file,
//! `features` prints the feature table (or just its column names) for one row
//! file, `inspect` examines a `.feat` artifact, and `score` computes quadratic
//! weighted kappa for labels against predictions.

pub mod display;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use relfeat::FeatureGroup;

#[derive(Parser)]
#[command(
    name = "relfeat",
    about = "Query / title / description relevance feature builder",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build features and write every fold split
    Build {
        /// Pipeline configuration (JSON)
        #[arg(short, long)]
        config: PathBuf,
    },

    /// Build the feature table for one row file and print it
    Features {
        /// JSON array of rows
        #[arg(short, long)]
        input: PathBuf,

        /// Feature groups to compute
        #[arg(long, value_delimiter = ',', default_values = ["counting", "distance"], value_parser = parse_group)]
        groups: Vec<FeatureGroup>,

        /// Print the column names only, one per line
        #[arg(long)]
        names_only: bool,
    },

    /// Inspect a .feat artifact
    Inspect {
        /// Path to .feat file
        file: PathBuf,

        /// Number of leading values to show
        #[arg(short, long, default_value = "10")]
        limit: usize,
    },

    /// Quadratic weighted kappa of predictions against labels
    ///
    /// The input is `{"labels": [...], "predictions": [...]}`, or an array of
    /// such objects (one per fold) to also get mean and std.
    Score {
        /// JSON file with labels and predictions
        #[arg(short, long)]
        input: PathBuf,
    },
}

fn parse_group(s: &str) -> Result<FeatureGroup, String> {
    match s {
        "counting" => Ok(FeatureGroup::Counting),
        "distance" => Ok(FeatureGroup::Distance),
        other => Err(format!("unknown feature group '{other}' (expected counting or distance)")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_features_groups_default() {
        let cli = Cli::try_parse_from(["relfeat", "features", "--input", "rows.json"]).unwrap();
        match cli.command {
            Commands::Features { groups, names_only, .. } => {
                assert_eq!(groups, vec![FeatureGroup::Counting, FeatureGroup::Distance]);
                assert!(!names_only);
            }
            _ => panic!("expected features"),
        }
    }

    #[test]
    fn test_unknown_group_rejected() {
        assert!(Cli::try_parse_from([
            "relfeat", "features", "--input", "rows.json", "--groups", "tfidf"
        ])
        .is_err());
    }
}
