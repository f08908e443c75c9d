// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

use std::fs;
use std::path::Path;

use clap::Parser;
use serde::Deserialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use relfeat::artifact::{decode, ArtifactFooter, ArtifactHeader};
use relfeat::build::{build_table, load_rows, run_build};
use relfeat::kappa::{quadratic_weighted_kappa, KappaSummary, RATING_RANGE};
use relfeat::text::DEFAULT_JOIN;
use relfeat::{
    ColumnType, ColumnValues, DefaultTokenizer, Error, FeatureGroup, FeatureSet, PipelineConfig,
    Result,
};

mod cli;
use cli::display::{self, format_size, kappa_value, kv, section_bot, section_top};
use cli::{Cli, Commands};

/// Logs go to stderr; `RELFEAT_LOG` overrides the default filter.
fn init_tracing() {
    let filter =
        EnvFilter::try_from_env("RELFEAT_LOG").unwrap_or_else(|_| EnvFilter::new("relfeat=info"));
    // A second init (e.g. from a test harness) is harmless.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Build { config } => cmd_build(&config),
        Commands::Features {
            input,
            groups,
            names_only,
        } => cmd_features(&input, &groups, names_only),
        Commands::Inspect { file, limit } => cmd_inspect(&file, limit),
        Commands::Score { input } => cmd_score(&input),
    };

    if let Err(e) = result {
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }
}

fn cmd_build(config_path: &Path) -> Result<()> {
    let config = PipelineConfig::load(config_path)?;
    let summary = run_build(&config)?;

    section_top("BUILD");
    kv("train rows", &summary.train_rows.to_string());
    kv("test rows", &summary.test_rows.to_string());
    kv("columns", &summary.columns.to_string());
    kv("splits", &summary.splits.to_string());
    kv("artifacts", &summary.artifacts.to_string());
    if let Some(task) = summary.task {
        kv("task", task.as_str());
        kv("backend", task.backend().as_str());
        kv(
            "target",
            if task.is_classification() {
                "class labels"
            } else {
                "relevance score"
            },
        );
    }
    for path in &summary.manifests {
        kv("manifest", &path.display().to_string());
    }
    section_bot();
    eprintln!("✅ Build complete");
    Ok(())
}

fn cmd_features(input: &Path, groups: &[FeatureGroup], names_only: bool) -> Result<()> {
    let rows = load_rows(input)?;
    let table = build_table(
        &rows,
        &DefaultTokenizer,
        &FeatureSet::default(),
        groups,
        DEFAULT_JOIN,
    )?;

    if names_only {
        for name in table.names() {
            println!("{name}");
        }
        return Ok(());
    }

    let mut out = Vec::with_capacity(rows.len());
    for (i, row) in rows.iter().enumerate() {
        let mut obj = serde_json::Map::new();
        obj.insert("id".to_string(), serde_json::Value::from(row.id));
        for (name, value) in table.row(i)? {
            obj.insert(
                name,
                serde_json::to_value(value).map_err(|e| Error::json(input, e))?,
            );
        }
        out.push(serde_json::Value::Object(obj));
    }
    let text = serde_json::to_string_pretty(&out).map_err(|e| Error::json(input, e))?;
    println!("{text}");
    Ok(())
}

fn cmd_inspect(file: &Path, limit: usize) -> Result<()> {
    let bytes = fs::read(file).map_err(|e| Error::io(file, e))?;
    let footer = ArtifactFooter::read(&bytes)?;
    let header = ArtifactHeader::read(&mut bytes.as_slice())?;
    let computed = ArtifactFooter::compute_crc32(&bytes[..bytes.len() - ArtifactFooter::SIZE]);

    section_top("ARTIFACT");
    kv("file", &file.display().to_string());
    kv("size", &format_size(bytes.len()));
    kv("version", &header.version.to_string());
    kv(
        "dtype",
        match header.column_type {
            ColumnType::Int => "i64",
            ColumnType::Float => "f64",
        },
    );
    kv("rows", &header.rows.to_string());
    let crc = if computed == footer.crc32 {
        display::themed(display::GREEN, &[], &format!("{:08x} ✓", footer.crc32))
    } else {
        display::themed(
            display::RED,
            &[],
            &format!("{:08x} ✗ (computed {:08x})", footer.crc32, computed),
        )
    };
    kv("crc32", &crc);

    // Checksum failures surface here as an error after the header is shown.
    let values = decode(&bytes);
    if let Ok(values) = &values {
        let shown: Vec<String> = match values {
            ColumnValues::Int(v) => v.iter().take(limit).map(|x| x.to_string()).collect(),
            ColumnValues::Float(v) => v.iter().take(limit).map(|x| format!("{x:.6}")).collect(),
        };
        let more = if values.len() > limit { ", …" } else { "" };
        kv("values", &format!("[{}{}]", shown.join(", "), more));
    }
    section_bot();
    values.map(|_| ())
}

#[derive(Deserialize)]
struct ScorePair {
    labels: Vec<i64>,
    predictions: Vec<i64>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ScoreInput {
    One(ScorePair),
    Folds(Vec<ScorePair>),
}

fn cmd_score(input: &Path) -> Result<()> {
    let data = fs::read_to_string(input).map_err(|e| Error::io(input, e))?;
    let parsed: ScoreInput = serde_json::from_str(&data).map_err(|e| Error::json(input, e))?;
    let pairs = match parsed {
        ScoreInput::One(pair) => vec![pair],
        ScoreInput::Folds(pairs) => pairs,
    };

    let scores = pairs
        .iter()
        .map(|p| quadratic_weighted_kappa(&p.labels, &p.predictions, Some(RATING_RANGE)))
        .collect::<Result<Vec<f64>>>()?;

    section_top("KAPPA");
    for (i, score) in scores.iter().enumerate() {
        kv(&format!("fold {}", i + 1), &kappa_value(*score));
    }
    if scores.len() > 1 {
        let summary = KappaSummary::from_scores(&scores);
        kv("mean", &kappa_value(summary.mean));
        kv("std", &format!("{:.6}", summary.std));
    }
    section_bot();
    Ok(())
}
