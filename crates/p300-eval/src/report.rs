// ─────────────────────────────────────────────────────────────────────
// P300 Speller Core — Report
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Per-fold outcomes and the files written at the end of a run.
//!
//! Each metric is stored as one plain-text array (one value per fold,
//! `%.18e` per line, the numpy `savetxt` layout) under the historical
//! `.npy` names, plus a `summary.json` with every fold and mean/std.

use p300_math::metrics::{FoldMetrics, MetricSummary};
use p300_types::error::{P300Error, P300Result};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Metric file names, in `FoldMetrics::to_array` order.
pub const METRIC_FILE_NAMES: [&str; 6] = [
    "aucs.npy",
    "accuracies.npy",
    "precisions.npy",
    "recalls.npy",
    "aps.npy",
    "f1scores.npy",
];

pub const SUMMARY_FILE_NAME: &str = "summary.json";

/// Result of one held-out subject.
#[derive(Debug, Clone, Serialize)]
pub struct FoldOutcome {
    pub fold: usize,
    pub subject: usize,
    pub n_train: usize,
    pub n_valid: usize,
    pub n_test: usize,
    pub epochs_run: usize,
    pub best_epoch: Option<usize>,
    pub stopped_early: bool,
    pub checkpoint: PathBuf,
    pub metrics: FoldMetrics,
}

/// All folds of a run.
#[derive(Debug, Clone, Serialize)]
pub struct EvaluationReport {
    pub folds: Vec<FoldOutcome>,
    pub summary: Option<MetricSummary>,
}

impl EvaluationReport {
    pub fn new(folds: Vec<FoldOutcome>) -> Self {
        let metrics: Vec<FoldMetrics> = folds.iter().map(|f| f.metrics).collect();
        let summary = MetricSummary::from_folds(&metrics);
        Self { folds, summary }
    }

    pub fn metrics(&self) -> Vec<FoldMetrics> {
        self.folds.iter().map(|f| f.metrics).collect()
    }

    /// Write the six metric arrays and the JSON summary into `dir`.
    pub fn write(&self, dir: &Path) -> P300Result<Vec<PathBuf>> {
        let mut written = write_metric_files(dir, &self.metrics())?;
        let summary_path = dir.join(SUMMARY_FILE_NAME);
        fs::write(&summary_path, serde_json::to_string_pretty(self)?)?;
        written.push(summary_path);
        Ok(written)
    }
}

/// One file per metric, one line per fold.
pub fn write_metric_files(dir: &Path, rows: &[FoldMetrics]) -> P300Result<Vec<PathBuf>> {
    let columns: Vec<[f64; 6]> = rows.iter().map(FoldMetrics::to_array).collect();
    METRIC_FILE_NAMES
        .iter()
        .enumerate()
        .map(|(m, name)| {
            let values: Vec<f64> = columns.iter().map(|row| row[m]).collect();
            let path = dir.join(name);
            savetxt(&path, &values)?;
            Ok(path)
        })
        .collect()
}

/// Write `values` one per line in `%.18e` format.
pub fn savetxt(path: &Path, values: &[f64]) -> P300Result<()> {
    let out: String = values
        .iter()
        .map(|&v| format_scientific(v) + "\n")
        .collect();
    fs::write(path, out)?;
    Ok(())
}

/// Read a file written by [`savetxt`].
pub fn loadtxt(path: &Path) -> P300Result<Vec<f64>> {
    fs::read_to_string(path)?
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(|l| {
            l.parse::<f64>().map_err(|e| {
                P300Error::InvalidData(format!("bad value '{l}' in '{}': {e}", path.display()))
            })
        })
        .collect()
}

/// C-style `%.18e`: 18 fractional digits, signed two-digit exponent.
pub fn format_scientific(v: f64) -> String {
    if v.is_nan() {
        return "nan".to_string();
    }
    if v.is_infinite() {
        return if v > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    let s = format!("{v:.18e}");
    match s.split_once('e') {
        Some((mantissa, exp)) => {
            let exp: i32 = exp.parse().unwrap_or(0);
            let sign = if exp < 0 { '-' } else { '+' };
            format!("{mantissa}e{sign}{:02}", exp.abs())
        }
        None => s,
    }
}
