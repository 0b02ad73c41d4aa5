// ─────────────────────────────────────────────────────────────────────
// P300 Speller Core — Detection Metrics
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Binary classification metrics for single-trial P300 detection.
//!
//! Ranking metrics (ROC AUC, average precision) use the raw target
//! probability; the others use hard decisions `p > 0.5`, which is what
//! round-half-to-even of a probability gives. Ratios with a zero
//! denominator evaluate to 0.

use p300_types::constants::DECISION_THRESHOLD;
use p300_types::error::{P300Error, P300Result};
use serde::{Deserialize, Serialize};

/// Confusion-matrix counts with label 1 as the positive class.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConfusionCounts {
    pub tp: usize,
    pub fp: usize,
    pub tn: usize,
    pub fn_: usize,
}

impl ConfusionCounts {
    pub fn from_predictions(y_true: &[u8], y_pred: &[u8]) -> P300Result<Self> {
        check_lengths(y_true.len(), y_pred.len())?;
        let mut counts = ConfusionCounts::default();
        for (&t, &p) in y_true.iter().zip(y_pred) {
            match (t == 1, p == 1) {
                (true, true) => counts.tp += 1,
                (false, true) => counts.fp += 1,
                (false, false) => counts.tn += 1,
                (true, false) => counts.fn_ += 1,
            }
        }
        Ok(counts)
    }

    pub fn total(&self) -> usize {
        self.tp + self.fp + self.tn + self.fn_
    }

    pub fn accuracy(&self) -> f64 {
        ratio(self.tp + self.tn, self.total())
    }

    pub fn precision(&self) -> f64 {
        ratio(self.tp, self.tp + self.fp)
    }

    pub fn recall(&self) -> f64 {
        ratio(self.tp, self.tp + self.fn_)
    }

    pub fn f1(&self) -> f64 {
        ratio(2 * self.tp, 2 * self.tp + self.fp + self.fn_)
    }
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

fn check_lengths(n_true: usize, n_other: usize) -> P300Result<()> {
    if n_true != n_other {
        return Err(P300Error::shape("metric inputs", n_true, n_other));
    }
    if n_true == 0 {
        return Err(P300Error::MetricUndefined("empty input".to_string()));
    }
    Ok(())
}

/// Hard decisions from target probabilities.
pub fn threshold(proba: &[f64]) -> Vec<u8> {
    proba.iter().map(|&p| u8::from(p > DECISION_THRESHOLD)).collect()
}

pub fn accuracy(y_true: &[u8], y_pred: &[u8]) -> P300Result<f64> {
    Ok(ConfusionCounts::from_predictions(y_true, y_pred)?.accuracy())
}

pub fn precision(y_true: &[u8], y_pred: &[u8]) -> P300Result<f64> {
    Ok(ConfusionCounts::from_predictions(y_true, y_pred)?.precision())
}

pub fn recall(y_true: &[u8], y_pred: &[u8]) -> P300Result<f64> {
    Ok(ConfusionCounts::from_predictions(y_true, y_pred)?.recall())
}

pub fn f1(y_true: &[u8], y_pred: &[u8]) -> P300Result<f64> {
    Ok(ConfusionCounts::from_predictions(y_true, y_pred)?.f1())
}

/// Cumulative (false positives, true positives) at each distinct score,
/// scanning scores from high to low.
fn binary_clf_curve(y_true: &[u8], scores: &[f64]) -> P300Result<(Vec<f64>, Vec<f64>)> {
    check_lengths(y_true.len(), scores.len())?;
    if let Some(i) = scores.iter().position(|s| !s.is_finite()) {
        return Err(P300Error::MetricUndefined(format!(
            "non-finite score {} at index {i}",
            scores[i]
        )));
    }

    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]));

    let mut fps = Vec::new();
    let mut tps = Vec::new();
    let (mut fp, mut tp) = (0.0, 0.0);
    for (k, &i) in order.iter().enumerate() {
        if y_true[i] == 1 {
            tp += 1.0;
        } else {
            fp += 1.0;
        }
        let last_of_tie = order
            .get(k + 1)
            .map_or(true, |&next| scores[next] != scores[i]);
        if last_of_tie {
            fps.push(fp);
            tps.push(tp);
        }
    }
    Ok((fps, tps))
}

/// Area under the ROC curve (trapezoidal rule, ties grouped).
pub fn roc_auc(y_true: &[u8], scores: &[f64]) -> P300Result<f64> {
    let (fps, tps) = binary_clf_curve(y_true, scores)?;
    let n_pos = *tps.last().unwrap_or(&0.0);
    let n_neg = *fps.last().unwrap_or(&0.0);
    if n_pos == 0.0 || n_neg == 0.0 {
        return Err(P300Error::MetricUndefined(
            "ROC AUC needs both classes in y_true".to_string(),
        ));
    }

    let mut area = 0.0;
    let (mut prev_fpr, mut prev_tpr) = (0.0, 0.0);
    for (&fp, &tp) in fps.iter().zip(&tps) {
        let fpr = fp / n_neg;
        let tpr = tp / n_pos;
        area += (fpr - prev_fpr) * (tpr + prev_tpr) / 2.0;
        prev_fpr = fpr;
        prev_tpr = tpr;
    }
    Ok(area)
}

/// Average precision: `Σ (R_k − R_{k−1}) P_k` over decreasing thresholds.
/// Without positives the recall increments are all zero and AP is 0.
pub fn average_precision(y_true: &[u8], scores: &[f64]) -> P300Result<f64> {
    let (fps, tps) = binary_clf_curve(y_true, scores)?;
    let n_pos = *tps.last().unwrap_or(&0.0);
    if n_pos == 0.0 {
        return Ok(0.0);
    }

    let mut ap = 0.0;
    let mut prev_recall = 0.0;
    for (&fp, &tp) in fps.iter().zip(&tps) {
        let recall = tp / n_pos;
        let precision = tp / (tp + fp);
        ap += (recall - prev_recall) * precision;
        prev_recall = recall;
    }
    Ok(ap)
}

/// The six scores reported for one held-out subject.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FoldMetrics {
    pub auc: f64,
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub average_precision: f64,
    pub f1: f64,
}

impl FoldMetrics {
    /// Metric names in report order.
    pub const NAMES: [&'static str; 6] = ["auc", "accuracy", "precision", "recall", "ap", "f1"];

    /// Score target probabilities `proba` against `y_true`.
    pub fn score(y_true: &[u8], proba: &[f64]) -> P300Result<Self> {
        let auc = roc_auc(y_true, proba)?;
        let average_precision = average_precision(y_true, proba)?;
        let counts = ConfusionCounts::from_predictions(y_true, &threshold(proba))?;
        Ok(FoldMetrics {
            auc,
            accuracy: counts.accuracy(),
            precision: counts.precision(),
            recall: counts.recall(),
            average_precision,
            f1: counts.f1(),
        })
    }

    pub fn to_array(&self) -> [f64; 6] {
        [
            self.auc,
            self.accuracy,
            self.precision,
            self.recall,
            self.average_precision,
            self.f1,
        ]
    }

    fn from_array(v: [f64; 6]) -> Self {
        FoldMetrics {
            auc: v[0],
            accuracy: v[1],
            precision: v[2],
            recall: v[3],
            average_precision: v[4],
            f1: v[5],
        }
    }

    pub fn all_in_unit_interval(&self) -> bool {
        self.to_array().iter().all(|v| (0.0..=1.0).contains(v))
    }
}

/// Mean and population standard deviation of each metric across folds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricSummary {
    pub mean: FoldMetrics,
    pub std: FoldMetrics,
}

impl MetricSummary {
    pub fn from_folds(folds: &[FoldMetrics]) -> Option<Self> {
        if folds.is_empty() {
            return None;
        }
        let n = folds.len() as f64;
        let mut mean = [0.0; 6];
        for f in folds {
            for (m, v) in mean.iter_mut().zip(f.to_array()) {
                *m += v / n;
            }
        }
        let mut var = [0.0; 6];
        for f in folds {
            for ((s, v), m) in var.iter_mut().zip(f.to_array()).zip(mean) {
                *s += (v - m).powi(2) / n;
            }
        }
        Some(MetricSummary {
            mean: FoldMetrics::from_array(mean),
            std: FoldMetrics::from_array(var.map(f64::sqrt)),
        })
    }
}
