// ─────────────────────────────────────────────────────────────────────
// P300 Speller Core — Label Encoding
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! One-hot targets and class-balanced sample weights.

use ndarray::{Array1, Array2, ArrayView1};
use p300_types::error::{P300Error, P300Result};

/// Encode class indices as rows of an `[n, n_classes]` indicator matrix.
pub fn one_hot(labels: ArrayView1<'_, u8>, n_classes: usize) -> P300Result<Array2<f32>> {
    let mut out = Array2::zeros((labels.len(), n_classes));
    for (i, &label) in labels.iter().enumerate() {
        let class = label as usize;
        if class >= n_classes {
            return Err(P300Error::InvalidLabel {
                index: i,
                value: label as f64,
            });
        }
        out[[i, class]] = 1.0;
    }
    Ok(out)
}

/// Count of each class index up to the largest label seen.
pub fn class_counts(labels: ArrayView1<'_, u8>) -> Vec<usize> {
    let n_bins = labels.iter().map(|&v| v as usize + 1).max().unwrap_or(0);
    let mut counts = vec![0usize; n_bins];
    for &v in labels.iter() {
        counts[v as usize] += 1;
    }
    counts
}

/// "Balanced" per-sample weights: `n / (n_present_classes * count[class])`.
///
/// Rare classes get proportionally larger weights so that every class
/// contributes the same total weight to the loss.
pub fn balanced_sample_weights(labels: ArrayView1<'_, u8>) -> Array1<f64> {
    let counts = class_counts(labels);
    let n_present = counts.iter().filter(|&&c| c > 0).count();
    let n = labels.len() as f64;

    labels.mapv(|v| n / (n_present as f64 * counts[v as usize] as f64))
}
