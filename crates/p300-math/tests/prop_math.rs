// ─────────────────────────────────────────────────────────────────────
// P300 Speller Core — Property-Based Tests (proptest) for p300-math
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Property-based tests for p300-math using proptest.
//!
//! Covers: fold disjointness, scaler leakage, one-hot row sums,
//! balanced weights, metric bounds.

use ndarray::{Array1, Array3};
use p300_math::encoding::{balanced_sample_weights, one_hot};
use p300_math::metrics::{average_precision, roc_auc, FoldMetrics};
use p300_math::scaler::ChannelScaler;
use p300_math::split::cross_subject_folds;
use proptest::prelude::*;

/// Labels with at least one sample of each class.
fn two_class_labels(max_len: usize) -> impl Strategy<Value = Vec<u8>> {
    proptest::collection::vec(0u8..2, 2..max_len).prop_map(|mut v| {
        v[0] = 0;
        v[1] = 1;
        v
    })
}

// ── Fold Properties ──────────────────────────────────────────────────

proptest! {
    /// Held-out subject trials never leak into train or validation.
    #[test]
    fn folds_are_disjoint_and_cover_everything(
        n_subjects in 2usize..8,
        trials in 2usize..40,
        seed in any::<u64>(),
    ) {
        let folds = cross_subject_folds(n_subjects, trials, 0.2, seed).unwrap();
        prop_assert_eq!(folds.len(), n_subjects);

        for fold in &folds {
            prop_assert!(fold.is_disjoint());
            prop_assert_eq!(fold.test.len(), trials);
            prop_assert!(fold.test.iter().all(|&i| i / trials == fold.subject));
            prop_assert!(fold.train.iter().chain(&fold.valid).all(|&i| i / trials != fold.subject));
            prop_assert_eq!(
                fold.train.len() + fold.valid.len() + fold.test.len(),
                n_subjects * trials
            );
        }
    }
}

// ── Scaler Properties ────────────────────────────────────────────────

proptest! {
    /// Fitted statistics depend only on the training data: transforming
    /// anything else leaves them unchanged, and refitting on the same
    /// training data reproduces them exactly.
    #[test]
    fn scaler_fits_on_train_only(
        n_train in 1usize..10,
        n_other in 1usize..10,
        offset in -50.0f32..50.0,
        gain in 0.1f32..10.0,
    ) {
        let train = Array3::from_shape_fn((n_train, 7, 3), |(t, s, c)| {
            ((t * 7 + s) as f32).sin() + c as f32
        });
        let other = Array3::from_shape_fn((n_other, 7, 3), |(t, s, c)| {
            gain * ((t + s + c) as f32).cos() + offset
        });

        let mut scaler = ChannelScaler::new();
        scaler.fit(&train).unwrap();
        let mean_before = scaler.mean().unwrap().clone();
        let std_before = scaler.std().unwrap().clone();

        scaler.transform(&other).unwrap();
        prop_assert_eq!(scaler.mean().unwrap(), &mean_before);
        prop_assert_eq!(scaler.std().unwrap(), &std_before);

        let mut refit = ChannelScaler::new();
        refit.fit(&train).unwrap();
        prop_assert_eq!(refit, scaler);
    }
}

// ── Encoding Properties ──────────────────────────────────────────────

proptest! {
    /// Binary one-hot is N x 2 with rows summing to one.
    #[test]
    fn one_hot_rows_sum_to_one(labels in proptest::collection::vec(0u8..2, 0..200)) {
        let y = Array1::from_vec(labels.clone());
        let enc = one_hot(y.view(), 2).unwrap();
        prop_assert_eq!(enc.dim(), (labels.len(), 2));
        for (row, &label) in enc.rows().into_iter().zip(&labels) {
            prop_assert_eq!(row.sum(), 1.0);
            prop_assert_eq!(row[label as usize], 1.0);
        }
    }

    /// The minority class always gets the larger weight.
    #[test]
    fn balanced_weights_favor_minority(n_pos in 1usize..50, extra_neg in 1usize..200) {
        let n_neg = n_pos + extra_neg;
        let y: Array1<u8> = std::iter::repeat(1u8).take(n_pos)
            .chain(std::iter::repeat(0u8).take(n_neg))
            .collect();
        let w = balanced_sample_weights(y.view());
        prop_assert!(w[0] > w[n_pos], "minority {} <= majority {}", w[0], w[n_pos]);

        let total: f64 = w.sum();
        prop_assert!((total - y.len() as f64).abs() < 1e-9);
    }
}

// ── Metric Properties ────────────────────────────────────────────────

proptest! {
    /// All six scores stay in [0, 1].
    #[test]
    fn metrics_bounded(
        labels in two_class_labels(100),
        seed in 0u64..1000,
    ) {
        let proba: Vec<f64> = (0..labels.len())
            .map(|i| (((i as u64 + seed) * 2_654_435_761) % 1000) as f64 / 999.0)
            .collect();
        let m = FoldMetrics::score(&labels, &proba).unwrap();
        prop_assert!(m.all_in_unit_interval(), "{:?}", m);
    }

    /// AUC of reversed scores is 1 - AUC.
    #[test]
    fn auc_antisymmetric(labels in two_class_labels(80)) {
        let scores: Vec<f64> = (0..labels.len()).map(|i| ((i * 37) % 11) as f64).collect();
        let reversed: Vec<f64> = scores.iter().map(|s| -s).collect();
        let a = roc_auc(&labels, &scores).unwrap();
        let b = roc_auc(&labels, &reversed).unwrap();
        prop_assert!((a + b - 1.0).abs() < 1e-9);
    }

    /// Scores that rank every positive above every negative give AUC = AP = 1.
    #[test]
    fn perfect_ranking(labels in two_class_labels(80)) {
        let scores: Vec<f64> = labels.iter().map(|&l| if l == 1 { 0.9 } else { 0.1 }).collect();
        prop_assert!((roc_auc(&labels, &scores).unwrap() - 1.0).abs() < 1e-12);
        prop_assert!((average_precision(&labels, &scores).unwrap() - 1.0).abs() < 1e-12);
    }
}
