// ─────────────────────────────────────────────────────────────────────
// P300 Speller Core — Subject Splits
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Leave-one-subject-out folds with a seeded train/validation split.

use p300_types::error::{P300Error, P300Result};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::collections::BTreeSet;

/// One cross-validation fold. Index vectors point into the full dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fold {
    /// Position of the fold in the run (also the checkpoint suffix).
    pub index: usize,
    /// Held-out subject.
    pub subject: usize,
    pub train: Vec<usize>,
    pub valid: Vec<usize>,
    pub test: Vec<usize>,
}

impl Fold {
    /// True when no trial index occurs in more than one partition.
    pub fn is_disjoint(&self) -> bool {
        let mut seen = BTreeSet::new();
        self.train
            .iter()
            .chain(&self.valid)
            .chain(&self.test)
            .all(|&i| seen.insert(i))
    }
}

/// Subject id of every trial when subjects occupy contiguous blocks.
pub fn subject_groups(n_subjects: usize, trials_per_subject: usize) -> Vec<usize> {
    (0..n_subjects)
        .flat_map(|s| std::iter::repeat(s).take(trials_per_subject))
        .collect()
}

/// For every distinct group (ascending), the indices outside it (train) and
/// inside it (test).
pub fn leave_one_group_out(groups: &[usize]) -> Vec<(usize, Vec<usize>, Vec<usize>)> {
    let distinct: BTreeSet<usize> = groups.iter().copied().collect();
    distinct
        .into_iter()
        .map(|g| {
            let (test, train): (Vec<usize>, Vec<usize>) =
                (0..groups.len()).partition(|&i| groups[i] == g);
            (g, train, test)
        })
        .collect()
}

/// Shuffle `indices` with `seed` and cut off `ceil(valid_fraction * n)` of
/// them as validation. Returns `(train, valid)`.
pub fn train_valid_split(
    indices: &[usize],
    valid_fraction: f64,
    seed: u64,
) -> P300Result<(Vec<usize>, Vec<usize>)> {
    if !(valid_fraction > 0.0 && valid_fraction < 1.0) {
        return Err(P300Error::ConfigError(format!(
            "valid_fraction must be in (0, 1), got {valid_fraction}"
        )));
    }
    let n = indices.len();
    let n_valid = (valid_fraction * n as f64).ceil() as usize;
    if n_valid == 0 || n_valid >= n {
        return Err(P300Error::ConfigError(format!(
            "cannot split {n} trials into non-empty train and validation sets"
        )));
    }

    let mut shuffled = indices.to_vec();
    let mut rng = StdRng::seed_from_u64(seed);
    shuffled.shuffle(&mut rng);
    let train = shuffled.split_off(n_valid);
    Ok((train, shuffled))
}

/// Leave-one-subject-out folds for contiguously blocked subjects.
pub fn cross_subject_folds(
    n_subjects: usize,
    trials_per_subject: usize,
    valid_fraction: f64,
    seed: u64,
) -> P300Result<Vec<Fold>> {
    let groups = subject_groups(n_subjects, trials_per_subject);
    leave_one_group_out(&groups)
        .into_iter()
        .enumerate()
        .map(|(index, (subject, rest, test))| {
            let (train, valid) = train_valid_split(&rest, valid_fraction, seed)?;
            Ok(Fold {
                index,
                subject,
                train,
                valid,
                test,
            })
        })
        .collect()
}
