// ─────────────────────────────────────────────────────────────────────
// P300 Speller Core — Constants
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
/// Subjects in the P300 Speller database.
pub const N_SUBJECTS: usize = 22;

/// Trials recorded per subject (contiguous blocks in the data file).
pub const TRIALS_PER_SUBJECT: usize = 2880;

/// Time samples per trial after epoching.
pub const SAMPLES_PER_TRIAL: usize = 206;

/// EEG channels kept in the database.
pub const N_CHANNELS: usize = 6;

/// Binary task: non-target (0) vs target (1).
pub const N_CLASSES: usize = 2;

/// Fraction of the non-held-out trials used for validation.
pub const VALID_FRACTION: f64 = 0.2;

/// Seed of the train/validation shuffle.
pub const SPLIT_SEED: u64 = 123;

/// Decision threshold on the target probability (round-half-to-even of p).
pub const DECISION_THRESHOLD: f64 = 0.5;

/// Floor applied to per-channel standard deviations.
pub const EPS_STD: f64 = 1e-8;
