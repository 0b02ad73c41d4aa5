// ─────────────────────────────────────────────────────────────────────
// P300 Speller Core — Config
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use crate::constants::{N_SUBJECTS, SPLIT_SEED, TRIALS_PER_SUBJECT, VALID_FRACTION};
use crate::error::{P300Error, P300Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level cross-subject evaluation configuration.
/// Every field has a default, so `{}` is a valid JSON config and reproduces
/// the reference run (22 subjects, 2880 trials each).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluationConfig {
    pub n_subjects: usize,
    pub trials_per_subject: usize,
    /// Validation share of the non-held-out trials.
    pub valid_fraction: f64,
    /// Seed of the train/validation shuffle.
    pub split_seed: u64,
    pub model: ModelParams,
    pub training: TrainingParams,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        EvaluationConfig {
            n_subjects: N_SUBJECTS,
            trials_per_subject: TRIALS_PER_SUBJECT,
            valid_fraction: VALID_FRACTION,
            split_seed: SPLIT_SEED,
            model: ModelParams::default(),
            training: TrainingParams::default(),
        }
    }
}

/// BN3 network hyperparameters. Channel and sample counts come from the data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelParams {
    /// Filters of the pointwise channel projection (`Ns`).
    pub ns: usize,
    /// Filters of the strided temporal convolution.
    pub temporal_filters: usize,
    pub kernel: usize,
    pub stride: usize,
    /// Units of each dense stage.
    pub hidden: usize,
    /// Number of dense + tanh + dropout stages (1 or 2).
    pub dense_stages: usize,
    /// Drop probability of each dropout layer.
    pub dropout: f64,
}

impl Default for ModelParams {
    fn default() -> Self {
        ModelParams {
            ns: 16,
            temporal_filters: 16,
            kernel: 20,
            stride: 20,
            hidden: 128,
            dense_stages: 2,
            dropout: 0.8,
        }
    }
}

/// Optimizer and early-stopping settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingParams {
    pub batch_size: usize,
    pub max_epochs: usize,
    /// Epochs without validation-loss improvement before stopping.
    pub patience: usize,
    /// Minimum decrease of the validation loss that counts as improvement.
    pub min_delta: f64,
    pub learning_rate: f64,
    /// Seed for weight init and per-epoch shuffling; the fold index is added.
    pub seed: u64,
}

impl Default for TrainingParams {
    fn default() -> Self {
        TrainingParams {
            batch_size: 32,
            max_epochs: 200,
            patience: 50,
            min_delta: 0.0,
            learning_rate: 1e-3,
            seed: 123,
        }
    }
}

impl EvaluationConfig {
    /// Load from a JSON file. Missing fields fall back to defaults.
    pub fn from_file(path: impl AsRef<Path>) -> P300Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Total number of trials the dataset must hold.
    pub fn total_trials(&self) -> usize {
        self.n_subjects * self.trials_per_subject
    }

    pub fn validate(&self) -> P300Result<()> {
        if self.n_subjects < 2 {
            return Err(P300Error::ConfigError(format!(
                "n_subjects must be >= 2 for leave-one-subject-out, got {}",
                self.n_subjects
            )));
        }
        if self.trials_per_subject == 0 {
            return Err(P300Error::ConfigError(
                "trials_per_subject must be > 0".to_string(),
            ));
        }
        if !(self.valid_fraction > 0.0 && self.valid_fraction < 1.0) {
            return Err(P300Error::ConfigError(format!(
                "valid_fraction must be in (0, 1), got {}",
                self.valid_fraction
            )));
        }
        self.model.validate()?;
        self.training.validate()
    }
}

impl ModelParams {
    pub fn validate(&self) -> P300Result<()> {
        if self.ns == 0 || self.temporal_filters == 0 || self.hidden == 0 {
            return Err(P300Error::ConfigError(
                "model filter and unit counts must be > 0".to_string(),
            ));
        }
        if self.kernel == 0 || self.stride == 0 {
            return Err(P300Error::ConfigError(
                "model kernel and stride must be > 0".to_string(),
            ));
        }
        if !(1..=2).contains(&self.dense_stages) {
            return Err(P300Error::ConfigError(format!(
                "dense_stages must be 1 or 2, got {}",
                self.dense_stages
            )));
        }
        if !(0.0..1.0).contains(&self.dropout) {
            return Err(P300Error::ConfigError(format!(
                "dropout must be in [0, 1), got {}",
                self.dropout
            )));
        }
        Ok(())
    }
}

impl TrainingParams {
    pub fn validate(&self) -> P300Result<()> {
        if self.batch_size == 0 || self.max_epochs == 0 {
            return Err(P300Error::ConfigError(
                "batch_size and max_epochs must be > 0".to_string(),
            ));
        }
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(P300Error::ConfigError(format!(
                "learning_rate must be finite and > 0, got {}",
                self.learning_rate
            )));
        }
        if !(self.min_delta.is_finite() && self.min_delta >= 0.0) {
            return Err(P300Error::ConfigError(format!(
                "min_delta must be finite and >= 0, got {}",
                self.min_delta
            )));
        }
        Ok(())
    }
}
