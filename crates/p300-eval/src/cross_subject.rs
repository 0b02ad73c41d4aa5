// ─────────────────────────────────────────────────────────────────────
// P300 Speller Core — Cross-Subject Evaluation
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Leave-one-subject-out training loop.
//!
//! For each held-out subject: split the remaining trials into train and
//! validation, weight classes, standardize with train-only statistics,
//! train BN3 with early stopping, checkpoint it as `s{k}.mpk`, and score
//! the held-out subject.

use crate::report::{EvaluationReport, FoldOutcome};
use burn::module::AutodiffModule;
use p300_math::encoding::{balanced_sample_weights, one_hot};
use p300_math::metrics::FoldMetrics;
use p300_math::scaler::ChannelScaler;
use p300_math::split::{cross_subject_folds, Fold};
use p300_ml::backend::{cpu_device, TrainBackend};
use p300_ml::bn3::Bn3Config;
use p300_ml::checkpoint::{fold_stem, save_config, save_model};
use p300_ml::training::{fit, predict_proba, LabeledTrials};
use p300_types::config::EvaluationConfig;
use p300_types::constants::N_CLASSES;
use p300_types::dataset::Dataset;
use p300_types::error::P300Result;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Architecture file written once per run, next to the checkpoints.
pub const MODEL_CONFIG_FILE: &str = "bn3_config.json";

#[derive(Debug, Clone)]
pub struct CrossSubjectEvaluator {
    config: EvaluationConfig,
    output_dir: PathBuf,
}

impl CrossSubjectEvaluator {
    pub fn new(config: EvaluationConfig, output_dir: impl Into<PathBuf>) -> P300Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            output_dir: output_dir.into(),
        })
    }

    pub fn config(&self) -> &EvaluationConfig {
        &self.config
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// One fold per subject, in subject order.
    pub fn folds(&self) -> P300Result<Vec<Fold>> {
        cross_subject_folds(
            self.config.n_subjects,
            self.config.trials_per_subject,
            self.config.valid_fraction,
            self.config.split_seed,
        )
    }

    /// Run every fold and write checkpoints and metric files to the
    /// output directory.
    pub fn run(&self, dataset: &Dataset) -> P300Result<EvaluationReport> {
        dataset.check_subject_layout(self.config.n_subjects, self.config.trials_per_subject)?;
        fs::create_dir_all(&self.output_dir)?;

        let model_config =
            Bn3Config::from_params(dataset.n_channels(), dataset.n_samples(), &self.config.model);
        save_config(&model_config, &self.output_dir.join(MODEL_CONFIG_FILE))?;
        info!(
            trials = dataset.n_trials(),
            samples = dataset.n_samples(),
            channels = dataset.n_channels(),
            targets = dataset.n_targets(),
            flatten = model_config.flatten_dim(),
            "dataset loaded"
        );

        let folds = self.folds()?;
        let mut outcomes = Vec::with_capacity(folds.len());
        for fold in &folds {
            outcomes.push(self.run_fold(dataset, fold, &model_config)?);
        }

        let report = EvaluationReport::new(outcomes);
        report.write(&self.output_dir)?;
        if let Some(summary) = &report.summary {
            info!(
                auc = summary.mean.auc,
                accuracy = summary.mean.accuracy,
                f1 = summary.mean.f1,
                "cross-subject mean"
            );
        }
        Ok(report)
    }

    fn run_fold(
        &self,
        dataset: &Dataset,
        fold: &Fold,
        model_config: &Bn3Config,
    ) -> P300Result<FoldOutcome> {
        let device = cpu_device();
        let (raw_train, y_train) = dataset.select(&fold.train);
        let (raw_valid, y_valid) = dataset.select(&fold.valid);
        let (raw_test, y_test) = dataset.select(&fold.test);
        info!(
            partition = fold.index,
            subject = fold.subject,
            train = ?raw_train.dim(),
            valid = ?raw_valid.dim(),
            test = ?raw_test.dim(),
            "partition"
        );

        let weights = balanced_sample_weights(y_train.view());
        let t_train = one_hot(y_train.view(), N_CLASSES)?;
        let t_valid = one_hot(y_valid.view(), N_CLASSES)?;

        let mut scaler = ChannelScaler::new();
        let x_train = scaler.fit_transform(&raw_train)?;
        drop(raw_train);
        let x_valid = scaler.transform(&raw_valid)?;
        let x_test = scaler.transform(&raw_test)?;

        let mut params = self.config.training.clone();
        params.seed = params.seed.wrapping_add(fold.index as u64);

        let (model, history) = fit::<TrainBackend>(
            model_config,
            &params,
            LabeledTrials::new(&x_train, &t_train).with_weights(&weights),
            LabeledTrials::new(&x_valid, &t_valid),
            &device,
        )?;
        let model = model.valid();

        let proba = predict_proba(&model, &x_test, params.batch_size, &device)?;
        let checkpoint = save_model(model, &self.output_dir, &fold_stem(fold.index))?;
        let metrics = FoldMetrics::score(&y_test.to_vec(), &proba)?;
        info!(
            partition = fold.index,
            auc = metrics.auc,
            accuracy = metrics.accuracy,
            precision = metrics.precision,
            recall = metrics.recall,
            ap = metrics.average_precision,
            f1 = metrics.f1,
            epochs = history.epochs_run(),
            "partition scored"
        );

        Ok(FoldOutcome {
            fold: fold.index,
            subject: fold.subject,
            n_train: fold.train.len(),
            n_valid: fold.valid.len(),
            n_test: fold.test.len(),
            epochs_run: history.epochs_run(),
            best_epoch: history.best_epoch,
            stopped_early: history.stopped_early,
            checkpoint,
            metrics,
        })
    }
}
