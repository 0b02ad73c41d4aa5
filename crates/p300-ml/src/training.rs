// ─────────────────────────────────────────────────────────────────────
// P300 Speller Core — Training
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Mini-batch Adam training with early stopping on validation loss.
//!
//! The network emits one target probability `p`; the loss is the
//! sample-weighted categorical cross-entropy of `[1 − p, p]` against one-hot
//! targets, averaged over the batch. Weights of the epoch with the lowest
//! validation loss are restored when training ends.

use crate::bn3::{Bn3, Bn3Config, Bn3Record};
use burn::module::{AutodiffModule, Module};
use burn::optim::{AdamConfig, GradientsParams, Optimizer};
use burn::tensor::backend::{AutodiffBackend, Backend};
use burn::tensor::{ElementConversion, Tensor, TensorData};
use ndarray::{Array1, Array2, Array3, Axis};
use p300_types::config::TrainingParams;
use p300_types::error::{P300Error, P300Result};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::{debug, info};

/// Probability clip before taking logs.
const PROBA_EPS: f32 = 1e-7;

/// Adam epsilon.
const ADAM_EPSILON: f32 = 1e-7;

// ── Early Stopping ───────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopDecision {
    /// New best loss; snapshot the weights.
    Improved,
    /// No improvement yet, patience not exhausted.
    Waiting,
    /// Patience exhausted.
    Stop,
}

/// Tracks the best monitored loss and the epochs since it improved.
#[derive(Debug, Clone)]
pub struct EarlyStopping {
    patience: usize,
    min_delta: f64,
    best: f64,
    best_epoch: Option<usize>,
    wait: usize,
}

impl EarlyStopping {
    pub fn new(patience: usize, min_delta: f64) -> Self {
        Self {
            patience,
            min_delta,
            best: f64::INFINITY,
            best_epoch: None,
            wait: 0,
        }
    }

    /// Record `loss` for `epoch`. NaN never counts as an improvement.
    pub fn update(&mut self, epoch: usize, loss: f64) -> StopDecision {
        if loss < self.best - self.min_delta {
            self.best = loss;
            self.best_epoch = Some(epoch);
            self.wait = 0;
            return StopDecision::Improved;
        }
        self.wait += 1;
        if self.wait >= self.patience {
            StopDecision::Stop
        } else {
            StopDecision::Waiting
        }
    }

    pub fn best_loss(&self) -> f64 {
        self.best
    }

    pub fn best_epoch(&self) -> Option<usize> {
        self.best_epoch
    }
}

// ── Data ─────────────────────────────────────────────────────────────

/// Trials with one-hot targets and optional per-sample loss weights.
#[derive(Debug, Clone, Copy)]
pub struct LabeledTrials<'a> {
    /// `[n, samples, channels]`, already standardized.
    pub inputs: &'a Array3<f32>,
    /// `[n, 2]` one-hot.
    pub targets: &'a Array2<f32>,
    /// `[n]`; unit weights when absent.
    pub weights: Option<&'a Array1<f64>>,
}

impl<'a> LabeledTrials<'a> {
    pub fn new(inputs: &'a Array3<f32>, targets: &'a Array2<f32>) -> Self {
        Self {
            inputs,
            targets,
            weights: None,
        }
    }

    pub fn with_weights(mut self, weights: &'a Array1<f64>) -> Self {
        self.weights = Some(weights);
        self
    }

    pub fn len(&self) -> usize {
        self.inputs.len_of(Axis(0))
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn validate(&self, what: &str) -> P300Result<()> {
        let n = self.len();
        if n == 0 {
            return Err(P300Error::shape(what, "at least one trial", 0));
        }
        if self.targets.dim() != (n, 2) {
            return Err(P300Error::shape(
                what,
                format!("targets ({n}, 2)"),
                format!("{:?}", self.targets.dim()),
            ));
        }
        if let Some(w) = self.weights {
            if w.len() != n {
                return Err(P300Error::shape(what, format!("{n} weights"), w.len()));
            }
        }
        Ok(())
    }

    fn batch<B: Backend>(&self, indices: &[usize], device: &B::Device) -> Bn3Batch<B> {
        let inputs = gather_inputs::<B>(self.inputs, indices, device);

        let targets: Vec<f32> = indices
            .iter()
            .flat_map(|&i| self.targets.row(i).to_vec())
            .collect();
        let targets = Tensor::from_data(TensorData::new(targets, [indices.len(), 2]), device);

        let weights: Vec<f32> = match self.weights {
            Some(w) => indices.iter().map(|&i| w[i] as f32).collect(),
            None => vec![1.0; indices.len()],
        };
        let weights = Tensor::from_data(TensorData::new(weights, [indices.len(), 1]), device);

        Bn3Batch {
            inputs,
            targets,
            weights,
        }
    }
}

struct Bn3Batch<B: Backend> {
    inputs: Tensor<B, 3>,
    targets: Tensor<B, 2>,
    weights: Tensor<B, 2>,
}

fn gather_inputs<B: Backend>(x: &Array3<f32>, indices: &[usize], device: &B::Device) -> Tensor<B, 3> {
    let (_, samples, channels) = x.dim();
    let mut values = Vec::with_capacity(indices.len() * samples * channels);
    for &i in indices {
        values.extend(x.index_axis(Axis(0), i).iter().copied());
    }
    Tensor::from_data(
        TensorData::new(values, [indices.len(), samples, channels]),
        device,
    )
}

// ── Loss ─────────────────────────────────────────────────────────────

/// Weighted two-class cross-entropy, mean over the batch.
///
/// `proba`: `[b, 1]` target probability, `targets`: `[b, 2]` one-hot,
/// `weights`: `[b, 1]`.
pub fn weighted_cross_entropy<B: Backend>(
    proba: Tensor<B, 2>,
    targets: Tensor<B, 2>,
    weights: Tensor<B, 2>,
) -> Tensor<B, 1> {
    let p = proba.clamp(PROBA_EPS, 1.0 - PROBA_EPS);
    let two_class = Tensor::cat(vec![p.clone().neg().add_scalar(1.0), p], 1);
    let per_sample = (targets * two_class.log()).sum_dim(1).neg();
    (per_sample * weights).mean()
}

// ── Fit / Predict ────────────────────────────────────────────────────

/// Per-epoch losses of one training run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrainingHistory {
    pub train_loss: Vec<f64>,
    pub valid_loss: Vec<f64>,
    /// Epoch whose weights were restored.
    pub best_epoch: Option<usize>,
    pub stopped_early: bool,
}

impl TrainingHistory {
    pub fn epochs_run(&self) -> usize {
        self.valid_loss.len()
    }

    pub fn best_valid_loss(&self) -> Option<f64> {
        self.best_epoch.map(|e| self.valid_loss[e])
    }
}

/// Train a fresh BN3 instance and return it with the best validation
/// weights restored.
pub fn fit<B: AutodiffBackend>(
    config: &Bn3Config,
    params: &TrainingParams,
    train: LabeledTrials<'_>,
    valid: LabeledTrials<'_>,
    device: &B::Device,
) -> P300Result<(Bn3<B>, TrainingHistory)> {
    params.validate()?;
    train.validate("training set")?;
    valid.validate("validation set")?;
    check_geometry(config, train.inputs)?;
    check_geometry(config, valid.inputs)?;

    B::seed(params.seed);
    let mut model: Bn3<B> = config.init(device);
    let mut optim = AdamConfig::new()
        .with_epsilon(ADAM_EPSILON)
        .init::<B, Bn3<B>>();
    let mut rng = StdRng::seed_from_u64(params.seed);
    let mut order: Vec<usize> = (0..train.len()).collect();

    let mut stopper = EarlyStopping::new(params.patience, params.min_delta);
    // Records own their tensors; a cloned module would share running stats.
    let mut best: Option<Bn3Record<B>> = None;
    let mut history = TrainingHistory::default();

    for epoch in 0..params.max_epochs {
        order.shuffle(&mut rng);
        let mut loss_sum = 0.0;
        for chunk in order.chunks(params.batch_size) {
            let batch = train.batch::<B>(chunk, device);
            let proba = model.forward(batch.inputs);
            let loss = weighted_cross_entropy(proba, batch.targets, batch.weights);
            let loss_value: f64 = loss.clone().into_scalar().elem();
            loss_sum += loss_value * chunk.len() as f64;

            let grads = GradientsParams::from_grads(loss.backward(), &model);
            model = optim.step(params.learning_rate, model, grads);
        }
        let train_loss = loss_sum / train.len() as f64;
        let valid_loss = evaluate_loss(&model.valid(), valid, params.batch_size, device);
        history.train_loss.push(train_loss);
        history.valid_loss.push(valid_loss);
        debug!(epoch, train_loss, valid_loss, "epoch finished");

        match stopper.update(epoch, valid_loss) {
            StopDecision::Improved => best = Some(model.clone().into_record()),
            StopDecision::Waiting => {}
            StopDecision::Stop => {
                history.stopped_early = true;
                info!(
                    epoch,
                    best_epoch = ?stopper.best_epoch(),
                    best_valid_loss = stopper.best_loss(),
                    "early stopping"
                );
                break;
            }
        }
    }

    history.best_epoch = stopper.best_epoch();
    let model = match best {
        Some(record) => model.load_record(record),
        None => model,
    };
    Ok((model, history))
}

fn check_geometry(config: &Bn3Config, x: &Array3<f32>) -> P300Result<()> {
    let (_, samples, channels) = x.dim();
    if samples != config.samples || channels != config.channels {
        return Err(P300Error::shape(
            "model input",
            format!("({}, {}) samples x channels", config.samples, config.channels),
            format!("({samples}, {channels})"),
        ));
    }
    Ok(())
}

/// Mean weighted loss of `model` over `data`, in inference mode.
pub fn evaluate_loss<B: Backend>(
    model: &Bn3<B>,
    data: LabeledTrials<'_>,
    batch_size: usize,
    device: &B::Device,
) -> f64 {
    let order: Vec<usize> = (0..data.len()).collect();
    let mut loss_sum = 0.0;
    for chunk in order.chunks(batch_size.max(1)) {
        let batch = data.batch::<B>(chunk, device);
        let proba = model.forward(batch.inputs);
        let loss: f64 = weighted_cross_entropy(proba, batch.targets, batch.weights)
            .into_scalar()
            .elem();
        loss_sum += loss * chunk.len() as f64;
    }
    loss_sum / data.len().max(1) as f64
}

/// Target probability of every trial in `inputs`.
pub fn predict_proba<B: Backend>(
    model: &Bn3<B>,
    inputs: &Array3<f32>,
    batch_size: usize,
    device: &B::Device,
) -> P300Result<Vec<f64>> {
    let n = inputs.len_of(Axis(0));
    let order: Vec<usize> = (0..n).collect();
    let mut out = Vec::with_capacity(n);
    for chunk in order.chunks(batch_size.max(1)) {
        let proba = model.forward(gather_inputs::<B>(inputs, chunk, device));
        let values = proba
            .into_data()
            .to_vec::<f32>()
            .map_err(|e| P300Error::Model(format!("failed to read predictions: {e:?}")))?;
        out.extend(values.into_iter().map(f64::from));
    }
    Ok(out)
}
