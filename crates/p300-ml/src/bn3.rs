// ─────────────────────────────────────────────────────────────────────
// P300 Speller Core — BN3 Network
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! BN3 single-trial P300 detector.
//!
//! input [batch, samples, channels]
//!   → channel batch-norm → pointwise conv (channels → ns, linear)
//!   → temporal conv (ns → 16, kernel 20, stride 20, "same")
//!   → batch-norm → ReLU → flatten
//!   → (Dense 128 → tanh → Dropout 0.8) × dense_stages
//!   → Dense 1 → sigmoid

use burn::config::Config;
use burn::module::{Module, Param};
use burn::nn::conv::{Conv1d, Conv1dConfig};
use burn::nn::{
    BatchNorm, BatchNormConfig, Dropout, DropoutConfig, Initializer, Linear, LinearConfig,
    PaddingConfig1d, Relu,
};
use burn::tensor::activation::sigmoid;
use burn::tensor::backend::Backend;
use burn::tensor::Tensor;
use p300_types::config::ModelParams;

/// Running-statistics update rate, i.e. 1 − 0.99 decay.
const BN_MOMENTUM: f64 = 0.01;
const BN_EPSILON: f64 = 1e-3;

#[derive(Config, Debug)]
pub struct Bn3Config {
    /// EEG channels per trial.
    pub channels: usize,
    /// Time samples per trial.
    pub samples: usize,
    /// Filters of the pointwise channel projection.
    #[config(default = 16)]
    pub ns: usize,
    #[config(default = 16)]
    pub temporal_filters: usize,
    #[config(default = 20)]
    pub kernel: usize,
    #[config(default = 20)]
    pub stride: usize,
    #[config(default = 128)]
    pub hidden: usize,
    /// Dense + tanh + dropout stages, chained.
    #[config(default = 2)]
    pub dense_stages: usize,
    #[config(default = 0.8)]
    pub dropout: f64,
}

impl Bn3Config {
    /// Configuration for data with `channels` × `samples` trials.
    pub fn from_params(channels: usize, samples: usize, params: &ModelParams) -> Self {
        Bn3Config::new(channels, samples)
            .with_ns(params.ns)
            .with_temporal_filters(params.temporal_filters)
            .with_kernel(params.kernel)
            .with_stride(params.stride)
            .with_hidden(params.hidden)
            .with_dense_stages(params.dense_stages)
            .with_dropout(params.dropout)
    }

    /// Symmetric padding approximating "same" for the strided convolution:
    /// half of the total padding that yields `ceil(samples / stride)` outputs.
    pub fn same_padding(&self) -> usize {
        let target = self.samples.div_ceil(self.stride);
        let needed = ((target.max(1) - 1) * self.stride + self.kernel).saturating_sub(self.samples);
        needed.div_ceil(2)
    }

    /// Length of the temporal convolution output.
    pub fn temporal_len(&self) -> usize {
        (self.samples + 2 * self.same_padding()).saturating_sub(self.kernel) / self.stride + 1
    }

    /// Width of the flattened feature vector fed to the dense stages.
    pub fn flatten_dim(&self) -> usize {
        self.temporal_filters * self.temporal_len()
    }

    /// Glorot-uniform kernels and zero biases throughout.
    pub fn init<B: Backend>(&self, device: &B::Device) -> Bn3<B> {
        let input_norm = BatchNormConfig::new(self.channels)
            .with_momentum(BN_MOMENTUM)
            .with_epsilon(BN_EPSILON)
            .init(device);
        let mut pointwise = Conv1dConfig::new(self.channels, self.ns, 1)
            .with_bias(true)
            .with_initializer(glorot_uniform(self.channels, self.ns))
            .init(device);
        pointwise.bias = zero_bias(self.ns, device);
        let mut temporal = Conv1dConfig::new(self.ns, self.temporal_filters, self.kernel)
            .with_stride(self.stride)
            .with_padding(PaddingConfig1d::Explicit(self.same_padding()))
            .with_bias(true)
            .with_initializer(glorot_uniform(
                self.ns * self.kernel,
                self.temporal_filters * self.kernel,
            ))
            .init(device);
        temporal.bias = zero_bias(self.temporal_filters, device);
        let temporal_norm = BatchNormConfig::new(self.temporal_filters)
            .with_momentum(BN_MOMENTUM)
            .with_epsilon(BN_EPSILON)
            .init(device);

        let mut dense = Vec::with_capacity(self.dense_stages);
        let mut d_in = self.flatten_dim();
        for _ in 0..self.dense_stages {
            let mut stage = LinearConfig::new(d_in, self.hidden)
                .with_initializer(glorot_uniform(d_in, self.hidden))
                .init(device);
            stage.bias = zero_bias(self.hidden, device);
            dense.push(stage);
            d_in = self.hidden;
        }
        let mut output = LinearConfig::new(d_in, 1)
            .with_initializer(glorot_uniform(d_in, 1))
            .init(device);
        output.bias = zero_bias(1, device);

        Bn3 {
            input_norm,
            pointwise,
            temporal,
            temporal_norm,
            activation: Relu::new(),
            dense,
            dropout: DropoutConfig::new(self.dropout).init(),
            output,
        }
    }
}

/// Half-width of the Glorot-uniform range, `sqrt(6 / (fan_in + fan_out))`.
pub fn glorot_limit(fan_in: usize, fan_out: usize) -> f64 {
    (6.0 / (fan_in + fan_out).max(1) as f64).sqrt()
}

fn glorot_uniform(fan_in: usize, fan_out: usize) -> Initializer {
    let limit = glorot_limit(fan_in, fan_out);
    Initializer::Uniform {
        min: -limit,
        max: limit,
    }
}

fn zero_bias<B: Backend>(size: usize, device: &B::Device) -> Option<Param<Tensor<B, 1>>> {
    Some(Param::from_tensor(Tensor::zeros([size], device)))
}

#[derive(Module, Debug)]
pub struct Bn3<B: Backend> {
    input_norm: BatchNorm<B, 1>,
    pointwise: Conv1d<B>,
    temporal: Conv1d<B>,
    temporal_norm: BatchNorm<B, 1>,
    activation: Relu,
    dense: Vec<Linear<B>>,
    dropout: Dropout,
    output: Linear<B>,
}

impl<B: Backend> Bn3<B> {
    /// Target probability for each trial.
    ///
    /// `x`: `[batch, samples, channels]` → `[batch, 1]` in `[0, 1]`.
    pub fn forward(&self, x: Tensor<B, 3>) -> Tensor<B, 2> {
        // Convolutions run over time with channels as features.
        let x = x.swap_dims(1, 2);
        let x = self.input_norm.forward(x);
        let x = self.pointwise.forward(x);
        let x = self.temporal.forward(x);
        let x = self.temporal_norm.forward(x);
        let x = self.activation.forward(x);

        let mut x = x.flatten::<2>(1, 2);
        for dense in &self.dense {
            x = self.dropout.forward(dense.forward(x).tanh());
        }
        sigmoid(self.output.forward(x))
    }

    pub fn dense_stages(&self) -> usize {
        self.dense.len()
    }
}
