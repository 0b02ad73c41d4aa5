// ─────────────────────────────────────────────────────────────────────
// P300 Speller Core — Backend
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use burn::backend::ndarray::NdArrayDevice;
use burn::backend::{Autodiff, NdArray};

/// CPU backend used for inference and checkpoints.
pub type InferenceBackend = NdArray<f32>;

/// Autodiff wrapper used while training.
pub type TrainBackend = Autodiff<InferenceBackend>;

pub fn cpu_device() -> NdArrayDevice {
    NdArrayDevice::Cpu
}
