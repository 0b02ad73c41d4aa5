// ─────────────────────────────────────────────────────────────────────
// P300 Speller Core — Dataset
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! EEG trial container and `.npy` loading.
//!
//! Data files hold `(trials, samples, channels)` or
//! `(subjects, trials, samples, channels)`; leading axes are folded into the
//! trial axis. Labels may be stored with any integer or float dtype numpy
//! commonly produces, but every value must be 0 or 1.

use crate::error::{P300Error, P300Result};
use ndarray::{Array1, Array3, ArrayD, Axis};
use ndarray_npy::{read_npy, ReadNpyError};
use std::path::Path;

/// EEG trials with binary target labels.
#[derive(Debug, Clone)]
pub struct Dataset {
    /// Trials `[n_trials, n_samples, n_channels]`.
    pub trials: Array3<f32>,
    /// 1 = target stimulus, 0 = non-target.
    pub labels: Array1<u8>,
}

impl Dataset {
    pub fn new(trials: Array3<f32>, labels: Array1<u8>) -> P300Result<Self> {
        if trials.len_of(Axis(0)) != labels.len() {
            return Err(P300Error::shape(
                "labels",
                format!("{} labels (one per trial)", trials.len_of(Axis(0))),
                labels.len(),
            ));
        }
        if let Some(index) = labels.iter().position(|&v| v > 1) {
            return Err(P300Error::InvalidLabel {
                index,
                value: labels[index] as f64,
            });
        }
        Ok(Dataset { trials, labels })
    }

    /// Build from arrays of arbitrary rank as they come out of numpy.
    pub fn from_arrays(data: ArrayD<f32>, labels: ArrayD<f64>) -> P300Result<Self> {
        let trials = fold_leading_axes(data)?;
        let labels = binary_labels(labels.iter().copied())?;
        Self::new(trials, labels)
    }

    /// Load `datapath` and `labelspath` NumPy files.
    pub fn from_npy(data_path: impl AsRef<Path>, labels_path: impl AsRef<Path>) -> P300Result<Self> {
        let data = read_float_npy(data_path.as_ref())?;
        let labels = read_label_npy(labels_path.as_ref())?;
        Self::from_arrays(data, labels)
    }

    pub fn n_trials(&self) -> usize {
        self.trials.len_of(Axis(0))
    }

    pub fn n_samples(&self) -> usize {
        self.trials.len_of(Axis(1))
    }

    pub fn n_channels(&self) -> usize {
        self.trials.len_of(Axis(2))
    }

    /// Number of target (label 1) trials.
    pub fn n_targets(&self) -> usize {
        self.labels.iter().filter(|&&v| v == 1).count()
    }

    /// Check that trials form `n_subjects` contiguous blocks of
    /// `trials_per_subject`.
    pub fn check_subject_layout(&self, n_subjects: usize, trials_per_subject: usize) -> P300Result<()> {
        let expected = n_subjects * trials_per_subject;
        if self.n_trials() != expected {
            return Err(P300Error::shape(
                "dataset trials",
                format!("{n_subjects} subjects x {trials_per_subject} trials = {expected}"),
                self.n_trials(),
            ));
        }
        Ok(())
    }

    /// Gather trials and labels at `indices`, in the given order.
    pub fn select(&self, indices: &[usize]) -> (Array3<f32>, Array1<u8>) {
        (
            self.trials.select(Axis(0), indices),
            self.labels.select(Axis(0), indices),
        )
    }
}

fn fold_leading_axes(data: ArrayD<f32>) -> P300Result<Array3<f32>> {
    let shape = data.shape().to_vec();
    if shape.len() < 3 {
        return Err(P300Error::shape(
            "dataset rank",
            "(trials, samples, channels) or (subjects, trials, samples, channels)",
            format!("{shape:?}"),
        ));
    }
    let n_channels = shape[shape.len() - 1];
    let n_samples = shape[shape.len() - 2];
    let n_trials: usize = shape[..shape.len() - 2].iter().product();

    let standard = data.as_standard_layout().into_owned();
    standard
        .into_shape((n_trials, n_samples, n_channels))
        .map_err(|e| P300Error::shape("dataset reshape", format!("{shape:?}"), e))
}

fn binary_labels(values: impl Iterator<Item = f64>) -> P300Result<Array1<u8>> {
    values
        .enumerate()
        .map(|(index, value)| {
            if value == 0.0 {
                Ok(0)
            } else if value == 1.0 {
                Ok(1)
            } else {
                Err(P300Error::InvalidLabel { index, value })
            }
        })
        .collect::<P300Result<Vec<u8>>>()
        .map(Array1::from_vec)
}

fn npy_error(path: &Path, err: ReadNpyError) -> P300Error {
    P300Error::Npy {
        path: path.display().to_string(),
        message: err.to_string(),
    }
}

/// Data arrays: float64 or float32.
fn read_float_npy(path: &Path) -> P300Result<ArrayD<f32>> {
    match read_npy::<_, ArrayD<f32>>(path) {
        Ok(arr) => return Ok(arr),
        Err(ReadNpyError::Io(e)) => return Err(P300Error::Io(e)),
        Err(_) => {}
    }
    read_npy::<_, ArrayD<f64>>(path)
        .map(|arr| arr.mapv(|v| v as f32))
        .map_err(|e| npy_error(path, e))
}

/// Label arrays: int64, int32, uint8, float64 or float32.
fn read_label_npy(path: &Path) -> P300Result<ArrayD<f64>> {
    match read_npy::<_, ArrayD<i64>>(path) {
        Ok(arr) => return Ok(arr.mapv(|v| v as f64)),
        Err(ReadNpyError::Io(e)) => return Err(P300Error::Io(e)),
        Err(_) => {}
    }
    if let Ok(arr) = read_npy::<_, ArrayD<i32>>(path) {
        return Ok(arr.mapv(|v| v as f64));
    }
    if let Ok(arr) = read_npy::<_, ArrayD<u8>>(path) {
        return Ok(arr.mapv(|v| v as f64));
    }
    if let Ok(arr) = read_npy::<_, ArrayD<bool>>(path) {
        return Ok(arr.mapv(|v| if v { 1.0 } else { 0.0 }));
    }
    if let Ok(arr) = read_npy::<_, ArrayD<f32>>(path) {
        return Ok(arr.mapv(|v| v as f64));
    }
    read_npy::<_, ArrayD<f64>>(path).map_err(|e| npy_error(path, e))
}
