// ─────────────────────────────────────────────────────────────────────
// P300 Speller Core — Channel Scaler
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Per-channel standardization of EEG trials.
//!
//! Statistics are pooled over every trial and time sample of a channel and
//! are fitted on the training partition only; validation and test data are
//! transformed with the training statistics.

use ndarray::{Array1, Array3, Axis};
use p300_types::constants::EPS_STD;
use p300_types::error::{P300Error, P300Result};

/// Fitted per-channel mean and standard deviation (population, ddof = 0).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChannelScaler {
    params: Option<ChannelStats>,
}

#[derive(Debug, Clone, PartialEq)]
struct ChannelStats {
    mean: Array1<f64>,
    std: Array1<f64>,
}

impl ChannelScaler {
    pub fn new() -> Self {
        Self { params: None }
    }

    /// Fit on trials `[n_trials, n_samples, n_channels]`.
    pub fn fit(&mut self, x: &Array3<f32>) -> P300Result<()> {
        let (n_trials, n_samples, n_channels) = x.dim();
        let count = n_trials * n_samples;
        if count == 0 || n_channels == 0 {
            return Err(P300Error::shape(
                "scaler input",
                "at least one trial, sample and channel",
                format!("{:?}", x.dim()),
            ));
        }

        let mut mean = Array1::zeros(n_channels);
        let mut std = Array1::zeros(n_channels);
        for (c, channel) in x.axis_iter(Axis(2)).enumerate() {
            let m = channel.iter().map(|&v| v as f64).sum::<f64>() / count as f64;
            let var = channel
                .iter()
                .map(|&v| (v as f64 - m).powi(2))
                .sum::<f64>()
                / count as f64;
            if !m.is_finite() || !var.is_finite() {
                return Err(P300Error::InvalidData(format!(
                    "channel {c} contains non-finite values"
                )));
            }
            mean[c] = m;
            std[c] = var.sqrt();
        }

        self.params = Some(ChannelStats { mean, std });
        Ok(())
    }

    /// Standardize `x` with the fitted statistics. Does not touch them.
    pub fn transform(&self, x: &Array3<f32>) -> P300Result<Array3<f32>> {
        let stats = self.params.as_ref().ok_or(P300Error::NotFitted)?;
        let n_channels = x.len_of(Axis(2));
        if n_channels != stats.mean.len() {
            return Err(P300Error::shape("scaler channels", stats.mean.len(), n_channels));
        }

        let mut out = x.to_owned();
        for (c, mut channel) in out.axis_iter_mut(Axis(2)).enumerate() {
            let m = stats.mean[c];
            let s = stats.std[c].max(EPS_STD);
            channel.mapv_inplace(|v| ((v as f64 - m) / s) as f32);
        }
        Ok(out)
    }

    pub fn fit_transform(&mut self, x: &Array3<f32>) -> P300Result<Array3<f32>> {
        self.fit(x)?;
        self.transform(x)
    }

    pub fn is_fitted(&self) -> bool {
        self.params.is_some()
    }

    pub fn mean(&self) -> Option<&Array1<f64>> {
        self.params.as_ref().map(|p| &p.mean)
    }

    pub fn std(&self) -> Option<&Array1<f64>> {
        self.params.as_ref().map(|p| &p.std)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(n: usize, s: usize, c: usize) -> Array3<f32> {
        Array3::from_shape_fn((n, s, c), |(t, k, ch)| {
            (t as f32) * 0.5 + (k as f32) * 0.1 + 10.0 * ch as f32
        })
    }

    #[test]
    fn test_transform_before_fit_fails() {
        let scaler = ChannelScaler::new();
        let err = scaler.transform(&ramp(2, 3, 2)).unwrap_err();
        assert!(matches!(err, P300Error::NotFitted));
    }

    #[test]
    fn test_fit_transform_standardizes_each_channel() {
        let mut scaler = ChannelScaler::new();
        let out = scaler.fit_transform(&ramp(8, 6, 3)).unwrap();

        for channel in out.axis_iter(Axis(2)) {
            let n = channel.len() as f64;
            let mean = channel.iter().map(|&v| v as f64).sum::<f64>() / n;
            let var = channel.iter().map(|&v| (v as f64 - mean).powi(2)).sum::<f64>() / n;
            assert!(mean.abs() < 1e-5, "mean {mean}");
            assert!((var - 1.0).abs() < 1e-4, "var {var}");
        }
    }

    #[test]
    fn test_known_statistics() {
        // Channel 0 holds 1, 3; channel 1 holds 10, 10.
        let x = Array3::from_shape_vec((2, 1, 2), vec![1.0, 10.0, 3.0, 10.0]).unwrap();
        let mut scaler = ChannelScaler::new();
        scaler.fit(&x).unwrap();

        let mean = scaler.mean().unwrap();
        let std = scaler.std().unwrap();
        assert!((mean[0] - 2.0).abs() < 1e-12);
        assert!((std[0] - 1.0).abs() < 1e-12);
        assert!((mean[1] - 10.0).abs() < 1e-12);
        assert_eq!(std[1], 0.0);

        // Constant channel maps to zero instead of dividing by zero.
        let out = scaler.transform(&x).unwrap();
        assert_eq!(out[[0, 0, 1]], 0.0);
        assert_eq!(out[[0, 0, 0]], -1.0);
        assert_eq!(out[[1, 0, 0]], 1.0);
    }

    #[test]
    fn test_transform_leaves_fitted_state_untouched() {
        let mut scaler = ChannelScaler::new();
        scaler.fit(&ramp(5, 4, 2)).unwrap();
        let before = scaler.clone();

        let other = ramp(7, 4, 2).mapv(|v| v * 3.0 - 100.0);
        scaler.transform(&other).unwrap();
        assert_eq!(scaler, before);
    }

    #[test]
    fn test_channel_mismatch_rejected() {
        let mut scaler = ChannelScaler::new();
        scaler.fit(&ramp(3, 3, 2)).unwrap();
        assert!(scaler.transform(&ramp(3, 3, 4)).is_err());
    }

    #[test]
    fn test_empty_input_rejected() {
        let mut scaler = ChannelScaler::new();
        assert!(scaler.fit(&Array3::zeros((0, 5, 2))).is_err());
        assert!(!scaler.is_fitted());
    }

    #[test]
    fn test_non_finite_input_is_a_data_error() {
        let mut scaler = ChannelScaler::new();
        let mut x = ramp(4, 3, 2);
        x[[2, 1, 1]] = f32::NAN;
        assert!(matches!(scaler.fit(&x), Err(P300Error::InvalidData(_))));
        assert!(!scaler.is_fitted());
    }
}
