// ─────────────────────────────────────────────────────────────────────
// P300 Speller Core — Checkpoint
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Trained-model persistence with burn's named MessagePack recorder.

use crate::bn3::{Bn3, Bn3Config};
use burn::config::Config;
use burn::module::Module;
use burn::record::{FullPrecisionSettings, NamedMpkFileRecorder};
use burn::tensor::backend::Backend;
use p300_types::error::{P300Error, P300Result};
use std::path::{Path, PathBuf};

/// Extension the recorder appends to checkpoint stems.
pub const CHECKPOINT_EXTENSION: &str = "mpk";

fn recorder() -> NamedMpkFileRecorder<FullPrecisionSettings> {
    NamedMpkFileRecorder::<FullPrecisionSettings>::new()
}

/// File name stem of fold `k`'s checkpoint.
pub fn fold_stem(fold: usize) -> String {
    format!("s{fold}")
}

/// Save `model` as `<dir>/<stem>.mpk` and return the written path.
pub fn save_model<B: Backend>(model: Bn3<B>, dir: &Path, stem: &str) -> P300Result<PathBuf> {
    let base = dir.join(stem);
    model
        .save_file(base.clone(), &recorder())
        .map_err(|e| P300Error::Checkpoint(format!("failed to save '{}': {e:?}", base.display())))?;
    Ok(base.with_extension(CHECKPOINT_EXTENSION))
}

/// Load weights saved by [`save_model`] into a model built from `config`.
pub fn load_model<B: Backend>(
    config: &Bn3Config,
    path: &Path,
    device: &B::Device,
) -> P300Result<Bn3<B>> {
    let base = path.with_extension("");
    config
        .init::<B>(device)
        .load_file(base.clone(), &recorder(), device)
        .map_err(|e| P300Error::Checkpoint(format!("failed to load '{}': {e:?}", base.display())))
}

/// Write the architecture next to the checkpoints.
pub fn save_config(config: &Bn3Config, path: &Path) -> P300Result<()> {
    config.save(path)?;
    Ok(())
}

pub fn load_config(path: &Path) -> P300Result<Bn3Config> {
    Bn3Config::load(path)
        .map_err(|e| P300Error::Checkpoint(format!("failed to read '{}': {e:?}", path.display())))
}
