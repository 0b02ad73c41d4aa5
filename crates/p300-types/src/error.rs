// ─────────────────────────────────────────────────────────────────────
// P300 Speller Core — Error
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use thiserror::Error;

#[derive(Error, Debug)]
pub enum P300Error {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Shape mismatch for {what}: expected {expected}, got {got}")]
    ShapeMismatch {
        what: String,
        expected: String,
        got: String,
    },

    #[error("Invalid label {value} at index {index}: labels must be 0 or 1")]
    InvalidLabel { index: usize, value: f64 },

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Scaler used before fit")]
    NotFitted,

    #[error("Metric undefined: {0}")]
    MetricUndefined(String),

    #[error("Model error: {0}")]
    Model(String),

    #[error("Checkpoint error: {0}")]
    Checkpoint(String),

    #[error("NumPy array error in '{path}': {message}")]
    Npy { path: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl P300Error {
    pub fn shape(what: &str, expected: impl ToString, got: impl ToString) -> Self {
        P300Error::ShapeMismatch {
            what: what.to_string(),
            expected: expected.to_string(),
            got: got.to_string(),
        }
    }
}

pub type P300Result<T> = Result<T, P300Error>;
