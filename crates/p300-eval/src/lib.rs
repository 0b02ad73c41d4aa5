// ─────────────────────────────────────────────────────────────────────
// P300 Speller Core — P300 Eval
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Cross-subject evaluation of the BN3 detector.
//!
//! Every subject is held out once; a fresh model is trained on the others,
//! checkpointed, and scored on the held-out trials.

pub mod cross_subject;
pub mod report;

pub use cross_subject::CrossSubjectEvaluator;
pub use report::{EvaluationReport, FoldOutcome};

/// Environment variable naming an optional JSON `EvaluationConfig`.
pub const CONFIG_ENV: &str = "P300_EVAL_CONFIG";
