// ─────────────────────────────────────────────────────────────────────
// P300 Speller Core — P300 Math
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Numerical building blocks around the classifier: channel scaling, label
//! encoding, subject-wise fold construction and detection metrics.

pub mod encoding;
pub mod metrics;
pub mod scaler;
pub mod split;
