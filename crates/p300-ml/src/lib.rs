// ─────────────────────────────────────────────────────────────────────
// P300 Speller Core — P300 Ml
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Machine learning models.
//!
//! BN3 convolutional P300 detector on burn, its early-stopped training loop
//! and checkpoint persistence.

pub mod backend;
pub mod bn3;
pub mod checkpoint;
pub mod training;
