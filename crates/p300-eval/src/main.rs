// ─────────────────────────────────────────────────────────────────────
// P300 Speller Core — Cross-Subject CLI
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Cross-subject P300 evaluation.
//!
//! ```bash
//! p300-cross-subject data.npy labels.npy models/
//!
//! # smaller run, verbose
//! P300_EVAL_CONFIG=quick.json RUST_LOG=debug p300-cross-subject data.npy labels.npy out/
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use p300_eval::{CrossSubjectEvaluator, CONFIG_ENV};
use p300_types::config::EvaluationConfig;
use p300_types::dataset::Dataset;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Evaluates single-trial cross-subject P300 detection using cross-validation
#[derive(Parser, Debug)]
#[command(name = "p300-cross-subject")]
struct Cli {
    /// Path for the data of the P300 Speller Database (NumPy file)
    #[arg(value_name = "datapath")]
    datapath: PathBuf,

    /// Path for the labels of the P300 Speller Database (NumPy file)
    #[arg(value_name = "labelspath")]
    labelspath: PathBuf,

    /// Path of the directory where the models are to be saved
    #[arg(value_name = "modelpath")]
    modelpath: PathBuf,
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            e.print().ok();
            if e.use_stderr() {
                eprintln!("for help use --help");
                return ExitCode::from(2);
            }
            return ExitCode::SUCCESS;
        }
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = match std::env::var_os(CONFIG_ENV) {
        Some(path) => {
            info!(path = ?path, "loading evaluation config");
            EvaluationConfig::from_file(&path)
                .with_context(|| format!("reading {CONFIG_ENV}={}", PathBuf::from(&path).display()))?
        }
        None => EvaluationConfig::default(),
    };

    let dataset = Dataset::from_npy(&cli.datapath, &cli.labelspath).with_context(|| {
        format!(
            "loading '{}' and '{}'",
            cli.datapath.display(),
            cli.labelspath.display()
        )
    })?;

    let evaluator = CrossSubjectEvaluator::new(config, &cli.modelpath)?;
    let report = evaluator
        .run(&dataset)
        .with_context(|| format!("evaluating into '{}'", cli.modelpath.display()))?;

    info!(
        folds = report.folds.len(),
        output = %cli.modelpath.display(),
        "evaluation finished"
    );
    Ok(())
}
