// ─────────────────────────────────────────────────────────────────────
// P300 Speller Core — End-to-End Tests
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Small synthetic runs of the full pipeline and the CLI.

use ndarray::{Array1, Array3};
use ndarray_npy::write_npy;
use p300_eval::report::{loadtxt, METRIC_FILE_NAMES, SUMMARY_FILE_NAME};
use p300_eval::{CrossSubjectEvaluator, CONFIG_ENV};
use p300_types::config::{EvaluationConfig, ModelParams, TrainingParams};
use p300_types::dataset::Dataset;
use std::path::Path;
use std::process::Command;

const SUBJECTS: usize = 3;
const TRIALS: usize = 36;
const SAMPLES: usize = 24;
const CHANNELS: usize = 2;

fn small_config() -> EvaluationConfig {
    EvaluationConfig {
        n_subjects: SUBJECTS,
        trials_per_subject: TRIALS,
        model: ModelParams {
            ns: 4,
            temporal_filters: 4,
            kernel: 4,
            stride: 4,
            hidden: 8,
            dense_stages: 2,
            dropout: 0.2,
        },
        training: TrainingParams {
            batch_size: 16,
            max_epochs: 2,
            patience: 2,
            ..TrainingParams::default()
        },
        ..EvaluationConfig::default()
    }
}

/// Every sixth trial is a target with a positive bump mid-trial.
fn synthetic() -> (Array3<f32>, Array1<i64>) {
    let n = SUBJECTS * TRIALS;
    let labels = Array1::from_shape_fn(n, |i| i64::from(i % 6 == 0));
    let trials = Array3::from_shape_fn((n, SAMPLES, CHANNELS), |(i, t, c)| {
        let noise = ((i * 31 + t * 7 + c * 13) % 17) as f32 / 17.0 - 0.5;
        let bump = if labels[i] == 1 && (8..16).contains(&t) { 2.0 } else { 0.0 };
        noise + bump + c as f32
    });
    (trials, labels)
}

fn write_inputs(dir: &Path) -> (std::path::PathBuf, std::path::PathBuf) {
    let (trials, labels) = synthetic();
    let data_path = dir.join("data.npy");
    let labels_path = dir.join("labels.npy");
    write_npy(&data_path, &trials).unwrap();
    write_npy(&labels_path, &labels).unwrap();
    (data_path, labels_path)
}

fn assert_outputs(out: &Path) {
    for k in 0..SUBJECTS {
        assert!(out.join(format!("s{k}.mpk")).exists(), "missing checkpoint s{k}");
    }
    for name in METRIC_FILE_NAMES {
        let values = loadtxt(&out.join(name)).unwrap();
        assert_eq!(values.len(), SUBJECTS, "{name}");
        assert!(
            values.iter().all(|v| (0.0..=1.0).contains(v)),
            "{name}: {values:?}"
        );
    }
    assert!(out.join(SUMMARY_FILE_NAME).exists());
    assert!(out.join("bn3_config.json").exists());
}

#[test]
fn test_pipeline_writes_checkpoints_and_metrics() {
    let dir = tempfile::tempdir().unwrap();
    let (data_path, labels_path) = write_inputs(dir.path());
    let dataset = Dataset::from_npy(&data_path, &labels_path).unwrap();
    let out = dir.path().join("models");

    let report = CrossSubjectEvaluator::new(small_config(), &out)
        .unwrap()
        .run(&dataset)
        .unwrap();

    assert_eq!(report.folds.len(), SUBJECTS);
    for (k, fold) in report.folds.iter().enumerate() {
        assert_eq!(fold.fold, k);
        assert_eq!(fold.subject, k);
        assert_eq!(fold.n_test, TRIALS);
        assert_eq!(fold.n_train + fold.n_valid, (SUBJECTS - 1) * TRIALS);
        assert!(fold.epochs_run >= 1 && fold.epochs_run <= 2);
        assert!(fold.metrics.all_in_unit_interval());
    }
    assert!(report.summary.is_some());
    assert_outputs(&out);

    let aucs = loadtxt(&out.join("aucs.npy")).unwrap();
    let expected: Vec<f64> = report.folds.iter().map(|f| f.metrics.auc).collect();
    assert_eq!(aucs, expected);
}

#[test]
fn test_pipeline_accepts_subject_blocked_arrays() {
    let dir = tempfile::tempdir().unwrap();
    let (trials, labels) = synthetic();
    let blocked = trials
        .into_shape((SUBJECTS, TRIALS, SAMPLES, CHANNELS))
        .unwrap();
    let blocked_labels = labels.into_shape((SUBJECTS, TRIALS)).unwrap();
    let data_path = dir.path().join("data4d.npy");
    let labels_path = dir.path().join("labels2d.npy");
    write_npy(&data_path, &blocked).unwrap();
    write_npy(&labels_path, &blocked_labels).unwrap();

    let dataset = Dataset::from_npy(&data_path, &labels_path).unwrap();
    assert_eq!(dataset.n_trials(), SUBJECTS * TRIALS);
    assert_eq!(dataset.n_targets(), SUBJECTS * TRIALS / 6);
}

#[test]
fn test_cli_without_arguments_exits_2() {
    let output = Command::new(env!("CARGO_BIN_EXE_p300-cross-subject"))
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("for help use --help"), "{stderr}");
}

#[test]
fn test_cli_extra_argument_exits_2() {
    let output = Command::new(env!("CARGO_BIN_EXE_p300-cross-subject"))
        .args(["a.npy", "b.npy", "out", "surplus"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_cli_help_exits_0() {
    let output = Command::new(env!("CARGO_BIN_EXE_p300-cross-subject"))
        .arg("--help")
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("<datapath> <labelspath> <modelpath>"),
        "{stdout}"
    );
    assert!(stdout.contains("P300 Speller Database"), "{stdout}");
}

#[test]
fn test_cli_missing_data_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let output = Command::new(env!("CARGO_BIN_EXE_p300-cross-subject"))
        .arg(dir.path().join("absent.npy"))
        .arg(dir.path().join("absent_labels.npy"))
        .arg(dir.path().join("out"))
        .env_remove(CONFIG_ENV)
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn test_cli_full_run_with_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let (data_path, labels_path) = write_inputs(dir.path());
    let config_path = dir.path().join("eval.json");
    std::fs::write(&config_path, serde_json::to_string(&small_config()).unwrap()).unwrap();
    let out = dir.path().join("models");

    let output = Command::new(env!("CARGO_BIN_EXE_p300-cross-subject"))
        .arg(&data_path)
        .arg(&labels_path)
        .arg(&out)
        .env(CONFIG_ENV, &config_path)
        .env("RUST_LOG", "warn")
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "{}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert_outputs(&out);
}

#[test]
#[ignore = "full 22-subject run; takes hours on CPU"]
fn test_reference_scale_run() {
    let dir = tempfile::tempdir().unwrap();
    let config = EvaluationConfig::default();
    let n = config.total_trials();
    let trials = Array3::from_shape_fn((n, 206, 6), |(i, t, c)| {
        ((i * 7 + t * 3 + c) % 11) as f32 / 11.0 + if i % 6 == 0 && t > 60 { 0.5 } else { 0.0 }
    });
    let labels = Array1::from_shape_fn(n, |i| u8::from(i % 6 == 0));
    let dataset = Dataset::new(trials, labels).unwrap();

    let report = CrossSubjectEvaluator::new(config, dir.path())
        .unwrap()
        .run(&dataset)
        .unwrap();
    assert_eq!(report.folds.len(), 22);
}
