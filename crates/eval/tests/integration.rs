use std::path::PathBuf;

use sificc_eval::config::{AxisMapping, EvalConfig};
use sificc_eval::engine::{check_table, run};
use sificc_eval::source::{load_recon_table, resolve_truth_path, CsvTruthSource};
use sificc_eval::{EvalError, EvalReport};

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn load_and_run(config: &EvalConfig) -> EvalReport {
    let dir = fixtures_dir();
    let table = load_recon_table(&dir.join("recon"), &config.frame).unwrap();
    let truth = resolve_truth_path(&dir, &table.meta);
    run(config, table, CsvTruthSource::new(truth)).unwrap()
}

// -------------------------------------------------------------------------
// Default tolerance, detector frame
// -------------------------------------------------------------------------

#[test]
fn fixture_counts() {
    let report = load_and_run(&EvalConfig::default());
    let s = &report.stats;

    assert_eq!(s.processed, 10);
    assert_eq!(s.valid, 7);
    assert_eq!(s.compton, 5);
    assert_eq!(s.recon_total, 5);
    assert_eq!(s.matches, 2);
    assert_eq!(s.missing, 1);
    assert_eq!(s.efficiency, Some(0.4));
    assert_eq!(s.purity, Some(0.4));
}

#[test]
fn fixture_mismatch_breakdown() {
    let report = load_and_run(&EvalConfig::default());
    let s = &report.stats;

    // Entry 3 misses on e_pos_y, entry 6 on e_energy, entry 4 has no candidate.
    assert_eq!(s.criterion_failures.e_pos_y, 2);
    assert_eq!(s.criterion_failures.e_energy, 2);
    assert_eq!(s.criterion_failures.e_pos_x, 1);
    assert_eq!(s.criterion_failures.p_energy, 1);

    // recon_total minus candidates passing each criterion.
    assert_eq!(s.mismatches.e_pos_y, 2);
    assert_eq!(s.mismatches.e_energy, 2);
    assert_eq!(s.mismatches.e_pos_x, 1);
    assert_eq!(s.mismatches.p_pos_z, 1);
}

#[test]
fn fixture_distance_statistics() {
    let report = load_and_run(&EvalConfig::default());
    let s = &report.stats;

    assert_eq!(s.distance_samples, 8);
    let samples = [0.0, 0.0, 10.5, 0.0, 0.0, 0.0, 93.5f64.sqrt(), 0.0];
    let mean = samples.iter().sum::<f64>() / 8.0;
    let var = samples.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / 8.0;
    assert!((s.euclidean_mean.unwrap() - mean).abs() < 1e-9);
    assert!((s.euclidean_std.unwrap() - var.sqrt()).abs() < 1e-9);
}

#[test]
fn fixture_meta() {
    let report = load_and_run(&EvalConfig::default());
    assert_eq!(report.meta.recon.input_filename.as_deref(), Some("truth.csv"));
    assert_eq!(report.meta.recon.total_sim_nev, 10);
    assert!(report.meta.truth_source.ends_with("truth.csv"));
    assert_eq!(report.meta.frame, AxisMapping::DETECTOR);

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["stats"]["matches"], 2);
    assert_eq!(json["meta"]["frame"], serde_json::json!(["-z", "x", "-y"]));
}

// -------------------------------------------------------------------------
// Configuration variants
// -------------------------------------------------------------------------

#[test]
fn identity_frame_breaks_photon_positions() {
    let config = EvalConfig::from_toml(r#"frame = "identity""#).unwrap();
    let report = load_and_run(&config);
    assert_eq!(report.stats.matches, 0);
    assert_eq!(report.stats.compton, 5);
    assert_eq!(report.stats.criterion_failures.p_pos_x, 5);
}

#[test]
fn widened_tolerance_recovers_matches() {
    let config = EvalConfig::from_toml(
        r#"
[tolerance]
e_pos_y = 11.0
e_energy = 0.25
"#,
    )
    .unwrap();
    let report = load_and_run(&config);
    assert_eq!(report.stats.matches, 4);
    assert_eq!(report.stats.efficiency, Some(0.8));
}

#[test]
fn repeated_runs_are_identical() {
    let first = load_and_run(&EvalConfig::default());
    let second = load_and_run(&EvalConfig::default());
    assert_eq!(first.stats, second.stats);
}

// -------------------------------------------------------------------------
// Failures
// -------------------------------------------------------------------------

#[test]
fn duplicate_identifiers_rejected() {
    let table = load_recon_table(&fixtures_dir().join("dup_recon"), &AxisMapping::DETECTOR).unwrap();
    let err = check_table(&table).unwrap_err();
    assert!(matches!(err, EvalError::DuplicateIdentifier { id: 2 }));
}

#[test]
fn missing_recon_dir() {
    let err = load_recon_table(&fixtures_dir().join("nope"), &AxisMapping::DETECTOR).unwrap_err();
    assert!(matches!(err, EvalError::SourceOpen { .. }));
}

#[test]
fn truth_file_shorter_than_bounds() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("TreeStat.csv"),
        "InputFilename,StartEvent,StopEvent,TotalSimNev\ntruth.csv,0,19,20\n",
    )
    .unwrap();
    std::fs::copy(
        fixtures_dir().join("recon/ConeList.csv"),
        dir.path().join("ConeList.csv"),
    )
    .unwrap();

    let config = EvalConfig::default();
    let table = load_recon_table(dir.path(), &config.frame).unwrap();
    let truth = resolve_truth_path(&fixtures_dir(), &table.meta);
    let err = run(&config, table, CsvTruthSource::new(truth)).unwrap_err();
    assert!(matches!(err, EvalError::TruthExhausted { expected: 20, consumed: 10 }));
}
