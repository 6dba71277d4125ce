use std::fs;
use std::path::Path;

use pube_core::config::{ExperimentConfig, RunSettings};
use pube_core::PubeError;
use pube_tally::{artifact_path, calibrate, read_tally, EnergyGroup, StatepointEngine};

const STATEPOINT: &str = "\
tally,energy low [eV],energy high [eV],mean,std. dev.
other_tally,0.0,12000000.0,9.0,0.9
cr39_flux,0.0,0.0253,1.0e-6,1.0e-7
cr39_flux,0.0253,0.5,2.0e-6,2.0e-7
cr39_flux,0.5,100000.0,3.0e-6,3.0e-7
cr39_flux,100000.0,12000000.0,4.0e-5,4.0e-7
";

fn write_statepoint(dir: &Path, body: &str) {
    let path = artifact_path(dir, &RunSettings::default());
    fs::write(path, body).expect("write statepoint");
}

#[test]
fn artifact_name_follows_batches() {
    let mut settings = RunSettings::default();
    let dir = Path::new("/runs/a");
    assert_eq!(artifact_path(dir, &settings), dir.join("statepoint.100.csv"));
    settings.batches = 250;
    assert_eq!(artifact_path(dir, &settings), dir.join("statepoint.250.csv"));
}

#[test]
fn reads_named_tally_in_file_order() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_statepoint(dir.path(), STATEPOINT);
    let path = artifact_path(dir.path(), &RunSettings::default());

    let bins = read_tally(&path, "cr39_flux").expect("bins");
    assert_eq!(bins.len(), 4);
    assert_eq!(bins[0].group, EnergyGroup::Thermal);
    assert_eq!(bins[3].group, EnergyGroup::Fast);
    assert_eq!(bins[1].mean, 2.0e-6);
    assert_eq!(bins[2].energy_high_ev, Some(100_000.0));
}

#[test]
fn energy_columns_are_optional() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_statepoint(
        dir.path(),
        "tally,mean,std. dev.\ncr39_flux,0.5,0.05\ncr39_flux,0.25,0.01\n",
    );
    let bins = read_tally(
        &artifact_path(dir.path(), &RunSettings::default()),
        "cr39_flux",
    )
    .expect("bins");
    assert_eq!(bins.len(), 2);
    assert_eq!(bins[0].energy_low_ev, None);
}

#[test]
fn missing_artifact_is_artifact_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let err = read_tally(&dir.path().join("statepoint.100.csv"), "cr39_flux")
        .expect_err("missing file");
    assert!(matches!(err, PubeError::Artifact(_)));
    assert_eq!(err.code(), "artifact-missing");
    assert!(err.info().hint.is_some());
}

#[test]
fn missing_tally_lists_available() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_statepoint(dir.path(), STATEPOINT);
    let err = read_tally(
        &artifact_path(dir.path(), &RunSettings::default()),
        "no_such_tally",
    )
    .expect_err("missing tally");
    assert_eq!(err.code(), "missing-tally");
    assert_eq!(
        err.info().context.get("available").map(String::as_str),
        Some("other_tally,cr39_flux")
    );
}

#[test]
fn malformed_rows_are_rejected() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_statepoint(dir.path(), "tally,mean,std. dev.\ncr39_flux,abc,0.1\n");
    let err = read_tally(
        &artifact_path(dir.path(), &RunSettings::default()),
        "cr39_flux",
    )
    .expect_err("malformed");
    assert_eq!(err.code(), "artifact-malformed");

    write_statepoint(dir.path(), "tally,mean,std. dev.\ncr39_flux,1.0,-0.1\n");
    let err = read_tally(
        &artifact_path(dir.path(), &RunSettings::default()),
        "cr39_flux",
    )
    .expect_err("negative std");
    assert_eq!(err.code(), "bin-invalid");
}

#[test]
fn calibrate_requires_artifact() {
    let dir = tempfile::tempdir().expect("tempdir");
    let engine = StatepointEngine::new(dir.path());
    let err = calibrate(&engine, &ExperimentConfig::default()).expect_err("no artifact");
    assert_eq!(err.code(), "artifact-missing");
    // The model is still exported so the engine can be run on it.
    assert!(dir.path().join("geometry.json").is_file());
}

#[test]
fn calibrate_reference_run() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_statepoint(dir.path(), STATEPOINT);
    let config = ExperimentConfig::default();
    let report = calibrate(&StatepointEngine::new(dir.path()), &config).expect("report");

    assert_eq!(report.tally, "cr39_flux");
    assert_eq!(report.result.bins.len(), 4);
    let scale = config.source_rate() / config.detector_volume();
    assert!((report.result.flux_scale - scale).abs() / scale < 1e-12);
    let total_raw = 1.0e-6 + 2.0e-6 + 3.0e-6 + 4.0e-5;
    let expected = total_raw * scale;
    assert!((report.result.total.flux.mean - expected).abs() / expected < 1e-9);
}

#[test]
fn export_can_be_disabled() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_statepoint(dir.path(), STATEPOINT);
    let engine = StatepointEngine::new(dir.path()).with_export(false);
    calibrate(&engine, &ExperimentConfig::default()).expect("report");
    assert!(!dir.path().join("geometry.json").exists());
    assert!(!dir.path().join("tallies.json").exists());
}
