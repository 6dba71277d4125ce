//! Reader for the engine's tabular tally export.
//!
//! The artefact is a CSV table with one row per (tally, energy bin). The
//! required columns are `tally`, `mean` and `std. dev.`; the optional
//! `energy low [eV]` and `energy high [eV]` columns are carried through.
//! Rows of one tally appear in energy-bin order.

use std::fs::File;
use std::path::{Path, PathBuf};

use pube_core::config::RunSettings;
use pube_core::errors::{ErrorInfo, PubeError};
use serde::Deserialize;
use tracing::debug;

use crate::group::TallyBin;

#[derive(Debug, Deserialize)]
struct StatepointRow {
    tally: String,
    #[serde(rename = "energy low [eV]", default)]
    energy_low: Option<f64>,
    #[serde(rename = "energy high [eV]", default)]
    energy_high: Option<f64>,
    mean: f64,
    #[serde(rename = "std. dev.")]
    std_dev: f64,
}

/// Path of the result artefact for `settings` inside `run_dir`.
pub fn artifact_path(run_dir: &Path, settings: &RunSettings) -> PathBuf {
    run_dir.join(settings.artifact_file_name())
}

/// Reads the bins of `tally_name` from the artefact at `path`.
///
/// The file is opened read-only and closed when this function returns,
/// whichever way it returns.
pub fn read_tally(path: &Path, tally_name: &str) -> Result<Vec<TallyBin>, PubeError> {
    let file = File::open(path).map_err(|err| {
        PubeError::Artifact(
            ErrorInfo::new("artifact-missing", format!("cannot open result artifact: {err}"))
                .with_context("path", path.display())
                .with_hint("run the transport engine on the exported model first"),
        )
    })?;
    let mut reader = csv::Reader::from_reader(file);

    let mut bins = Vec::new();
    let mut seen = Vec::new();
    for (line, row) in reader.deserialize::<StatepointRow>().enumerate() {
        let row = row.map_err(|err| {
            PubeError::Artifact(
                ErrorInfo::new("artifact-malformed", err.to_string())
                    .with_context("path", path.display())
                    .with_context("row", line + 1),
            )
        })?;
        if row.tally != tally_name {
            if !seen.contains(&row.tally) {
                seen.push(row.tally);
            }
            continue;
        }
        if !(row.mean.is_finite() && row.std_dev.is_finite() && row.std_dev >= 0.0) {
            return Err(PubeError::Tally(
                ErrorInfo::new("bin-invalid", "tally statistics must be finite, std. dev. >= 0")
                    .with_context("tally", tally_name)
                    .with_context("bin", bins.len()),
            ));
        }
        let mut bin = TallyBin::new(bins.len(), row.mean, row.std_dev);
        bin.energy_low_ev = row.energy_low;
        bin.energy_high_ev = row.energy_high;
        bins.push(bin);
    }

    if bins.is_empty() {
        return Err(PubeError::Tally(
            ErrorInfo::new("missing-tally", "named tally is not present in the result artifact")
                .with_context("tally", tally_name)
                .with_context("path", path.display())
                .with_context("available", seen.join(",")),
        ));
    }
    debug!(tally = tally_name, bins = bins.len(), "read tally bins");
    Ok(bins)
}
