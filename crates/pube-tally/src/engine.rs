//! Seam between the model and the transport engine that runs it.

use std::path::{Path, PathBuf};

use pube_core::config::ExperimentConfig;
use pube_core::errors::{ErrorInfo, PubeError};
use pube_model::EngineModel;
use tracing::{info, warn};

use crate::aggregate::{aggregate, ScalingInputs};
use crate::artifact::{artifact_path, read_tally};
use crate::group::TallyBin;
use crate::report::ExposureReport;

/// Monte Carlo transport engine driven synchronously.
pub trait TransportEngine {
    /// Handle to a finished run.
    type Handle;

    /// Runs `model` to completion.
    fn run(&self, model: &EngineModel) -> Result<Self::Handle, PubeError>;

    /// Ordered bins of the tally called `tally_name`.
    fn extract(&self, handle: &Self::Handle, tally_name: &str) -> Result<Vec<TallyBin>, PubeError>;
}

/// Finished run whose results live in a statepoint artefact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatepointHandle {
    /// Artefact path.
    pub path: PathBuf,
}

/// Engine bound to a run directory where an external transport code has
/// written (or will write) its statepoint table.
#[derive(Debug, Clone)]
pub struct StatepointEngine {
    run_dir: PathBuf,
    export: bool,
}

impl StatepointEngine {
    /// Engine that writes the model into `run_dir` and reads results from it.
    pub fn new(run_dir: impl Into<PathBuf>) -> Self {
        Self {
            run_dir: run_dir.into(),
            export: true,
        }
    }

    /// Whether `run` writes the engine model into the run directory.
    pub fn with_export(mut self, export: bool) -> Self {
        self.export = export;
        self
    }

    /// Run directory.
    pub fn run_dir(&self) -> &Path {
        &self.run_dir
    }
}

impl TransportEngine for StatepointEngine {
    type Handle = StatepointHandle;

    fn run(&self, model: &EngineModel) -> Result<Self::Handle, PubeError> {
        if self.export {
            model.write_json(&self.run_dir)?;
        }
        let path = artifact_path(&self.run_dir, &model.settings);
        if !path.is_file() {
            return Err(PubeError::Artifact(
                ErrorInfo::new("artifact-missing", "result artifact was not produced")
                    .with_context("path", path.display())
                    .with_context("batches", model.settings.batches)
                    .with_hint("run the transport engine on the exported model first"),
            ));
        }
        info!(path = %path.display(), "resolved result artifact");
        Ok(StatepointHandle { path })
    }

    fn extract(&self, handle: &Self::Handle, tally_name: &str) -> Result<Vec<TallyBin>, PubeError> {
        read_tally(&handle.path, tally_name)
    }
}

/// Assembles the model, runs `engine`, extracts the configured tally and
/// calibrates it into an exposure report.
pub fn calibrate<E: TransportEngine>(
    engine: &E,
    config: &ExperimentConfig,
) -> Result<ExposureReport, PubeError> {
    let inputs = ScalingInputs::from_config(config);
    // Fail on bad scaling inputs before touching the engine.
    inputs.flux_scale()?;

    let model = EngineModel::assemble(config)?;
    let handle = engine.run(&model)?;
    let bins = engine.extract(&handle, &config.tally.name)?;

    let expected = config.tally.energy_bins_ev.len().saturating_sub(1);
    if bins.len() != expected {
        warn!(
            tally = %config.tally.name,
            bins = bins.len(),
            expected,
            "tally bin count differs from the energy filter; labels are positional"
        );
    }

    let result = aggregate(&inputs, &bins)?;
    ExposureReport::new(config, result)
}
