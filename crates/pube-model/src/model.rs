//! Everything the transport engine consumes, assembled from one config.

use std::fs;
use std::path::{Path, PathBuf};

use pube_core::config::{ExperimentConfig, RunSettings};
use pube_core::errors::{ErrorInfo, PubeError};
use pube_core::hash::to_canonical_json_bytes;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::builder::build_geometry;
use crate::geometry::{CellId, Geometry};
use crate::material::{Material, MaterialCatalog};
use crate::partition::{validate_partition, PartitionReport};
use crate::source::SourceSpecification;

/// Cell-and-energy filtered flux tally definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TallyDefinition {
    /// Tally name used to retrieve the results.
    pub name: String,
    /// Cell filter.
    pub cell: CellId,
    /// Energy filter edges in eV.
    pub energy_bins_ev: Vec<f64>,
    /// Scores accumulated by the tally.
    pub scores: Vec<String>,
}

/// Complete engine input for a fixed-source run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineModel {
    /// Materials referenced by the geometry.
    pub materials: Vec<Material>,
    /// Cells and surfaces.
    pub geometry: Geometry,
    /// Source marginals.
    pub source: SourceSpecification,
    /// Run settings.
    pub settings: RunSettings,
    /// Tallies to accumulate.
    pub tallies: Vec<TallyDefinition>,
    /// Partition check the geometry passed at assembly.
    pub partition: PartitionReport,
}

impl EngineModel {
    /// Builds catalog, geometry and source from `config`.
    ///
    /// The geometry must pass the sampled partition check configured in
    /// `config.validation` before anything else is assembled.
    pub fn assemble(config: &ExperimentConfig) -> Result<Self, PubeError> {
        let catalog = MaterialCatalog::from_config(config)?;
        let geometry = build_geometry(config, &catalog)?;
        let partition = validate_partition(
            &geometry,
            config.validation.partition_samples,
            config.validation.seed,
        )?;
        let source = SourceSpecification::from_config(config)?;

        let mut materials = Vec::new();
        for cell in geometry.cells() {
            if let Some(fill) = &cell.fill {
                let material = catalog.get(fill)?;
                if !materials.iter().any(|known: &Material| known.id == material.id) {
                    materials.push(material.clone());
                }
            }
        }

        let tallies = vec![TallyDefinition {
            name: config.tally.name.clone(),
            cell: geometry.detector_cell(),
            energy_bins_ev: config.tally.energy_bins_ev.clone(),
            scores: vec!["flux".to_string()],
        }];

        Ok(Self {
            materials,
            geometry,
            source,
            settings: config.run.clone(),
            tallies,
            partition,
        })
    }

    /// Writes `materials.json`, `geometry.json`, `settings.json` (source and
    /// run settings) and `tallies.json` into `dir`.
    pub fn write_json(&self, dir: &Path) -> Result<Vec<PathBuf>, PubeError> {
        fs::create_dir_all(dir).map_err(|err| export_error(dir, err))?;
        let settings = serde_json::json!({
            "source": &self.source,
            "run": &self.settings,
        });
        let files = [
            ("materials.json", to_canonical_json_bytes(&self.materials)?),
            ("geometry.json", to_canonical_json_bytes(&self.geometry)?),
            ("settings.json", to_canonical_json_bytes(&settings)?),
            ("tallies.json", to_canonical_json_bytes(&self.tallies)?),
        ];
        let mut written = Vec::with_capacity(files.len());
        for (name, bytes) in files {
            let path = dir.join(name);
            fs::write(&path, bytes).map_err(|err| export_error(&path, err))?;
            written.push(path);
        }
        info!(dir = %dir.display(), files = written.len(), "exported engine model");
        Ok(written)
    }
}

fn export_error(path: &Path, err: std::io::Error) -> PubeError {
    PubeError::Serde(
        ErrorInfo::new("export-write", err.to_string()).with_context("path", path.display()),
    )
}
