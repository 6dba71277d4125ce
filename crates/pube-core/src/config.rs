//! YAML-configurable experiment parameters.
//!
//! [`ExperimentConfig`] is the single source of truth for every physical
//! constant of the experiment. The geometry builder places the detector
//! layer from `detector.thickness_cm` and the tally aggregator derives the
//! detector volume from the very same field, so the two can never drift
//! apart.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::{config_error, ErrorInfo, PubeError};

/// Seconds per hour, used to convert the exposure duration.
pub const SECONDS_PER_HOUR: f64 = 3600.0;

/// Top-level configuration for one shield experiment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ExperimentConfig {
    /// Neutron source body and emission parameters.
    #[serde(default)]
    pub source: SourceConfig,
    /// Shield layers placed between source and detector.
    #[serde(default)]
    pub shielding: ShieldingConfig,
    /// Detector layer closing the stack.
    #[serde(default)]
    pub detector: DetectorConfig,
    /// Exposure duration.
    #[serde(default)]
    pub exposure: ExposureConfig,
    /// Bounding sphere and ambient medium.
    #[serde(default)]
    pub world: WorldConfig,
    /// Tally name and energy filter handed to the engine.
    #[serde(default)]
    pub tally: TallyConfig,
    /// Transport run settings.
    #[serde(default)]
    pub run: RunSettings,
    /// Partition validation sampling.
    #[serde(default)]
    pub validation: ValidationConfig,
    /// Additional or replacement material definitions keyed by `id`.
    #[serde(default)]
    pub materials: Vec<MaterialConfig>,
}

/// PuBe source cylinder and emission rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Source activity in curie.
    #[serde(default = "default_activity_ci")]
    pub activity_ci: f64,
    /// Neutron yield in n/s per curie.
    #[serde(default = "default_yield_per_ci")]
    pub yield_per_ci: f64,
    /// Cylinder radius in cm.
    #[serde(default = "default_source_radius")]
    pub radius_cm: f64,
    /// Cylinder height in cm (centred on the origin along `z`).
    #[serde(default = "default_source_height")]
    pub height_cm: f64,
    /// Material id filling the source body.
    #[serde(default = "default_source_material")]
    pub material: String,
    /// Tabulated emission spectrum; the built-in PuBe spectrum when absent.
    #[serde(default)]
    pub spectrum: Option<SpectrumConfig>,
}

fn default_activity_ci() -> f64 {
    0.5
}

fn default_yield_per_ci() -> f64 {
    1.75e6
}

fn default_source_radius() -> f64 {
    0.5
}

fn default_source_height() -> f64 {
    2.4
}

fn default_source_material() -> String {
    "pube".to_string()
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            activity_ci: default_activity_ci(),
            yield_per_ci: default_yield_per_ci(),
            radius_cm: default_source_radius(),
            height_cm: default_source_height(),
            material: default_source_material(),
            spectrum: None,
        }
    }
}

/// Tabulated energy spectrum (grid in eV, relative weights).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpectrumConfig {
    /// Strictly increasing energy grid in eV.
    pub energies_ev: Vec<f64>,
    /// Non-negative relative weights, one per grid point.
    pub probabilities: Vec<f64>,
}

/// Shield layers in stack order (front to back).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShieldingConfig {
    /// Distance from the source surface to the front face of the stack, in cm.
    #[serde(default = "default_gap")]
    pub gap_cm: f64,
    /// Air gap inserted between consecutive layers, in cm.
    #[serde(default)]
    pub interlayer_gap_cm: f64,
    /// Shield layers; the detector layer is appended after them.
    #[serde(default = "default_layers")]
    pub layers: Vec<LayerConfig>,
}

fn default_gap() -> f64 {
    5.0
}

fn default_layers() -> Vec<LayerConfig> {
    vec![
        LayerConfig {
            name: "PP_Shield".to_string(),
            material: "polypropylene".to_string(),
            thickness_cm: 42.0e-4,
        },
        LayerConfig {
            name: "PE_Shield".to_string(),
            material: "polyethylene".to_string(),
            thickness_cm: 20.0e-4,
        },
    ]
}

impl Default for ShieldingConfig {
    fn default() -> Self {
        Self {
            gap_cm: default_gap(),
            interlayer_gap_cm: 0.0,
            layers: default_layers(),
        }
    }
}

/// One slab of the shield stack.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerConfig {
    /// Cell name given to the layer.
    pub name: String,
    /// Material id filling the layer.
    pub material: String,
    /// Thickness along the stack axis, in cm.
    pub thickness_cm: f64,
}

/// CR-39 detector layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectorConfig {
    /// Cell name of the detector (the tallied cell).
    #[serde(default = "default_detector_name")]
    pub name: String,
    /// Material id filling the detector.
    #[serde(default = "default_detector_material")]
    pub material: String,
    /// Face area in cm^2; the face is square.
    #[serde(default = "default_detector_area")]
    pub area_cm2: f64,
    /// Thickness along the stack axis, in cm.
    #[serde(default = "default_detector_thickness")]
    pub thickness_cm: f64,
}

fn default_detector_name() -> String {
    "CR39_Detector".to_string()
}

fn default_detector_material() -> String {
    "cr39".to_string()
}

fn default_detector_area() -> f64 {
    0.048
}

fn default_detector_thickness() -> f64 {
    0.15
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            name: default_detector_name(),
            material: default_detector_material(),
            area_cm2: default_detector_area(),
            thickness_cm: default_detector_thickness(),
        }
    }
}

/// Exposure duration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExposureConfig {
    /// Exposure duration in hours.
    #[serde(default = "default_exposure_hours")]
    pub hours: f64,
}

fn default_exposure_hours() -> f64 {
    24.0
}

impl Default for ExposureConfig {
    fn default() -> Self {
        Self {
            hours: default_exposure_hours(),
        }
    }
}

/// Bounding sphere and the medium filling the rest of the world.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldConfig {
    /// Radius of the vacuum-boundary sphere, in cm.
    #[serde(default = "default_boundary_radius")]
    pub boundary_radius_cm: f64,
    /// Material id of the surrounding medium.
    #[serde(default = "default_medium")]
    pub medium: String,
}

fn default_boundary_radius() -> f64 {
    50.0
}

fn default_medium() -> String {
    "air".to_string()
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            boundary_radius_cm: default_boundary_radius(),
            medium: default_medium(),
        }
    }
}

/// Flux tally on the detector cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TallyConfig {
    /// Name under which the engine stores the tally.
    #[serde(default = "default_tally_name")]
    pub name: String,
    /// Energy filter edges in eV (thermal, epithermal, intermediate, fast).
    #[serde(default = "default_energy_bins")]
    pub energy_bins_ev: Vec<f64>,
}

fn default_tally_name() -> String {
    "cr39_flux".to_string()
}

fn default_energy_bins() -> Vec<f64> {
    vec![0.0, 0.0253, 0.5, 1.0e5, 12.0e6]
}

impl Default for TallyConfig {
    fn default() -> Self {
        Self {
            name: default_tally_name(),
            energy_bins_ev: default_energy_bins(),
        }
    }
}

/// Transport run mode. Only fixed-source runs are supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum RunMode {
    /// External source, no eigenvalue iteration.
    #[default]
    FixedSource,
}

/// Settings handed to the transport engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSettings {
    /// Source particles per batch.
    #[serde(default = "default_particles")]
    pub particles: u64,
    /// Number of batches.
    #[serde(default = "default_batches")]
    pub batches: u32,
    /// Run mode.
    #[serde(default)]
    pub run_mode: RunMode,
    /// Result artefact file name prefix.
    #[serde(default = "default_artifact_prefix")]
    pub artifact_prefix: String,
    /// Result artefact file extension.
    #[serde(default = "default_artifact_extension")]
    pub artifact_extension: String,
}

fn default_particles() -> u64 {
    1_000_000
}

fn default_batches() -> u32 {
    100
}

fn default_artifact_prefix() -> String {
    "statepoint".to_string()
}

fn default_artifact_extension() -> String {
    "csv".to_string()
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            particles: default_particles(),
            batches: default_batches(),
            run_mode: RunMode::default(),
            artifact_prefix: default_artifact_prefix(),
            artifact_extension: default_artifact_extension(),
        }
    }
}

impl RunSettings {
    /// Result artefact name: `<prefix>.<batches>.<ext>`.
    pub fn artifact_file_name(&self) -> String {
        format!(
            "{}.{}.{}",
            self.artifact_prefix, self.batches, self.artifact_extension
        )
    }
}

/// Sampling parameters for the partition validation pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Points drawn in the bounding sphere and in each probe box.
    #[serde(default = "default_partition_samples")]
    pub partition_samples: usize,
    /// Master seed for the sampler.
    #[serde(default = "default_validation_seed")]
    pub seed: u64,
}

fn default_partition_samples() -> usize {
    20_000
}

fn default_validation_seed() -> u64 {
    0x5EED_CE11_u64
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            partition_samples: default_partition_samples(),
            seed: default_validation_seed(),
        }
    }
}

/// Fraction interpretation of a material's constituents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FractionBasis {
    /// Atom fractions.
    #[default]
    Atom,
    /// Weight fractions.
    Weight,
}

/// Constituent species type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConstituentKind {
    /// Natural element, expanded by the engine.
    Element,
    /// Specific nuclide.
    Nuclide,
}

/// One constituent entry of a material definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstituentConfig {
    /// Element or nuclide.
    pub kind: ConstituentKind,
    /// Symbol (`C`, `H`) or nuclide name (`Be9`).
    pub symbol: String,
    /// Relative fraction.
    pub fraction: f64,
}

/// Material definition as written in the configuration file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialConfig {
    /// Catalog key referenced by layers, detector, source and world.
    pub id: String,
    /// Human readable name handed to the engine.
    pub name: String,
    /// Density in g/cm^3.
    pub density_g_cm3: f64,
    /// How constituent fractions are interpreted.
    #[serde(default)]
    pub basis: FractionBasis,
    /// Constituents with relative fractions.
    pub constituents: Vec<ConstituentConfig>,
}

impl ExperimentConfig {
    /// Reads and validates a YAML configuration file.
    pub fn load(path: &Path) -> Result<Self, PubeError> {
        let raw = fs::read_to_string(path).map_err(|err| {
            PubeError::Config(
                ErrorInfo::new("config-read", err.to_string())
                    .with_context("path", path.display()),
            )
        })?;
        Self::from_yaml_str(&raw)
    }

    /// Parses and validates a YAML configuration document.
    pub fn from_yaml_str(raw: &str) -> Result<Self, PubeError> {
        let config: ExperimentConfig = serde_yaml::from_str(raw)
            .map_err(|err| PubeError::Serde(ErrorInfo::new("config-parse", err.to_string())))?;
        config.validate()?;
        Ok(config)
    }

    /// Neutron emission rate `S` in n/s.
    pub fn source_rate(&self) -> f64 {
        self.source.activity_ci * self.source.yield_per_ci
    }

    /// Detector face area `A` in cm^2.
    pub fn detector_area(&self) -> f64 {
        self.detector.area_cm2
    }

    /// Detector sensitive volume `V` in cm^3.
    pub fn detector_volume(&self) -> f64 {
        self.detector.area_cm2 * self.detector.thickness_cm
    }

    /// Side of the square detector face, in cm.
    pub fn detector_side(&self) -> f64 {
        self.detector.area_cm2.sqrt()
    }

    /// Exposure duration `T` in seconds.
    pub fn exposure_seconds(&self) -> f64 {
        self.exposure.hours * SECONDS_PER_HOUR
    }

    /// Position of the stack front face along the stack axis.
    pub fn stack_front(&self) -> f64 {
        self.source.radius_cm + self.shielding.gap_cm
    }

    /// Upper bound on the position of the stack back face.
    pub fn stack_back_bound(&self) -> f64 {
        let layers: f64 = self
            .shielding
            .layers
            .iter()
            .map(|layer| layer.thickness_cm)
            .sum();
        let gaps = self.shielding.interlayer_gap_cm * self.shielding.layers.len() as f64;
        self.stack_front() + layers + gaps + self.detector.thickness_cm
    }

    /// Checks every parameter before any geometry or numeric work runs.
    pub fn validate(&self) -> Result<(), PubeError> {
        positive("source.activity_ci", self.source.activity_ci)?;
        positive("source.yield_per_ci", self.source.yield_per_ci)?;
        positive("source.radius_cm", self.source.radius_cm)?;
        positive("source.height_cm", self.source.height_cm)?;
        non_negative("shielding.gap_cm", self.shielding.gap_cm)?;
        non_negative(
            "shielding.interlayer_gap_cm",
            self.shielding.interlayer_gap_cm,
        )?;
        for (idx, layer) in self.shielding.layers.iter().enumerate() {
            if layer.name.trim().is_empty() {
                return Err(PubeError::Config(
                    ErrorInfo::new("empty-layer-name", "shield layers must be named")
                        .with_context("layer", idx),
                ));
            }
            positive(&format!("shielding.layers[{idx}].thickness_cm"), layer.thickness_cm)?;
        }
        positive("detector.area_cm2", self.detector.area_cm2)?;
        if !(self.detector.thickness_cm.is_finite() && self.detector.thickness_cm > 0.0) {
            return Err(PubeError::Config(
                ErrorInfo::new("zero-volume", "detector volume must be positive")
                    .with_context("thickness_cm", self.detector.thickness_cm)
                    .with_hint("set detector.thickness_cm to the CR-39 sheet thickness"),
            ));
        }
        non_negative("exposure.hours", self.exposure.hours)?;
        positive("world.boundary_radius_cm", self.world.boundary_radius_cm)?;
        self.validate_energy_bins()?;
        if self.run.particles == 0 || self.run.batches == 0 {
            return Err(config_error(
                "empty-run",
                "run.particles and run.batches must be at least 1",
            ));
        }
        self.validate_world_extent()
    }

    fn validate_energy_bins(&self) -> Result<(), PubeError> {
        let edges = &self.tally.energy_bins_ev;
        if edges.len() < 2 {
            return Err(PubeError::Config(
                ErrorInfo::new("energy-bins-short", "energy filter needs at least two edges")
                    .with_context("edges", edges.len()),
            ));
        }
        if edges.iter().any(|edge| !edge.is_finite() || *edge < 0.0) {
            return Err(config_error(
                "energy-bins-invalid",
                "energy filter edges must be finite and non-negative",
            ));
        }
        if let Some(idx) = edges.windows(2).position(|pair| pair[1] <= pair[0]) {
            return Err(PubeError::Config(
                ErrorInfo::new(
                    "grid-not-increasing",
                    "energy filter edges must be strictly increasing",
                )
                .with_context("index", idx + 1),
            ));
        }
        Ok(())
    }

    fn validate_world_extent(&self) -> Result<(), PubeError> {
        let radius = self.world.boundary_radius_cm;
        let half_side = self.detector_side() / 2.0;
        let back = self.stack_back_bound();
        let stack_corner = (back * back + 2.0 * half_side * half_side).sqrt();
        let source_corner = (self.source.radius_cm.powi(2)
            + (self.source.height_cm / 2.0).powi(2))
        .sqrt();
        if stack_corner >= radius || source_corner >= radius {
            return Err(PubeError::Config(
                ErrorInfo::new(
                    "world-too-small",
                    "source and stack must lie inside the bounding sphere",
                )
                .with_context("boundary_radius_cm", radius)
                .with_context("stack_extent_cm", stack_corner),
            ));
        }
        Ok(())
    }
}

fn positive(field: &str, value: f64) -> Result<(), PubeError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(PubeError::Config(
            ErrorInfo::new("not-positive", format!("{field} must be positive and finite"))
                .with_context("field", field)
                .with_context("value", value),
        ))
    }
}

fn non_negative(field: &str, value: f64) -> Result<(), PubeError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(PubeError::Config(
            ErrorInfo::new("negative", format!("{field} must be non-negative and finite"))
                .with_context("field", field)
                .with_context("value", value),
        ))
    }
}
