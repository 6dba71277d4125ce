//! Source distribution parameters handed to the transport engine.
//!
//! Nothing here samples particles: the engine owns sampling. This module
//! only builds and validates the three independent marginals.

use std::f64::consts::PI;

use pube_core::config::ExperimentConfig;
use pube_core::errors::{ErrorInfo, PubeError};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::surface::Point;

/// PuBe spectrum grid (ISO 8529-1 shape), in MeV.
const PUBE_ENERGIES_MEV: [f64; 35] = [
    0.0, 0.25, 0.5, 0.75, 1.0, 1.25, 1.5, 1.75, 2.0, 2.25, 2.5, 2.75, 3.0, 3.25, 3.5, 3.75, 4.0,
    4.25, 4.5, 4.75, 5.0, 5.25, 5.5, 5.75, 6.0, 6.5, 7.0, 7.5, 8.0, 8.5, 9.0, 9.5, 10.0, 10.5, 11.0,
];

/// Relative PuBe emission weights on [`PUBE_ENERGIES_MEV`].
const PUBE_WEIGHTS: [f64; 35] = [
    0.0, 0.01, 0.02, 0.03, 0.05, 0.06, 0.07, 0.08, 0.09, 0.10, 0.11, 0.11, 0.12, 0.13, 0.13, 0.13,
    0.13, 0.12, 0.11, 0.10, 0.09, 0.08, 0.07, 0.06, 0.05, 0.05, 0.04, 0.04, 0.04, 0.03, 0.02, 0.01,
    0.005, 0.001, 0.0,
];

fn source_error(code: &str, message: impl Into<String>) -> PubeError {
    PubeError::Source(ErrorInfo::new(code, message))
}

/// Rescales finite, non-negative `weights` to sum to one; `None` when all
/// are zero.
///
/// Dividing by the peak first keeps the sum finite for weights near
/// `f64::MAX`.
pub(crate) fn normalize_weights(weights: &[f64]) -> Option<Vec<f64>> {
    let peak = weights.iter().copied().fold(0.0, f64::max);
    if peak <= 0.0 {
        return None;
    }
    let scaled: Vec<f64> = weights.iter().map(|w| w / peak).collect();
    let total: f64 = scaled.iter().sum();
    Some(scaled.iter().map(|w| w / total).collect())
}

/// Uniform distribution over `[low, high]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Uniform {
    /// Lower bound.
    pub low: f64,
    /// Upper bound.
    pub high: f64,
}

impl Uniform {
    /// Builds a uniform marginal; bounds must be finite with `low < high`.
    pub fn new(low: f64, high: f64) -> Result<Self, PubeError> {
        if !(low.is_finite() && high.is_finite() && low < high) {
            return Err(PubeError::Source(
                ErrorInfo::new("uniform-bounds", "uniform bounds must be finite and increasing")
                    .with_context("low", low)
                    .with_context("high", high),
            ));
        }
        Ok(Self { low, high })
    }
}

/// Spatial marginal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum SpatialDistribution {
    /// Independent uniform radius, azimuth and axial position about `origin`.
    ///
    /// The radius is uniform in the parameter, not area-weighted; area
    /// correction, if wanted, is the engine's sampling convention.
    CylindricalIndependent {
        /// Radius marginal.
        r: Uniform,
        /// Azimuth marginal.
        phi: Uniform,
        /// Axial marginal.
        z: Uniform,
        /// Cylinder centre.
        origin: Point,
    },
}

/// Angular marginal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AngularDistribution {
    /// Uniform over the unit sphere of directions.
    Isotropic,
}

/// Interpolation between tabulated energy points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Interpolation {
    /// Linear in both energy and probability.
    LinearLinear,
}

/// Tabulated energy spectrum on a strictly increasing eV grid.
///
/// Probabilities are per-point relative weights normalized to sum to one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TabularEnergy {
    energies_ev: Vec<f64>,
    probabilities: Vec<f64>,
    interpolation: Interpolation,
}

impl TabularEnergy {
    /// Validates the grid and normalizes `weights`.
    pub fn new(energies_ev: Vec<f64>, weights: Vec<f64>) -> Result<Self, PubeError> {
        if energies_ev.len() != weights.len() {
            return Err(PubeError::Source(
                ErrorInfo::new("table-length", "energy grid and table differ in length")
                    .with_context("energies", energies_ev.len())
                    .with_context("weights", weights.len()),
            ));
        }
        if energies_ev.len() < 2 {
            return Err(source_error(
                "table-short",
                "energy table needs at least two points",
            ));
        }
        if energies_ev.iter().any(|e| !e.is_finite() || *e < 0.0) {
            return Err(source_error(
                "grid-invalid",
                "energy grid values must be finite and non-negative",
            ));
        }
        if let Some(idx) = energies_ev.windows(2).position(|pair| pair[1] <= pair[0]) {
            return Err(PubeError::Source(
                ErrorInfo::new(
                    "grid-not-increasing",
                    "energy grid must be strictly increasing",
                )
                .with_context("index", idx + 1)
                .with_context("energy_ev", energies_ev[idx + 1]),
            ));
        }
        if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(source_error(
                "table-negative",
                "energy probabilities must be finite and non-negative",
            ));
        }
        let probabilities = normalize_weights(&weights).ok_or_else(|| {
            source_error("table-all-zero", "energy probability table is all zero")
        })?;
        Ok(Self {
            energies_ev,
            probabilities,
            interpolation: Interpolation::LinearLinear,
        })
    }

    /// The built-in PuBe spectrum.
    pub fn pube() -> Result<Self, PubeError> {
        Self::new(
            PUBE_ENERGIES_MEV.iter().map(|e| e * 1.0e6).collect(),
            PUBE_WEIGHTS.to_vec(),
        )
    }

    /// Energy grid in eV.
    pub fn energies_ev(&self) -> &[f64] {
        &self.energies_ev
    }

    /// Normalized probabilities.
    pub fn probabilities(&self) -> &[f64] {
        &self.probabilities
    }

    /// Interpolation law.
    pub fn interpolation(&self) -> Interpolation {
        self.interpolation
    }

    /// Linearly interpolated table value at `energy_ev`; zero outside the grid.
    pub fn value_at(&self, energy_ev: f64) -> f64 {
        let grid = &self.energies_ev;
        let last = grid.len() - 1;
        if energy_ev < grid[0] || energy_ev > grid[last] {
            return 0.0;
        }
        let upper = grid.partition_point(|e| *e < energy_ev).max(1);
        let lower = upper - 1;
        let t = (energy_ev - grid[lower]) / (grid[upper] - grid[lower]);
        self.probabilities[lower] + t * (self.probabilities[upper] - self.probabilities[lower])
    }
}

/// Source description: three independent marginals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceSpecification {
    /// Spatial marginal.
    pub space: SpatialDistribution,
    /// Angular marginal.
    pub angle: AngularDistribution,
    /// Energy marginal.
    pub energy: TabularEnergy,
}

impl SourceSpecification {
    /// Source filling the configured cylinder with the configured (or
    /// built-in PuBe) spectrum.
    pub fn from_config(config: &ExperimentConfig) -> Result<Self, PubeError> {
        let half_height = config.source.height_cm / 2.0;
        let space = SpatialDistribution::CylindricalIndependent {
            r: Uniform::new(0.0, config.source.radius_cm)?,
            phi: Uniform::new(0.0, 2.0 * PI)?,
            z: Uniform::new(-half_height, half_height)?,
            origin: [0.0, 0.0, 0.0],
        };
        let energy = match &config.source.spectrum {
            Some(spectrum) => {
                TabularEnergy::new(spectrum.energies_ev.clone(), spectrum.probabilities.clone())?
            }
            None => TabularEnergy::pube()?,
        };
        debug!(points = energy.energies_ev().len(), "built source spectrum");
        Ok(Self {
            space,
            angle: AngularDistribution::Isotropic,
            energy,
        })
    }
}
