//! Conversion of raw track-length estimates into flux and neutron counts.
//!
//! Per bin, with `scale = S / V`:
//!
//! * `flux = raw * scale` for both mean and standard deviation;
//! * `count = flux * T * A`, again for both.
//!
//! The scale factors are deterministic constants, so standard deviations
//! scale linearly with no cross term. Bins are disjoint energy-filtered
//! scores and are treated as independent: totals add means and combine
//! uncertainties in quadrature.

use pube_core::config::ExperimentConfig;
use pube_core::errors::{ErrorInfo, PubeError};
use serde::{Deserialize, Serialize};

use crate::group::{EnergyGroup, TallyBin};

/// Physical constants needed to calibrate the estimator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScalingInputs {
    /// Source emission rate `S` in n/s.
    pub source_rate: f64,
    /// Detector sensitive volume `V` in cm^3.
    pub detector_volume: f64,
    /// Detector face area `A` in cm^2.
    pub detector_area: f64,
    /// Exposure duration `T` in s.
    pub exposure_seconds: f64,
}

impl ScalingInputs {
    /// Inputs derived from the shared experiment configuration.
    pub fn from_config(config: &ExperimentConfig) -> Self {
        Self {
            source_rate: config.source_rate(),
            detector_volume: config.detector_volume(),
            detector_area: config.detector_area(),
            exposure_seconds: config.exposure_seconds(),
        }
    }

    fn validate(&self) -> Result<(), PubeError> {
        if self.detector_volume == 0.0 {
            return Err(PubeError::Config(
                ErrorInfo::new("zero-volume", "detector volume is zero; flux would be infinite")
                    .with_hint("check detector.area_cm2 and detector.thickness_cm"),
            ));
        }
        let fields = [
            ("source_rate", self.source_rate),
            ("detector_volume", self.detector_volume),
            ("detector_area", self.detector_area),
            ("exposure_seconds", self.exposure_seconds),
        ];
        for (name, value) in fields {
            if !(value.is_finite() && value >= 0.0) {
                return Err(PubeError::Config(
                    ErrorInfo::new("invalid-scaling", "scaling inputs must be finite and non-negative")
                        .with_context("field", name)
                        .with_context("value", value),
                ));
            }
        }
        Ok(())
    }

    /// Flux scale `S / V`.
    pub fn flux_scale(&self) -> Result<f64, PubeError> {
        self.validate()?;
        Ok(self.source_rate / self.detector_volume)
    }

    /// Count scale `T * A` applied on top of the flux.
    pub fn count_scale(&self) -> f64 {
        self.exposure_seconds * self.detector_area
    }
}

/// Mean with a one-sigma uncertainty.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    /// Mean value.
    pub mean: f64,
    /// Standard deviation.
    pub uncertainty: f64,
}

impl Measurement {
    /// Multiplies mean and uncertainty by a deterministic constant.
    pub fn scaled(self, factor: f64) -> Self {
        Self {
            mean: self.mean * factor,
            uncertainty: self.uncertainty * factor,
        }
    }

    /// Sum of independent measurements: means add, uncertainties add in
    /// quadrature.
    pub fn sum_independent<I>(values: I) -> Self
    where
        I: IntoIterator<Item = Measurement>,
    {
        let (mean, variance) = values
            .into_iter()
            .fold((0.0, 0.0), |(mean, variance), value| {
                (
                    mean + value.mean,
                    variance + value.uncertainty * value.uncertainty,
                )
            });
        Self {
            mean,
            uncertainty: variance.sqrt(),
        }
    }
}

/// Calibrated values for one bin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScaledBin {
    /// Position in the energy filter.
    pub index: usize,
    /// Energy group of the bin.
    pub group: EnergyGroup,
    /// Flux in n/cm^2/s.
    pub flux: Measurement,
    /// Neutrons through the detector face over the exposure.
    pub count: Measurement,
}

/// Integral over all bins.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IntegralTotal {
    /// Total flux.
    pub flux: Measurement,
    /// Total count.
    pub count: Measurement,
}

/// Calibrated per-bin results plus the integral total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScaledResult {
    /// Inputs the result was computed with.
    pub inputs: ScalingInputs,
    /// Flux scale `S / V` that was applied.
    pub flux_scale: f64,
    /// Per-bin values in filter order.
    pub bins: Vec<ScaledBin>,
    /// Integral total row.
    pub total: IntegralTotal,
}

/// Calibrates `bins` with `inputs`.
pub fn aggregate(inputs: &ScalingInputs, bins: &[TallyBin]) -> Result<ScaledResult, PubeError> {
    let flux_scale = inputs.flux_scale()?;
    let count_scale = inputs.count_scale();

    let scaled: Vec<ScaledBin> = bins
        .iter()
        .map(|bin| {
            let raw = Measurement {
                mean: bin.mean,
                uncertainty: bin.std_dev,
            };
            let flux = raw.scaled(flux_scale);
            ScaledBin {
                index: bin.index,
                group: bin.group,
                flux,
                count: flux.scaled(count_scale),
            }
        })
        .collect();

    let total = IntegralTotal {
        flux: Measurement::sum_independent(scaled.iter().map(|bin| bin.flux)),
        count: Measurement::sum_independent(scaled.iter().map(|bin| bin.count)),
    };

    Ok(ScaledResult {
        inputs: *inputs,
        flux_scale,
        bins: scaled,
        total,
    })
}
