//! Exposure report: fixed-width text table and JSON with provenance.

use std::fmt;

use pube_core::config::ExperimentConfig;
use pube_core::errors::PubeError;
use pube_core::hash::{stable_hash_string, to_canonical_json_bytes};
use serde::{Deserialize, Serialize};

use crate::aggregate::{Measurement, ScaledResult};

const RULE_WIDTH: usize = 110;

/// Experiment summary printed above the table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportHeader {
    /// Source emission rate in n/s.
    pub source_rate: f64,
    /// Detector name.
    pub detector: String,
    /// Detector face area in cm^2.
    pub detector_area_cm2: f64,
    /// Detector thickness in cm.
    pub detector_thickness_cm: f64,
    /// Exposure duration in hours.
    pub exposure_hours: f64,
    /// Shielding stack, front to back.
    pub shielding: String,
}

impl ReportHeader {
    /// Summary of `config`.
    pub fn from_config(config: &ExperimentConfig) -> Self {
        let shielding = if config.shielding.layers.is_empty() {
            "none".to_string()
        } else {
            config
                .shielding
                .layers
                .iter()
                .map(|layer| {
                    format!(
                        "{}um {} ({})",
                        trim_float(layer.thickness_cm * 1.0e4),
                        layer.name,
                        layer.material
                    )
                })
                .collect::<Vec<_>>()
                .join(" + ")
        };
        Self {
            source_rate: config.source_rate(),
            detector: config.detector.name.clone(),
            detector_area_cm2: config.detector.area_cm2,
            detector_thickness_cm: config.detector.thickness_cm,
            exposure_hours: config.exposure.hours,
            shielding,
        }
    }
}

/// Calibrated exposure report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExposureReport {
    /// Tally the bins were read from.
    pub tally: String,
    /// SHA-256 of the canonical JSON of the configuration.
    pub config_hash: String,
    /// Experiment summary.
    pub header: ReportHeader,
    /// Scaled bins and integral total.
    pub result: ScaledResult,
}

impl ExposureReport {
    /// Wraps `result` with provenance derived from `config`.
    pub fn new(config: &ExperimentConfig, result: ScaledResult) -> Result<Self, PubeError> {
        Ok(Self {
            tally: config.tally.name.clone(),
            config_hash: stable_hash_string(config)?,
            header: ReportHeader::from_config(config),
            result,
        })
    }

    /// Renders the fixed-width text table.
    pub fn render_text(&self) -> String {
        self.to_string()
    }

    /// Writes the fixed-width text table into `out`.
    pub fn write_table(&self, out: &mut impl fmt::Write) -> fmt::Result {
        let heavy = "=".repeat(RULE_WIDTH);
        let light = "-".repeat(RULE_WIDTH);
        let header = &self.header;

        writeln!(out, "\n{heavy}")?;
        writeln!(out, " NEUTRON EXPOSURE REPORT")?;
        writeln!(out, " {heavy}")?;
        writeln!(out, " Source Rate : {} n/s", sci(header.source_rate, 2))?;
        writeln!(
            out,
            " Detector    : {} Area={} cm2, Thickness={} cm",
            header.detector,
            trim_float(header.detector_area_cm2),
            trim_float(header.detector_thickness_cm)
        )?;
        writeln!(
            out,
            " Exposure    : {} Hours",
            trim_float(header.exposure_hours)
        )?;
        writeln!(out, " Shielding   : {}", header.shielding)?;
        writeln!(out, " Tally       : {}", self.tally)?;
        writeln!(out, " {light}")?;
        writeln!(
            out,
            " {:<18} | {:<18} | {:<22} | {:<22}",
            "Energy Group", "Range", "Flux (n/cm2/s)", "Total Neutrons (N)"
        )?;
        writeln!(
            out,
            " {:<18} | {:<18} | {:<22} | {:<22}",
            "", "", "(Mean +/- SD)", "(Flux * Time * Area)"
        )?;
        writeln!(out, " {light}")?;
        for bin in &self.result.bins {
            writeln!(
                out,
                " {:<18} | {:<18} | {} | {}",
                bin.group.label(),
                bin.group.range(),
                measurement(bin.flux),
                measurement(bin.count)
            )?;
        }
        writeln!(out, " {light}")?;
        writeln!(
            out,
            " {:<41} | {} | {}",
            "INTEGRAL TOTAL",
            measurement(self.result.total.flux),
            measurement(self.result.total.count)
        )?;
        writeln!(out, " {heavy}\n")?;
        writeln!(out, "NOTES:")?;
        writeln!(
            out,
            "1. 'Flux' is the volume-averaged scalar flux inside the {} layer.",
            header.detector
        )?;
        writeln!(
            out,
            "2. 'Total Neutrons (N)' is the number of neutrons entering the detector area over {} h.",
            trim_float(header.exposure_hours)
        )?;
        writeln!(out, "   Calculation: N = Flux * Exposure_Time * Detector_Area.")
    }

    /// Canonical JSON bytes of the report.
    pub fn to_json_bytes(&self) -> Result<Vec<u8>, PubeError> {
        to_canonical_json_bytes(self)
    }
}

impl fmt::Display for ExposureReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_table(f)
    }
}

fn measurement(value: Measurement) -> String {
    format!("{} +/- {}", sci(value.mean, 3), sci(value.uncertainty, 1))
}

/// Scientific notation with a signed, two-digit exponent (`8.750e+05`).
pub fn sci(value: f64, digits: usize) -> String {
    let raw = format!("{value:.digits$e}");
    match raw.split_once('e') {
        Some((mantissa, exponent)) => match exponent.parse::<i32>() {
            Ok(exp) => {
                let sign = if exp < 0 { '-' } else { '+' };
                format!("{mantissa}e{sign}{:02}", exp.abs())
            }
            Err(_) => raw,
        },
        None => raw,
    }
}

fn trim_float(value: f64) -> String {
    let text = format!("{value:.6}");
    let text = text.trim_end_matches('0').trim_end_matches('.');
    text.to_string()
}
