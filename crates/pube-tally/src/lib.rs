#![deny(missing_docs)]
#![doc = "Tally extraction, flux/count calibration and exposure reporting for the PuBe shield experiment."]

pub mod aggregate;
pub mod artifact;
pub mod engine;
/// Positional energy groups and raw tally bins.
pub mod group;
pub mod report;

pub use aggregate::{aggregate, IntegralTotal, Measurement, ScaledBin, ScaledResult, ScalingInputs};
pub use artifact::{artifact_path, read_tally};
pub use engine::{calibrate, StatepointEngine, StatepointHandle, TransportEngine};
pub use group::{EnergyGroup, TallyBin};
pub use report::{sci, ExposureReport, ReportHeader};
