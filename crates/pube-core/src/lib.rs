#![deny(missing_docs)]
#![doc = "Core configuration, error, hashing and RNG types shared by the PuBe shield experiment crates."]

pub mod config;
pub mod errors;
/// Canonical JSON and stable hashing helpers.
pub mod hash;
pub mod rng;

pub use config::{
    ConstituentConfig, ConstituentKind, DetectorConfig, ExperimentConfig, ExposureConfig,
    FractionBasis, LayerConfig, MaterialConfig, RunMode, RunSettings, ShieldingConfig,
    SourceConfig, SpectrumConfig, TallyConfig, ValidationConfig, WorldConfig,
};
pub use errors::{config_error, ErrorInfo, PubeError};
pub use hash::{stable_hash_string, to_canonical_json_bytes};
pub use rng::{derive_substream_seed, RngHandle};
