pub mod check;
pub mod export;
pub mod report;

use std::error::Error;
use std::path::Path;

use pube_core::config::ExperimentConfig;

pub(crate) fn load_config(path: &Path) -> Result<ExperimentConfig, Box<dyn Error>> {
    ExperimentConfig::load(path).map_err(|err| Box::new(err) as Box<dyn Error>)
}
