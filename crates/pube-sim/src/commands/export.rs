use std::error::Error;
use std::path::PathBuf;

use clap::Args;
use pube_model::EngineModel;

use super::load_config;

#[derive(Args, Debug)]
pub struct ExportArgs {
    /// YAML experiment configuration.
    #[arg(long)]
    pub config: PathBuf,
    /// Directory receiving the engine model files.
    #[arg(long)]
    pub out: PathBuf,
}

pub fn run(args: &ExportArgs) -> Result<(), Box<dyn Error>> {
    let config = load_config(&args.config)?;
    let model = EngineModel::assemble(&config)?;
    for path in model.write_json(&args.out)? {
        println!("{}", path.display());
    }
    Ok(())
}
