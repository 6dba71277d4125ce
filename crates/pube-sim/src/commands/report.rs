use std::error::Error;
use std::fs;
use std::path::PathBuf;

use clap::Args;
use pube_tally::{calibrate, StatepointEngine};

use super::load_config;

#[derive(Args, Debug)]
pub struct ReportArgs {
    /// YAML experiment configuration.
    #[arg(long)]
    pub config: PathBuf,
    /// Run directory holding the statepoint table.
    #[arg(long)]
    pub run_dir: PathBuf,
    /// Optional path for the JSON report.
    #[arg(long)]
    pub json: Option<PathBuf>,
}

pub fn run(args: &ReportArgs) -> Result<(), Box<dyn Error>> {
    let config = load_config(&args.config)?;
    let engine = StatepointEngine::new(&args.run_dir);
    let report = calibrate(&engine, &config)?;

    if let Some(path) = &args.json {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, report.to_json_bytes()?)?;
    }
    print!("{}", report.render_text());
    Ok(())
}
