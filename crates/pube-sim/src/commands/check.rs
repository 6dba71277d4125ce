use std::error::Error;
use std::path::PathBuf;

use clap::Args;
use pube_model::EngineModel;

use super::load_config;

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// YAML experiment configuration.
    #[arg(long)]
    pub config: PathBuf,
    /// Points drawn in the sphere and in each probe box; defaults to the
    /// configured `validation.partition_samples`.
    #[arg(long)]
    pub samples: Option<usize>,
    /// Sampling seed; defaults to the configured `validation.seed`.
    #[arg(long)]
    pub seed: Option<u64>,
}

pub fn run(args: &CheckArgs) -> Result<(), Box<dyn Error>> {
    let mut config = load_config(&args.config)?;
    if let Some(samples) = args.samples {
        config.validation.partition_samples = samples;
    }
    if let Some(seed) = args.seed {
        config.validation.seed = seed;
    }
    let model = EngineModel::assemble(&config)?;
    let report = &model.partition;

    println!("configuration : {}", args.config.display());
    println!(
        "geometry      : {} surfaces, {} cells",
        model.geometry.surfaces().len(),
        model.geometry.cells().len()
    );
    for layer in model.geometry.layers() {
        println!(
            "  {:<16} {:<14} x = [{:.6}, {:.6}) cm",
            layer.name, layer.material, layer.inner, layer.outer
        );
    }
    println!(
        "source        : {} point spectrum, {:.3e} n/s",
        model.source.energy.energies_ev().len(),
        config.source_rate()
    );
    println!(
        "partition     : {} points, {} gaps, {} overlaps",
        report.samples, report.gaps, report.overlaps
    );
    Ok(())
}
