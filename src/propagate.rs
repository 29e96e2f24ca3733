//! Run a propagation job described by a TOML file.
//!
//! ```sh
//! propagate job.toml
//! propagate job.toml --output scratch --threads 4 --verbose
//! propagate job.toml --check
//! ```

use std::path::PathBuf;
use anyhow::Context;
use clap::Parser;
use filament::config;

#[derive(Parser)]
#[command(name = "propagate")]
#[command(about = "Split-step propagation of a self-focusing beam in a Kerr medium")]
#[command(version)]
struct Cli {
    /// Path to the job configuration file.
    config: PathBuf,

    /// Output directory (overrides the config file setting).
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Worker threads for the spectral diffraction step (`xy` beams only).
    #[arg(short, long)]
    threads: Option<usize>,

    /// Validate the configuration and exit.
    #[arg(long)]
    check: bool,

    /// Log per-construction detail.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(filter)).init();

    let mut job = config::load_config(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;
    if let Some(dir) = cli.output {
        job.output.directory = dir;
    }
    if let Some(threads) = cli.threads {
        if job.beam.geometry == "xy" {
            job.propagation.threads = Some(threads);
        } else {
            log::warn!(
                "--threads has no effect on geometry {:?}", job.beam.geometry);
        }
    }

    let geometry = job.validate()
        .with_context(|| format!("invalid configuration {}", cli.config.display()))?;
    if cli.check {
        log::info!(
            "{} is valid (geometry {})", cli.config.display(), geometry.tag());
        return Ok(());
    }

    let mut sim = config::build(&job)?;
    let mut logger = job.logger().with_executors(sim.executors());
    let track = sim.run(Some(&mut logger))?;

    let z_diff = sim.z_diff();
    match track.last() {
        Some([z, dz, i_norm, i_max]) => log::info!(
            "finished at z = {:.4e} m ({:.4} z_diff), dz = {:.3e} m, i_max / i_0 = {:.4}, i_max = {:.4e} W/m^2",
            z, z / z_diff, dz, i_norm, i_max,
        ),
        None => log::warn!("no steps recorded"),
    }
    log::info!("output written to {}", logger.directory().display());
    Ok(())
}
