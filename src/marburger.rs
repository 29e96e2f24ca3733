//! Scan the collapse distance of a radial Gaussian beam in fused silica over
//! initial powers and compare with Marburger's formula.

use std::{ fs::{ self, File }, path::PathBuf };
use clap::Parser;
use ndarray as nd;
use ndarray_npy::NpzWriter;
use rayon::prelude::*;
use filament::{
    analytics::marburger_distance,
    beam::{ Beam, RadialBeam, RadialParams },
    diffraction::SweepDiffractionR,
    propagate::{ PropagationParams, Propagator },
};

#[derive(Parser)]
#[command(name = "marburger")]
#[command(about = "Collapse distance of a Gaussian beam versus initial power")]
struct Cli {
    /// Number of power ratios sampled between 2 and 10 P_G.
    #[arg(short, long, default_value_t = 17)]
    points: usize,

    /// Radial grid points.
    #[arg(long, default_value_t = 2048)]
    n_r: usize,

    /// Step budget per run.
    #[arg(long, default_value_t = 100_000)]
    n_z: usize,

    /// Output directory.
    #[arg(short, long, default_value = "output")]
    output: PathBuf,
}

// collapse distance in units of z_diff, or NaN if the beam never reached the
// stopping intensity
fn collapse_distance(p0_to_pcr: f64, n_r: usize, n_z: usize)
    -> anyhow::Result<f64>
{
    let params = RadialParams {
        p0_to_pcr,
        n_r,
        radii_in_grid: 10.0,
        ..RadialParams::default()
    };
    let beam = RadialBeam::new(&params)?;
    let z_diff = beam.z_diff();
    let diffraction = SweepDiffractionR::new(&beam);
    let params = PropagationParams {
        n_z,
        dz0: 1e-3 * z_diff,
        ..PropagationParams::default()
    };
    let mut prop = Propagator::new(beam, params)?
        .with_diffraction(diffraction)
        .with_kerr_effect();
    prop.propagate()?;
    let z = if prop.stopped_early() { prop.z() / z_diff } else { f64::NAN };
    log::info!("P0 / P_G = {:.2}: z_sf / z_diff = {:.4}", p0_to_pcr, z);
    Ok(z)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info")).init();

    let ratios: nd::Array1<f64>
        = nd::Array1::linspace(2.0, 10.0, cli.points.max(2));
    let z_collapse: nd::Array1<f64>
        = ratios.as_slice().unwrap_or(&[]).par_iter()
        .map(|p| collapse_distance(*p, cli.n_r, cli.n_z))
        .collect::<anyhow::Result<Vec<f64>>>()?
        .into();
    let z_marburger: nd::Array1<f64>
        = ratios.mapv(|p| marburger_distance(p, 1.0).unwrap_or(f64::NAN));

    fs::create_dir_all(&cli.output)?;
    let path = cli.output.join("marburger.npz");
    let mut npz = NpzWriter::new(File::create(&path)?);
    npz.add_array("p0_to_pcr", &ratios)?;
    npz.add_array("z_collapse", &z_collapse)?;
    npz.add_array("z_marburger", &z_marburger)?;
    npz.finish()?;
    log::info!("wrote {}", path.display());
    Ok(())
}
