use approx::assert_relative_eq;
use filament::{
    analytics::{ Spread, gaussian_peak_ratio },
    beam::*,
    diffraction::{ FourierDiffractionXY, SweepDiffractionR, SweepDiffractionX },
    propagate::{ PropagationParams, Propagator, Track },
};

fn linear_params(n_z: usize, z_diff: f64) -> PropagationParams {
    PropagationParams {
        n_z,
        dz0: z_diff / n_z as f64,
        const_dz: true,
        ..PropagationParams::default()
    }
}

fn check_against_law(track: &Track, z_diff: f64, spread: Spread, eps: f64) {
    let i_0 = track.i_max_normalized()[0];
    track.z().iter().zip(track.i_max_normalized())
        .for_each(|(z, i)| {
            let expected = gaussian_peak_ratio(*z, z_diff, spread);
            assert_relative_eq!(*i / i_0, expected, max_relative = eps);
        });
}

#[test]
fn slab_gaussian() {
    let beam = SlabBeam::new(&SlabParams::default()).unwrap();
    let z_diff = beam.z_diff();
    let diffraction = SweepDiffractionX::new(&beam);
    let mut prop = Propagator::new(beam, linear_params(1000, z_diff)).unwrap()
        .with_diffraction(diffraction);
    let track = prop.propagate().unwrap();
    assert_eq!(track.len(), 1001);
    assert_relative_eq!(prop.z() / z_diff, 1.0, max_relative = 1e-9);
    assert_relative_eq!(
        prop.beam().i_max(), 0.5_f64.sqrt(), max_relative = 1e-2);
    check_against_law(&track, z_diff, Spread::OneDim, 1e-2);
}

#[test]
fn radial_gaussian() {
    let params = RadialParams {
        n_r: 1024,
        radii_in_grid: 20.0,
        ..RadialParams::default()
    };
    let beam = RadialBeam::new(&params).unwrap();
    let z_diff = beam.z_diff();
    let diffraction = SweepDiffractionR::new(&beam);
    let mut prop = Propagator::new(beam, linear_params(1000, z_diff)).unwrap()
        .with_diffraction(diffraction);
    let track = prop.propagate().unwrap();
    assert_relative_eq!(prop.z() / z_diff, 1.0, max_relative = 1e-9);
    assert_relative_eq!(prop.beam().i_max(), 0.5, max_relative = 2e-2);
    check_against_law(&track, z_diff, Spread::TwoDim, 2e-2);
}

#[test]
fn transverse_gaussian() {
    let params = TransverseParams { n_x: 256, n_y: 256, ..TransverseParams::default() };
    let beam = TransverseBeam::new(&params, None).unwrap();
    let z_diff = beam.z_diff();
    let diffraction = FourierDiffractionXY::new(&beam);
    // the spectral step is exact, so large steps are fine
    let mut prop = Propagator::new(beam, linear_params(20, z_diff)).unwrap()
        .with_diffraction(diffraction);
    let track = prop.propagate().unwrap();
    assert_relative_eq!(prop.beam().i_max(), 0.5, max_relative = 1e-2);
    check_against_law(&track, z_diff, Spread::TwoDim, 1e-2);
}

#[test]
fn transverse_gaussian_over_several_lengths() {
    let params = TransverseParams { n_x: 256, n_y: 256, ..TransverseParams::default() };
    let beam = TransverseBeam::new(&params, None).unwrap();
    let z_diff = beam.z_diff();
    let diffraction = FourierDiffractionXY::new(&beam);
    let params = PropagationParams {
        n_z: 30,
        dz0: 0.1 * z_diff,
        const_dz: true,
        ..PropagationParams::default()
    };
    let mut prop = Propagator::new(beam, params).unwrap()
        .with_diffraction(diffraction);
    let track = prop.propagate().unwrap();
    assert_relative_eq!(prop.z() / z_diff, 3.0, max_relative = 1e-9);
    check_against_law(&track, z_diff, Spread::TwoDim, 1e-2);
}

#[test]
fn transverse_vortex() {
    let params = TransverseParams { M: 1, m: 1, n_x: 256, n_y: 256, ..TransverseParams::default() };
    let beam = TransverseBeam::new(&params, None).unwrap();
    assert_eq!(beam.distribution_type(), DistributionType::Vortex);
    let z_diff = beam.z_diff();
    let i_start = beam.i_max();
    let diffraction = FourierDiffractionXY::new(&beam);
    let mut prop = Propagator::new(beam, linear_params(20, z_diff)).unwrap()
        .with_diffraction(diffraction);
    let track = prop.propagate().unwrap();
    // a charge-1 ring is a Laguerre-Gauss mode, so its peak follows the
    // same law as the round Gaussian
    assert_relative_eq!(prop.beam().i_max() / i_start, 0.5, max_relative = 2e-2);
    check_against_law(&track, z_diff, Spread::TwoDim, 2e-2);
    // the phase singularity keeps the center dark
    assert!(prop.beam().intensity()[[128, 128]] < 1e-6 * prop.beam().i_max());
}
