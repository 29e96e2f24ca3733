//! Beam with a single transverse coordinate.

use ndarray as nd;
use num_complex::Complex64 as C64;
use crate::{
    beam::{ BResult, Beam, BeamCore, DistributionType },
    error::{ BeamError, PositiveError },
    medium::Medium,
    units::{ Constants, report },
};

/// Construction parameters for a [`SlabBeam`].
#[derive(Clone, Debug)]
pub struct SlabParams {
    pub medium: String,
    /// Vacuum wavelength (m).
    pub lmbda: f64,
    /// Polynomial order of the envelope.
    pub M: usize,
    /// Suppress the `x < 0` half of a ring envelope.
    pub half: bool,
    /// Kerr parameter; fixes the reference intensity.
    pub r_kerr: f64,
    /// Characteristic width (m).
    pub x_0: f64,
    pub n_x: usize,
    /// Grid extent in units of `x_0`.
    pub radii_in_grid: f64,
    pub consts: Constants,
}

impl Default for SlabParams {
    fn default() -> Self {
        Self {
            medium: "SiO2".into(),
            lmbda: 1800e-9,
            M: 0,
            half: false,
            r_kerr: 100.0,
            x_0: 100e-6,
            n_x: 512,
            radii_in_grid: 40.0,
            consts: Constants::default(),
        }
    }
}

/// Beam with envelope
/// ```text
/// A(x) = (H |x| / x_0)^M exp(-x² / 2 x_0²)
/// ```
/// on the grid `x[i] = i dx - x_max / 2`, where `H` masks `x < 0` for a
/// half-beam.
///
/// Unlike the three-dimensional geometries, the reference intensity is derived
/// from the supplied Kerr parameter rather than from a beam power.
#[derive(Clone, Debug)]
pub struct SlabBeam {
    core: BeamCore<nd::Ix1>,
    x_0: f64,
    half: bool,
    n_x: usize,
    x_max: f64,
    dx: f64,
    xs: nd::Array1<f64>,
}

impl SlabBeam {
    pub fn new(params: &SlabParams) -> BResult<Self> {
        PositiveError::check("lmbda", params.lmbda)?;
        PositiveError::check("x_0", params.x_0)?;
        PositiveError::check("r_kerr", params.r_kerr)?;
        PositiveError::check("radii_in_grid", params.radii_in_grid)?;
        BeamError::check_grid("n_x", params.n_x)?;
        let distribution_type = DistributionType::from_mode(params.M, 0)?;
        let medium = Medium::new(&params.medium, params.lmbda, &params.consts)?;

        let x_0 = params.x_0;
        let n_x = params.n_x;
        let x_max = params.radii_in_grid * x_0;
        let dx = x_max / n_x as f64;
        let xs: nd::Array1<f64>
            = (0..n_x).map(|i| i as f64 * dx - x_max / 2.0).collect();

        let M = params.M as i32;
        let half = params.half;
        let field: nd::Array1<C64>
            = xs.mapv(|x| {
                let mask = if half && x < 0.0 { 0.0 } else { 1.0 };
                let a = (mask * x.abs() / x_0).powi(M)
                    * (-0.5 * (x / x_0).powi(2)).exp();
                C64::from(a)
            });

        let z_diff = medium.k_0() * x_0.powi(2);
        let i_0
            = params.r_kerr * medium.n_0()
            / (2.0 * medium.k_0() * medium.n_2() * z_diff);
        let core = BeamCore::new(
            medium, params.M, 0, distribution_type, field, i_0, z_diff);
        Ok(Self { core, x_0, half, n_x, x_max, dx, xs })
    }

    pub fn x_0(&self) -> f64 { self.x_0 }

    pub fn half(&self) -> bool { self.half }

    pub fn n_x(&self) -> usize { self.n_x }

    pub fn x_max(&self) -> f64 { self.x_max }

    pub fn dx(&self) -> f64 { self.dx }

    pub fn xs(&self) -> &nd::Array1<f64> { &self.xs }
}

impl Beam for SlabBeam {
    type Dim = nd::Ix1;

    fn core(&self) -> &BeamCore<nd::Ix1> { &self.core }

    fn core_mut(&mut self) -> &mut BeamCore<nd::Ix1> { &mut self.core }

    fn info(&self) -> &'static str { "beam_x" }

    fn power(&self) -> f64 {
        self.core.i_0 * self.core.intensity.sum() * self.dx
    }

    fn parameters(&self) -> Vec<(&'static str, f64, &'static str)> {
        vec![
            ("x_0", self.x_0 / report::um, "um"),
            ("x_max", self.x_max / report::um, "um"),
            ("n_x", self.n_x as f64, ""),
            ("dx", self.dx / report::um, "um"),
            ("half", if self.half { 1.0 } else { 0.0 }, ""),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn gaussian_defaults() {
        let beam = SlabBeam::new(&SlabParams::default()).unwrap();
        assert_eq!(beam.info(), "beam_x");
        assert_eq!(beam.distribution_type(), DistributionType::Gauss);
        assert_eq!(beam.field().len(), 512);
        assert_relative_eq!(beam.x_max(), 4e-3, max_relative = 1e-12);
        assert_relative_eq!(beam.xs()[256], 0.0, epsilon = 1e-15);
        assert_relative_eq!(beam.i_max(), 1.0);
        assert_relative_eq!(beam.r_kerr(), 100.0, max_relative = 1e-12);
        assert_relative_eq!(
            beam.z_diff(), beam.medium().k_0() * 1e-8, max_relative = 1e-12);
        assert!(beam.intensity().iter().all(|ik| *ik >= 0.0));
    }

    #[test]
    fn half_ring() {
        let params = SlabParams { M: 2, half: true, ..SlabParams::default() };
        let beam = SlabBeam::new(&params).unwrap();
        assert_eq!(beam.distribution_type(), DistributionType::Ring);
        beam.xs().iter().zip(beam.intensity())
            .filter(|(x, _)| **x < 0.0)
            .for_each(|(_, ik)| { assert_eq!(*ik, 0.0); });
        // |A|² = (x/x_0)⁴ exp(-(x/x_0)²) peaks at x = √2 x_0
        assert_relative_eq!(
            beam.i_max(), 4.0 * (-2.0_f64).exp(), max_relative = 1e-2);
    }

    #[test]
    fn bad_inputs() {
        let params = SlabParams { medium: "Ge".into(), ..SlabParams::default() };
        assert!(matches!(SlabBeam::new(&params), Err(BeamError::Medium(_))));
        let params = SlabParams { x_0: -1.0, ..SlabParams::default() };
        assert!(matches!(SlabBeam::new(&params), Err(BeamError::Positive(_))));
        let params = SlabParams { n_x: 2, ..SlabParams::default() };
        assert!(matches!(SlabBeam::new(&params), Err(BeamError::BadGrid(..))));
    }
}
