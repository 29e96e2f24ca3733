//! Axisymmetric beam.

use std::f64::consts::PI;
use ndarray as nd;
use num_complex::Complex64 as C64;
use crate::{
    beam::{ BResult, Beam, BeamCore, DistributionType, p_gauss, p_vortex },
    error::{ BeamError, PositiveError },
    medium::Medium,
    units::{ Constants, report },
    utils::{ gamma_int, trapz },
};

/// Construction parameters for a [`RadialBeam`].
#[derive(Clone, Debug)]
pub struct RadialParams {
    pub medium: String,
    /// Vacuum wavelength (m).
    pub lmbda: f64,
    /// Polynomial order of the envelope.
    pub M: usize,
    /// Topological charge.
    pub m: usize,
    /// Initial power in units of the critical power appropriate to the
    /// distribution type (Gaussian for gauss and ring beams, vortex
    /// otherwise).
    pub p0_to_pcr: f64,
    /// Characteristic radius (m).
    pub r_0: f64,
    pub n_r: usize,
    /// Grid extent in units of `r_0`.
    pub radii_in_grid: f64,
    pub consts: Constants,
}

impl Default for RadialParams {
    fn default() -> Self {
        Self {
            medium: "SiO2".into(),
            lmbda: 1800e-9,
            M: 0,
            m: 0,
            p0_to_pcr: 1.0,
            r_0: 100e-6,
            n_r: 512,
            radii_in_grid: 40.0,
            consts: Constants::default(),
        }
    }
}

/// Axisymmetric beam with envelope
/// ```text
/// A(r) = (r / r_0)^M exp(-r² / 2 r_0²)
/// ```
/// on the grid `r[i] = i dr`. The vortex phase `exp(i m φ)` is implicit and
/// enters only through the centrifugal term of the diffraction operator.
#[derive(Clone, Debug)]
pub struct RadialBeam {
    core: BeamCore<nd::Ix1>,
    r_0: f64,
    n_r: usize,
    r_max: f64,
    dr: f64,
    rs: nd::Array1<f64>,
    p_gauss: f64,
    p_vortex: f64,
    p_0: f64,
}

impl RadialBeam {
    pub fn new(params: &RadialParams) -> BResult<Self> {
        PositiveError::check("lmbda", params.lmbda)?;
        PositiveError::check("r_0", params.r_0)?;
        PositiveError::check("P0_to_Pcr", params.p0_to_pcr)?;
        PositiveError::check("radii_in_grid", params.radii_in_grid)?;
        BeamError::check_grid("n_r", params.n_r)?;
        let distribution_type
            = DistributionType::from_mode(params.M, params.m)?;
        let medium = Medium::new(&params.medium, params.lmbda, &params.consts)?;

        let r_0 = params.r_0;
        let n_r = params.n_r;
        let r_max = params.radii_in_grid * r_0;
        let dr = r_max / n_r as f64;
        let rs: nd::Array1<f64> = (0..n_r).map(|i| i as f64 * dr).collect();

        let M = params.M as i32;
        let field: nd::Array1<C64>
            = rs.mapv(|r| {
                C64::from((r / r_0).powi(M) * (-0.5 * (r / r_0).powi(2)).exp())
            });

        let p_g = p_gauss(params.lmbda, medium.n_0(), medium.n_2());
        let p_v = p_vortex(p_g, params.m);
        let p_0 = match distribution_type {
            DistributionType::Vortex => params.p0_to_pcr * p_v,
            _ => params.p0_to_pcr * p_g,
        };
        // 2π ∫ (r/r_0)^2M exp(-r²/r_0²) r dr = π r_0² Γ(M + 1)
        let i_0 = p_0 / (PI * r_0.powi(2) * gamma_int(params.M + 1));
        let z_diff = medium.k_0() * r_0.powi(2);
        let core = BeamCore::new(
            medium, params.M, params.m, distribution_type, field, i_0, z_diff);
        Ok(Self {
            core,
            r_0,
            n_r,
            r_max,
            dr,
            rs,
            p_gauss: p_g,
            p_vortex: p_v,
            p_0,
        })
    }

    pub fn r_0(&self) -> f64 { self.r_0 }

    pub fn n_r(&self) -> usize { self.n_r }

    pub fn r_max(&self) -> f64 { self.r_max }

    pub fn dr(&self) -> f64 { self.dr }

    pub fn rs(&self) -> &nd::Array1<f64> { &self.rs }

    /// Gaussian critical power (W).
    pub fn p_gauss(&self) -> f64 { self.p_gauss }

    /// Vortex critical power for this beam's topological charge (W).
    pub fn p_vortex(&self) -> f64 { self.p_vortex }

    /// Initial power (W).
    pub fn p_0(&self) -> f64 { self.p_0 }
}

impl Beam for RadialBeam {
    type Dim = nd::Ix1;

    fn core(&self) -> &BeamCore<nd::Ix1> { &self.core }

    fn core_mut(&mut self) -> &mut BeamCore<nd::Ix1> { &mut self.core }

    fn info(&self) -> &'static str { "beam_r" }

    fn power(&self) -> f64 {
        let integrand = &self.core.intensity * &self.rs;
        2.0 * PI * self.core.i_0 * trapz(&integrand, self.dr)
    }

    fn parameters(&self) -> Vec<(&'static str, f64, &'static str)> {
        vec![
            ("r_0", self.r_0 / report::um, "um"),
            ("r_max", self.r_max / report::um, "um"),
            ("n_r", self.n_r as f64, ""),
            ("dr", self.dr / report::um, "um"),
            ("P_G", self.p_gauss / report::MW, "MW"),
            ("P_V", self.p_vortex / report::MW, "MW"),
            ("P_0", self.p_0 / report::MW, "MW"),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn gaussian_power_matches_request() {
        let params = RadialParams { p0_to_pcr: 3.0, ..RadialParams::default() };
        let beam = RadialBeam::new(&params).unwrap();
        assert_eq!(beam.info(), "beam_r");
        assert_eq!(beam.distribution_type(), DistributionType::Gauss);
        assert_relative_eq!(beam.rs()[0], 0.0);
        assert_relative_eq!(beam.p_0(), 3.0 * beam.p_gauss());
        assert_relative_eq!(beam.power(), beam.p_0(), max_relative = 5e-3);
        let med = beam.medium();
        assert_relative_eq!(
            beam.r_kerr(),
            2.0 * med.k_0() * med.n_2() * beam.i_0() * beam.z_diff() / med.n_0(),
            max_relative = 1e-12,
        );
    }

    #[test]
    fn vortex_power_matches_request() {
        let params = RadialParams {
            M: 1,
            m: 1,
            radii_in_grid: 10.0,
            ..RadialParams::default()
        };
        let beam = RadialBeam::new(&params).unwrap();
        assert_eq!(beam.distribution_type(), DistributionType::Vortex);
        assert_relative_eq!(beam.p_vortex(), 4.0 * beam.p_gauss(), max_relative = 1e-12);
        assert_relative_eq!(beam.p_0(), beam.p_vortex(), max_relative = 1e-12);
        assert_relative_eq!(beam.power(), beam.p_0(), max_relative = 1e-3);
        // vortex has a hole on axis
        assert_eq!(beam.intensity()[0], 0.0);
    }

    #[test]
    fn charge_without_order() {
        let params = RadialParams { M: 0, m: 1, ..RadialParams::default() };
        assert!(matches!(
            RadialBeam::new(&params),
            Err(BeamError::BadMode { M: 0, m: 1 }),
        ));
    }
}
