//! Beam resolved over the full transverse plane.

use std::f64::consts::PI;
use ndarray as nd;
use num_complex::Complex64 as C64;
use crate::{
    beam::{ BResult, Beam, BeamCore, DistributionType, p_gauss, p_vortex },
    error::{ BeamError, PositiveError },
    medium::Medium,
    noise::NoiseGenerator,
    units::{ Constants, report },
    utils::{ gamma_int, wave_numbers },
};

/// Construction parameters for a [`TransverseBeam`].
#[derive(Clone, Debug)]
pub struct TransverseParams {
    pub medium: String,
    /// Vacuum wavelength (m).
    pub lmbda: f64,
    /// Polynomial order of the envelope.
    pub M: usize,
    /// Topological charge.
    pub m: usize,
    /// Initial power in units of the critical power appropriate to the
    /// distribution type.
    pub p0_to_pcr: f64,
    /// Characteristic half-widths (m).
    pub x_0: f64,
    pub y_0: f64,
    pub n_x: usize,
    pub n_y: usize,
    /// Grid extent in units of `max(x_0, y_0)`.
    pub radii_in_grid: f64,
    /// Amplitude of the multiplicative noise, in percent.
    pub noise_percent: f64,
    pub consts: Constants,
}

impl Default for TransverseParams {
    fn default() -> Self {
        Self {
            medium: "SiO2".into(),
            lmbda: 1800e-9,
            M: 0,
            m: 0,
            p0_to_pcr: 1.0,
            x_0: 100e-6,
            y_0: 100e-6,
            n_x: 256,
            n_y: 256,
            radii_in_grid: 20.0,
            noise_percent: 0.0,
            consts: Constants::default(),
        }
    }
}

/// Beam with envelope
/// ```text
/// A(x, y) = (1 + 0.01 p N(x, y)) ρ^M exp(-ρ² / 2) exp(i m θ)
/// ρ² = x² / x_0² + y² / y_0²
/// ```
/// on a centered grid of shape `(n_x, n_y)`, where `N` is an optional noise
/// field of strength `p` percent.
#[derive(Debug)]
pub struct TransverseBeam {
    core: BeamCore<nd::Ix2>,
    x_0: f64,
    y_0: f64,
    n_x: usize,
    n_y: usize,
    x_max: f64,
    y_max: f64,
    dx: f64,
    dy: f64,
    xs: nd::Array1<f64>,
    ys: nd::Array1<f64>,
    k_xs: nd::Array1<f64>,
    k_ys: nd::Array1<f64>,
    noise_percent: f64,
    noise: Option<Box<dyn NoiseGenerator>>,
    p_gauss: f64,
    p_vortex: f64,
    p_0: f64,
}

impl TransverseBeam {
    /// Build the beam, drawing one realization from `noise` if given.
    ///
    /// A nonzero `noise_percent` without a generator is an error.
    pub fn new(
        params: &TransverseParams,
        mut noise: Option<Box<dyn NoiseGenerator>>,
    ) -> BResult<Self> {
        PositiveError::check("lmbda", params.lmbda)?;
        PositiveError::check("x_0", params.x_0)?;
        PositiveError::check("y_0", params.y_0)?;
        PositiveError::check("P0_to_Pcr", params.p0_to_pcr)?;
        PositiveError::check("radii_in_grid", params.radii_in_grid)?;
        BeamError::check_grid("n_x", params.n_x)?;
        BeamError::check_grid("n_y", params.n_y)?;
        if params.noise_percent != 0.0 && noise.is_none() {
            return Err(BeamError::MissingNoise(params.noise_percent));
        }
        let distribution_type
            = DistributionType::from_mode(params.M, params.m)?;
        let medium = Medium::new(&params.medium, params.lmbda, &params.consts)?;

        let x_0 = params.x_0;
        let y_0 = params.y_0;
        let n_x = params.n_x;
        let n_y = params.n_y;
        let x_max = params.radii_in_grid * x_0.max(y_0);
        let y_max = x_max;
        let dx = x_max / n_x as f64;
        let dy = y_max / n_y as f64;
        let xs: nd::Array1<f64>
            = (0..n_x).map(|i| i as f64 * dx - x_max / 2.0).collect();
        let ys: nd::Array1<f64>
            = (0..n_y).map(|j| j as f64 * dy - y_max / 2.0).collect();

        let M = params.M as i32;
        let m = params.m as f64;
        let mut field: nd::Array2<C64>
            = nd::Array2::from_shape_fn((n_x, n_y), |(i, j)| {
                let (x, y) = (xs[i], ys[j]);
                let rho2 = (x / x_0).powi(2) + (y / y_0).powi(2);
                let a = rho2.sqrt().powi(M) * (-0.5 * rho2).exp();
                a * C64::cis(m * x.atan2(y))
            });

        let noisy = params.noise_percent != 0.0;
        if let Some(gen) = noise.as_mut() {
            gen.initialize(n_x, n_y, dx, dy)?;
            gen.process()?;
            if noisy {
                let amp = 0.01 * params.noise_percent;
                nd::Zip::from(&mut field).and(gen.noise_field()?)
                    .for_each(|fk, nk| { *fk *= 1.0 + amp * *nk; });
            }
        }

        let p_g = p_gauss(params.lmbda, medium.n_0(), medium.n_2());
        let p_v = p_vortex(p_g, params.m);
        let p_0 = match distribution_type {
            DistributionType::Vortex => params.p0_to_pcr * p_v,
            _ => params.p0_to_pcr * p_g,
        };
        let i_0 = if !noisy && x_0 == y_0 {
            p_0 / (PI * x_0.powi(2) * gamma_int(params.M + 1))
        } else {
            let norm = field.fold(0.0, |acc, fk| acc + fk.norm_sqr()) * dx * dy;
            if norm <= 0.0 { return Err(BeamError::ZeroPower); }
            p_0 / norm
        };
        let z_diff = medium.k_0() * (0.5 * (x_0 + y_0)).powi(2);
        let core = BeamCore::new(
            medium, params.M, params.m, distribution_type, field, i_0, z_diff);
        Ok(Self {
            core,
            x_0,
            y_0,
            n_x,
            n_y,
            x_max,
            y_max,
            dx,
            dy,
            k_xs: wave_numbers(n_x, dx),
            k_ys: wave_numbers(n_y, dy),
            xs,
            ys,
            noise_percent: params.noise_percent,
            noise,
            p_gauss: p_g,
            p_vortex: p_v,
            p_0,
        })
    }

    pub fn x_0(&self) -> f64 { self.x_0 }

    pub fn y_0(&self) -> f64 { self.y_0 }

    pub fn n_x(&self) -> usize { self.n_x }

    pub fn n_y(&self) -> usize { self.n_y }

    pub fn x_max(&self) -> f64 { self.x_max }

    pub fn y_max(&self) -> f64 { self.y_max }

    pub fn dx(&self) -> f64 { self.dx }

    pub fn dy(&self) -> f64 { self.dy }

    pub fn xs(&self) -> &nd::Array1<f64> { &self.xs }

    pub fn ys(&self) -> &nd::Array1<f64> { &self.ys }

    /// Angular wave numbers along *x*, in FFT order.
    pub fn k_xs(&self) -> &nd::Array1<f64> { &self.k_xs }

    /// Angular wave numbers along *y*, in FFT order.
    pub fn k_ys(&self) -> &nd::Array1<f64> { &self.k_ys }

    pub fn noise_percent(&self) -> f64 { self.noise_percent }

    /// The generator that perturbed the initial field, if any.
    pub fn noise(&self) -> Option<&dyn NoiseGenerator> { self.noise.as_deref() }

    /// Gaussian critical power (W).
    pub fn p_gauss(&self) -> f64 { self.p_gauss }

    /// Vortex critical power for this beam's topological charge (W).
    pub fn p_vortex(&self) -> f64 { self.p_vortex }

    /// Initial power (W).
    pub fn p_0(&self) -> f64 { self.p_0 }
}

impl Beam for TransverseBeam {
    type Dim = nd::Ix2;

    fn core(&self) -> &BeamCore<nd::Ix2> { &self.core }

    fn core_mut(&mut self) -> &mut BeamCore<nd::Ix2> { &mut self.core }

    fn info(&self) -> &'static str { "beam_xy" }

    fn power(&self) -> f64 {
        self.core.i_0 * self.core.intensity.sum() * self.dx * self.dy
    }

    fn parameters(&self) -> Vec<(&'static str, f64, &'static str)> {
        vec![
            ("x_0", self.x_0 / report::um, "um"),
            ("y_0", self.y_0 / report::um, "um"),
            ("x_max", self.x_max / report::um, "um"),
            ("y_max", self.y_max / report::um, "um"),
            ("n_x", self.n_x as f64, ""),
            ("n_y", self.n_y as f64, ""),
            ("dx", self.dx / report::um, "um"),
            ("dy", self.dy / report::um, "um"),
            ("noise_percent", self.noise_percent, "%"),
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
    use crate::noise::GaussianNoise;

    #[test]
    fn gaussian_closed_form_power() {
        let params = TransverseParams { p0_to_pcr: 2.0, ..TransverseParams::default() };
        let beam = TransverseBeam::new(&params, None).unwrap();
        assert_eq!(beam.info(), "beam_xy");
        assert_eq!(beam.shape(), &[256, 256]);
        assert_relative_eq!(beam.i_max(), 1.0);
        assert_relative_eq!(beam.power(), beam.p_0(), max_relative = 1e-6);
        assert_relative_eq!(beam.k_xs()[1], 2.0 * PI / beam.x_max(), max_relative = 1e-12);
    }

    #[test]
    fn elliptic_uses_numerical_norm() {
        let params = TransverseParams {
            x_0: 80e-6,
            y_0: 120e-6,
            ..TransverseParams::default()
        };
        let beam = TransverseBeam::new(&params, None).unwrap();
        assert_relative_eq!(beam.power(), beam.p_0(), max_relative = 1e-12);
        assert_relative_eq!(
            beam.z_diff(), beam.medium().k_0() * 1e-8, max_relative = 1e-12);
    }

    #[test]
    fn vortex_phase_winds() {
        let params = TransverseParams { M: 1, m: 1, ..TransverseParams::default() };
        let beam = TransverseBeam::new(&params, None).unwrap();
        assert_eq!(beam.distribution_type(), DistributionType::Vortex);
        assert_relative_eq!(beam.p_0(), 4.0 * beam.p_gauss(), max_relative = 1e-12);
        // intensity vanishes at the center of the grid
        assert!(beam.intensity()[[128, 128]] < 1e-12);
        assert_relative_eq!(beam.power(), beam.p_0(), max_relative = 1e-6);
    }

    #[test]
    fn noisy_beam() {
        let params = TransverseParams { noise_percent: 1.0, ..TransverseParams::default() };
        assert!(matches!(
            TransverseBeam::new(&params, None),
            Err(BeamError::MissingNoise(_)),
        ));
        let noise = GaussianNoise::new(1.0, 50e-6).unwrap().with_seed(1);
        let beam = TransverseBeam::new(&params, Some(Box::new(noise))).unwrap();
        assert!(beam.noise().is_some());
        assert_relative_eq!(beam.power(), beam.p_0(), max_relative = 1e-12);
        assert!((beam.i_max() - 1.0).abs() < 0.2);
    }
}
