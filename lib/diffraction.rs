//! Linear diffraction steps.
//!
//! The slab and radial geometries use an implicit Crank-Nicolson discretization
//! of the transverse Laplacian, solved by a single tridiagonal (Thomas) sweep
//! per step. The diagonal of the implicit half,
//! ```text
//! β[i] = 2 c_1 + 2 i k_0 / dz + (m / r[i])²
//! ```
//! enters the explicit half as `conj(β[i]) - (m / r[i])²`, so the centrifugal
//! term is carried entirely on the implicit side.
//!
//! The transverse geometry is advanced exactly in Fourier space, multiplying
//! each plane-wave component by `exp(i dz (k_x² + k_y²) / 2 k_0)`; the
//! boundary is then implicitly periodic.

use ndarray as nd;
use num_complex::Complex64 as C64;
use crate::{
    beam::{ Beam, RadialBeam, SlabBeam, TransverseBeam },
    error::PropagationError,
    propagate::PResult,
    utils::Fft2,
};

/// Advances a beam of type `B` through one diffraction sub-step.
pub trait DiffractionExecutor<B: Beam> {
    fn info(&self) -> &'static str;

    /// Propagate the field of `beam` over `dz` (m) in place. The beam's
    /// intensity is not refreshed.
    fn process_diffraction(&mut self, beam: &mut B, dz: f64) -> PResult<()>;
}

// shared Thomas-sweep state; `alpha`, `gamma` and `vx` are indexed by grid
// point and left at zero on both boundaries
#[derive(Clone, Debug)]
struct Sweep {
    c1: f64,
    c3: C64,
    alpha: nd::Array1<f64>,
    gamma: nd::Array1<f64>,
    vx: nd::Array1<f64>,
    kappa_left: C64,
    mu_left: C64,
    kappa_right: C64,
    mu_right: C64,
    xi: nd::Array1<C64>,
    eta: nd::Array1<C64>,
}

impl Sweep {
    fn new(
        c1: f64,
        k_0: f64,
        alpha: nd::Array1<f64>,
        gamma: nd::Array1<f64>,
        vx: nd::Array1<f64>,
        kappa_left: f64,
    ) -> Self {
        let n = alpha.len();
        Self {
            c1,
            c3: 2.0 * C64::i() * k_0,
            alpha,
            gamma,
            vx,
            kappa_left: C64::from(kappa_left),
            mu_left: C64::from(0.0),
            kappa_right: C64::from(0.0),
            mu_right: C64::from(0.0),
            xi: nd::Array1::zeros(n),
            eta: nd::Array1::zeros(n),
        }
    }

    fn len(&self) -> usize { self.alpha.len() }

    fn check(&self, field: &nd::Array1<C64>) -> PResult<()> {
        let expected = self.len();
        let found = field.len();
        (expected == found).then_some(())
            .ok_or(PropagationError::GridMismatch { expected, found })
    }

    fn process(&mut self, field: &mut nd::Array1<C64>, dz: f64) {
        let n = self.len();
        let c1 = self.c1;
        let c3dz = self.c3 / dz;
        let (kappa_right, mu_right) = (self.kappa_right, self.mu_right);

        // left boundary condition
        self.xi[1] = self.kappa_left;
        self.eta[1] = self.mu_left;

        let Self { alpha, gamma, vx, xi, eta, .. } = &mut *self;

        // forward
        for i in 1..n - 1 {
            let beta = 2.0 * c1 + c3dz + vx[i];
            let delta
                = alpha[i] * field[i + 1]
                - (beta.conj() - vx[i]) * field[i]
                + gamma[i] * field[i - 1];
            let denom = beta - gamma[i] * xi[i];
            xi[i + 1] = alpha[i] / denom;
            eta[i + 1] = (delta + gamma[i] * eta[i]) / denom;
        }

        // right boundary condition
        field[n - 1]
            = (mu_right + kappa_right * eta[n - 1])
            / (1.0 - kappa_right * xi[n - 1]);

        // backward
        for j in (1..n).rev() {
            field[j - 1] = xi[j] * field[j] + eta[j];
        }
    }
}

/// Crank-Nicolson sweep for [`SlabBeam`], with the field pinned to zero at
/// both ends of the grid.
#[derive(Clone, Debug)]
pub struct SweepDiffractionX {
    sweep: Sweep,
}

impl SweepDiffractionX {
    pub fn new(beam: &SlabBeam) -> Self {
        let n = beam.n_x();
        let c1 = 0.5 / beam.dx().powi(2);
        let mut alpha: nd::Array1<f64> = nd::Array1::from_elem(n, c1);
        let mut gamma: nd::Array1<f64> = nd::Array1::from_elem(n, c1);
        alpha[0] = 0.0;
        gamma[0] = 0.0;
        alpha[n - 1] = 0.0;
        gamma[n - 1] = 0.0;
        let vx = nd::Array1::zeros(n);
        let sweep = Sweep::new(c1, beam.medium().k_0(), alpha, gamma, vx, 0.0);
        Self { sweep }
    }
}

impl DiffractionExecutor<SlabBeam> for SweepDiffractionX {
    fn info(&self) -> &'static str { "sweep_diffraction_executor_x" }

    fn process_diffraction(&mut self, beam: &mut SlabBeam, dz: f64)
        -> PResult<()>
    {
        let field = beam.field_mut();
        self.sweep.check(field)?;
        self.sweep.process(field, dz);
        Ok(())
    }
}

/// Crank-Nicolson sweep for [`RadialBeam`], including the `-(m / r)²` term
/// for vortex beams. The field has zero slope on axis and vanishes at the
/// outer edge.
#[derive(Clone, Debug)]
pub struct SweepDiffractionR {
    sweep: Sweep,
}

impl SweepDiffractionR {
    pub fn new(beam: &RadialBeam) -> Self {
        let n = beam.n_r();
        let dr = beam.dr();
        let c1 = 0.5 / dr.powi(2);
        let c2 = 0.25 / dr;
        let m = beam.m() as f64;
        let rs = beam.rs();
        let mut alpha: nd::Array1<f64> = nd::Array1::zeros(n);
        let mut gamma: nd::Array1<f64> = nd::Array1::zeros(n);
        let mut vx: nd::Array1<f64> = nd::Array1::zeros(n);
        for i in 1..n - 1 {
            alpha[i] = c1 + c2 / rs[i];
            gamma[i] = c1 - c2 / rs[i];
            vx[i] = (m / rs[i]).powi(2);
        }
        let sweep = Sweep::new(c1, beam.medium().k_0(), alpha, gamma, vx, 1.0);
        Self { sweep }
    }
}

impl DiffractionExecutor<RadialBeam> for SweepDiffractionR {
    fn info(&self) -> &'static str { "sweep_diffraction_executor_r" }

    fn process_diffraction(&mut self, beam: &mut RadialBeam, dz: f64)
        -> PResult<()>
    {
        let field = beam.field_mut();
        self.sweep.check(field)?;
        self.sweep.process(field, dz);
        Ok(())
    }
}

/// Spectral step for [`TransverseBeam`].
///
/// FFT lanes are processed in parallel, either on the global rayon pool or on
/// a dedicated pool set with
/// [`with_threads`][FourierDiffractionXY::with_threads].
#[derive(Debug)]
pub struct FourierDiffractionXY {
    fft: Fft2,
    k_0: f64,
    k_sq: nd::Array2<f64>,
    pool: Option<rayon::ThreadPool>,
}

impl FourierDiffractionXY {
    pub fn new(beam: &TransverseBeam) -> Self {
        let k_xs = beam.k_xs();
        let k_ys = beam.k_ys();
        let k_sq: nd::Array2<f64>
            = nd::Array2::from_shape_fn((beam.n_x(), beam.n_y()), |(i, j)| {
                k_xs[i].powi(2) + k_ys[j].powi(2)
            });
        Self {
            fft: Fft2::new(beam.n_x(), beam.n_y()),
            k_0: beam.medium().k_0(),
            k_sq,
            pool: None,
        }
    }

    /// Run the transforms on a dedicated pool of `threads` workers.
    pub fn with_threads(mut self, threads: usize) -> PResult<Self> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()?;
        self.pool = Some(pool);
        Ok(self)
    }

    fn step(&self, field: &mut nd::Array2<C64>, dz: f64) {
        let a = 0.5 * dz / self.k_0;
        self.fft.forward(field);
        nd::Zip::from(&mut *field).and(&self.k_sq)
            .par_for_each(|fk, k2| { *fk *= C64::cis(a * k2); });
        self.fft.inverse(field);
    }
}

impl DiffractionExecutor<TransverseBeam> for FourierDiffractionXY {
    fn info(&self) -> &'static str { "fourier_diffraction_executor_xy" }

    fn process_diffraction(&mut self, beam: &mut TransverseBeam, dz: f64)
        -> PResult<()>
    {
        let field = beam.field_mut();
        let (n_x, n_y) = self.fft.shape();
        if field.dim() != (n_x, n_y) {
            return Err(PropagationError::GridMismatch {
                expected: n_x * n_y,
                found: field.len(),
            });
        }
        match self.pool.as_ref() {
            Some(pool) => pool.install(|| self.step(field, dz)),
            None => self.step(field, dz),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use crate::beam::{ RadialParams, SlabParams, TransverseParams };

    #[test]
    fn spectral_zero_step_is_identity() {
        let params = TransverseParams { M: 1, m: 1, n_x: 64, n_y: 64, ..TransverseParams::default() };
        let mut beam = TransverseBeam::new(&params, None).unwrap();
        let before = beam.field().clone();
        FourierDiffractionXY::new(&beam)
            .process_diffraction(&mut beam, 0.0)
            .unwrap();
        nd::Zip::from(beam.field()).and(&before)
            .for_each(|a, b| { assert!((a - b).norm() < 1e-12); });
    }

    #[test]
    fn spectral_conserves_power() {
        let params = TransverseParams { n_x: 128, n_y: 128, ..TransverseParams::default() };
        let mut beam = TransverseBeam::new(&params, None).unwrap();
        let p0 = beam.power();
        let mut diff = FourierDiffractionXY::new(&beam).with_threads(2).unwrap();
        let dz = 0.1 * beam.z_diff();
        for _ in 0..5 {
            diff.process_diffraction(&mut beam, dz).unwrap();
        }
        beam.update_intensity();
        assert_relative_eq!(beam.power(), p0, max_relative = 1e-9);
        assert!(beam.i_max() < 1.0);
    }

    #[test]
    fn slab_sweep_spreads_symmetrically() {
        let mut beam = SlabBeam::new(&SlabParams::default()).unwrap();
        let mut diff = SweepDiffractionX::new(&beam);
        let dz = 0.01 * beam.z_diff();
        diff.process_diffraction(&mut beam, dz).unwrap();
        beam.update_intensity();
        let n = beam.n_x();
        let intensity = beam.intensity();
        for i in 1..n / 2 {
            assert_relative_eq!(
                intensity[n / 2 - i],
                intensity[n / 2 + i],
                epsilon = 1e-12,
                max_relative = 1e-9,
            );
        }
        assert!(beam.i_max() < 1.0);
        assert_eq!(beam.field()[n - 1], C64::from(0.0));
    }

    #[test]
    fn radial_sweep_keeps_axis_flat() {
        let mut beam = RadialBeam::new(&RadialParams::default()).unwrap();
        let mut diff = SweepDiffractionR::new(&beam);
        let dz = 0.01 * beam.z_diff();
        diff.process_diffraction(&mut beam, dz).unwrap();
        assert_eq!(beam.field()[0], beam.field()[1]);
    }
}
