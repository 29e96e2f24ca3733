//! Spatially correlated complex noise for perturbing transverse beams.
//!
//! [`GaussianNoise`] uses spectral synthesis: independent uniform deviates for
//! the real and imaginary channels are weighted by a Gaussian envelope in
//! frequency space and brought back to real space with an inverse FFT. For a
//! correlation radius of `r` grid points on an `n`-point axis, the envelope is
//! ```text
//! cf exp(-d k²),   scale = r / n,   cf = scale sqrt(π v),   d = (π scale)² / 2
//! ```
//! over signed frequency indices `k`, which yields a field of variance `v`
//! whose autocorrelation decays to `1/e` at a lag of `r` points.

use std::f64::consts::PI;
use ndarray as nd;
use num_complex::Complex64 as C64;
use rand::{ Rng, SeedableRng, distributions::Uniform, rngs::StdRng };
use crate::{
    error::{ NoiseError, PositiveError },
    utils::{ Fft2, autocorrelation, decay_length, fft_indices, variance },
};

pub type NResult<T> = Result<T, NoiseError>;

/// Source of a complex multiplicative noise field over a transverse grid.
pub trait NoiseGenerator: std::fmt::Debug + Send {
    fn info(&self) -> &'static str;

    /// Set the grid that subsequent calls to
    /// [`process`][NoiseGenerator::process] will fill.
    fn initialize(&mut self, n_x: usize, n_y: usize, dx: f64, dy: f64)
        -> NResult<()>;

    /// Generate a new realization.
    fn process(&mut self) -> NResult<()>;

    /// The most recent realization, with shape `(n_x, n_y)`.
    fn noise_field(&self) -> NResult<&nd::Array2<C64>>;

    /// Target variance of each channel.
    fn variance_expected(&self) -> f64;

    /// Target correlation radius (m).
    fn r_corr_expected(&self) -> f64;
}

#[derive(Copy, Clone, Debug)]
struct Grid {
    n_x: usize,
    n_y: usize,
    dx: f64,
    dy: f64,
    r_corr_in_points: usize,
}

/// Averaged autocorrelation functions of one realization, indexed by
/// non-negative lag.
#[derive(Clone, Debug)]
pub struct Autocorrs {
    /// Real channel, lag along *x*.
    pub real_x: nd::Array1<f64>,
    /// Real channel, lag along *y*.
    pub real_y: nd::Array1<f64>,
    /// Imaginary channel, lag along *x*.
    pub imag_x: nd::Array1<f64>,
    /// Imaginary channel, lag along *y*.
    pub imag_y: nd::Array1<f64>,
}

#[derive(Clone, Debug)]
struct Realization {
    field: nd::Array2<C64>,
    variance_real: f64,
    variance_imag: f64,
    autocorrs: Autocorrs,
}

/// Complex Gaussian-correlated noise.
#[derive(Clone, Debug)]
pub struct GaussianNoise {
    variance_expected: f64,
    r_corr: f64,
    rng: StdRng,
    grid: Option<Grid>,
    realization: Option<Realization>,
}

impl GaussianNoise {
    /// Target `variance` per channel and correlation radius `r_corr` (m).
    pub fn new(variance: f64, r_corr: f64) -> NResult<Self> {
        PositiveError::check("variance", variance)?;
        PositiveError::check("r_corr", r_corr)?;
        Ok(Self {
            variance_expected: variance,
            r_corr,
            rng: StdRng::from_entropy(),
            grid: None,
            realization: None,
        })
    }

    /// Replace the entropy-seeded generator with a reproducible one.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Correlation radius in units of the coarser grid spacing.
    pub fn r_corr_in_points(&self) -> NResult<usize> {
        self.grid.map(|g| g.r_corr_in_points).ok_or(NoiseError::Uninitialized)
    }

    fn realization(&self) -> NResult<&Realization> {
        self.realization.as_ref().ok_or(NoiseError::Uninitialized)
    }

    /// Sample variance of the real channel.
    pub fn variance_real(&self) -> NResult<f64> {
        self.realization().map(|r| r.variance_real)
    }

    /// Sample variance of the imaginary channel.
    pub fn variance_imag(&self) -> NResult<f64> {
        self.realization().map(|r| r.variance_imag)
    }

    pub fn autocorrs(&self) -> NResult<&Autocorrs> {
        self.realization().map(|r| &r.autocorrs)
    }

    /// Realized correlation radius (m): the `1/e` decay length of each of the
    /// four autocorrelation functions, averaged.
    pub fn r_corr_realized(&self) -> NResult<f64> {
        let grid = self.grid.ok_or(NoiseError::Uninitialized)?;
        let acfs = self.autocorrs()?;
        let lengths = [
            (&acfs.real_x, grid.dx),
            (&acfs.real_y, grid.dy),
            (&acfs.imag_x, grid.dx),
            (&acfs.imag_y, grid.dy),
        ];
        let mut total = 0.0;
        for (acf, d) in lengths {
            let lag = decay_length(acf).ok_or(NoiseError::NoDecay)?;
            total += lag as f64 * d;
        }
        Ok(total / 4.0)
    }

    fn proto(&mut self, grid: &Grid) -> nd::Array2<C64> {
        let n_max = grid.n_x.max(grid.n_y) as f64;
        let scale = grid.r_corr_in_points as f64 / n_max;
        let cf = scale * (PI * self.variance_expected).sqrt();
        let d = 0.5 * (PI * scale).powi(2);
        let s3 = 3.0_f64.sqrt();
        let uniform = Uniform::new_inclusive(-s3, s3);
        let kx = fft_indices(grid.n_x);
        let ky = fft_indices(grid.n_y);
        let rng = &mut self.rng;
        nd::Array2::from_shape_fn((grid.n_x, grid.n_y), |(i, j)| {
            let gauss = cf * (-d * (kx[i].powi(2) + ky[j].powi(2))).exp();
            let a: f64 = rng.sample(&uniform);
            let b: f64 = rng.sample(&uniform);
            C64::new(a * gauss, b * gauss)
        })
    }
}

impl NoiseGenerator for GaussianNoise {
    fn info(&self) -> &'static str { "gaussian_noise" }

    fn initialize(&mut self, n_x: usize, n_y: usize, dx: f64, dy: f64)
        -> NResult<()>
    {
        PositiveError::check("dx", dx)?;
        PositiveError::check("dy", dy)?;
        let r_corr_in_points = (self.r_corr / dx.max(dy)).floor() as usize;
        if r_corr_in_points == 0 {
            return Err(NoiseError::Unresolved { r_corr: self.r_corr, dx, dy });
        }
        self.grid = Some(Grid { n_x, n_y, dx, dy, r_corr_in_points });
        self.realization = None;
        Ok(())
    }

    fn process(&mut self) -> NResult<()> {
        let grid = self.grid.ok_or(NoiseError::Uninitialized)?;
        let mut field = self.proto(&grid);
        Fft2::new(grid.n_x, grid.n_y).inverse(&mut field);
        // undo the 1/(n_x n_y) of the inverse transform
        let n = (grid.n_x * grid.n_y) as f64;
        field.map_inplace(|fk| { *fk *= n; });

        let real: nd::Array2<f64> = field.mapv(|fk| fk.re);
        let imag: nd::Array2<f64> = field.mapv(|fk| fk.im);
        let autocorrs = Autocorrs {
            real_x: autocorrelation(&real, nd::Axis(0)),
            real_y: autocorrelation(&real, nd::Axis(1)),
            imag_x: autocorrelation(&imag, nd::Axis(0)),
            imag_y: autocorrelation(&imag, nd::Axis(1)),
        };
        self.realization = Some(Realization {
            variance_real: variance(&real),
            variance_imag: variance(&imag),
            field,
            autocorrs,
        });
        Ok(())
    }

    fn noise_field(&self) -> NResult<&nd::Array2<C64>> {
        self.realization().map(|r| &r.field)
    }

    fn variance_expected(&self) -> f64 { self.variance_expected }

    fn r_corr_expected(&self) -> f64 { self.r_corr }
}
