//! Miscellaneous tools.

use std::{ f64::consts::TAU, sync::Arc };
use ndarray::{ self as nd, concatenate };
use num_complex::Complex64 as C64;
use num_traits::Float;
use rustfft::{ self as fft, Fft };
use crate::{ Arr1, Arr2 };

/// Integrate using the trapezoidal rule.
///
/// *Panics if `y` has length less than 2*.
pub fn trapz<S, A>(y: &Arr1<S>, dx: A) -> A
where
    S: nd::Data<Elem = A>,
    A: Float,
{
    let n: usize = y.len();
    let two = A::one() + A::one();
    let inner = y.slice(nd::s![1..n - 1]).iter()
        .fold(A::zero(), |acc, yk| acc + *yk);
    (dx / two) * (y[0] + two * inner + y[n - 1])
}

/// Generate an array of frequency-space coordinates to accompany a FFT of `n`
/// points for sampling time `dt`.
pub fn fft_freq(n: usize, dt: f64) -> nd::Array1<f64> {
    if n % 2 == 0 {
        let fp: nd::Array1<f64>
            = (0..n / 2)
            .map(|k| k as f64 / (n as f64 * dt))
            .collect();
        let fm: nd::Array1<f64>
            = (1..n / 2 + 1).rev()
            .map(|k| -(k as f64) / (n as f64 * dt))
            .collect();
        concatenate!(nd::Axis(0), fp, fm)
    } else {
        let fp: nd::Array1<f64>
            = (0..(n + 1) / 2)
            .map(|k| k as f64 / (n as f64 * dt))
            .collect();
        let fm: nd::Array1<f64>
            = (1..(n + 1) / 2).rev()
            .map(|k| -(k as f64) / (n as f64 * dt))
            .collect();
        concatenate!(nd::Axis(0), fp, fm)
    }
}

/// Angular wave numbers accompanying a FFT of `n` points with spacing `d`, in
/// standard FFT order.
pub fn wave_numbers(n: usize, d: f64) -> nd::Array1<f64> {
    fft_freq(n, d).mapv(|f| TAU * f)
}

/// Signed integer frequency indices of a FFT of `n` points, in standard FFT
/// order (`0, 1, ..., -2, -1`).
pub fn fft_indices(n: usize) -> nd::Array1<f64> {
    let m = (n + 1) / 2;
    (0..n)
        .map(|k| if k < m { k as f64 } else { k as f64 - n as f64 })
        .collect()
}

/// Transform every lane of `a` along `axis` in place, in parallel over lanes.
fn process_lanes(plan: &Arc<dyn Fft<f64>>, a: &mut nd::Array2<C64>, axis: nd::Axis) {
    nd::Zip::from(a.lanes_mut(axis))
        .par_for_each(|mut lane| {
            if let Some(buf) = lane.as_slice_mut() {
                plan.process(buf);
            } else {
                let mut buf: Vec<C64> = lane.to_vec();
                plan.process(&mut buf);
                lane.iter_mut().zip(buf)
                    .for_each(|(lk, bk)| { *lk = bk; });
            }
        });
}

/// Cached plans for the two-dimensional, complex-valued FFT over a fixed
/// `(n_x, n_y)` grid.
///
/// Both passes run their independent lanes on the current rayon pool.
#[derive(Clone)]
pub struct Fft2 {
    n_x: usize,
    n_y: usize,
    fwd_x: Arc<dyn Fft<f64>>,
    fwd_y: Arc<dyn Fft<f64>>,
    inv_x: Arc<dyn Fft<f64>>,
    inv_y: Arc<dyn Fft<f64>>,
}

impl std::fmt::Debug for Fft2 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Fft2")
            .field("n_x", &self.n_x)
            .field("n_y", &self.n_y)
            .finish()
    }
}

impl Fft2 {
    pub fn new(n_x: usize, n_y: usize) -> Self {
        let mut planner = fft::FftPlanner::new();
        Self {
            n_x,
            n_y,
            fwd_x: planner.plan_fft_forward(n_x),
            fwd_y: planner.plan_fft_forward(n_y),
            inv_x: planner.plan_fft_inverse(n_x),
            inv_y: planner.plan_fft_inverse(n_y),
        }
    }

    pub fn shape(&self) -> (usize, usize) { (self.n_x, self.n_y) }

    /// Unnormalized forward transform in place.
    ///
    /// *Panics if the shape of `a` does not match the planned grid.*
    pub fn forward(&self, a: &mut nd::Array2<C64>) {
        assert_eq!(a.dim(), (self.n_x, self.n_y));
        process_lanes(&self.fwd_y, a, nd::Axis(1));
        process_lanes(&self.fwd_x, a, nd::Axis(0));
    }

    /// Inverse transform in place, normalized by `1 / (n_x n_y)`.
    ///
    /// *Panics if the shape of `a` does not match the planned grid.*
    pub fn inverse(&self, a: &mut nd::Array2<C64>) {
        assert_eq!(a.dim(), (self.n_x, self.n_y));
        process_lanes(&self.inv_y, a, nd::Axis(1));
        process_lanes(&self.inv_x, a, nd::Axis(0));
        let n = (self.n_x * self.n_y) as f64;
        a.par_map_inplace(|ak| { *ak /= n; });
    }
}

/// Compute the linear (zero-padded) autocorrelation of every lane of `a` along
/// `axis` for non-negative lags, and average over lanes.
///
/// The result has length `a.len_of(axis)`; element `k` is
/// `Σ_j a[j] a[j + k]` averaged over lanes.
pub fn autocorrelation<S>(a: &Arr2<S>, axis: nd::Axis) -> nd::Array1<f64>
where S: nd::Data<Elem = f64>
{
    let n = a.len_of(axis);
    let n_pad = 2 * n;
    let mut planner = fft::FftPlanner::new();
    let fwd = planner.plan_fft_forward(n_pad);
    let inv = planner.plan_fft_inverse(n_pad);
    let mut acf: nd::Array1<f64> = nd::Array1::zeros(n);
    let mut buf: Vec<C64> = vec![C64::from(0.0); n_pad];
    let mut n_lanes: usize = 0;
    for lane in a.lanes(axis) {
        buf.iter_mut().for_each(|bk| { *bk = C64::from(0.0); });
        buf.iter_mut().zip(lane.iter())
            .for_each(|(bk, ak)| { *bk = C64::from(*ak); });
        fwd.process(&mut buf);
        buf.iter_mut().for_each(|bk| { *bk = C64::from(bk.norm_sqr()); });
        inv.process(&mut buf);
        acf.iter_mut().zip(&buf)
            .for_each(|(ck, bk)| { *ck += bk.re / n_pad as f64; });
        n_lanes += 1;
    }
    if n_lanes > 0 {
        acf /= n_lanes as f64;
    }
    acf
}

/// Return the first lag at which `acf` falls below `acf[0] / e`.
pub fn decay_length<S>(acf: &Arr1<S>) -> Option<usize>
where S: nd::Data<Elem = f64>
{
    let th = *acf.get(0)? * (-1.0_f64).exp();
    acf.iter().position(|ak| *ak < th)
}

/// Population variance of all elements of an array.
pub fn variance<S, D>(a: &nd::ArrayBase<S, D>) -> f64
where
    S: nd::Data<Elem = f64>,
    D: nd::Dimension,
{
    let n = a.len() as f64;
    let mean = a.sum() / n;
    a.fold(0.0, |acc, ak| acc + (ak - mean).powi(2)) / n
}

/// Γ(`n`) for positive integer `n`, i.e. (`n` - 1)!.
///
/// *Panics if `n` is 0.*
pub fn gamma_int(n: usize) -> f64 {
    assert!(n > 0, "gamma_int: argument must be positive");
    (1..n).fold(1.0, |acc, k| acc * k as f64)
}
