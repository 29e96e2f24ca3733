//! Discretized beam envelopes.
//!
//! Three geometries are provided:
//! - [`SlabBeam`]: a single transverse coordinate *x*
//! - [`RadialBeam`]: an axisymmetric beam in the radial coordinate *r*
//! - [`TransverseBeam`]: a full (*x*, *y*) transverse plane
//!
//! Each owns a [`BeamCore`] holding the complex field, its intensity and the
//! scalars derived at construction. The field is dimensionless; absolute
//! intensities are `i_0 * intensity`.

use std::f64::consts::PI;
use ndarray as nd;
use num_complex::Complex64 as C64;
use crate::{
    error::BeamError,
    medium::Medium,
    utils::gamma_int,
};

pub mod slab;
pub mod radial;
pub mod transverse;

pub use slab::{ SlabBeam, SlabParams };
pub use radial::{ RadialBeam, RadialParams };
pub use transverse::{ TransverseBeam, TransverseParams };

pub type BResult<T> = Result<T, BeamError>;

/// Shape class of the initial envelope.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DistributionType {
    /// `M = 0`, `m = 0`.
    Gauss,
    /// `M > 0`, `m = 0`: a ring with a flat phase.
    Ring,
    /// `M = m > 0`: an optical vortex.
    Vortex,
}

impl DistributionType {
    /// Classify a polynomial order `M` and topological charge `m`.
    pub fn from_mode(M: usize, m: usize) -> BResult<Self> {
        match (M, m) {
            (0, 0) => Ok(Self::Gauss),
            (_, 0) => Ok(Self::Ring),
            (M, m) if M == m => Ok(Self::Vortex),
            (M, m) => Err(BeamError::BadMode { M, m }),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Gauss => "gauss",
            Self::Ring => "ring",
            Self::Vortex => "vortex",
        }
    }
}

/// Critical self-focusing power of a Gaussian beam (W).
pub fn p_gauss(lmbda: f64, n_0: f64, n_2: f64) -> f64 {
    3.77 * lmbda.powi(2) / (8.0 * PI * n_0 * n_2)
}

/// Critical self-focusing power of an optical vortex with topological charge
/// `m`, given the Gaussian critical power `p_g` (W).
pub fn p_vortex(p_g: f64, m: usize) -> f64 {
    p_g * 2.0_f64.powi(2 * m as i32 + 1)
        * gamma_int(m + 1) * gamma_int(m + 2)
        / (2.0 * gamma_int(2 * m + 1))
}

/// Field, intensity and scalars shared by every beam geometry.
#[derive(Clone, Debug)]
pub struct BeamCore<D: nd::Dimension> {
    pub(crate) medium: Medium,
    pub(crate) M: usize,
    pub(crate) m: usize,
    pub(crate) distribution_type: DistributionType,
    pub(crate) i_0: f64,
    pub(crate) z_diff: f64,
    pub(crate) r_kerr: f64,
    pub(crate) field: nd::Array<C64, D>,
    pub(crate) intensity: nd::Array<f64, D>,
    pub(crate) i_max: f64,
}

impl<D: nd::Dimension> BeamCore<D> {
    // `r_kerr` follows from `i_0` and `z_diff`; the intensity is brought up to
    // date immediately
    pub(crate) fn new(
        medium: Medium,
        M: usize,
        m: usize,
        distribution_type: DistributionType,
        field: nd::Array<C64, D>,
        i_0: f64,
        z_diff: f64,
    ) -> Self {
        let r_kerr
            = 2.0 * medium.k_0() * medium.n_2() * i_0 * z_diff / medium.n_0();
        let intensity = nd::Array::zeros(field.raw_dim());
        let mut core = Self {
            medium,
            M,
            m,
            distribution_type,
            i_0,
            z_diff,
            r_kerr,
            field,
            intensity,
            i_max: 0.0,
        };
        core.update_intensity();
        core
    }

    pub(crate) fn update_intensity(&mut self) {
        nd::Zip::from(&mut self.intensity).and(&self.field)
            .for_each(|ik, fk| { *ik = fk.re * fk.re + fk.im * fk.im; });
        self.i_max = peak(&self.intensity);
    }
}

// maximum that propagates NaN instead of skipping it
fn peak<D: nd::Dimension>(a: &nd::Array<f64, D>) -> f64 {
    a.fold(0.0_f64, |acc, ak| {
        if acc.is_nan() || ak.is_nan() { f64::NAN } else { acc.max(*ak) }
    })
}

/// Common interface to all beam geometries.
///
/// Implementors only expose their [`BeamCore`] and geometry-specific
/// quantities; every shared accessor is provided.
pub trait Beam {
    /// Dimensionality of the field array.
    type Dim: nd::Dimension;

    fn core(&self) -> &BeamCore<Self::Dim>;

    fn core_mut(&mut self) -> &mut BeamCore<Self::Dim>;

    /// Short geometry tag.
    fn info(&self) -> &'static str;

    /// Total discrete power of the current field, `i_0 ∫ intensity`. For the
    /// slab geometry this is a power per unit length.
    fn power(&self) -> f64;

    /// Geometry-specific parameters as `(name, value, unit)` in reporting
    /// units.
    fn parameters(&self) -> Vec<(&'static str, f64, &'static str)>;

    fn medium(&self) -> &Medium { &self.core().medium }

    /// Vacuum wavelength (m).
    fn lmbda(&self) -> f64 { self.core().medium.lmbda() }

    fn field(&self) -> &nd::Array<C64, Self::Dim> { &self.core().field }

    fn field_mut(&mut self) -> &mut nd::Array<C64, Self::Dim> {
        &mut self.core_mut().field
    }

    /// Normalized intensity `|field|²`, as of the last call to
    /// [`update_intensity`][Beam::update_intensity].
    fn intensity(&self) -> &nd::Array<f64, Self::Dim> {
        &self.core().intensity
    }

    /// Reference intensity (W m^-2).
    fn i_0(&self) -> f64 { self.core().i_0 }

    /// Normalized peak intensity, as of the last call to
    /// [`update_intensity`][Beam::update_intensity].
    fn i_max(&self) -> f64 { self.core().i_max }

    /// Diffraction length (m).
    fn z_diff(&self) -> f64 { self.core().z_diff }

    /// Dimensionless Kerr parameter `2 k_0 n_2 i_0 z_diff / n_0`.
    fn r_kerr(&self) -> f64 { self.core().r_kerr }

    /// Polynomial order of the envelope.
    fn M(&self) -> usize { self.core().M }

    /// Topological charge.
    fn m(&self) -> usize { self.core().m }

    fn distribution_type(&self) -> DistributionType {
        self.core().distribution_type
    }

    /// Shape of the field array.
    fn shape(&self) -> &[usize] { self.core().field.shape() }

    /// Recompute the intensity and its peak from the current field.
    fn update_intensity(&mut self) { self.core_mut().update_intensity(); }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn mode_rules() {
        assert_eq!(DistributionType::from_mode(0, 0).unwrap(), DistributionType::Gauss);
        assert_eq!(DistributionType::from_mode(3, 0).unwrap(), DistributionType::Ring);
        assert_eq!(DistributionType::from_mode(2, 2).unwrap(), DistributionType::Vortex);
        assert!(matches!(
            DistributionType::from_mode(0, 1),
            Err(BeamError::BadMode { M: 0, m: 1 }),
        ));
        assert!(matches!(
            DistributionType::from_mode(2, 1),
            Err(BeamError::BadMode { M: 2, m: 1 }),
        ));
    }

    #[test]
    fn critical_powers() {
        let p_g = p_gauss(800e-9, 1.453, 3.4e-20);
        assert_relative_eq!(p_g, 3.77 * 64e-14 / (8.0 * PI * 1.453 * 3.4e-20), max_relative = 1e-12);
        assert_relative_eq!(p_vortex(p_g, 0), p_g, max_relative = 1e-12);
        assert_relative_eq!(p_vortex(p_g, 1), 4.0 * p_g, max_relative = 1e-12);
        // 2^5 * 2! * 3! / (2 * 4!) = 8
        assert_relative_eq!(p_vortex(p_g, 2), 8.0 * p_g, max_relative = 1e-12);
    }

    #[test]
    fn nan_peak() {
        let a = nd::array![1.0, f64::NAN, 3.0];
        assert!(peak(&a).is_nan());
        let b = nd::array![1.0, 4.0, 3.0];
        assert_eq!(peak(&b), 4.0);
    }
}
