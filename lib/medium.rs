//! Linear and nonlinear optical properties of the propagation medium.
//!
//! The linear refractive index follows a three-term Sellmeier law
//! ```text
//!               3      C_i
//! n²(ω) = 1 +   Σ  -----------
//!              i=1 1 - (ω/ω_i)²
//! ```
//! and the wave number together with its first two frequency derivatives are
//! evaluated from the analytic derivatives of this expression. The Kerr index
//! `n_2` is taken to be dispersionless.

use std::{ f64::consts::PI, fmt, str::FromStr };
use crate::{ error::MediumError, units::Constants };

pub type MResult<T> = Result<T, MediumError>;

/// Catalogue of supported materials.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Material {
    /// Fused silica.
    SiO2,
    /// Calcium fluoride.
    CaF2,
    /// Lithium fluoride.
    LiF,
}

impl Material {
    /// Sellmeier oscillator strengths `C_i`.
    pub fn strengths(self) -> [f64; 3] {
        match self {
            Self::SiO2 => [0.6961663, 0.4079426, 0.8974794],
            Self::CaF2 => [0.5675888, 0.4710914, 3.8484723],
            Self::LiF => [0.92549, 6.96747, 0.0],
        }
    }

    /// Sellmeier resonance wavelengths `λ_i` (m).
    ///
    /// The third LiF term has zero strength; its resonance is parked far in
    /// the UV so that it never divides by zero.
    pub fn resonances(self) -> [f64; 3] {
        match self {
            Self::SiO2 => [0.0684043e-6, 0.1162414e-6, 9.896161e-6],
            Self::CaF2 => [0.050263605e-6, 0.1003909e-6, 34.64904e-6],
            Self::LiF => [0.07376e-6, 32.79e-6, 1e-10],
        }
    }

    /// Nonlinear (Kerr) refractive index `n_2` (m^2 W^-1).
    pub fn n_2(self) -> f64 {
        match self {
            Self::SiO2 => 3.4e-20,
            Self::CaF2 => 1.92e-20,
            Self::LiF => 1.0e-20,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::SiO2 => "SiO2",
            Self::CaF2 => "CaF2",
            Self::LiF => "LiF",
        }
    }
}

impl FromStr for Material {
    type Err = MediumError;

    fn from_str(s: &str) -> MResult<Self> {
        match s {
            "SiO2" => Ok(Self::SiO2),
            "CaF2" => Ok(Self::CaF2),
            "LiF" => Ok(Self::LiF),
            _ => Err(MediumError(s.to_string())),
        }
    }
}

impl fmt::Display for Material {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Optical constants of a material at a fixed carrier wavelength.
///
/// All values are fixed at construction.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Medium {
    material: Material,
    lmbda: f64,
    omega: f64,
    n_0: f64,
    k_0: f64,
    k_1: f64,
    k_2: f64,
    n_2: f64,
}

impl Medium {
    /// Look up `name` in the catalogue and evaluate its dispersion at vacuum
    /// wavelength `lmbda` (m).
    pub fn new(name: &str, lmbda: f64, consts: &Constants) -> MResult<Self> {
        let material: Material = name.parse()?;
        Ok(Self::from_material(material, lmbda, consts))
    }

    /// Evaluate the dispersion of `material` at vacuum wavelength `lmbda` (m).
    pub fn from_material(material: Material, lmbda: f64, consts: &Constants)
        -> Self
    {
        let c = consts.c;
        let omega = 2.0 * PI * c / lmbda;

        // S = n², T1 = dS/dω / 2, T2 = dT1/dω
        let mut S = 1.0;
        let mut T1 = 0.0;
        let mut T2 = 0.0;
        let iter
            = material.strengths().into_iter()
            .zip(material.resonances());
        for (Ci, li) in iter {
            let wi = 2.0 * PI * c / li;
            let wi2 = wi * wi;
            let ui = 1.0 - (omega / wi).powi(2);
            S += Ci / ui;
            T1 += Ci * omega / (wi2 * ui.powi(2));
            T2 += 4.0 * Ci * omega.powi(2) / (wi2 * wi2 * ui.powi(3))
                + Ci / (wi2 * ui.powi(2));
        }

        let n_0 = S.sqrt();
        let k_0 = omega * n_0 / c;
        let k_1 = (n_0 + omega * T1 / n_0) / c;
        let k_2 = (
            2.0 * T1 / n_0
            + omega * T2 / n_0
            - omega * T1.powi(2) / n_0.powi(3)
        ) / c;

        Self {
            material,
            lmbda,
            omega,
            n_0,
            k_0,
            k_1,
            k_2,
            n_2: material.n_2(),
        }
    }

    /// Material name.
    pub fn info(&self) -> &'static str { self.material.name() }

    pub fn material(&self) -> Material { self.material }

    /// Vacuum wavelength (m).
    pub fn lmbda(&self) -> f64 { self.lmbda }

    /// Carrier angular frequency (s^-1).
    pub fn omega(&self) -> f64 { self.omega }

    /// Linear refractive index.
    pub fn n_0(&self) -> f64 { self.n_0 }

    /// Wave number in the medium (m^-1).
    pub fn k_0(&self) -> f64 { self.k_0 }

    /// Inverse group velocity, dk/dω (s m^-1).
    pub fn k_1(&self) -> f64 { self.k_1 }

    /// Group velocity dispersion, d²k/dω² (s^2 m^-1).
    pub fn k_2(&self) -> f64 { self.k_2 }

    /// Kerr index (m^2 W^-1).
    pub fn n_2(&self) -> f64 { self.n_2 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn sio2_at_800nm() {
        let med = Medium::new("SiO2", 800e-9, &Constants::default()).unwrap();
        assert_eq!(med.info(), "SiO2");
        assert_relative_eq!(med.n_0(), 1.453317, max_relative = 1e-6);
        assert_relative_eq!(med.k_0(), 1.1414327e7, max_relative = 1e-6);
        assert_relative_eq!(med.k_1(), 4.893868e-9, max_relative = 1e-6);
        // ≈ 36.16 fs²/mm
        assert_relative_eq!(med.k_2(), 3.61620e-26, max_relative = 1e-4);
        assert_relative_eq!(med.n_2(), 3.4e-20);
    }

    #[test]
    fn sio2_at_1800nm_is_anomalous() {
        let med = Medium::new("SiO2", 1800e-9, &Constants::default()).unwrap();
        assert_relative_eq!(med.n_0(), 1.440874, max_relative = 1e-6);
        assert!(med.k_2() < 0.0);
    }

    #[test]
    fn fluorides_at_800nm() {
        let consts = Constants::default();
        let caf2 = Medium::new("CaF2", 800e-9, &consts).unwrap();
        assert_relative_eq!(caf2.n_0(), 1.430529, max_relative = 1e-6);
        assert_relative_eq!(caf2.n_2(), 1.92e-20);
        let lif = Medium::new("LiF", 800e-9, &consts).unwrap();
        assert_relative_eq!(lif.n_0(), 1.388983, max_relative = 1e-6);
        assert_relative_eq!(lif.k_2(), 2.04440e-26, max_relative = 1e-4);
    }

    #[test]
    fn unknown_medium() {
        let err = Medium::new("BK7", 800e-9, &Constants::default()).unwrap_err();
        assert_eq!(err.0, "BK7");
    }
}
