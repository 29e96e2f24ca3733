#![allow(non_upper_case_globals)]

//! Physical constants and the scale factors used when reporting quantities in
//! laboratory units.
//!
//! Concrete physical constants are taken from NIST.

use std::f64::consts::PI;

/// Planck constant (kg m^2 s^-1)
pub const h: f64 = 6.62607015e-34;
//             +/- 0 (exact)

/// reduced Planck constant (kg m^2 s^-1)
pub const hbar: f64 = h / 2.0 / PI;
//                +/- 0 (exact)

/// speed of light in vacuum (m s^-1)
pub const c: f64 = 2.99792458e8;
//             +/- 0 (exact)

/// elementary charge (C)
pub const e: f64 = 1.602176634e-19;
//             +/- 0 (exact)

/// Bundle of constants handed to [`Medium`][crate::medium::Medium] at
/// construction.
///
/// Only `c` enters the dispersion relations; `hbar` and `e` are carried for
/// photon-energy bookkeeping in reports.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Constants {
    /// Speed of light in vacuum (m s^-1).
    pub c: f64,
    /// Reduced Planck constant (kg m^2 s^-1).
    pub hbar: f64,
    /// Elementary charge (C).
    pub e: f64,
}

impl Default for Constants {
    fn default() -> Self { Self { c, hbar, e } }
}

impl Constants {
    /// Photon energy (eV) at vacuum wavelength `lmbda` (m).
    pub fn photon_energy_ev(&self, lmbda: f64) -> f64 {
        2.0 * PI * self.hbar * self.c / lmbda / self.e
    }
}

/// Scale factors converting SI values to the units used in parameter
/// summaries, e.g. `x / units::um` gives `x` in micrometers.
pub mod report {
    /// micrometer (m)
    pub const um: f64 = 1e-6;
    /// nanometer (m)
    pub const nm: f64 = 1e-9;
    /// centimeter (m)
    pub const cm: f64 = 1e-2;
    /// millimeter (m)
    pub const mm: f64 = 1e-3;
    /// megawatt (W)
    pub const MW: f64 = 1e6;
    /// terawatt per square centimeter (W m^-2)
    pub const TW_cm2: f64 = 1e16;
    /// femtosecond (s)
    pub const fs: f64 = 1e-15;
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn photon_energy_at_800nm() {
        let consts = Constants::default();
        assert_relative_eq!(consts.photon_energy_ev(800e-9), 1.5498, epsilon = 1e-3);
    }
}
