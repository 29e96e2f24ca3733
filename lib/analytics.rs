//! Closed-form reference results used to validate propagation runs.

/// Number of transverse dimensions a beam spreads in.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Spread {
    /// Slab beams.
    OneDim,
    /// Radial and full transverse beams.
    TwoDim,
}

impl Spread {
    fn exponent(self) -> f64 {
        match self {
            Self::OneDim => 0.5,
            Self::TwoDim => 1.0,
        }
    }
}

/// On-axis peak intensity of a linearly diffracting Gaussian beam at `z`,
/// relative to its value at `z = 0`:
/// ```text
/// I(z) / I(0) = 1 / (1 + (z / z_diff)²)^p
/// ```
/// with `p = 1/2` for [`Spread::OneDim`] and `p = 1` for [`Spread::TwoDim`].
pub fn gaussian_peak_ratio(z: f64, z_diff: f64, spread: Spread) -> f64 {
    (1.0 + (z / z_diff).powi(2)).powf(-spread.exponent())
}

/// Marburger's empirical self-focusing distance for a collimated Gaussian beam
/// of power `p0_to_pcr` in units of the Gaussian critical power:
/// ```text
/// z_sf = 0.367 z_diff / sqrt((sqrt(P / P_G) - 0.852)² - 0.0219)
/// ```
/// Returns `None` where the formula has no real solution, i.e. for powers at
/// or below about `P_G`.
pub fn marburger_distance(p0_to_pcr: f64, z_diff: f64) -> Option<f64> {
    if p0_to_pcr <= 0.0 { return None; }
    let arg = (p0_to_pcr.sqrt() - 0.852).powi(2) - 0.0219;
    let below_threshold = p0_to_pcr.sqrt() <= 0.852 || arg <= 0.0;
    (!below_threshold).then(|| 0.367 * z_diff / arg.sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn diffraction_law() {
        assert_relative_eq!(gaussian_peak_ratio(0.0, 1.0, Spread::OneDim), 1.0);
        assert_relative_eq!(
            gaussian_peak_ratio(1.0, 1.0, Spread::OneDim), 0.5_f64.sqrt());
        assert_relative_eq!(gaussian_peak_ratio(1.0, 1.0, Spread::TwoDim), 0.5);
        assert_relative_eq!(gaussian_peak_ratio(-2.0, 1.0, Spread::TwoDim), 0.2, max_relative = 1e-12);
    }

    #[test]
    fn marburger() {
        assert!(marburger_distance(0.99, 1.0).is_none());
        assert!(marburger_distance(0.5, 1.0).is_none());
        assert!(marburger_distance(-1.0, 1.0).is_none());
        let z4 = marburger_distance(4.0, 2.0).unwrap();
        let expected = 0.367 * 2.0 / ((2.0_f64 - 0.852).powi(2) - 0.0219).sqrt();
        assert_relative_eq!(z4, expected);
        // more power collapses sooner
        assert!(marburger_distance(9.0, 2.0).unwrap() < z4);
    }
}
