//! Nonlinear (Kerr) phase step.

use ndarray as nd;
use num_complex::Complex64 as C64;
use crate::beam::Beam;

/// Applies the intensity-dependent phase rotation
/// ```text
/// A ← A exp(-i k_0 n_2 I_0 |A|² dz / n_0)
/// ```
/// using the intensity cached on the beam.
#[derive(Copy, Clone, Debug)]
pub struct KerrExecutor {
    nonlin_phase_const: C64,
}

impl KerrExecutor {
    /// Precompute `-i r_kerr / (2 z_diff)` for `beam`, which equals
    /// `-i k_0 n_2 i_0 / n_0`.
    pub fn new<B: Beam>(beam: &B) -> Self {
        let nonlin_phase_const
            = -0.5 * C64::i() * beam.r_kerr() / beam.z_diff();
        Self { nonlin_phase_const }
    }

    pub fn info(&self) -> &'static str { "kerr_effect" }

    /// Phase advance per unit length per unit normalized intensity (m^-1).
    pub fn nonlin_phase_const(&self) -> C64 { self.nonlin_phase_const }

    /// Rotate the field phase in place. The beam's intensity is not refreshed.
    pub fn process_kerr_effect<B: Beam>(&self, beam: &mut B, dz: f64) {
        let phase = self.nonlin_phase_const * dz;
        let core = beam.core_mut();
        nd::Zip::from(&mut core.field).and(&core.intensity)
            .for_each(|fk, ik| { *fk *= (phase * *ik).exp(); });
    }
}
