//! Split-step propagation engine.
//!
//! Each step applies, in order, linear diffraction, the Kerr phase rotation,
//! and an intensity refresh, then advances *z* and (optionally) adapts the step
//! size. The run ends after `n_z` steps or as soon as the absolute peak
//! intensity exceeds a stopping threshold, whichever comes first.
//!
//! ```ignore
//! let beam = RadialBeam::new(&RadialParams::default())?;
//! let diffraction = SweepDiffractionR::new(&beam);
//! let params = PropagationParams { n_z: 1000, dz0: beam.z_diff() / 1000.0, ..Default::default() };
//! let mut prop = Propagator::new(beam, params)?
//!     .with_diffraction(diffraction)
//!     .with_kerr_effect();
//! let track = prop.propagate()?;
//! ```

use std::time::{ Duration, Instant };
use ndarray as nd;
use crate::{
    beam::Beam,
    diffraction::DiffractionExecutor,
    error::PropagationError,
    kerr::KerrExecutor,
};

pub type PResult<T> = Result<T, PropagationError>;

/// Adaptive step-size rule.
///
/// With `φ = k_0 n_2 I_max dz / n_0` the nonlinear phase a step of size `dz`
/// would accumulate on axis, `dz` is replaced by `safety * nonlin_phase_max / φ
/// * dz` whenever `φ > nonlin_phase_max`. The step never grows.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct StepControl {
    /// Largest nonlinear phase increment allowed per step (rad).
    pub nonlin_phase_max: f64,
    /// Extra shrink factor applied on top of the exact ratio.
    pub safety: f64,
}

impl Default for StepControl {
    fn default() -> Self { Self { nonlin_phase_max: 0.05, safety: 0.8 } }
}

impl StepControl {
    /// Return the step to use after `dz`, given the absolute peak intensity
    /// `i_max` (W m^-2) and the phase coefficient `k_0 n_2 / n_0`.
    pub fn update(&self, dz: f64, i_max: f64, kerr_coeff: f64) -> f64 {
        let nonlin_phase = kerr_coeff * i_max * dz;
        if nonlin_phase > self.nonlin_phase_max {
            dz * self.safety * self.nonlin_phase_max / nonlin_phase
        } else {
            dz
        }
    }
}

/// Parameters of a propagation run.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PropagationParams {
    /// Step budget.
    pub n_z: usize,
    /// Initial step size (m).
    pub dz0: f64,
    /// Disable adaptive stepping.
    pub const_dz: bool,
    /// Absolute peak intensity (W m^-2) above which the run stops early.
    pub max_intensity_to_stop: f64,
    pub step_control: StepControl,
}

impl Default for PropagationParams {
    fn default() -> Self {
        Self {
            n_z: 1000,
            dz0: 1e-5,
            const_dz: false,
            max_intensity_to_stop: 1e17,
            step_control: StepControl::default(),
        }
    }
}

impl PropagationParams {
    fn check(&self) -> PResult<()> {
        PropagationError::check_step("dz0", self.dz0)?;
        PropagationError::check_step(
            "max_intensity_to_stop", self.max_intensity_to_stop)?;
        PropagationError::check_step(
            "nonlin_phase_max", self.step_control.nonlin_phase_max)?;
        PropagationError::check_step("safety", self.step_control.safety)?;
        Ok(())
    }
}

/// Snapshot of the scalars recorded after a step.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct State {
    pub n_step: usize,
    /// Longitudinal coordinate (m).
    pub z: f64,
    /// Step size in effect for the next step (m).
    pub dz: f64,
    /// Peak intensity in units of `i_0`.
    pub i_max_normalized: f64,
    /// Peak intensity (W m^-2).
    pub i_max: f64,
}

impl State {
    pub fn row(&self) -> [f64; 4] {
        [self.z, self.dz, self.i_max_normalized, self.i_max]
    }
}

/// Per-step record of a run, one row per recorded step with columns
/// [`Track::COLUMNS`].
#[derive(Clone, Debug)]
pub struct Track {
    data: nd::Array2<f64>,
    n_rows: usize,
}

impl Track {
    pub const COLUMNS: [&'static str; 4]
        = ["z, m", "dz, m", "i_max / i_0", "i_max, W / m^2"];

    fn with_capacity(n: usize) -> Self {
        Self { data: nd::Array2::zeros((n, 4)), n_rows: 0 }
    }

    fn push(&mut self, state: &State) {
        self.data.row_mut(self.n_rows)
            .iter_mut().zip(state.row())
            .for_each(|(dk, sk)| { *dk = sk; });
        self.n_rows += 1;
    }

    // drop the unused tail after an early stop
    fn crop(&mut self) {
        if self.n_rows < self.data.nrows() {
            self.data = self.data.slice(nd::s![..self.n_rows, ..]).to_owned();
        }
    }

    /// Number of recorded rows.
    pub fn len(&self) -> usize { self.n_rows }

    pub fn is_empty(&self) -> bool { self.n_rows == 0 }

    /// All recorded rows.
    pub fn rows(&self) -> nd::ArrayView2<'_, f64> {
        self.data.slice(nd::s![..self.n_rows, ..])
    }

    pub fn z(&self) -> nd::ArrayView1<'_, f64> {
        self.data.slice(nd::s![..self.n_rows, 0])
    }

    pub fn dz(&self) -> nd::ArrayView1<'_, f64> {
        self.data.slice(nd::s![..self.n_rows, 1])
    }

    pub fn i_max_normalized(&self) -> nd::ArrayView1<'_, f64> {
        self.data.slice(nd::s![..self.n_rows, 2])
    }

    pub fn i_max(&self) -> nd::ArrayView1<'_, f64> {
        self.data.slice(nd::s![..self.n_rows, 3])
    }

    /// The most recent row.
    pub fn last(&self) -> Option<[f64; 4]> {
        (self.n_rows > 0).then(|| {
            let r = self.data.row(self.n_rows - 1);
            [r[0], r[1], r[2], r[3]]
        })
    }
}

/// Wall time accumulated in each stage of the step loop.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct StageTimes {
    pub diffraction: Duration,
    pub kerr_effect: Duration,
    pub intensity: Duration,
    pub step_control: Duration,
    pub monitor: Duration,
}

impl StageTimes {
    pub fn total(&self) -> Duration {
        self.diffraction
            + self.kerr_effect
            + self.intensity
            + self.step_control
            + self.monitor
    }
}

fn timed<T, F>(acc: &mut Duration, f: F) -> T
where F: FnOnce() -> T
{
    let t0 = Instant::now();
    let out = f();
    *acc += t0.elapsed();
    out
}

/// Observer of a propagation run.
///
/// All methods default to doing nothing; `()` is the silent monitor.
pub trait Monitor<B: Beam> {
    /// Called once before the first step.
    fn on_start(&mut self, _beam: &B, _params: &PropagationParams)
        -> PResult<()>
    {
        Ok(())
    }

    /// Called after every recorded step, including the initial state.
    fn on_step(&mut self, _beam: &B, _state: &State) -> PResult<()> {
        Ok(())
    }

    /// Called once after the last step.
    fn on_finish(&mut self, _beam: &B, _track: &Track, _times: &StageTimes)
        -> PResult<()>
    {
        Ok(())
    }
}

impl<B: Beam> Monitor<B> for () { }

/// Owns a beam and the executors acting on it, and drives the step loop.
///
/// Both executors are optional; a missing one skips its sub-step.
pub struct Propagator<B: Beam> {
    beam: B,
    diffraction: Option<Box<dyn DiffractionExecutor<B>>>,
    kerr_effect: Option<KerrExecutor>,
    params: PropagationParams,
    z: f64,
    dz: f64,
    times: StageTimes,
    stopped_early: bool,
}

impl<B: Beam> Propagator<B> {
    pub fn new(beam: B, params: PropagationParams) -> PResult<Self> {
        params.check()?;
        Ok(Self {
            beam,
            diffraction: None,
            kerr_effect: None,
            params,
            z: 0.0,
            dz: params.dz0,
            times: StageTimes::default(),
            stopped_early: false,
        })
    }

    pub fn with_diffraction<D>(mut self, diffraction: D) -> Self
    where D: DiffractionExecutor<B> + 'static
    {
        self.diffraction = Some(Box::new(diffraction));
        self
    }

    /// Attach a [`KerrExecutor`] built for the owned beam.
    pub fn with_kerr_effect(mut self) -> Self {
        self.kerr_effect = Some(KerrExecutor::new(&self.beam));
        self
    }

    pub fn beam(&self) -> &B { &self.beam }

    pub fn into_beam(self) -> B { self.beam }

    pub fn params(&self) -> &PropagationParams { &self.params }

    /// Current longitudinal coordinate (m).
    pub fn z(&self) -> f64 { self.z }

    /// Current step size (m).
    pub fn dz(&self) -> f64 { self.dz }

    pub fn times(&self) -> &StageTimes { &self.times }

    /// Whether the last run ended on the intensity threshold rather than
    /// after `n_z` steps.
    pub fn stopped_early(&self) -> bool { self.stopped_early }

    /// Names of the attached executors.
    pub fn executors(&self) -> (Option<&'static str>, Option<&'static str>) {
        (
            self.diffraction.as_ref().map(|d| d.info()),
            self.kerr_effect.as_ref().map(|k| k.info()),
        )
    }

    fn state(&self, n_step: usize) -> State {
        let i_max = self.beam.i_max();
        State {
            n_step,
            z: self.z,
            dz: self.dz,
            i_max_normalized: i_max,
            i_max: i_max * self.beam.i_0(),
        }
    }

    /// Run without observation.
    pub fn propagate(&mut self) -> PResult<Track> {
        self.propagate_with(&mut ())
    }

    /// Run, reporting to `monitor` along the way.
    ///
    /// Returns the track cropped to the recorded rows; an early stop on the
    /// intensity threshold is a normal return, reported by
    /// [`stopped_early`][Self::stopped_early].
    ///
    /// A run starts from the current beam, `z` and `dz`, so calling this again
    /// continues the propagation for another `n_z` steps. The first row of
    /// the new track repeats the last row of the previous one.
    pub fn propagate_with<M>(&mut self, monitor: &mut M) -> PResult<Track>
    where M: Monitor<B>
    {
        let params = self.params;
        let medium = self.beam.medium();
        let kerr_coeff = medium.k_0() * medium.n_2() / medium.n_0();
        let dz_floor = 1e-6 * params.dz0;
        let mut warned_dz = false;
        self.stopped_early = false;

        monitor.on_start(&self.beam, &params)?;
        let mut track = Track::with_capacity(params.n_z + 1);
        for n_step in 0..=params.n_z {
            if n_step > 0 {
                let dz = self.dz;
                if let Some(diffraction) = self.diffraction.as_mut() {
                    let beam = &mut self.beam;
                    timed(&mut self.times.diffraction, || {
                        diffraction.process_diffraction(beam, dz)
                    })?;
                }
                if let Some(kerr) = self.kerr_effect.as_ref() {
                    let beam = &mut self.beam;
                    timed(&mut self.times.kerr_effect, || {
                        kerr.process_kerr_effect(beam, dz)
                    });
                }
                let beam = &mut self.beam;
                timed(&mut self.times.intensity, || beam.update_intensity());
                self.z += dz;
                if !params.const_dz {
                    let i_max = self.beam.i_max() * self.beam.i_0();
                    self.dz = timed(&mut self.times.step_control, || {
                        params.step_control.update(dz, i_max, kerr_coeff)
                    });
                    if self.dz < dz_floor && !warned_dz {
                        log::warn!(
                            "step size fell below {:.1e} of its initial value at z = {:.4e} m",
                            1e-6, self.z,
                        );
                        warned_dz = true;
                    }
                }
            }

            let state = self.state(n_step);
            if !state.i_max.is_finite() {
                return Err(PropagationError::NonFinite { n_step, z: self.z });
            }
            track.push(&state);
            log::trace!(
                "{:>6} z = {:.6e} dz = {:.6e} i_max/i_0 = {:.6e}",
                n_step, state.z, state.dz, state.i_max_normalized,
            );
            let beam = &self.beam;
            timed(&mut self.times.monitor, || monitor.on_step(beam, &state))?;

            if state.i_max > params.max_intensity_to_stop {
                log::info!(
                    "peak intensity {:.3e} W/m^2 exceeded {:.3e} W/m^2 at step {} (z = {:.4e} m); stopping",
                    state.i_max, params.max_intensity_to_stop, n_step, state.z,
                );
                self.stopped_early = true;
                break;
            }
        }
        track.crop();
        monitor.on_finish(&self.beam, &track, &self.times)?;
        Ok(track)
    }
}
