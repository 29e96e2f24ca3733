//! Persistence of a propagation run.
//!
//! A [`Logger`] is a [`Monitor`] that lays out a results directory as
//! ```text
//! <directory>/
//!     parameters.txt   medium, beam and track parameters in reporting units
//!     beam/NNNNN.npz   intensity snapshots (arrays `intensity`, `z`)
//!     track.csv        one row per recorded step
//!     track.npz        the same rows as array `track`
//!     times.log        wall time per engine stage
//! ```
//! and logs a progress row every few steps.

use std::{
    fmt::Write as _,
    fs::{ self, File },
    io::{ BufWriter, Write },
    path::{ Path, PathBuf },
    time::Duration,
};
use ndarray as nd;
use ndarray_npy::NpzWriter;
use crate::{
    beam::Beam,
    error::LogError,
    propagate::{ Monitor, PResult, PropagationParams, StageTimes, State, Track },
    units::report,
};

pub type LResult<T> = Result<T, LogError>;

/// Writes run output under a single directory.
#[derive(Clone, Debug)]
pub struct Logger {
    directory: PathBuf,
    print_current_state_every: usize,
    save_beam_every: usize,
    diffraction: Option<&'static str>,
    kerr_effect: Option<&'static str>,
}

impl Logger {
    /// Write into `directory`, created on start if it doesn't exist. Progress
    /// printing and beam snapshots are off until enabled.
    pub fn new<P: AsRef<Path>>(directory: P) -> Self {
        Self {
            directory: directory.as_ref().to_path_buf(),
            print_current_state_every: 0,
            save_beam_every: 0,
            diffraction: None,
            kerr_effect: None,
        }
    }

    /// Log a progress row every `n` steps; `0` disables.
    pub fn print_current_state_every(mut self, n: usize) -> Self {
        self.print_current_state_every = n;
        self
    }

    /// Save an intensity snapshot every `n` steps; `0` disables.
    pub fn save_beam_every(mut self, n: usize) -> Self {
        self.save_beam_every = n;
        self
    }

    /// Record the names of the executors attached to the run, as returned by
    /// [`Propagator::executors`][crate::propagate::Propagator::executors].
    pub fn with_executors(
        mut self,
        executors: (Option<&'static str>, Option<&'static str>),
    ) -> Self {
        self.diffraction = executors.0;
        self.kerr_effect = executors.1;
        self
    }

    pub fn directory(&self) -> &Path { &self.directory }

    fn beam_dir(&self) -> PathBuf { self.directory.join("beam") }

    fn write_parameters<B: Beam>(&self, beam: &B, params: &PropagationParams)
        -> LResult<()>
    {
        let medium = beam.medium();
        let mut out = String::new();
        let mut row = |name: &str, value: f64, unit: &str| {
            // writing to a String can't fail
            let _ = writeln!(out, "{:<24} {:>16.6e} {}", name, value, unit);
        };

        row("lmbda", medium.lmbda() / report::nm, "nm");
        row("omega", medium.omega() * report::fs, "rad/fs");
        row("n_0", medium.n_0(), "");
        row("k_0", medium.k_0() * report::mm, "1/mm");
        row("k_1", medium.k_1() * report::mm / report::fs, "fs/mm");
        row("k_2", medium.k_2() * report::mm / report::fs.powi(2), "fs^2/mm");
        row("n_2", medium.n_2() / report::cm.powi(2), "cm^2/W");
        row("M", beam.M() as f64, "");
        row("m", beam.m() as f64, "");
        row("i_0", beam.i_0() / report::TW_cm2, "TW/cm^2");
        row("z_diff", beam.z_diff() / report::cm, "cm");
        row("r_kerr", beam.r_kerr(), "");
        row("power", beam.power() / report::MW, "MW");
        for (name, value, unit) in beam.parameters() {
            row(name, value, unit);
        }
        row("n_z", params.n_z as f64, "");
        row("dz0", params.dz0 / report::um, "um");
        row("dz0 / z_diff", params.dz0 / beam.z_diff(), "");
        row("const_dz", if params.const_dz { 1.0 } else { 0.0 }, "");
        row(
            "max_intensity_to_stop",
            params.max_intensity_to_stop / report::TW_cm2,
            "TW/cm^2",
        );
        row("nonlin_phase_max", params.step_control.nonlin_phase_max, "rad");

        let mut file = BufWriter::new(File::create(
            self.directory.join("parameters.txt"))?);
        writeln!(file, "{:<24} {}", "medium", medium.info())?;
        writeln!(file, "{:<24} {}", "beam", beam.info())?;
        writeln!(file, "{:<24} {}", "distribution_type",
            beam.distribution_type().name())?;
        writeln!(file, "{:<24} {}", "diffraction",
            self.diffraction.unwrap_or("none"))?;
        writeln!(file, "{:<24} {}", "kerr_effect",
            self.kerr_effect.unwrap_or("none"))?;
        file.write_all(out.as_bytes())?;
        file.flush()?;
        Ok(())
    }

    fn save_beam<B: Beam>(&self, beam: &B, state: &State) -> LResult<()> {
        let path = self.beam_dir().join(format!("{:05}.npz", state.n_step));
        let mut npz = NpzWriter::new(File::create(path)?);
        npz.add_array("intensity", beam.intensity())?;
        npz.add_array("z", &nd::arr0(state.z))?;
        npz.finish()?;
        Ok(())
    }

    fn write_track(&self, track: &Track) -> LResult<()> {
        let mut file = BufWriter::new(File::create(
            self.directory.join("track.csv"))?);
        let header: Vec<String>
            = Track::COLUMNS.iter().map(|name| format!("{:?}", name)).collect();
        writeln!(file, "{}", header.join(","))?;
        for row in track.rows().outer_iter() {
            writeln!(file, "{:e},{:e},{:e},{:e}", row[0], row[1], row[2], row[3])?;
        }
        file.flush()?;

        let mut npz = NpzWriter::new(File::create(
            self.directory.join("track.npz"))?);
        npz.add_array("track", &track.rows())?;
        npz.finish()?;
        Ok(())
    }

    fn write_times(&self, times: &StageTimes) -> LResult<()> {
        let mut file = BufWriter::new(File::create(
            self.directory.join("times.log"))?);
        writeln!(file, "{:<40} | {}", "STAGE", "TIME (hh:mm:ss)")?;
        writeln!(file, "{}", "-".repeat(62))?;
        let stages = [
            ("diffraction", times.diffraction),
            ("kerr_effect", times.kerr_effect),
            ("update_intensity", times.intensity),
            ("step_control", times.step_control),
            ("monitor", times.monitor),
            ("total", times.total()),
        ];
        for (name, t) in stages {
            writeln!(file, "{:<40} | {}", name, hms(t))?;
        }
        file.flush()?;
        Ok(())
    }
}

/// Format a duration as `hh:mm:ss.sss`.
pub fn hms(t: Duration) -> String {
    let secs = t.as_secs_f64();
    let h = (secs / 3600.0).floor();
    let m = ((secs - 3600.0 * h) / 60.0).floor();
    let s = secs - 3600.0 * h - 60.0 * m;
    format!("{:02}:{:02}:{:06.3}", h as u64, m as u64, s)
}

impl<B: Beam> Monitor<B> for Logger {
    fn on_start(&mut self, beam: &B, params: &PropagationParams)
        -> PResult<()>
    {
        fs::create_dir_all(&self.directory).map_err(LogError::from)?;
        if self.save_beam_every > 0 {
            fs::create_dir_all(self.beam_dir()).map_err(LogError::from)?;
        }
        self.write_parameters(beam, params)?;
        log::info!(
            "{} in {} (i_0 = {:.4e} W/m^2, z_diff = {:.4e} m), writing to {}",
            beam.info(),
            beam.medium().info(),
            beam.i_0(),
            beam.z_diff(),
            self.directory.display(),
        );
        if self.print_current_state_every > 0 {
            log::info!(
                "{:>6} | {:>14} | {:>14} | {:>14} | {:>14}",
                "n_step",
                Track::COLUMNS[0],
                Track::COLUMNS[1],
                Track::COLUMNS[2],
                Track::COLUMNS[3],
            );
        }
        Ok(())
    }

    fn on_step(&mut self, beam: &B, state: &State) -> PResult<()> {
        let every = self.print_current_state_every;
        if every > 0 && state.n_step % every == 0 {
            log::info!(
                "{:>6} | {:>14.6e} | {:>14.6e} | {:>14.6} | {:>14.6e}",
                state.n_step, state.z, state.dz, state.i_max_normalized, state.i_max,
            );
        }
        let every = self.save_beam_every;
        if every > 0 && state.n_step % every == 0 {
            self.save_beam(beam, state)?;
        }
        Ok(())
    }

    fn on_finish(&mut self, _beam: &B, track: &Track, times: &StageTimes)
        -> PResult<()>
    {
        self.write_track(track)?;
        self.write_times(times)?;
        log::info!(
            "recorded {} steps in {}",
            track.len(), hms(times.total()),
        );
        Ok(())
    }
}
