//! TOML job configuration.
//!
//! A job file describes one beam, an optional noise source, the propagation
//! parameters and where to write output:
//! ```toml
//! [beam]
//! geometry = "r"
//! medium = "SiO2"
//! lmbda = 1800e-9
//! M = 1
//! m = 1
//! P0_to_Pcr_V = 1.0
//! r_0 = 100e-6
//! n_r = 1024
//!
//! [propagation]
//! n_z = 2000
//! dz0_to_z_diff = 1e-3
//! print_current_state_every = 100
//!
//! [output]
//! directory = "results"
//! ```
//! Unknown keys are rejected at parse time; keys that the selected geometry
//! doesn't use, missing required keys and the wrong critical-power ratio for
//! the beam's distribution type are rejected by [`JobConfig::validate`].

use std::{ path::{ Path, PathBuf }, str::FromStr };
use serde::{ Deserialize, Serialize };
use crate::{
    beam::{
        Beam,
        DistributionType,
        RadialBeam,
        RadialParams,
        SlabBeam,
        SlabParams,
        TransverseBeam,
        TransverseParams,
    },
    diffraction::{ FourierDiffractionXY, SweepDiffractionR, SweepDiffractionX },
    error::{ BeamError, ConfigError },
    logger::Logger,
    noise::{ GaussianNoise, NoiseGenerator },
    propagate::{ PResult, PropagationParams, Propagator, StepControl, Track },
};

pub type CResult<T> = Result<T, ConfigError>;

/// Beam geometry selected by the `geometry` key.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Geometry {
    /// `"x"`
    Slab,
    /// `"r"`
    Radial,
    /// `"xy"`
    Transverse,
}

impl FromStr for Geometry {
    type Err = ConfigError;

    fn from_str(s: &str) -> CResult<Self> {
        match s {
            "x" => Ok(Self::Slab),
            "r" => Ok(Self::Radial),
            "xy" => Ok(Self::Transverse),
            other => Err(ConfigError::Geometry(other.into())),
        }
    }
}

impl Geometry {
    pub fn tag(self) -> &'static str {
        match self {
            Self::Slab => "x",
            Self::Radial => "r",
            Self::Transverse => "xy",
        }
    }

    // geometry-dependent [beam] keys that must be present
    fn required(self) -> &'static [&'static str] {
        match self {
            Self::Slab => &["x_0", "n_x"],
            Self::Radial => &["m", "r_0", "n_r"],
            Self::Transverse => &["m", "x_0", "y_0", "n_x", "n_y"],
        }
    }

    // geometry-dependent keys that may be present
    fn optional(self) -> &'static [&'static str] {
        match self {
            Self::Slab => &["r_kerr", "half", "radii_in_grid"],
            Self::Radial => &["radii_in_grid"],
            Self::Transverse => &["radii_in_grid", "noise_percent", "threads"],
        }
    }
}

/// Top-level job configuration.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct JobConfig {
    pub beam: BeamConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub noise: Option<NoiseConfig>,
    pub propagation: PropagationConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// `[beam]` section.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BeamConfig {
    /// One of `"x"`, `"r"`, `"xy"`.
    pub geometry: String,
    pub medium: String,
    /// Vacuum wavelength (m).
    pub lmbda: f64,
    pub M: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub m: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub P0_to_Pcr_G: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub P0_to_Pcr_V: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub r_kerr: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub half: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x_0: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y_0: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub r_0: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub n_x: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub n_y: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub n_r: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radii_in_grid: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub noise_percent: Option<f64>,
}

impl BeamConfig {
    fn keys(&self, threads: bool) -> [(&'static str, bool); 12] {
        [
            ("m", self.m.is_some()),
            ("r_kerr", self.r_kerr.is_some()),
            ("half", self.half.is_some()),
            ("x_0", self.x_0.is_some()),
            ("y_0", self.y_0.is_some()),
            ("r_0", self.r_0.is_some()),
            ("n_x", self.n_x.is_some()),
            ("n_y", self.n_y.is_some()),
            ("n_r", self.n_r.is_some()),
            ("radii_in_grid", self.radii_in_grid.is_some()),
            ("noise_percent", self.noise_percent.is_some()),
            ("threads", threads),
        ]
    }

    fn m_or_zero(&self) -> usize { self.m.unwrap_or(0) }
}

/// `[noise]` section; transverse beams only.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct NoiseConfig {
    #[serde(default = "default_variance")]
    pub variance: f64,
    /// Correlation radius (m).
    pub r_corr: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

fn default_variance() -> f64 { 1.0 }

/// `[propagation]` section.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PropagationConfig {
    pub n_z: usize,
    /// Initial step (m); exclusive with `dz0_to_z_diff`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dz0: Option<f64>,
    /// Initial step in units of the beam's diffraction length.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dz0_to_z_diff: Option<f64>,
    #[serde(default)]
    pub const_dz: bool,
    /// W m^-2
    #[serde(default = "default_max_intensity_to_stop")]
    pub max_intensity_to_stop: f64,
    #[serde(default = "default_nonlin_phase_max")]
    pub nonlin_phase_max: f64,
    #[serde(default = "default_true")]
    pub diffraction: bool,
    #[serde(default = "default_true")]
    pub kerr_effect: bool,
    #[serde(default)]
    pub print_current_state_every: usize,
    #[serde(default)]
    pub save_beam_every: usize,
    /// Worker count for the spectral diffraction step; transverse beams only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threads: Option<usize>,
}

fn default_max_intensity_to_stop() -> f64 { 1e17 }

fn default_nonlin_phase_max() -> f64 {
    StepControl::default().nonlin_phase_max
}

fn default_true() -> bool { true }

impl PropagationConfig {
    /// Engine parameters for a beam with diffraction length `z_diff`.
    pub fn params(&self, z_diff: f64) -> CResult<PropagationParams> {
        let dz0 = match (self.dz0, self.dz0_to_z_diff) {
            (Some(dz0), None) => dz0,
            (None, Some(ratio)) => ratio * z_diff,
            (Some(_), Some(_))
                => { return Err(ConfigError::Conflict("dz0", "dz0_to_z_diff")); },
            (None, None) => {
                return Err(ConfigError::Missing {
                    key: "dz0",
                    geometry: "any".into(),
                });
            },
        };
        Ok(PropagationParams {
            n_z: self.n_z,
            dz0,
            const_dz: self.const_dz,
            max_intensity_to_stop: self.max_intensity_to_stop,
            step_control: StepControl {
                nonlin_phase_max: self.nonlin_phase_max,
                ..StepControl::default()
            },
        })
    }
}

/// `[output]` section.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    #[serde(default = "default_directory")]
    pub directory: PathBuf,
    /// Prepended to the run directory's name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { directory: default_directory(), prefix: None }
    }
}

fn default_directory() -> PathBuf { "results".into() }

impl FromStr for JobConfig {
    type Err = ConfigError;

    fn from_str(s: &str) -> CResult<Self> { Ok(toml::from_str(s)?) }
}

/// Load and parse a TOML job configuration file.
pub fn load_config<P: AsRef<Path>>(path: P) -> CResult<JobConfig> {
    let content = std::fs::read_to_string(path)?;
    content.parse()
}

// validation guarantees exactly one ratio is set
fn power_ratio(b: &BeamConfig, geometry: Geometry) -> CResult<f64> {
    b.P0_to_Pcr_G.or(b.P0_to_Pcr_V)
        .ok_or_else(|| ConfigError::Missing {
            key: "P0_to_Pcr_G",
            geometry: geometry.tag().into(),
        })
}

fn required<T: Copy>(value: Option<T>, key: &'static str, geometry: Geometry)
    -> CResult<T>
{
    value.ok_or_else(|| {
        ConfigError::Missing { key, geometry: geometry.tag().into() }
    })
}

impl JobConfig {
    /// Check that the keys given fit the selected geometry and distribution
    /// type, and return the geometry.
    pub fn validate(&self) -> CResult<Geometry> {
        let geometry: Geometry = self.beam.geometry.parse()?;
        let tag = || geometry.tag().to_string();
        let req = geometry.required();
        let opt = geometry.optional();
        for (key, present) in self.beam.keys(self.propagation.threads.is_some()) {
            let allowed = req.contains(&key) || opt.contains(&key);
            if present && !allowed {
                return Err(ConfigError::Unexpected { key, geometry: tag() });
            }
            if !present && req.contains(&key) {
                return Err(ConfigError::Missing { key, geometry: tag() });
            }
        }

        match (geometry, self.noise.is_some()) {
            (Geometry::Transverse, false)
                if self.beam.noise_percent.is_some_and(|p| p != 0.0)
                => {
                    return Err(ConfigError::Missing { key: "noise", geometry: tag() });
                },
            (Geometry::Slab | Geometry::Radial, true) => {
                return Err(ConfigError::Unexpected { key: "noise", geometry: tag() });
            },
            _ => { },
        }

        // the slab beam is specified by r_kerr instead of a power ratio
        if geometry != Geometry::Slab {
            let distribution
                = DistributionType::from_mode(self.beam.M, self.beam.m_or_zero())?;
            let (expected, other) = match distribution {
                DistributionType::Vortex => ("P0_to_Pcr_V", "P0_to_Pcr_G"),
                _ => ("P0_to_Pcr_G", "P0_to_Pcr_V"),
            };
            let (given, wrong) = match distribution {
                DistributionType::Vortex
                    => (self.beam.P0_to_Pcr_V, self.beam.P0_to_Pcr_G),
                _ => (self.beam.P0_to_Pcr_G, self.beam.P0_to_Pcr_V),
            };
            if wrong.is_some() {
                return Err(ConfigError::PowerRatio {
                    distribution: distribution.name(),
                    expected,
                    found: other,
                });
            }
            if given.is_none() {
                return Err(ConfigError::Missing { key: expected, geometry: tag() });
            }
        } else if self.beam.P0_to_Pcr_G.is_some() {
            return Err(ConfigError::Unexpected {
                key: "P0_to_Pcr_G", geometry: tag() });
        } else if self.beam.P0_to_Pcr_V.is_some() {
            return Err(ConfigError::Unexpected {
                key: "P0_to_Pcr_V", geometry: tag() });
        }

        if self.propagation.dz0.is_some() && self.propagation.dz0_to_z_diff.is_some() {
            return Err(ConfigError::Conflict("dz0", "dz0_to_z_diff"));
        }
        if self.propagation.dz0.is_none() && self.propagation.dz0_to_z_diff.is_none() {
            return Err(ConfigError::Missing { key: "dz0", geometry: tag() });
        }
        Ok(geometry)
    }

    /// Directory the run writes into:
    /// `<directory>/<prefix>_beam_<geometry>`, or without the prefix if none
    /// is given.
    pub fn run_directory(&self) -> PathBuf {
        let name = match &self.output.prefix {
            Some(prefix) => format!("{}_beam_{}", prefix, self.beam.geometry),
            None => format!("beam_{}", self.beam.geometry),
        };
        self.output.directory.join(name)
    }

    /// A [`Logger`] writing to [`run_directory`][Self::run_directory] at the
    /// configured cadences.
    pub fn logger(&self) -> Logger {
        Logger::new(self.run_directory())
            .print_current_state_every(self.propagation.print_current_state_every)
            .save_beam_every(self.propagation.save_beam_every)
    }
}

/// A fully constructed propagation run for one of the three geometries.
pub enum Simulation {
    Slab(Propagator<SlabBeam>),
    Radial(Propagator<RadialBeam>),
    Transverse(Propagator<TransverseBeam>),
}

fn run_one<B: Beam>(prop: &mut Propagator<B>, logger: Option<&mut Logger>)
    -> PResult<Track>
{
    match logger {
        Some(logger) => prop.propagate_with(logger),
        None => prop.propagate(),
    }
}

impl Simulation {
    pub fn geometry(&self) -> Geometry {
        match self {
            Self::Slab(_) => Geometry::Slab,
            Self::Radial(_) => Geometry::Radial,
            Self::Transverse(_) => Geometry::Transverse,
        }
    }

    /// Names of the attached diffraction and Kerr executors.
    pub fn executors(&self) -> (Option<&'static str>, Option<&'static str>) {
        match self {
            Self::Slab(prop) => prop.executors(),
            Self::Radial(prop) => prop.executors(),
            Self::Transverse(prop) => prop.executors(),
        }
    }

    /// Diffraction length of the beam (m).
    pub fn z_diff(&self) -> f64 {
        match self {
            Self::Slab(prop) => prop.beam().z_diff(),
            Self::Radial(prop) => prop.beam().z_diff(),
            Self::Transverse(prop) => prop.beam().z_diff(),
        }
    }

    /// Current longitudinal coordinate (m).
    pub fn z(&self) -> f64 {
        match self {
            Self::Slab(prop) => prop.z(),
            Self::Radial(prop) => prop.z(),
            Self::Transverse(prop) => prop.z(),
        }
    }

    /// Run to completion, optionally writing output through `logger`.
    pub fn run(&mut self, logger: Option<&mut Logger>) -> PResult<Track> {
        match self {
            Self::Slab(prop) => run_one(prop, logger),
            Self::Radial(prop) => run_one(prop, logger),
            Self::Transverse(prop) => run_one(prop, logger),
        }
    }
}

/// Construct the beam, executors and engine described by `config`.
pub fn build(config: &JobConfig) -> CResult<Simulation> {
    let geometry = config.validate()?;
    let b = &config.beam;
    let p = &config.propagation;
    let sim = match geometry {
        Geometry::Slab => {
            let defaults = SlabParams::default();
            let params = SlabParams {
                medium: b.medium.clone(),
                lmbda: b.lmbda,
                M: b.M,
                half: b.half.unwrap_or(defaults.half),
                r_kerr: b.r_kerr.unwrap_or(defaults.r_kerr),
                x_0: required(b.x_0, "x_0", geometry)?,
                n_x: required(b.n_x, "n_x", geometry)?,
                radii_in_grid: b.radii_in_grid.unwrap_or(defaults.radii_in_grid),
                consts: defaults.consts,
            };
            let beam = SlabBeam::new(&params)?;
            let z_diff = beam.z_diff();
            let mut prop = Propagator::new(beam, p.params(z_diff)?)?;
            if p.diffraction {
                let diffraction = SweepDiffractionX::new(prop.beam());
                prop = prop.with_diffraction(diffraction);
            }
            if p.kerr_effect { prop = prop.with_kerr_effect(); }
            Simulation::Slab(prop)
        },
        Geometry::Radial => {
            let defaults = RadialParams::default();
            let m = required(b.m, "m", geometry)?;
            let params = RadialParams {
                medium: b.medium.clone(),
                lmbda: b.lmbda,
                M: b.M,
                m,
                p0_to_pcr: power_ratio(b, geometry)?,
                r_0: required(b.r_0, "r_0", geometry)?,
                n_r: required(b.n_r, "n_r", geometry)?,
                radii_in_grid: b.radii_in_grid.unwrap_or(defaults.radii_in_grid),
                consts: defaults.consts,
            };
            let beam = RadialBeam::new(&params)?;
            let z_diff = beam.z_diff();
            let mut prop = Propagator::new(beam, p.params(z_diff)?)?;
            if p.diffraction {
                let diffraction = SweepDiffractionR::new(prop.beam());
                prop = prop.with_diffraction(diffraction);
            }
            if p.kerr_effect { prop = prop.with_kerr_effect(); }
            Simulation::Radial(prop)
        },
        Geometry::Transverse => {
            let defaults = TransverseParams::default();
            let params = TransverseParams {
                medium: b.medium.clone(),
                lmbda: b.lmbda,
                M: b.M,
                m: required(b.m, "m", geometry)?,
                p0_to_pcr: power_ratio(b, geometry)?,
                x_0: required(b.x_0, "x_0", geometry)?,
                y_0: required(b.y_0, "y_0", geometry)?,
                n_x: required(b.n_x, "n_x", geometry)?,
                n_y: required(b.n_y, "n_y", geometry)?,
                radii_in_grid: b.radii_in_grid.unwrap_or(defaults.radii_in_grid),
                noise_percent: b.noise_percent.unwrap_or(defaults.noise_percent),
                consts: defaults.consts,
            };
            let noise: Option<Box<dyn NoiseGenerator>> = match &config.noise {
                Some(cfg) => {
                    let mut gen = GaussianNoise::new(cfg.variance, cfg.r_corr)
                        .map_err(BeamError::from)?;
                    if let Some(seed) = cfg.seed { gen = gen.with_seed(seed); }
                    Some(Box::new(gen))
                },
                None => None,
            };
            let beam = TransverseBeam::new(&params, noise)?;
            let z_diff = beam.z_diff();
            let mut prop = Propagator::new(beam, p.params(z_diff)?)?;
            if p.diffraction {
                let mut diffraction = FourierDiffractionXY::new(prop.beam());
                if let Some(threads) = p.threads {
                    diffraction = diffraction.with_threads(threads)?;
                }
                prop = prop.with_diffraction(diffraction);
            }
            if p.kerr_effect { prop = prop.with_kerr_effect(); }
            Simulation::Transverse(prop)
        },
    };
    log::debug!(
        "built {} simulation ({:?})",
        geometry.tag(), sim.executors(),
    );
    Ok(sim)
}

#[cfg(test)]
mod tests {
    use super::*;

    const RADIAL: &str = r#"
        [beam]
        geometry = "r"
        medium = "SiO2"
        lmbda = 1800e-9
        M = 0
        m = 0
        P0_to_Pcr_G = 2.0
        r_0 = 100e-6
        n_r = 256

        [propagation]
        n_z = 10
        dz0_to_z_diff = 1e-3
    "#;

    fn radial() -> JobConfig { RADIAL.parse().unwrap() }

    #[test]
    fn parses_with_defaults() {
        let config = radial();
        assert_eq!(config.validate().unwrap(), Geometry::Radial);
        assert!(config.propagation.diffraction);
        assert!(config.propagation.kerr_effect);
        assert!(!config.propagation.const_dz);
        assert_eq!(config.propagation.max_intensity_to_stop, 1e17);
        assert_eq!(config.propagation.nonlin_phase_max, 0.05);
        assert_eq!(config.output.directory, PathBuf::from("results"));
        assert_eq!(config.run_directory(), PathBuf::from("results/beam_r"));
    }

    #[test]
    fn rejects_unknown_keys() {
        let text = RADIAL.replace("n_r = 256", "n_r = 256\ncolour = 3");
        assert!(matches!(text.parse::<JobConfig>(), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn rejects_foreign_keys() {
        let mut config = radial();
        config.beam.x_0 = Some(1e-4);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Unexpected { key: "x_0", .. }),
        ));

        let mut config = radial();
        config.propagation.threads = Some(2);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Unexpected { key: "threads", .. }),
        ));
    }

    #[test]
    fn rejects_missing_keys() {
        let mut config = radial();
        config.beam.n_r = None;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Missing { key: "n_r", .. }),
        ));

        let mut config = radial();
        config.propagation.dz0_to_z_diff = None;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Missing { key: "dz0", .. }),
        ));

        let mut config = radial();
        config.propagation.dz0 = Some(1e-5);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Conflict("dz0", "dz0_to_z_diff")),
        ));
    }

    #[test]
    fn power_ratio_follows_distribution() {
        let mut config = radial();
        config.beam.M = 1;
        config.beam.m = Some(1);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::PowerRatio { distribution: "vortex", .. }),
        ));
        config.beam.P0_to_Pcr_G = None;
        config.beam.P0_to_Pcr_V = Some(1.0);
        assert!(config.validate().is_ok());

        config.beam.M = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Beam(BeamError::BadMode { M: 0, m: 1 })),
        ));
    }

    #[test]
    fn bad_geometry() {
        let mut config = radial();
        config.beam.geometry = "z".into();
        assert!(matches!(config.validate(), Err(ConfigError::Geometry(_))));
    }

    #[test]
    fn noise_only_for_transverse() {
        let mut config = radial();
        config.noise = Some(NoiseConfig { variance: 1.0, r_corr: 1e-5, seed: None });
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Unexpected { key: "noise", .. }),
        ));
    }

    #[test]
    fn builds_and_runs() {
        let mut sim = build(&radial()).unwrap();
        assert_eq!(sim.geometry(), Geometry::Radial);
        assert_eq!(
            sim.executors(),
            (Some("sweep_diffraction_executor_r"), Some("kerr_effect")),
        );
        let track = sim.run(None).unwrap();
        assert_eq!(track.len(), 11);
        assert!((sim.z() - 1e-2 * sim.z_diff()).abs() < 1e-12 * sim.z_diff());
    }
}
