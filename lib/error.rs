//! Collection of all error types.
//!
//! All errors derive [`thiserror::Error`], making them composable when allowed
//! and compatible with application code using [`anyhow`][anyhow].
//!
//! [anyhow]: https://crates.io/crates/anyhow

use thiserror::Error;

/// Returned when a [`Medium`][crate::medium::Medium] is requested for a
/// material outside the catalogue.
#[derive(Debug, Error)]
#[error("unsupported medium {0:?}; expected one of SiO2, CaF2, LiF")]
pub struct MediumError(pub String);

/// Returned when a quantity that must be strictly positive is not.
#[derive(Debug, Error)]
#[error("{0} must be greater than 0; got {1}")]
pub struct PositiveError(pub &'static str, pub f64);

impl PositiveError {
    pub(crate) fn check(name: &'static str, value: f64) -> Result<(), Self> {
        (value > 0.0 && value.is_finite()).then_some(()).ok_or(Self(name, value))
    }
}

/// Returned from beam constructors.
#[derive(Debug, Error)]
pub enum BeamError {
    /// Returned for the illegal pairing of a nonzero topological charge with a
    /// polynomial order that does not match it (including `M = 0`).
    #[error("invalid mode: topological charge m = {m} requires M = m; got M = {M}")]
    BadMode { M: usize, m: usize },

    /// Returned when a grid has too few points for the three-point stencil.
    #[error("{0} must be at least 3; got {1}")]
    BadGrid(&'static str, usize),

    /// Returned when a nonzero noise percentage is requested without a noise
    /// generator.
    #[error("noise_percent = {0} requires a noise generator")]
    MissingNoise(f64),

    /// Returned when the initial field integrates to zero power, leaving the
    /// reference intensity undefined.
    #[error("initial field carries no power")]
    ZeroPower,

    /// [`PositiveError`]
    #[error("parameter error: {0}")]
    Positive(#[from] PositiveError),

    /// [`MediumError`]
    #[error("medium error: {0}")]
    Medium(#[from] MediumError),

    /// [`NoiseError`]
    #[error("noise error: {0}")]
    Noise(#[from] NoiseError),
}

impl BeamError {
    pub(crate) fn check_grid(name: &'static str, n: usize) -> Result<(), Self> {
        (n >= 3).then_some(()).ok_or(Self::BadGrid(name, n))
    }
}

/// Returned from noise generators.
#[derive(Debug, Error)]
pub enum NoiseError {
    /// Returned when a noise field is requested before the generator has been
    /// given a grid.
    #[error("noise generator used before initialization")]
    Uninitialized,

    /// Returned when the grid is too coarse to resolve the correlation radius.
    #[error("correlation radius {r_corr:e} m spans no grid points (dx = {dx:e} m, dy = {dy:e} m)")]
    Unresolved { r_corr: f64, dx: f64, dy: f64 },

    /// Returned when an autocorrelation never falls below 1/e of its peak.
    #[error("autocorrelation does not decay below 1/e")]
    NoDecay,

    /// [`PositiveError`]
    #[error("parameter error: {0}")]
    Positive(#[from] PositiveError),
}

/// Returned by the output [`Logger`][crate::logger::Logger].
#[derive(Debug, Error)]
pub enum LogError {
    /// I/O failure.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// Failure to serialize an array.
    #[error("npz error: {0}")]
    Npz(#[from] ndarray_npy::WriteNpzError),
}

/// Returned from the propagation engine.
#[derive(Debug, Error)]
pub enum PropagationError {
    /// Returned when a step parameter is invalid.
    #[error("{0} must be greater than 0; got {1}")]
    BadStep(&'static str, f64),

    /// Returned when an executor was built for a grid other than the beam's.
    #[error("executor expects {expected} grid points; beam has {found}")]
    GridMismatch { expected: usize, found: usize },

    /// Returned when the peak intensity stops being a finite number.
    #[error("peak intensity became non-finite at step {n_step} (z = {z:e} m)")]
    NonFinite { n_step: usize, z: f64 },

    /// Failure to build a dedicated worker pool.
    #[error("thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// [`LogError`]
    #[error("logging error: {0}")]
    Log(#[from] LogError),
}

impl PropagationError {
    pub(crate) fn check_step(name: &'static str, value: f64)
        -> Result<(), Self>
    {
        (value > 0.0 && value.is_finite()).then_some(())
            .ok_or(Self::BadStep(name, value))
    }
}

/// Returned when reading or validating a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading the file.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed TOML or unknown key.
    #[error("parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// Returned when a key required by the selected geometry is absent.
    #[error("missing key `{key}` for geometry {geometry:?}")]
    Missing { key: &'static str, geometry: String },

    /// Returned when a key is present that the selected geometry does not
    /// use.
    #[error("key `{key}` is not used by geometry {geometry:?}")]
    Unexpected { key: &'static str, geometry: String },

    /// Returned when the wrong critical-power ratio is given for the
    /// distribution type.
    #[error("{distribution} beams take `{expected}`, not `{found}`")]
    PowerRatio {
        distribution: &'static str,
        expected: &'static str,
        found: &'static str,
    },

    /// Returned when two mutually exclusive keys are both given.
    #[error("keys `{0}` and `{1}` are mutually exclusive")]
    Conflict(&'static str, &'static str),

    /// Returned for an unknown geometry tag.
    #[error("unknown geometry {0:?}; expected one of x, r, xy")]
    Geometry(String),

    /// [`BeamError`]
    #[error("beam error: {0}")]
    Beam(#[from] BeamError),

    /// [`PropagationError`]
    #[error("propagation error: {0}")]
    Propagation(#[from] PropagationError),
}
