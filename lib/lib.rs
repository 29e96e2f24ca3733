#![allow(dead_code, non_snake_case)]

//! Provides functions and higher-level constructs for the simulation of
//! self-focusing laser beams in Kerr media via the paraxial nonlinear envelope
//! equation, in slab, axisymmetric and full-transverse geometries.
//!
//! Provides implementations for the following numerical routines:
//! - Linear diffraction:
//!     - Crank-Nicolson finite differences with a Thomas-algorithm sweep
//!       (slab and radial, including the vortex centrifugal term)
//!     - Exact spectral step via parallel 2D FFTs (full transverse)
//! - Nonlinear Kerr phase rotation
//! - Split-step propagation with adaptive step control and an intensity
//!   stopping criterion
//! - Spectral synthesis of spatially correlated complex noise
//!
//! See [`docs`] for theoretical background.

pub mod analytics;
pub mod beam;
pub mod config;
pub mod diffraction;
pub mod error;
pub mod kerr;
pub mod logger;
pub mod medium;
pub mod noise;
pub mod propagate;
pub mod units;
pub mod utils;

pub mod docs;

pub type Arr1<S> = ndarray::ArrayBase<S, ndarray::Ix1>;
pub type Arr2<S> = ndarray::ArrayBase<S, ndarray::Ix2>;
