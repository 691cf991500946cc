// Copyright 2022 Chris Gubbin
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! Transporter-Boltzmann is a semiclassical transport solver written in Rust
//!
//! # Overview
//! Transporter-Boltzmann calculates the thermoelectric transport coefficients of semiconductors in the
//! relaxation-time approximation to the Boltzmann transport equation. The band structure is described
//! by one or more parabolic valleys, each with an anisotropic effective mass tensor, a band edge, a
//! carrier type and a valley degeneracy. Scattering is described by a tree of relaxation-time models
//! combined with a generalised Matthiessen rule.
//!
//! For every band the generalised transport integrals are computed by adaptive Gauss-Kronrod quadrature
//! and rotated into the laboratory frame. The electrical conductivity, Seebeck coefficient, electronic
//! thermal conductivity, Lorenz tensor and net carrier concentration are then formed from the moments
//! summed over all bands, which keeps bipolar compensation exact.
//!
//! # Usage
//! Transporter-Boltzmann is distributed as a binary crate, and is intended to be run from the command line.
//! To run the software first define a job in a `.toml` file:
//!
//! ```toml
//! temperatures = { start = 300.0, stop = 600.0, step = 100.0 }
//! chemical_potentials = [0.0, 0.05, 0.1]
//! chemical_potential = 0.1
//!
//! [[bands]]
//! masses = [1.0, 1.0, 1.0]
//! edge = 0.0
//! carrier = "electron"
//!
//! [scattering]
//! model = "constant"
//! value = 1e-14
//!
//! [[properties]]
//! property = "seebeck"
//! export_as_table = true
//! ```
//!
//! where additional bands can be appended with subsequent `bands` fields, and scattering models can
//! be nested in `matthiessen` nodes.

#![warn(missing_docs)]
#![allow(clippy::type_complexity)]

/// The command line global application, tracing and display primitives
pub mod app;

/// Transport tensors from band moments
pub mod assembly;

/// Parabolic bands and band structures
pub mod bands;

/// Physical constants
pub mod constants;

/// Error handling
mod error;

/// Fermi-Dirac occupation, the Fermi window and nondegenerate Fermi-Dirac integrals
pub mod fermi;

/// Adaptive quadrature and the generalised transport integrals
pub mod integrals;

/// Reading and building transport jobs
pub mod job;

/// Relaxation-time models
pub mod scattering;

/// Evaluation of transport properties over temperature and doping grids
pub mod sweep;

pub use error::{
    ConfigurationError, ConvergenceError, DomainError, SingularTensorError, SweepError,
    TransportError,
};
