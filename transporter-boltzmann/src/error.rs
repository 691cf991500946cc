// Copyright 2022 Chris Gubbin
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! # Error
//!
//! The error taxonomy of the transport engine. Construction of bands and scattering models
//! fails fast with a [`DomainError`] or [`ConfigurationError`]. Numerical failures at a single
//! grid point surface as [`ConvergenceError`] or [`SingularTensorError`] and are collected by the
//! sweep driver rather than aborting it.

use miette::Diagnostic;

#[derive(thiserror::Error, Debug, Diagnostic, Clone, PartialEq)]
/// Invalid physical input
pub enum DomainError {
    /// A principal effective mass which is not a positive finite number
    #[error("effective mass component {index} must be positive and finite, found {value}")]
    #[diagnostic(code(transporter::domain::mass))]
    NonPositiveMass {
        /// Index of the principal axis
        index: usize,
        /// The offending mass in units of the free electron mass
        value: f64,
    },
    /// A mass tensor which cannot be diagonalised into positive masses
    #[error("the effective mass tensor must be symmetric and positive definite")]
    #[diagnostic(code(transporter::domain::mass_tensor))]
    InvalidMassTensor,
    #[error("valley degeneracy must be at least one")]
    #[diagnostic(code(transporter::domain::degeneracy))]
    /// A band with no valleys
    ZeroDegeneracy,
    /// A band edge which is infinite or NaN
    #[error("the band edge must be finite, found {0}")]
    #[diagnostic(code(transporter::domain::edge))]
    NonFiniteBandEdge(f64),
    /// A Matthiessen exponent γ of zero or non-finite
    #[error("the generalised Matthiessen exponent must be finite and non-zero, found {0}")]
    #[diagnostic(code(transporter::domain::gamma))]
    InvalidExponent(f64),
    /// A scattering model parameter outside its domain
    #[error("scattering parameter `{name}` must be positive and finite, found {value}")]
    #[diagnostic(code(transporter::domain::parameter))]
    InvalidParameter {
        /// The name of the parameter
        name: &'static str,
        /// The value it was given
        value: f64,
    },
    /// A scattering model evaluated to a non-physical relaxation time
    #[error("relaxation time must be positive and finite, found {value} at {energy} eV and {temperature} K")]
    #[diagnostic(code(transporter::domain::relaxation_time))]
    InvalidRelaxationTime {
        /// The relaxation time in s
        value: f64,
        /// Carrier energy in eV
        energy: f64,
        /// Temperature in K
        temperature: f64,
    },
    /// A temperature which is not positive and finite
    #[error("temperature must be positive and finite, found {0} K")]
    #[diagnostic(code(transporter::domain::temperature))]
    InvalidTemperature(f64),
    /// The acoustic model evaluated at or below its reference temperature
    #[error("acoustic scattering requires T > T0, found T = {temperature} K and T0 = {reference} K")]
    #[diagnostic(
        code(transporter::domain::acoustic_temperature),
        help("shift the T0 parameter of the acoustic model below the lowest temperature")
    )]
    BelowReferenceTemperature {
        /// Temperature in K
        temperature: f64,
        /// The reference temperature T0 of the model in K
        reference: f64,
    },
    /// The acoustic model evaluated with a chemical potential outside its window
    #[error("chemical potential {chemical_potential} eV lies outside the acoustic model window [{lower}, {upper}] eV")]
    #[diagnostic(code(transporter::domain::acoustic_window))]
    OutsideModelWindow {
        /// Chemical potential in eV
        chemical_potential: f64,
        /// Lower end of the window in eV
        lower: f64,
        /// Upper end of the window in eV
        upper: f64,
    },
    #[error("chemical potential must be finite, found {0}")]
    #[diagnostic(code(transporter::domain::chemical_potential))]
    /// A chemical potential which is infinite or NaN
    NonFiniteChemicalPotential(f64),
    #[error("the transport integrand is not finite at reduced energy {0}")]
    #[diagnostic(code(transporter::domain::integrand))]
    /// The integrand overflowed or produced NaN
    NonFiniteIntegrand(f64),
    /// A net carrier density no chemical potential can produce
    #[error("net carrier density {target} m^-3 cannot be reached by the band structure")]
    #[diagnostic(
        code(transporter::domain::density),
        help("a positive net density needs a hole band, a negative one an electron band")
    )]
    UnreachableDensity {
        /// The requested net density `p - n` in m^-3
        target: f64,
    },
}

#[derive(thiserror::Error, Debug, Diagnostic, Clone, PartialEq)]
/// A numerical procedure exhausted its budget before reaching the requested tolerance
pub enum ConvergenceError {
    /// The adaptive quadrature ran out of subdivisions
    #[error("quadrature failed to converge after {subdivisions} subdivisions: estimate {estimate:e}, error {achieved:e} exceeds {requested:e}")]
    #[diagnostic(code(transporter::convergence::quadrature))]
    Quadrature {
        /// The best estimate of the integral when the budget ran out
        estimate: f64,
        /// The absolute error estimate of `estimate`
        achieved: f64,
        /// The absolute tolerance which was requested
        requested: f64,
        /// Subdivisions made before giving up
        subdivisions: usize,
    },
    /// The chemical potential solver stopped without converging
    #[error("chemical potential root-find failed after {iterations} iterations: estimate {estimate} eV, residual {achieved:e} m^-3")]
    #[diagnostic(code(transporter::convergence::root_finding))]
    RootFinding {
        /// The best chemical potential found in eV
        estimate: f64,
        /// Magnitude of the density residual at `estimate` in m^-3
        achieved: f64,
        /// Iterations performed by the solver
        iterations: u64,
    },
}

impl ConvergenceError {
    /// The last best estimate carried by the error
    pub fn estimate(&self) -> f64 {
        match self {
            ConvergenceError::Quadrature { estimate, .. } => *estimate,
            ConvergenceError::RootFinding { estimate, .. } => *estimate,
        }
    }
}

#[derive(thiserror::Error, Debug, Diagnostic, Clone, PartialEq)]
/// A ratio-type property is undefined because its denominator vanishes
pub enum SingularTensorError {
    /// K₀ is zero or not invertible
    #[error("the zeroth transport moment vanishes, the {property} is undefined")]
    #[diagnostic(code(transporter::singular::conductivity))]
    VanishingConductivity {
        /// The property which needed the inverse
        property: &'static str,
    },
    /// A property divided by a zero temperature
    #[error("the {property} is undefined at vanishing temperature")]
    #[diagnostic(code(transporter::singular::temperature))]
    VanishingTemperature {
        /// The property which was evaluated
        property: &'static str,
    },
}

#[derive(thiserror::Error, Debug, Diagnostic, Clone, PartialEq)]
/// A malformed band, scattering or sweep description
pub enum ConfigurationError {
    /// Both a carrier density and a chemical potential fix the reference state
    #[error("both a carrier density and a chemical potential were given, only one may be set")]
    #[diagnostic(code(transporter::configuration::reference))]
    ConflictingReference,
    /// Nothing fixes the reference state
    #[error("neither a carrier density nor a chemical potential was given")]
    #[diagnostic(code(transporter::configuration::reference))]
    MissingReference,
    /// Two sweep abscissae were given
    #[error("both chemical potentials and carrier densities were given as the sweep abscissa")]
    #[diagnostic(code(transporter::configuration::abscissa))]
    ConflictingAbscissa,
    #[error("the band structure contains no bands")]
    #[diagnostic(code(transporter::configuration::bands))]
    /// An empty band structure
    NoBands,
    #[error("a Matthiessen combination needs at least one scattering model")]
    #[diagnostic(code(transporter::configuration::matthiessen))]
    /// A Matthiessen node without children
    EmptyMatthiessen,
    /// A grid with no points, named by its axis
    #[error("the {0} grid is empty")]
    #[diagnostic(code(transporter::configuration::grid))]
    EmptyGrid(&'static str),
    /// A grid containing a non-finite or non-physical value
    #[error("the {grid} grid contains an invalid value {value}")]
    #[diagnostic(code(transporter::configuration::grid))]
    InvalidGridValue {
        /// The axis of the grid
        grid: &'static str,
        /// The offending value
        value: f64,
    },
    /// A range which does not step from `start` towards `stop`
    #[error("the range {start}:{stop}:{step} does not describe a finite grid")]
    #[diagnostic(code(transporter::configuration::grid))]
    InvalidRange {
        /// First value of the range
        start: f64,
        /// Last value of the range, inclusive
        stop: f64,
        /// Spacing between values
        step: f64,
    },
    #[error("no transport properties were requested")]
    #[diagnostic(code(transporter::configuration::properties))]
    /// A sweep without property requests
    NoProperties,
    /// A band whose mass is given both as principal masses and as a tensor, or neither
    #[error("band {index}: give either `masses` (with optional `angles`) or `tensor`")]
    #[diagnostic(code(transporter::configuration::band))]
    AmbiguousMass {
        /// Position of the band in the description
        index: usize,
    },
    /// A quadrature or root-finding setting outside its domain
    #[error("numerical setting `{name}` is invalid: {value}")]
    #[diagnostic(code(transporter::configuration::settings))]
    InvalidSetting {
        /// Name of the setting
        name: &'static str,
        /// The value it was given
        value: f64,
    },
    /// The description could not be read or deserialized
    #[error("failed to read the description: {0}")]
    #[diagnostic(code(transporter::configuration::read))]
    Read(String),
}

#[derive(thiserror::Error, Debug, Diagnostic, Clone, PartialEq)]
/// Union of every failure the transport engine can raise
pub enum TransportError {
    /// See [`DomainError`]
    #[error(transparent)]
    Domain(#[from] DomainError),
    /// See [`ConvergenceError`]
    #[error(transparent)]
    Convergence(#[from] ConvergenceError),
    /// See [`SingularTensorError`]
    #[error(transparent)]
    Singular(#[from] SingularTensorError),
    /// See [`ConfigurationError`]
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
}

#[derive(thiserror::Error, Debug, Diagnostic)]
/// Failure of a whole sweep, as opposed to the failure of a single grid point
pub enum SweepError {
    /// The cancellation token fired before every point was evaluated
    #[error("the sweep was cancelled, the partial grid was discarded")]
    #[diagnostic(code(transporter::sweep::cancelled))]
    Cancelled,
    /// The sweep was assembled from invalid inputs
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    /// The worker pool could not be started
    #[error(transparent)]
    #[diagnostic(code(transporter::sweep::thread_pool))]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn transport_error_is_transparent_over_its_sources() {
        let error: TransportError = SingularTensorError::VanishingConductivity {
            property: "Seebeck coefficient",
        }
        .into();
        assert_eq!(
            error.to_string(),
            "the zeroth transport moment vanishes, the Seebeck coefficient is undefined"
        );
    }

    #[test]
    fn convergence_error_carries_its_estimate() {
        let error = ConvergenceError::Quadrature {
            estimate: 1.5,
            achieved: 1e-3,
            requested: 1e-8,
            subdivisions: 500,
        };
        assert_eq!(error.estimate(), 1.5);
        assert!(error.to_string().contains("500 subdivisions"));
    }
}
