// Copyright 2022 Chris Gubbin
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! # Structure
//!
//! An ordered collection of parabolic bands sharing a chemical potential. The electrochemical
//! reference of the structure is fixed either by the chemical potential or by the net carrier
//! density, the other member of the pair is computed on construction. Converting a density into a
//! chemical potential is a one-dimensional root-find on the net carrier density
//!
//! n_net(μ) = Σ_holes p_b(μ) - Σ_electrons n_b(μ)
//!
//! which is strictly decreasing in μ, so a bracketing solver converges whenever a bracket exists.

use super::ParabBand;
use crate::error::{ConfigurationError, ConvergenceError, DomainError, TransportError};
use crate::integrals::{carrier_density, IntegrationSettings};
use argmin::core::{CostFunction, Error, Executor, State, TerminationReason};
use argmin::solver::brent::BrentRoot;
use serde::Deserialize;

#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
#[serde(default)]
/// Settings for the conversion of carrier densities into chemical potentials
pub struct RootFindingSettings {
    /// Absolute tolerance on the chemical potential in eV
    pub tolerance: f64,
    /// The maximum number of Brent iterations
    pub maximum_iterations: u64,
}

impl Default for RootFindingSettings {
    fn default() -> Self {
        Self {
            tolerance: 1e-12,
            maximum_iterations: 200,
        }
    }
}

impl RootFindingSettings {
    pub(crate) fn validate(&self) -> Result<(), ConfigurationError> {
        if !(self.tolerance > 0.) || !self.tolerance.is_finite() {
            return Err(ConfigurationError::InvalidSetting {
                name: "tolerance",
                value: self.tolerance,
            });
        }
        if self.maximum_iterations == 0 {
            return Err(ConfigurationError::InvalidSetting {
                name: "maximum_iterations",
                value: 0.,
            });
        }
        Ok(())
    }
}

/// The initial half-width of the root bracket around the band edges in eV
const INITIAL_BRACKET: f64 = 1.;
/// The bracket width doubles this many times before the density is declared unreachable
const MAXIMUM_EXPANSIONS: usize = 30;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
/// Carrier densities in m^-3 summed by carrier species
pub struct CarrierDensities {
    /// Electrons in conduction bands
    pub electrons: f64,
    /// Holes in valence bands
    pub holes: f64,
}

impl CarrierDensities {
    /// The net density `p - n`, the free charge density divided by the elementary charge
    pub fn net(&self) -> f64 {
        self.holes - self.electrons
    }
}

impl std::ops::Add for CarrierDensities {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self {
            electrons: self.electrons + rhs.electrons,
            holes: self.holes + rhs.holes,
        }
    }
}

/// The carrier densities of `bands` at chemical potential `chemical_potential` eV and temperature
/// `temperature` K
pub fn carrier_densities(
    bands: &[ParabBand],
    chemical_potential: f64,
    temperature: f64,
    settings: &IntegrationSettings,
) -> Result<CarrierDensities, TransportError> {
    let mut densities = CarrierDensities::default();
    for band in bands {
        let density = carrier_density(band, chemical_potential, temperature, settings)?;
        match band.carrier() {
            super::CarrierType::Electron => densities.electrons += density,
            super::CarrierType::Hole => densities.holes += density,
        }
    }
    Ok(densities)
}

/// Residual of the net carrier density with respect to a target
struct DensityResidual<'a> {
    bands: &'a [ParabBand],
    temperature: f64,
    target: f64,
    settings: &'a IntegrationSettings,
}

impl DensityResidual<'_> {
    fn evaluate(&self, chemical_potential: f64) -> Result<f64, TransportError> {
        Ok(
            carrier_densities(self.bands, chemical_potential, self.temperature, self.settings)?
                .net()
                - self.target,
        )
    }
}

impl CostFunction for DensityResidual<'_> {
    type Param = f64;
    type Output = f64;

    fn cost(&self, chemical_potential: &Self::Param) -> Result<Self::Output, Error> {
        Ok(self.evaluate(*chemical_potential)?)
    }
}

/// Find the chemical potential in eV at which `bands` hold the net carrier density `target` m^-3
#[tracing::instrument(name = "Chemical potential", level = "debug", skip(bands, integration, root_finding))]
pub fn chemical_potential_for_density(
    bands: &[ParabBand],
    target: f64,
    temperature: f64,
    integration: &IntegrationSettings,
    root_finding: &RootFindingSettings,
) -> Result<f64, TransportError> {
    if !target.is_finite() {
        return Err(DomainError::UnreachableDensity { target }.into());
    }
    let residual = DensityResidual {
        bands,
        temperature,
        target,
        settings: integration,
    };

    let (lowest, highest) = bands.iter().fold((f64::MAX, f64::MIN), |(low, high), band| {
        (low.min(band.edge()), high.max(band.edge()))
    });
    if lowest > highest {
        return Err(ConfigurationError::NoBands.into());
    }

    // The residual falls with μ: the lower end of the bracket must be non-negative and the upper
    // end non-positive
    let mut width = INITIAL_BRACKET;
    let mut lower = lowest - width;
    let mut upper = highest + width;
    let mut residual_lower = residual.evaluate(lower)?;
    let mut residual_upper = residual.evaluate(upper)?;
    let mut expansions = 0;
    while residual_lower < 0. || residual_upper > 0. {
        if expansions == MAXIMUM_EXPANSIONS {
            return Err(DomainError::UnreachableDensity { target }.into());
        }
        width *= 2.;
        if residual_lower < 0. {
            lower -= width;
            residual_lower = residual.evaluate(lower)?;
        }
        if residual_upper > 0. {
            upper += width;
            residual_upper = residual.evaluate(upper)?;
        }
        expansions += 1;
    }
    tracing::debug!(
        "Bracketed the chemical potential in [{lower}, {upper}] eV after {expansions} expansions"
    );

    if residual_lower == 0. {
        return Ok(lower);
    }
    if residual_upper == 0. {
        return Ok(upper);
    }

    // The closer end of the bracket stands in for the solver state if argmin fails outright
    let (bracket_estimate, bracket_residual) = if residual_lower.abs() < residual_upper.abs() {
        (lower, residual_lower.abs())
    } else {
        (upper, residual_upper.abs())
    };
    let solver = BrentRoot::new(lower, upper, root_finding.tolerance);
    let result = Executor::new(residual, solver)
        .configure(|state| state.max_iters(root_finding.maximum_iterations))
        .run()
        .map_err(|error| match error.downcast_ref::<TransportError>() {
            Some(source) => source.clone(),
            None => ConvergenceError::RootFinding {
                estimate: bracket_estimate,
                achieved: bracket_residual,
                iterations: 0,
            }
            .into(),
        })?;

    // Brent stores the magnitude of the residual as its cost
    let state = result.state();
    let iterations = state.get_iter();
    let estimate = state
        .get_best_param()
        .copied()
        .unwrap_or(bracket_estimate);
    match state.get_termination_reason() {
        Some(TerminationReason::SolverConverged) | Some(TerminationReason::TargetCostReached) => {}
        _ => {
            return Err(ConvergenceError::RootFinding {
                estimate,
                achieved: state.get_best_cost(),
                iterations,
            }
            .into())
        }
    }
    tracing::debug!("Chemical potential {estimate} eV found in {iterations} iterations");
    Ok(estimate)
}

#[derive(Clone, Debug, PartialEq)]
/// Bands sharing a chemical potential at a reference temperature
pub struct BandStructure {
    bands: Vec<ParabBand>,
    temperature: f64,
    chemical_potential: f64,
    carrier_density: f64,
}

impl BandStructure {
    /// Start building a band structure
    pub fn builder() -> BandStructureBuilder<()> {
        BandStructureBuilder::default()
    }

    /// The bands in the order they were given
    pub fn bands(&self) -> &[ParabBand] {
        &self.bands
    }

    /// The reference temperature in K
    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    /// The chemical potential in eV at the reference temperature
    pub fn chemical_potential(&self) -> f64 {
        self.chemical_potential
    }

    /// The net carrier density in m^-3 at the reference temperature
    pub fn carrier_density(&self) -> f64 {
        self.carrier_density
    }

    /// The carrier densities at an arbitrary chemical potential and temperature
    pub fn carrier_densities(
        &self,
        chemical_potential: f64,
        temperature: f64,
        settings: &IntegrationSettings,
    ) -> Result<CarrierDensities, TransportError> {
        carrier_densities(&self.bands, chemical_potential, temperature, settings)
    }

    /// The chemical potential giving net carrier density `target` at `temperature`
    pub fn chemical_potential_for_density(
        &self,
        target: f64,
        temperature: f64,
        integration: &IntegrationSettings,
        root_finding: &RootFindingSettings,
    ) -> Result<f64, TransportError> {
        chemical_potential_for_density(&self.bands, target, temperature, integration, root_finding)
    }
}

/// Builder for a [`BandStructure`]
///
/// Exactly one of the chemical potential or the net carrier density must be set.
pub struct BandStructureBuilder<RefBands> {
    bands: RefBands,
    temperature: f64,
    chemical_potential: Option<f64>,
    carrier_density: Option<f64>,
    integration: IntegrationSettings,
    root_finding: RootFindingSettings,
}

impl Default for BandStructureBuilder<()> {
    fn default() -> Self {
        Self {
            bands: (),
            temperature: 300.,
            chemical_potential: None,
            carrier_density: None,
            integration: IntegrationSettings::default(),
            root_finding: RootFindingSettings::default(),
        }
    }
}

impl<RefBands> BandStructureBuilder<RefBands> {
    /// The bands, which share one chemical potential
    pub fn with_bands(self, bands: Vec<ParabBand>) -> BandStructureBuilder<Vec<ParabBand>> {
        BandStructureBuilder {
            bands,
            temperature: self.temperature,
            chemical_potential: self.chemical_potential,
            carrier_density: self.carrier_density,
            integration: self.integration,
            root_finding: self.root_finding,
        }
    }

    /// The reference temperature in K, 300 K if unset
    pub fn at_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    /// Fix the chemical potential in eV
    pub fn with_chemical_potential(mut self, chemical_potential: f64) -> Self {
        self.chemical_potential = Some(chemical_potential);
        self
    }

    /// Fix the net carrier density `p - n` in m^-3
    pub fn with_carrier_density(mut self, carrier_density: f64) -> Self {
        self.carrier_density = Some(carrier_density);
        self
    }

    /// Settings of the density integrals
    pub fn with_integration_settings(mut self, settings: IntegrationSettings) -> Self {
        self.integration = settings;
        self
    }

    /// Settings of the chemical potential solver
    pub fn with_root_finding_settings(mut self, settings: RootFindingSettings) -> Self {
        self.root_finding = settings;
        self
    }
}

impl BandStructureBuilder<Vec<ParabBand>> {
    /// Validate the reference and compute its complement
    #[tracing::instrument(name = "Band structure builder", level = "info", skip(self))]
    pub fn build(self) -> Result<BandStructure, TransportError> {
        if self.bands.is_empty() {
            return Err(ConfigurationError::NoBands.into());
        }
        self.integration.validate()?;
        self.root_finding.validate()?;
        if !(self.temperature > 0.) || !self.temperature.is_finite() {
            return Err(DomainError::InvalidTemperature(self.temperature).into());
        }

        let (chemical_potential, carrier_density) =
            match (self.chemical_potential, self.carrier_density) {
                (Some(_), Some(_)) => return Err(ConfigurationError::ConflictingReference.into()),
                (None, None) => return Err(ConfigurationError::MissingReference.into()),
                (Some(chemical_potential), None) => {
                    let density = carrier_densities(
                        &self.bands,
                        chemical_potential,
                        self.temperature,
                        &self.integration,
                    )?
                    .net();
                    (chemical_potential, density)
                }
                (None, Some(density)) => {
                    let chemical_potential = chemical_potential_for_density(
                        &self.bands,
                        density,
                        self.temperature,
                        &self.integration,
                        &self.root_finding,
                    )?;
                    (chemical_potential, density)
                }
            };

        tracing::info!(
            "Built {} bands: μ = {chemical_potential} eV, n = {carrier_density:e} m^-3 at {} K",
            self.bands.len(),
            self.temperature
        );

        Ok(BandStructure {
            bands: self.bands,
            temperature: self.temperature,
            chemical_potential,
            carrier_density,
        })
    }
}
