// Copyright 2022 Chris Gubbin
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! Controls the deserialization of a transport job, and the `BuildProblem` trait which turns
//! a description into validated bands, a scattering tree and a sweep grid

/// The deserialization and storage of the `JobDescription`
pub mod reader;

pub use reader::{BandDescription, Grid, JobDescription, ScatteringDescription};

use crate::bands::{BandStructure, EffectiveMass, ParabBand, RootFindingSettings};
use crate::error::{ConfigurationError, TransportError};
use crate::integrals::IntegrationSettings;
use crate::scattering::{Acoustic, ScatteringModel};
use crate::sweep::{Abscissa, PropertyRequest};
use nalgebra::Matrix3;

/// Builds the core types of a transport calculation from a description
pub trait BuildProblem {
    /// The bands with their electrochemical reference
    fn build_band_structure(
        &self,
        integration: &IntegrationSettings,
        root_finding: &RootFindingSettings,
    ) -> Result<BandStructure, TransportError>;
    /// The relaxation-time model
    fn build_scattering_model(&self) -> Result<ScatteringModel, TransportError>;
    /// The temperature axis of the sweep in K
    fn build_temperatures(&self) -> Result<Vec<f64>, ConfigurationError>;
    /// The second axis of the sweep, `None` to sweep at the reference chemical potential only
    fn build_abscissa(&self) -> Result<Option<Abscissa>, ConfigurationError>;
    /// The requested properties
    fn build_requests(&self) -> Vec<PropertyRequest>;
}

impl BandDescription {
    fn build(&self, index: usize) -> Result<ParabBand, TransportError> {
        let mass = match (self.masses, self.angles, self.tensor) {
            (Some(masses), None, None) => EffectiveMass::principal(masses)?,
            (Some(masses), Some(angles), None) => EffectiveMass::with_euler_angles(masses, angles)?,
            (None, None, Some(tensor)) => {
                // Rows of the description become rows of the tensor
                let tensor = Matrix3::from_fn(|i, j| tensor[i][j]);
                EffectiveMass::from_tensor(tensor)?
            }
            _ => return Err(ConfigurationError::AmbiguousMass { index }.into()),
        };
        Ok(ParabBand::new(
            mass,
            self.edge,
            self.carrier,
            self.degeneracy,
        )?)
    }
}

impl ScatteringDescription {
    /// Recursively build the scattering tree
    pub fn build(&self) -> Result<ScatteringModel, TransportError> {
        Ok(match self {
            ScatteringDescription::Constant { value } => ScatteringModel::constant(*value)?,
            ScatteringDescription::Impurity {
                energy,
                prefactor,
                width,
            } => ScatteringModel::impurity(*energy, *prefactor, *width)?,
            ScatteringDescription::Acoustic {
                band_minimum,
                carrier,
                prefactor,
                maximum_time,
                reference_temperature,
                window_below,
                window_above,
            } => ScatteringModel::acoustic(
                Acoustic::new(*band_minimum, *carrier)
                    .with_prefactor(*prefactor)
                    .with_maximum_time(*maximum_time)
                    .with_reference_temperature(*reference_temperature)
                    .with_window(*window_below, *window_above),
            )?,
            ScatteringDescription::TemperaturePowerLaw { prefactor, exponent } => {
                ScatteringModel::temperature_power_law(*prefactor, *exponent)?
            }
            ScatteringDescription::Matthiessen { models, gamma } => {
                let models = models
                    .iter()
                    .map(ScatteringDescription::build)
                    .collect::<Result<Vec<_>, _>>()?;
                ScatteringModel::matthiessen(models, *gamma)?
            }
        })
    }
}

impl BuildProblem for JobDescription {
    #[tracing::instrument(name = "Job builder", level = "info", skip_all)]
    fn build_band_structure(
        &self,
        integration: &IntegrationSettings,
        root_finding: &RootFindingSettings,
    ) -> Result<BandStructure, TransportError> {
        let bands = self
            .bands
            .iter()
            .enumerate()
            .map(|(index, band)| band.build(index))
            .collect::<Result<Vec<_>, _>>()?;

        let mut builder = BandStructure::builder()
            .with_bands(bands)
            .at_temperature(self.reference_temperature)
            .with_integration_settings(*integration)
            .with_root_finding_settings(*root_finding);
        if let Some(chemical_potential) = self.chemical_potential {
            builder = builder.with_chemical_potential(chemical_potential);
        }
        if let Some(carrier_density) = self.carrier_density {
            builder = builder.with_carrier_density(carrier_density);
        }
        builder.build()
    }

    fn build_scattering_model(&self) -> Result<ScatteringModel, TransportError> {
        self.scattering.build()
    }

    fn build_temperatures(&self) -> Result<Vec<f64>, ConfigurationError> {
        self.temperatures.values()
    }

    fn build_abscissa(&self) -> Result<Option<Abscissa>, ConfigurationError> {
        match (&self.chemical_potentials, &self.carrier_densities) {
            (Some(_), Some(_)) => Err(ConfigurationError::ConflictingAbscissa),
            (Some(grid), None) => Ok(Some(Abscissa::ChemicalPotentials(grid.values()?))),
            (None, Some(grid)) => Ok(Some(Abscissa::CarrierDensities(grid.values()?))),
            (None, None) => Ok(None),
        }
    }

    fn build_requests(&self) -> Vec<PropertyRequest> {
        self.properties.clone()
    }
}
