// Copyright 2022 Chris Gubbin
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! # Scattering
//!
//! Relaxation-time models τ(ε, T, μ) and their combination by the generalised Matthiessen rule
//!
//! τ = (Σᵢ τᵢ^γ)^(1/γ)
//!
//! which reduces to the conventional rule 1/τ = Σᵢ 1/τᵢ for γ = -1. A [`ScatteringModel`] is a
//! tree: leaves are elementary models and internal nodes are Matthiessen combinations which may
//! nest without limit. Models are immutable once built and are shared freely between threads.

mod models;

pub use models::{Acoustic, Constant, Impurity, TemperatureFunction};

use crate::error::{ConfigurationError, DomainError, TransportError};

#[derive(Clone, Debug)]
/// A relaxation-time model
pub enum ScatteringModel {
    /// τ = A
    Constant(Constant),
    /// A Lorentzian resonance in energy
    Impurity(Impurity),
    /// Acoustic deformation-potential scattering
    Acoustic(Acoustic),
    /// τ = f(T)
    TemperatureFunction(TemperatureFunction),
    /// The generalised Matthiessen combination of child models
    Matthiessen(Matthiessen),
}

#[derive(Clone, Debug)]
/// A generalised Matthiessen node
pub struct Matthiessen {
    models: Vec<ScatteringModel>,
    exponent: f64,
}

impl Matthiessen {
    /// The child models
    pub fn models(&self) -> &[ScatteringModel] {
        &self.models
    }

    /// The exponent γ
    pub fn exponent(&self) -> f64 {
        self.exponent
    }

    fn relaxation_time(
        &self,
        energy: f64,
        temperature: f64,
        chemical_potential: f64,
    ) -> Result<f64, DomainError> {
        let conventional = self.exponent == -1.;
        let mut terms = self
            .models
            .iter()
            .map(|model| {
                model
                    .evaluate(energy, temperature, chemical_potential)
                    .map(|time| {
                        if conventional {
                            time.recip()
                        } else {
                            time.powf(self.exponent)
                        }
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        // Sorting fixes the summation order, so the result does not depend on the child order
        terms.sort_by(f64::total_cmp);
        let sum: f64 = terms.iter().sum();
        Ok(if conventional {
            sum.recip()
        } else {
            sum.powf(self.exponent.recip())
        })
    }
}

impl ScatteringModel {
    /// A constant relaxation time in seconds
    pub fn constant(value: f64) -> Result<Self, DomainError> {
        Ok(Self::Constant(Constant::new(value)?))
    }

    /// Impurity resonance at `energy` eV with peak time `prefactor` s and half width `width` eV
    pub fn impurity(energy: f64, prefactor: f64, width: f64) -> Result<Self, DomainError> {
        Ok(Self::Impurity(Impurity::new(energy, prefactor, width)?))
    }

    /// Acoustic phonon scattering, see [`Acoustic`] for the parameters
    pub fn acoustic(parameters: Acoustic) -> Result<Self, DomainError> {
        Ok(Self::Acoustic(parameters.validate()?))
    }

    /// A relaxation time given by a function of the temperature in K alone
    ///
    /// The label identifies the function in logs and debug output.
    pub fn temperature_function<F>(function: F, label: impl Into<String>) -> Self
    where
        F: Fn(f64) -> f64 + Send + Sync + 'static,
    {
        Self::TemperatureFunction(TemperatureFunction::new(function, label))
    }

    /// The power law τ = A Tᵖ
    pub fn temperature_power_law(prefactor: f64, exponent: f64) -> Result<Self, DomainError> {
        let prefactor = models::positive_parameter("prefactor", prefactor)?;
        if !exponent.is_finite() {
            return Err(DomainError::InvalidParameter {
                name: "exponent",
                value: exponent,
            });
        }
        Ok(Self::temperature_function(
            move |temperature| prefactor * temperature.powf(exponent),
            format!("{prefactor:e} T^{exponent}"),
        ))
    }

    /// Combine `models` with the generalised Matthiessen rule of exponent `exponent`
    pub fn matthiessen(
        models: Vec<ScatteringModel>,
        exponent: f64,
    ) -> Result<Self, TransportError> {
        if models.is_empty() {
            return Err(ConfigurationError::EmptyMatthiessen.into());
        }
        if exponent == 0. || !exponent.is_finite() {
            return Err(DomainError::InvalidExponent(exponent).into());
        }
        Ok(Self::Matthiessen(Matthiessen { models, exponent }))
    }

    /// The relaxation time in seconds at absolute energy `energy` eV, temperature `temperature`
    /// K and chemical potential `chemical_potential` eV
    pub fn evaluate(
        &self,
        energy: f64,
        temperature: f64,
        chemical_potential: f64,
    ) -> Result<f64, DomainError> {
        let time = match self {
            ScatteringModel::Constant(model) => model.relaxation_time(),
            ScatteringModel::Impurity(model) => model.relaxation_time(energy),
            ScatteringModel::Acoustic(model) => {
                model.relaxation_time(energy, temperature, chemical_potential)?
            }
            ScatteringModel::TemperatureFunction(model) => model.relaxation_time(temperature),
            ScatteringModel::Matthiessen(model) => {
                model.relaxation_time(energy, temperature, chemical_potential)?
            }
        };
        if time > 0. && time.is_finite() {
            Ok(time)
        } else {
            Err(DomainError::InvalidRelaxationTime {
                value: time,
                energy,
                temperature,
            })
        }
    }

    /// Whether the relaxation time is independent of the carrier energy
    pub fn is_energy_independent(&self) -> bool {
        match self {
            ScatteringModel::Constant(_) | ScatteringModel::TemperatureFunction(_) => true,
            ScatteringModel::Impurity(_) | ScatteringModel::Acoustic(_) => false,
            ScatteringModel::Matthiessen(model) => {
                model.models.iter().all(|child| child.is_energy_independent())
            }
        }
    }
}
