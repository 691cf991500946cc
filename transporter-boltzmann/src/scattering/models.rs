// Copyright 2022 Chris Gubbin
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! Elementary relaxation-time models

use crate::bands::CarrierType;
use crate::error::DomainError;
use std::fmt;
use std::sync::Arc;

pub(crate) fn positive_parameter(name: &'static str, value: f64) -> Result<f64, DomainError> {
    if value > 0. && value.is_finite() {
        Ok(value)
    } else {
        Err(DomainError::InvalidParameter { name, value })
    }
}

fn non_negative_parameter(name: &'static str, value: f64) -> Result<f64, DomainError> {
    if value >= 0. && value.is_finite() {
        Ok(value)
    } else {
        Err(DomainError::InvalidParameter { name, value })
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
/// An energy- and temperature-independent relaxation time
pub struct Constant {
    value: f64,
}

impl Constant {
    pub(crate) fn new(value: f64) -> Result<Self, DomainError> {
        Ok(Self {
            value: positive_parameter("value", value)?,
        })
    }

    pub(crate) fn relaxation_time(&self) -> f64 {
        self.value
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
/// Resonant scattering from an impurity level, a Lorentzian in energy
///
/// τ(ε) = A γ² / ((ε - ε_im)² + γ²)
pub struct Impurity {
    energy: f64,
    prefactor: f64,
    width: f64,
}

impl Impurity {
    pub(crate) fn new(energy: f64, prefactor: f64, width: f64) -> Result<Self, DomainError> {
        if !energy.is_finite() {
            return Err(DomainError::InvalidParameter {
                name: "energy",
                value: energy,
            });
        }
        Ok(Self {
            energy,
            prefactor: positive_parameter("prefactor", prefactor)?,
            width: positive_parameter("width", width)?,
        })
    }

    pub(crate) fn relaxation_time(&self, energy: f64) -> f64 {
        let detuning = energy - self.energy;
        let width_squared = self.width * self.width;
        self.prefactor * width_squared / (detuning * detuning + width_squared)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
/// Deformation-potential scattering from acoustic phonons
///
/// τ(ε, T) = min(τ_max, A / ((T - T₀) √E)) where `E` is the carrier energy in the band with edge
/// `band_minimum`. The model is restricted to chemical potentials within a window around the
/// band edge.
pub struct Acoustic {
    band_minimum: f64,
    carrier: CarrierType,
    prefactor: f64,
    maximum_time: f64,
    reference_temperature: f64,
    window_below: f64,
    window_above: f64,
}

impl Acoustic {
    /// Default model parameters for the band with edge `band_minimum` in eV
    ///
    /// The defaults are A = 1, τ_max = 1 s, T₀ = 50 K and a chemical potential window of 2 eV to
    /// either side of the edge.
    pub fn new(band_minimum: f64, carrier: CarrierType) -> Self {
        Self {
            band_minimum,
            carrier,
            prefactor: 1.,
            maximum_time: 1.,
            reference_temperature: 50.,
            window_below: 2.,
            window_above: 2.,
        }
    }

    /// The prefactor A
    pub fn with_prefactor(mut self, prefactor: f64) -> Self {
        self.prefactor = prefactor;
        self
    }

    /// Upper bound on τ in s
    pub fn with_maximum_time(mut self, maximum_time: f64) -> Self {
        self.maximum_time = maximum_time;
        self
    }

    /// T0 in K, 50 K if unset
    pub fn with_reference_temperature(mut self, reference_temperature: f64) -> Self {
        self.reference_temperature = reference_temperature;
        self
    }

    /// Restrict the model to chemical potentials in `[edge - below, edge + above]`
    pub fn with_window(mut self, below: f64, above: f64) -> Self {
        self.window_below = below;
        self.window_above = above;
        self
    }

    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        if !self.band_minimum.is_finite() {
            return Err(DomainError::InvalidParameter {
                name: "band_minimum",
                value: self.band_minimum,
            });
        }
        positive_parameter("prefactor", self.prefactor)?;
        positive_parameter("maximum_time", self.maximum_time)?;
        non_negative_parameter("window_below", self.window_below)?;
        non_negative_parameter("window_above", self.window_above)?;
        if !self.reference_temperature.is_finite() {
            return Err(DomainError::InvalidParameter {
                name: "reference_temperature",
                value: self.reference_temperature,
            });
        }
        Ok(self)
    }

    pub(crate) fn relaxation_time(
        &self,
        energy: f64,
        temperature: f64,
        chemical_potential: f64,
    ) -> Result<f64, DomainError> {
        if temperature <= self.reference_temperature {
            return Err(DomainError::BelowReferenceTemperature {
                temperature,
                reference: self.reference_temperature,
            });
        }
        let lower = self.band_minimum - self.window_below;
        let upper = self.band_minimum + self.window_above;
        if chemical_potential < lower || chemical_potential > upper {
            return Err(DomainError::OutsideModelWindow {
                chemical_potential,
                lower,
                upper,
            });
        }
        let kinetic = self.carrier.sign() * (energy - self.band_minimum);
        if kinetic <= 0. {
            return Ok(self.maximum_time);
        }
        let time = self.prefactor / ((temperature - self.reference_temperature) * kinetic.sqrt());
        Ok(time.min(self.maximum_time))
    }
}

#[derive(Clone)]
/// A relaxation time depending on temperature alone
pub struct TemperatureFunction {
    function: Arc<dyn Fn(f64) -> f64 + Send + Sync>,
    label: String,
}

impl TemperatureFunction {
    pub(crate) fn new<F>(function: F, label: impl Into<String>) -> Self
    where
        F: Fn(f64) -> f64 + Send + Sync + 'static,
    {
        Self {
            function: Arc::new(function),
            label: label.into(),
        }
    }

    pub(crate) fn relaxation_time(&self, temperature: f64) -> f64 {
        (self.function)(temperature)
    }
}

impl fmt::Debug for TemperatureFunction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("TemperatureFunction")
            .field("label", &self.label)
            .finish()
    }
}

#[cfg(test)]
mod test {
    use super::{Acoustic, Impurity};
    use crate::bands::CarrierType;
    use crate::error::DomainError;
    use approx::assert_relative_eq;

    #[test]
    fn impurity_lorentzian_peaks_at_the_level() {
        let impurity = Impurity::new(0.2, 3e-14, 0.05).unwrap();
        assert_relative_eq!(impurity.relaxation_time(0.2), 3e-14);
        assert_relative_eq!(impurity.relaxation_time(0.25), 1.5e-14, max_relative = 1e-12);
        assert_relative_eq!(impurity.relaxation_time(0.15), 1.5e-14, max_relative = 1e-12);
        assert!(Impurity::new(0.2, 1e-14, 0.).is_err());
    }

    #[test]
    fn acoustic_time_falls_with_energy_and_is_capped() {
        let acoustic = Acoustic::new(0., CarrierType::Electron)
            .with_prefactor(1e-12)
            .with_maximum_time(1e-13)
            .validate()
            .unwrap();
        // Below the edge and at tiny energies the cap applies
        assert_eq!(acoustic.relaxation_time(-0.1, 300., 0.).unwrap(), 1e-13);
        assert_eq!(acoustic.relaxation_time(1e-12, 300., 0.).unwrap(), 1e-13);
        let expected = 1e-12 / (250. * 0.04_f64.sqrt());
        assert_relative_eq!(
            acoustic.relaxation_time(0.04, 300., 0.).unwrap(),
            expected,
            max_relative = 1e-12
        );
    }

    #[test]
    fn acoustic_model_enforces_its_domain() {
        let acoustic = Acoustic::new(1.0, CarrierType::Hole).validate().unwrap();
        assert_eq!(
            acoustic.relaxation_time(0.5, 40., 1.0),
            Err(DomainError::BelowReferenceTemperature {
                temperature: 40.,
                reference: 50.
            })
        );
        assert!(matches!(
            acoustic.relaxation_time(0.5, 300., 3.5),
            Err(DomainError::OutsideModelWindow { .. })
        ));
        assert!(acoustic.relaxation_time(0.5, 300., -0.9).is_ok());
    }
}
