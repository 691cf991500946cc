// Copyright 2022 Chris Gubbin
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

use super::Moments;
use crate::constants::ELECTRON_CHARGE;
use crate::error::SingularTensorError;
use nalgebra::Matrix3;
use serde::Deserialize;
use std::fmt;

/// Smallest ratio of the extreme eigenvalues of K₀ for which it is treated as invertible
const CONDITION_LIMIT: f64 = 1e-12;

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
/// A macroscopic transport coefficient
pub enum Property {
    /// σ in S/m
    Conductivity,
    /// S in V/K
    Seebeck,
    /// κ, the electronic thermal conductivity in W/(m K)
    ThermalConductivity,
    /// n, the net carrier density in m^-3
    Concentration,
    /// L = κ σ⁻¹ / T in W Ω / K²
    Lorenz,
}

impl Property {
    /// Every property in output order
    pub const ALL: [Property; 5] = [
        Property::Conductivity,
        Property::Seebeck,
        Property::ThermalConductivity,
        Property::Concentration,
        Property::Lorenz,
    ];

    /// A short column label
    pub fn symbol(&self) -> &'static str {
        match self {
            Property::Conductivity => "sigma",
            Property::Seebeck => "seebeck",
            Property::ThermalConductivity => "kappa",
            Property::Concentration => "n",
            Property::Lorenz => "lorenz",
        }
    }

    /// SI unit of the property
    pub fn unit(&self) -> &'static str {
        match self {
            Property::Conductivity => "S/m",
            Property::Seebeck => "V/K",
            Property::ThermalConductivity => "W/(m K)",
            Property::Concentration => "m^-3",
            Property::Lorenz => "W Ohm/K^2",
        }
    }

    /// Whether the property needs the conductivity-type moments, or only carrier densities
    pub fn needs_transport_moments(&self) -> bool {
        !matches!(self, Property::Concentration)
    }

    /// Evaluate the property from band-summed moments
    ///
    /// Tensor-valued properties are reduced to a third of their trace unless `full_tensor` is set.
    /// The concentration is always a scalar.
    pub fn evaluate(
        &self,
        moments: &Moments,
        temperature: f64,
        full_tensor: bool,
    ) -> Result<PropertyTensor, SingularTensorError> {
        let tensor = match self {
            Property::Conductivity => conductivity(moments),
            Property::Seebeck => seebeck(moments, temperature)?,
            Property::ThermalConductivity => thermal_conductivity(moments, temperature)?,
            Property::Lorenz => lorenz(moments, temperature)?,
            Property::Concentration => {
                return Ok(PropertyTensor::Scalar(carrier_concentration(moments)))
            }
        };
        Ok(PropertyTensor::reduce(tensor, full_tensor))
    }
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Property::Conductivity => "electrical conductivity",
            Property::Seebeck => "Seebeck coefficient",
            Property::ThermalConductivity => "electronic thermal conductivity",
            Property::Concentration => "carrier concentration",
            Property::Lorenz => "Lorenz tensor",
        };
        write!(f, "{name}")
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
/// A transport coefficient in the laboratory frame, or its isotropic average
pub enum PropertyTensor {
    /// The full 3×3 tensor
    Tensor(Matrix3<f64>),
    /// A third of the trace
    Scalar(f64),
}

impl PropertyTensor {
    fn reduce(tensor: Matrix3<f64>, full_tensor: bool) -> Self {
        if full_tensor {
            PropertyTensor::Tensor(tensor)
        } else {
            PropertyTensor::Scalar(tensor.trace() / 3.)
        }
    }

    /// The isotropic average, a third of the trace for tensors
    pub fn scalar(&self) -> f64 {
        match self {
            PropertyTensor::Tensor(tensor) => tensor.trace() / 3.,
            PropertyTensor::Scalar(value) => *value,
        }
    }

    /// The components in row-major order
    pub fn components(&self) -> Vec<f64> {
        match self {
            PropertyTensor::Tensor(tensor) => tensor.transpose().iter().copied().collect(),
            PropertyTensor::Scalar(value) => vec![*value],
        }
    }
}

/// The inverse of K₀, or an error naming the property which needed it
fn invert_zeroth(
    moments: &Moments,
    property: &'static str,
) -> Result<Matrix3<f64>, SingularTensorError> {
    let scale = moments.zeroth.abs().max();
    if !(scale > 0.) || !scale.is_finite() {
        return Err(SingularTensorError::VanishingConductivity { property });
    }
    let normalised = moments.zeroth / scale;
    let eigenvalues = normalised.symmetric_eigenvalues();
    let smallest = eigenvalues.iter().fold(f64::MAX, |acc, value| acc.min(value.abs()));
    let largest = eigenvalues.iter().fold(0_f64, |acc, value| acc.max(value.abs()));
    if smallest < CONDITION_LIMIT * largest {
        return Err(SingularTensorError::VanishingConductivity { property });
    }
    normalised
        .try_inverse()
        .map(|inverse| inverse / scale)
        .ok_or(SingularTensorError::VanishingConductivity { property })
}

fn check_temperature(temperature: f64, property: &'static str) -> Result<(), SingularTensorError> {
    if temperature > 0. && temperature.is_finite() {
        Ok(())
    } else {
        Err(SingularTensorError::VanishingTemperature { property })
    }
}

/// σ = e² K₀
pub fn conductivity(moments: &Moments) -> Matrix3<f64> {
    moments.zeroth * ELECTRON_CHARGE * ELECTRON_CHARGE
}

/// S = -K₀⁻¹ K₁ / (e T)
pub fn seebeck(moments: &Moments, temperature: f64) -> Result<Matrix3<f64>, SingularTensorError> {
    let property = "Seebeck coefficient";
    check_temperature(temperature, property)?;
    let inverse = invert_zeroth(moments, property)?;
    Ok(-(inverse * moments.first) / (ELECTRON_CHARGE * temperature))
}

/// κ = (K₂ - K₁ K₀⁻¹ K₁) / T
pub fn thermal_conductivity(
    moments: &Moments,
    temperature: f64,
) -> Result<Matrix3<f64>, SingularTensorError> {
    let property = "electronic thermal conductivity";
    check_temperature(temperature, property)?;
    let inverse = invert_zeroth(moments, property)?;
    Ok((moments.second - moments.first * inverse * moments.first) / temperature)
}

/// L = κ σ⁻¹ / T
pub fn lorenz(moments: &Moments, temperature: f64) -> Result<Matrix3<f64>, SingularTensorError> {
    let property = "Lorenz tensor";
    check_temperature(temperature, property)?;
    let inverse = invert_zeroth(moments, property)?;
    let kappa = (moments.second - moments.first * inverse * moments.first) / temperature;
    Ok(kappa * inverse / (ELECTRON_CHARGE * ELECTRON_CHARGE * temperature))
}

/// The net carrier density `p - n` in m^-3
pub fn carrier_concentration(moments: &Moments) -> f64 {
    moments.net_carrier_density()
}
