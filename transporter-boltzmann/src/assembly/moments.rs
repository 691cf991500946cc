// Copyright 2022 Chris Gubbin
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

use super::{Property, PropertyTensor};
use crate::bands::{BandStructure, CarrierDensities, CarrierType, ParabBand, PrincipalAxis};
use crate::constants::ELECTRON_MASS;
use crate::error::TransportError;
use crate::integrals::{carrier_density, quadrature::IntegrationSettings, scalar_transport_moment};
use crate::scattering::ScatteringModel;
use nalgebra::{Matrix3, Vector3};
use std::iter::Sum;
use std::ops::{Add, AddAssign};

#[derive(Clone, Copy, Debug, PartialEq)]
/// The transport moments K₀, K₁, K₂ in the laboratory frame, and the carrier densities
///
/// Moments of different bands share the absolute energy axis and are summed element-wise.
pub struct Moments {
    /// K₀ in m^-1 V^-1 s^-1 C^-1, σ = e² K₀
    pub zeroth: Matrix3<f64>,
    /// K₁ in units of K₀ times J
    pub first: Matrix3<f64>,
    /// K₂ in units of K₀ times J²
    pub second: Matrix3<f64>,
    /// Carrier densities in m^-3
    pub densities: CarrierDensities,
}

impl Moments {
    /// Moments of an empty band structure
    pub fn zero() -> Self {
        Self {
            zeroth: Matrix3::zeros(),
            first: Matrix3::zeros(),
            second: Matrix3::zeros(),
            densities: CarrierDensities::default(),
        }
    }

    /// The net carrier density `p - n` in m^-3
    pub fn net_carrier_density(&self) -> f64 {
        self.densities.net()
    }
}

impl Add for Moments {
    type Output = Self;
    fn add(mut self, rhs: Self) -> Self {
        self += rhs;
        self
    }
}

impl AddAssign for Moments {
    fn add_assign(&mut self, rhs: Self) {
        self.zeroth += rhs.zeroth;
        self.first += rhs.first;
        self.second += rhs.second;
        self.densities = self.densities + rhs.densities;
    }
}

impl Sum for Moments {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::zero(), Add::add)
    }
}

/// The moments of a single band
///
/// The three principal-axis integrals share one energy integral per order, which is scaled by
/// the inverse principal masses and rotated into the laboratory frame.
pub fn band_moments(
    band: &ParabBand,
    chemical_potential: f64,
    temperature: f64,
    scattering: &ScatteringModel,
    settings: &IntegrationSettings,
) -> Result<Moments, TransportError> {
    let mut tensors = [Matrix3::zeros(); 3];
    for (order, tensor) in tensors.iter_mut().enumerate() {
        let scalar = scalar_transport_moment(
            band,
            chemical_potential,
            temperature,
            order as u32,
            scattering,
            settings,
        )?;
        let principal = Vector3::from_iterator(
            PrincipalAxis::ALL
                .iter()
                .map(|axis| scalar / (band.mass().along(*axis) * ELECTRON_MASS)),
        );
        *tensor = band.mass().rotate_diagonal(principal);
    }

    let density = carrier_density(band, chemical_potential, temperature, settings)?;
    let densities = match band.carrier() {
        CarrierType::Electron => CarrierDensities {
            electrons: density,
            holes: 0.,
        },
        CarrierType::Hole => CarrierDensities {
            electrons: 0.,
            holes: density,
        },
    };

    let [zeroth, first, second] = tensors;
    Ok(Moments {
        zeroth,
        first,
        second,
        densities,
    })
}

impl BandStructure {
    /// The moments of each band in order
    pub fn band_resolved_moments(
        &self,
        chemical_potential: f64,
        temperature: f64,
        scattering: &ScatteringModel,
        settings: &IntegrationSettings,
    ) -> Result<Vec<Moments>, TransportError> {
        self.bands()
            .iter()
            .map(|band| band_moments(band, chemical_potential, temperature, scattering, settings))
            .collect()
    }

    /// The moments summed over all bands
    pub fn moments(
        &self,
        chemical_potential: f64,
        temperature: f64,
        scattering: &ScatteringModel,
        settings: &IntegrationSettings,
    ) -> Result<Moments, TransportError> {
        Ok(self
            .band_resolved_moments(chemical_potential, temperature, scattering, settings)?
            .into_iter()
            .sum())
    }

    /// `property` evaluated from the moments of each band alone
    ///
    /// Ratios of single-band moments ignore bipolar compensation, so these values are diagnostics
    /// and do not sum to the property of the structure.
    pub fn band_resolved_property(
        &self,
        property: Property,
        chemical_potential: f64,
        temperature: f64,
        scattering: &ScatteringModel,
        settings: &IntegrationSettings,
        full_tensor: bool,
    ) -> Result<Vec<PropertyTensor>, TransportError> {
        self.band_resolved_moments(chemical_potential, temperature, scattering, settings)?
            .iter()
            .map(|moments| {
                property
                    .evaluate(moments, temperature, full_tensor)
                    .map_err(TransportError::from)
            })
            .collect()
    }
}
