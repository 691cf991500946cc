// Copyright 2022 Chris Gubbin
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! # Integrals
//!
//! The generalised transport integral of a single parabolic band
//!
//! Lₙ = ∫ g(E) w(E) τ(ε, T, μ) (ε - μ)ⁿ (-∂f/∂ε) dE
//!
//! where `E` is the carrier kinetic energy and `ε` the absolute energy. For the density weight the
//! relaxation time is dropped and the Fermi window is replaced by the occupation of the carrier,
//! so that L₀ is the carrier density of the band.
//!
//! The integral is evaluated in the reduced variable x = βE. Writing η for the reduced chemical
//! potential measured into the band, the conductivity-type integral becomes
//!
//! Lₙ = C (2/3) (k_BT)^(3/2) (s k_BT)ⁿ / (mᵢ mₑ) ∫ x^(3/2) τ (x - η)ⁿ f(1 - f) dx
//!
//! and the substitution x = u² removes the square-root singularity at the band edge.

/// Adaptive Gauss-Kronrod quadrature on the reduced energy axis
pub mod quadrature;

pub use quadrature::{integrate, IntegrationSettings, Quadrature};

use crate::bands::{ParabBand, PrincipalAxis};
use crate::constants::{BOLTZMANN, BOLTZMANN_EV, ELECTRON_MASS};
use crate::error::{DomainError, TransportError};
use crate::fermi::{fermi_window, occupation};
use crate::scattering::ScatteringModel;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
/// The energy weight of a transport integral
pub enum Weight {
    /// The squared group velocity along a principal axis, for conductivity-type integrals
    Velocity(PrincipalAxis),
    /// Unit weight with the occupation kernel, for carrier densities
    Density,
}

/// Half-width in reduced energy of the region around the chemical potential resolved by breakpoints
const KERNEL_HALF_WIDTH: f64 = 10.;

pub(crate) fn validate_state(chemical_potential: f64, temperature: f64) -> Result<(), DomainError> {
    if !(temperature > 0.) || !temperature.is_finite() {
        return Err(DomainError::InvalidTemperature(temperature));
    }
    if !chemical_potential.is_finite() {
        return Err(DomainError::NonFiniteChemicalPotential(chemical_potential));
    }
    Ok(())
}

/// Breakpoints in the substituted variable `u = √x`
fn breakpoints(eta: f64, settings: &IntegrationSettings) -> [f64; 5] {
    [
        0.,
        (eta - KERNEL_HALF_WIDTH).max(0.).sqrt(),
        eta.max(0.).sqrt(),
        (eta + KERNEL_HALF_WIDTH).max(0.).sqrt(),
        (eta.max(0.) + settings.energy_cutoff).sqrt(),
    ]
}

/// The dimensionless integral `∫ x^(3/2) τ (x - η)ⁿ f(1 - f) dx`, τ in seconds
fn reduced_transport_integral(
    band: &ParabBand,
    chemical_potential: f64,
    temperature: f64,
    order: u32,
    scattering: &ScatteringModel,
    settings: &IntegrationSettings,
) -> Result<f64, TransportError> {
    let thermal_energy = BOLTZMANN_EV * temperature;
    let eta = band.reduced_chemical_potential(chemical_potential, temperature);
    let power = order as i32;

    let integrand = |u: f64| -> Result<f64, TransportError> {
        let x = u * u;
        let offset = x - eta;
        let energy = band.absolute_energy(x * thermal_energy);
        let time = scattering.evaluate(energy, temperature, chemical_potential)?;
        Ok(2. * x * x * time * offset.powi(power) * fermi_window(offset))
    };

    Ok(integrate(integrand, &breakpoints(eta, settings), settings)?.value)
}

/// The dimensionless integral `∫ x^(1/2) (x - η)ⁿ f dx` with `f` the carrier occupation
fn reduced_density_integral(
    band: &ParabBand,
    chemical_potential: f64,
    temperature: f64,
    order: u32,
    settings: &IntegrationSettings,
) -> Result<f64, TransportError> {
    let eta = band.reduced_chemical_potential(chemical_potential, temperature);
    let power = order as i32;

    let integrand = |u: f64| -> Result<f64, TransportError> {
        let x = u * u;
        let offset = x - eta;
        Ok(2. * x * offset.powi(power) * occupation(offset))
    };

    Ok(integrate(integrand, &breakpoints(eta, settings), settings)?.value)
}

/// The mass-independent part of the conductivity-type integral, in m^-3 s Jⁿ kg^-1 after division by
/// the axis mass
///
/// This is `C (2/3) (k_BT)^(3/2) (s k_BT)ⁿ Rₙ`, the common factor of the three principal axes.
pub(crate) fn scalar_transport_moment(
    band: &ParabBand,
    chemical_potential: f64,
    temperature: f64,
    order: u32,
    scattering: &ScatteringModel,
    settings: &IntegrationSettings,
) -> Result<f64, TransportError> {
    validate_state(chemical_potential, temperature)?;
    let thermal_energy = BOLTZMANN * temperature;
    let reduced = reduced_transport_integral(
        band,
        chemical_potential,
        temperature,
        order,
        scattering,
        settings,
    )?;
    Ok(band.density_of_states_prefactor()
        * 2.
        / 3.
        * thermal_energy.powf(1.5)
        * (band.carrier().sign() * thermal_energy).powi(order as i32)
        * reduced)
}

/// The generalised transport integral Lₙ of `band`
///
/// Energies are in eV and the temperature in K. The result is in SI units: for the velocity
/// weight m^-1 s^-1 s Jⁿ per unit volume, so that e² L₀ is a conductivity in S/m, and for the
/// density weight m^-3 Jⁿ.
pub fn transport_integral(
    band: &ParabBand,
    chemical_potential: f64,
    temperature: f64,
    order: u32,
    weight: Weight,
    scattering: &ScatteringModel,
    settings: &IntegrationSettings,
) -> Result<f64, TransportError> {
    match weight {
        Weight::Velocity(axis) => {
            let scalar = scalar_transport_moment(
                band,
                chemical_potential,
                temperature,
                order,
                scattering,
                settings,
            )?;
            Ok(scalar / (band.mass().along(axis) * ELECTRON_MASS))
        }
        Weight::Density => density_integral(band, chemical_potential, temperature, order, settings),
    }
}

/// The density-type integral `C (k_BT)^(3/2) (s k_BT)ⁿ ∫ x^(1/2) (x - η)ⁿ f dx` in m^-3 Jⁿ
fn density_integral(
    band: &ParabBand,
    chemical_potential: f64,
    temperature: f64,
    order: u32,
    settings: &IntegrationSettings,
) -> Result<f64, TransportError> {
    validate_state(chemical_potential, temperature)?;
    let thermal_energy = BOLTZMANN * temperature;
    let reduced = reduced_density_integral(band, chemical_potential, temperature, order, settings)?;
    Ok(band.density_of_states_prefactor()
        * thermal_energy.powf(1.5)
        * (band.carrier().sign() * thermal_energy).powi(order as i32)
        * reduced)
}

/// The carrier density of `band` in m^-3, electrons for conduction bands and holes for valence bands
pub fn carrier_density(
    band: &ParabBand,
    chemical_potential: f64,
    temperature: f64,
    settings: &IntegrationSettings,
) -> Result<f64, TransportError> {
    density_integral(band, chemical_potential, temperature, 0, settings)
}

#[cfg(test)]
mod test {
    use super::{carrier_density, transport_integral, IntegrationSettings, Weight};
    use crate::assembly::{band_moments, Property};
    use crate::bands::{CarrierType, EffectiveMass, ParabBand, PrincipalAxis};
    use crate::constants::{BOLTZMANN, BOLTZMANN_EV, ELECTRON_CHARGE, ELECTRON_MASS, HBAR};
    use crate::error::{DomainError, TransportError};
    use crate::fermi::{fermi_window, nondegenerate_fermi_dirac_integral};
    use crate::scattering::ScatteringModel;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    fn free_electron_band(carrier: CarrierType) -> ParabBand {
        ParabBand::new(EffectiveMass::isotropic(1.).unwrap(), 0., carrier, 1).unwrap()
    }

    /// Composite Simpson integration of the untransformed integrand in absolute energy
    fn simpson<F: Fn(f64) -> f64>(f: F, lower: f64, upper: f64, intervals: usize) -> f64 {
        let h = (upper - lower) / intervals as f64;
        let interior: f64 = (1..intervals)
            .map(|i| {
                let weight = if i % 2 == 1 { 4. } else { 2. };
                weight * f(lower + i as f64 * h)
            })
            .sum();
        h / 3. * (f(lower) + interior + f(upper))
    }

    #[test]
    fn single_band_coefficients_match_direct_integration() {
        let band = free_electron_band(CarrierType::Electron);
        let scattering = ScatteringModel::constant(1e-14).unwrap();
        let (mu, temperature) = (0.1, 300.);
        let settings = IntegrationSettings::default();
        let kt = BOLTZMANN_EV * temperature;

        let mut references = [0.; 3];
        for (order, reference) in references.iter_mut().enumerate() {
            let computed = transport_integral(
                &band,
                mu,
                temperature,
                order as u32,
                Weight::Velocity(PrincipalAxis::First),
                &scattering,
                &settings,
            )
            .unwrap();

            // g(ε) v²(ε) τ (ε - μ)ⁿ (-∂f/∂ε) in SI, integrated over ε in eV
            let integrand = |energy: f64| {
                if energy <= 0. {
                    return 0.;
                }
                let dos = band.density_of_states(energy) / ELECTRON_CHARGE;
                let velocity = band.velocity_weight(energy, PrincipalAxis::First);
                let window = fermi_window((energy - mu) / kt) / (kt * ELECTRON_CHARGE);
                let moment = ((energy - mu) * ELECTRON_CHARGE).powi(order as i32);
                dos * velocity * 1e-14 * moment * window * ELECTRON_CHARGE
            };
            // Split at the chemical potential where the kernel peaks
            *reference = simpson(integrand, 0., mu, 20_000)
                + simpson(integrand, mu, mu + 60. * kt, 200_000);
            assert_relative_eq!(computed, *reference, max_relative = 1e-6);
        }

        // The coefficients of the assembled moments against the same references
        let [k0, k1, k2] = references;
        let moments = band_moments(&band, mu, temperature, &scattering, &settings).unwrap();
        let evaluate = |property: Property| {
            property
                .evaluate(&moments, temperature, false)
                .unwrap()
                .scalar()
        };
        let sigma = ELECTRON_CHARGE * ELECTRON_CHARGE * k0;
        let seebeck = -k1 / (ELECTRON_CHARGE * temperature * k0);
        let kappa = (k2 - k1 * k1 / k0) / temperature;
        let lorenz = kappa / (sigma * temperature);
        assert_relative_eq!(evaluate(Property::Conductivity), sigma, max_relative = 1e-6);
        assert_relative_eq!(evaluate(Property::Seebeck), seebeck, max_relative = 1e-6);
        assert_relative_eq!(
            evaluate(Property::ThermalConductivity),
            kappa,
            max_relative = 1e-6
        );
        assert_relative_eq!(evaluate(Property::Lorenz), lorenz, max_relative = 1e-6);
    }

    #[test]
    fn nondegenerate_density_matches_the_fermi_dirac_series() {
        let temperature = 300.;
        let settings = IntegrationSettings::default();
        for carrier in [CarrierType::Electron, CarrierType::Hole] {
            let band = free_electron_band(carrier);
            for eta in [-20., -5., -1.] {
                let mu = carrier.sign() * eta * BOLTZMANN_EV * temperature;
                let density = carrier_density(&band, mu, temperature, &settings).unwrap();
                let effective_density = 2.
                    * (ELECTRON_MASS * BOLTZMANN * temperature / (2. * PI * HBAR * HBAR))
                        .powf(1.5);
                let expected =
                    effective_density * nondegenerate_fermi_dirac_integral(0.5, eta).unwrap();
                assert_relative_eq!(density, expected, max_relative = 1e-8);
            }
        }
    }

    #[test]
    fn integral_is_smooth_across_the_degeneracy_crossover() {
        // The integral must converge and vary smoothly for η ∈ [-50, 50]
        let band = free_electron_band(CarrierType::Electron);
        let scattering = ScatteringModel::constant(1e-14).unwrap();
        let settings = IntegrationSettings::default();
        let temperature = 300.;
        let kt = BOLTZMANN_EV * temperature;
        let values = (-100..=100)
            .map(|i| {
                let eta = i as f64 * 0.5;
                transport_integral(
                    &band,
                    eta * kt,
                    temperature,
                    0,
                    Weight::Velocity(PrincipalAxis::Second),
                    &scattering,
                    &settings,
                )
                .unwrap()
            })
            .collect::<Vec<_>>();
        assert!(values.iter().all(|value| *value > 0.));
        assert!(values.windows(2).all(|pair| pair[1] > pair[0]));
        // Deep in the Boltzmann limit successive points differ by exp(Δη)
        assert_relative_eq!(values[1] / values[0], 0.5_f64.exp(), max_relative = 1e-6);
        // In the degenerate limit L₀ grows as η^(3/2)
        let last = values.len() - 1;
        assert_relative_eq!(
            values[last] / values[last - 2],
            (50_f64 / 49.).powf(1.5),
            max_relative = 1e-3
        );
    }

    #[test]
    fn electron_and_hole_odd_moments_have_opposite_sign() {
        let settings = IntegrationSettings::default();
        let scattering = ScatteringModel::constant(1e-14).unwrap();
        let electron = free_electron_band(CarrierType::Electron);
        let hole = free_electron_band(CarrierType::Hole);
        let weight = Weight::Velocity(PrincipalAxis::Third);
        let first_electron =
            transport_integral(&electron, -0.1, 300., 1, weight, &scattering, &settings).unwrap();
        let first_hole =
            transport_integral(&hole, 0.1, 300., 1, weight, &scattering, &settings).unwrap();
        assert!(first_electron > 0.);
        assert_relative_eq!(first_hole, -first_electron, max_relative = 1e-12);
        let zeroth_electron =
            transport_integral(&electron, -0.1, 300., 0, weight, &scattering, &settings).unwrap();
        let zeroth_hole =
            transport_integral(&hole, 0.1, 300., 0, weight, &scattering, &settings).unwrap();
        assert_relative_eq!(zeroth_hole, zeroth_electron, max_relative = 1e-12);
    }

    #[test]
    fn invalid_thermodynamic_state_is_rejected() {
        let band = free_electron_band(CarrierType::Electron);
        let settings = IntegrationSettings::default();
        assert_eq!(
            carrier_density(&band, 0., 0., &settings),
            Err(TransportError::Domain(DomainError::InvalidTemperature(0.)))
        );
        assert!(matches!(
            carrier_density(&band, f64::NAN, 300., &settings),
            Err(TransportError::Domain(
                DomainError::NonFiniteChemicalPotential(_)
            ))
        ));
    }

    #[test]
    fn scattering_domain_errors_abort_the_integral() {
        let band = free_electron_band(CarrierType::Electron);
        let settings = IntegrationSettings::default();
        let scattering = ScatteringModel::temperature_function(|_| -1., "negative");
        assert!(matches!(
            transport_integral(
                &band,
                0.,
                300.,
                0,
                Weight::Velocity(PrincipalAxis::First),
                &scattering,
                &settings
            ),
            Err(TransportError::Domain(
                DomainError::InvalidRelaxationTime { .. }
            ))
        ));
    }
}
