// Copyright 2022 Chris Gubbin
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! # Sweep
//!
//! Evaluates the requested transport properties over a grid of temperatures and either chemical
//! potentials or net carrier densities. Each grid point is an independent task on the rayon pool:
//! the moments of the point are computed once and shared by every requested property, and each
//! task writes only its own output slot.
//!
//! A numerical failure at a point is recorded as a [`PointFailure`] and leaves the affected slots
//! empty, the rest of the grid is unaffected. Cancellation through a [`CancellationToken`] is
//! checked before each point is started and discards the whole grid.

mod result;

pub use result::{PointFailure, PropertyGrid, SweepResult, Table};

use crate::assembly::{Moments, Property, PropertyTensor};
use crate::bands::{BandStructure, CarrierDensities, RootFindingSettings};
use crate::error::{ConfigurationError, SweepError, TransportError};
use crate::integrals::IntegrationSettings;
use crate::scattering::ScatteringModel;
use ndarray::Array2;
use rayon::prelude::*;
use serde::Deserialize;
use std::cell::OnceCell;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
/// A property to evaluate and how to report it
pub struct PropertyRequest {
    /// The property to evaluate
    pub property: Property,
    /// Report the full 3×3 tensor instead of a third of its trace
    #[serde(default)]
    pub full_tensor: bool,
    /// Produce a table of the grid for export
    #[serde(default)]
    pub export_as_table: bool,
}

impl PropertyRequest {
    /// A scalar-valued request with tabular export
    pub fn new(property: Property) -> Self {
        Self {
            property,
            full_tensor: false,
            export_as_table: true,
        }
    }

    /// Report the full tensor
    pub fn with_full_tensor(mut self, full_tensor: bool) -> Self {
        self.full_tensor = full_tensor;
        self
    }
}

#[derive(Clone, Debug, PartialEq)]
/// The second axis of the sweep grid
pub enum Abscissa {
    /// Chemical potentials in eV
    ChemicalPotentials(Vec<f64>),
    /// Net carrier densities `p - n` in m^-3, converted to chemical potentials at each temperature
    CarrierDensities(Vec<f64>),
}

impl Abscissa {
    /// The raw values of the axis
    pub fn values(&self) -> &[f64] {
        match self {
            Abscissa::ChemicalPotentials(values) | Abscissa::CarrierDensities(values) => values,
        }
    }

    /// Number of points on the axis
    pub fn len(&self) -> usize {
        self.values().len()
    }

    /// Whether the axis has no points
    pub fn is_empty(&self) -> bool {
        self.values().is_empty()
    }

    fn name(&self) -> &'static str {
        match self {
            Abscissa::ChemicalPotentials(_) => "chemical potential",
            Abscissa::CarrierDensities(_) => "carrier density",
        }
    }
}

#[derive(Clone, Debug, Default)]
/// A flag shared between a running sweep and its controller
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    /// A token which has not fired
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation, points already started run to completion
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation was requested
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
/// Numerical settings of a sweep
pub struct SweepSettings {
    /// Quadrature settings at every point
    pub integration: IntegrationSettings,
    /// Settings of the density to chemical potential conversion
    pub root_finding: RootFindingSettings,
    /// Size of a dedicated worker pool, `None` runs on the global rayon pool
    pub number_of_threads: Option<usize>,
}

/// Builder for a [`Sweep`]
pub struct SweepBuilder<RefBandStructure, RefScattering> {
    band_structure: RefBandStructure,
    scattering: RefScattering,
    temperatures: Vec<f64>,
    abscissa: Option<Abscissa>,
    requests: Vec<PropertyRequest>,
    settings: SweepSettings,
    cancellation: CancellationToken,
}

impl Default for SweepBuilder<(), ()> {
    fn default() -> Self {
        Self {
            band_structure: (),
            scattering: (),
            temperatures: Vec::new(),
            abscissa: None,
            requests: Vec::new(),
            settings: SweepSettings::default(),
            cancellation: CancellationToken::default(),
        }
    }
}

impl<RefBandStructure, RefScattering> SweepBuilder<RefBandStructure, RefScattering> {
    /// The band structure to sweep
    pub fn with_band_structure(
        self,
        band_structure: &BandStructure,
    ) -> SweepBuilder<&BandStructure, RefScattering> {
        SweepBuilder {
            band_structure,
            scattering: self.scattering,
            temperatures: self.temperatures,
            abscissa: self.abscissa,
            requests: self.requests,
            settings: self.settings,
            cancellation: self.cancellation,
        }
    }

    /// The relaxation-time model
    pub fn with_scattering_model(
        self,
        scattering: &ScatteringModel,
    ) -> SweepBuilder<RefBandStructure, &ScatteringModel> {
        SweepBuilder {
            band_structure: self.band_structure,
            scattering,
            temperatures: self.temperatures,
            abscissa: self.abscissa,
            requests: self.requests,
            settings: self.settings,
            cancellation: self.cancellation,
        }
    }

    /// Temperatures in K
    pub fn with_temperatures(mut self, temperatures: Vec<f64>) -> Self {
        self.temperatures = temperatures;
        self
    }

    /// Sweep over chemical potentials or carrier densities
    ///
    /// When unset the sweep runs at the chemical potential of the band structure alone.
    pub fn with_abscissa(mut self, abscissa: Abscissa) -> Self {
        self.abscissa = Some(abscissa);
        self
    }

    /// The properties to evaluate at each point
    pub fn with_properties(mut self, requests: Vec<PropertyRequest>) -> Self {
        self.requests = requests;
        self
    }

    /// Numerical settings and the size of the worker pool
    pub fn with_settings(mut self, settings: SweepSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Share a cancellation token with a controller
    pub fn with_cancellation_token(mut self, cancellation: CancellationToken) -> Self {
        self.cancellation = cancellation;
        self
    }
}

fn validate_grid(
    name: &'static str,
    values: &[f64],
    positive: bool,
) -> Result<(), ConfigurationError> {
    if values.is_empty() {
        return Err(ConfigurationError::EmptyGrid(name));
    }
    for &value in values {
        if !value.is_finite() || (positive && value <= 0.) {
            return Err(ConfigurationError::InvalidGridValue { grid: name, value });
        }
    }
    Ok(())
}

impl<'a> SweepBuilder<&'a BandStructure, &'a ScatteringModel> {
    /// Validate the grid and the requests
    pub fn build(self) -> Result<Sweep<'a>, ConfigurationError> {
        validate_grid("temperature", &self.temperatures, true)?;
        let abscissa = self.abscissa.unwrap_or_else(|| {
            Abscissa::ChemicalPotentials(vec![self.band_structure.chemical_potential()])
        });
        validate_grid(abscissa.name(), abscissa.values(), false)?;
        if self.requests.is_empty() {
            return Err(ConfigurationError::NoProperties);
        }
        self.settings.integration.validate()?;
        self.settings.root_finding.validate()?;
        if self.settings.number_of_threads == Some(0) {
            return Err(ConfigurationError::InvalidSetting {
                name: "number_of_threads",
                value: 0.,
            });
        }
        Ok(Sweep {
            band_structure: self.band_structure,
            scattering: self.scattering,
            temperatures: self.temperatures,
            abscissa,
            requests: self.requests,
            settings: self.settings,
            cancellation: self.cancellation,
        })
    }
}

/// The values computed at one grid point
struct PointOutcome {
    chemical_potential: Option<f64>,
    values: Vec<Result<PropertyTensor, TransportError>>,
}

/// A validated transport sweep
pub struct Sweep<'a> {
    band_structure: &'a BandStructure,
    scattering: &'a ScatteringModel,
    temperatures: Vec<f64>,
    abscissa: Abscissa,
    requests: Vec<PropertyRequest>,
    settings: SweepSettings,
    cancellation: CancellationToken,
}

impl<'a> Sweep<'a> {
    /// Start building a sweep
    pub fn builder() -> SweepBuilder<(), ()> {
        SweepBuilder::default()
    }

    /// A handle which cancels this sweep
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancellation.clone()
    }

    /// Points in the (temperature, abscissa) grid
    pub fn number_of_points(&self) -> usize {
        self.temperatures.len() * self.abscissa.len()
    }

    /// Evaluate every requested property at the point (temperature, abscissa)
    fn evaluate_point(&self, temperature: f64, abscissa: f64) -> PointOutcome {
        let chemical_potential = match self.abscissa {
            Abscissa::ChemicalPotentials(_) => Ok(abscissa),
            Abscissa::CarrierDensities(_) => self.band_structure.chemical_potential_for_density(
                abscissa,
                temperature,
                &self.settings.integration,
                &self.settings.root_finding,
            ),
        };
        let chemical_potential = match chemical_potential {
            Ok(value) => value,
            Err(error) => {
                return PointOutcome {
                    chemical_potential: None,
                    values: vec![Err(error); self.requests.len()],
                }
            }
        };

        let integration = &self.settings.integration;
        let needs_transport = self
            .requests
            .iter()
            .any(|request| request.property.needs_transport_moments());
        let transport = OnceCell::new();
        let transport_moments = || {
            self.band_structure.moments(
                chemical_potential,
                temperature,
                self.scattering,
                integration,
            )
        };
        // Densities do not depend on the relaxation time, so they survive a scattering failure
        let densities = OnceCell::new();
        let density_moments = || -> Result<Moments, TransportError> {
            if needs_transport {
                if let Ok(moments) = transport.get_or_init(transport_moments) {
                    return Ok(*moments);
                }
            }
            let densities: CarrierDensities =
                self.band_structure
                    .carrier_densities(chemical_potential, temperature, integration)?;
            Ok(Moments {
                densities,
                ..Moments::zero()
            })
        };

        let values = self
            .requests
            .iter()
            .map(|request| {
                let moments = if request.property.needs_transport_moments() {
                    transport.get_or_init(transport_moments)
                } else {
                    densities.get_or_init(density_moments)
                };
                match moments {
                    Ok(moments) => request
                        .property
                        .evaluate(moments, temperature, request.full_tensor)
                        .map_err(TransportError::from),
                    Err(error) => Err(error.clone()),
                }
            })
            .collect();

        PointOutcome {
            chemical_potential: Some(chemical_potential),
            values,
        }
    }

    fn evaluate_grid(&self) -> Vec<Option<PointOutcome>> {
        let columns = self.abscissa.len();
        (0..self.number_of_points())
            .into_par_iter()
            .map(|index| {
                if self.cancellation.is_cancelled() {
                    return None;
                }
                let temperature = self.temperatures[index / columns];
                let abscissa = self.abscissa.values()[index % columns];
                Some(self.evaluate_point(temperature, abscissa))
            })
            .collect()
    }

    /// Run the sweep to completion
    #[tracing::instrument(name = "Transport sweep", level = "info", skip(self))]
    pub fn run(&self) -> Result<SweepResult, SweepError> {
        tracing::info!(
            "Sweeping {} temperatures × {} {} values for {} properties",
            self.temperatures.len(),
            self.abscissa.len(),
            self.abscissa.name(),
            self.requests.len()
        );

        let outcomes = match self.settings.number_of_threads {
            Some(threads) => rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .build()?
                .install(|| self.evaluate_grid()),
            None => self.evaluate_grid(),
        };

        if self.cancellation.is_cancelled() {
            tracing::warn!("Sweep cancelled, discarding the partial grid");
            return Err(SweepError::Cancelled);
        }

        let shape = (self.temperatures.len(), self.abscissa.len());
        let mut chemical_potentials = Array2::from_elem(shape, None);
        let mut grids = self
            .requests
            .iter()
            .map(|request| PropertyGrid {
                request: *request,
                values: Array2::from_elem(shape, None),
            })
            .collect::<Vec<_>>();
        let mut failures = Vec::new();

        for (index, outcome) in outcomes.into_iter().enumerate() {
            // A missing outcome can only follow cancellation, which was handled above
            let outcome = outcome.ok_or(SweepError::Cancelled)?;
            let indices = (index / shape.1, index % shape.1);
            chemical_potentials[[indices.0, indices.1]] = outcome.chemical_potential;
            for (grid, value) in grids.iter_mut().zip(outcome.values) {
                match value {
                    Ok(tensor) => grid.values[[indices.0, indices.1]] = Some(tensor),
                    Err(error) => {
                        let failure = PointFailure {
                            property: grid.request.property,
                            indices,
                            temperature: self.temperatures[indices.0],
                            abscissa: self.abscissa.values()[indices.1],
                            error,
                        };
                        tracing::warn!(
                            "{} failed at T = {} K, {} = {}: {}",
                            failure.property,
                            failure.temperature,
                            self.abscissa.name(),
                            failure.abscissa,
                            failure.error
                        );
                        failures.push(failure);
                    }
                }
            }
        }

        tracing::info!(
            "Sweep finished with {} failed slots out of {}",
            failures.len(),
            self.number_of_points() * self.requests.len()
        );

        Ok(SweepResult {
            temperatures: self.temperatures.clone(),
            abscissa: self.abscissa.clone(),
            chemical_potentials,
            grids,
            failures,
        })
    }
}

#[cfg(test)]
mod test {
    use super::{Abscissa, CancellationToken, PropertyRequest, Sweep, SweepSettings};
    use crate::assembly::{Property, PropertyTensor};
    use crate::bands::{BandStructure, CarrierType, EffectiveMass, ParabBand};
    use crate::error::{ConfigurationError, DomainError, SweepError, TransportError};
    use crate::scattering::{Acoustic, ScatteringModel};
    use approx::assert_relative_eq;

    fn structure() -> BandStructure {
        BandStructure::builder()
            .with_bands(vec![
                ParabBand::new(
                    EffectiveMass::principal([0.3, 0.3, 0.8]).unwrap(),
                    0.,
                    CarrierType::Electron,
                    2,
                )
                .unwrap(),
                ParabBand::new(
                    EffectiveMass::isotropic(0.5).unwrap(),
                    -0.4,
                    CarrierType::Hole,
                    1,
                )
                .unwrap(),
            ])
            .with_chemical_potential(0.)
            .build()
            .unwrap()
    }

    #[test]
    fn sweep_fills_every_slot_of_a_well_posed_grid() {
        let structure = structure();
        let scattering = ScatteringModel::constant(1e-14).unwrap();
        let sweep = Sweep::builder()
            .with_band_structure(&structure)
            .with_scattering_model(&scattering)
            .with_temperatures(vec![200., 300., 400.])
            .with_abscissa(Abscissa::ChemicalPotentials(vec![-0.1, 0.0, 0.1, 0.2]))
            .with_properties(vec![
                PropertyRequest::new(Property::Conductivity),
                PropertyRequest::new(Property::Seebeck).with_full_tensor(true),
                PropertyRequest::new(Property::Concentration),
            ])
            .build()
            .unwrap();
        let result = sweep.run().unwrap();
        assert!(result.is_complete());
        assert_eq!(result.grids.len(), 3);
        for grid in &result.grids {
            assert_eq!(grid.values.dim(), (3, 4));
            assert!(grid.values.iter().all(Option::is_some));
        }
        match result.grid(Property::Seebeck).unwrap().values[[1, 2]] {
            Some(PropertyTensor::Tensor(tensor)) => assert!(tensor[(0, 0)] < 0.),
            ref other => panic!("expected a tensor, found {:?}", other),
        }

        let table = result.table(result.grid(Property::Seebeck).unwrap());
        assert_eq!(table.columns.len(), 2 + 9);
        assert_eq!(table.rows.len(), 12);
        assert_eq!(table.rows[5][0], Some(300.));
        assert_eq!(table.rows[5][1], Some(0.0));
    }

    #[test]
    fn sweep_matches_direct_evaluation() {
        let structure = structure();
        let scattering = ScatteringModel::constant(1e-14).unwrap();
        let settings = SweepSettings {
            number_of_threads: Some(2),
            ..SweepSettings::default()
        };
        let result = Sweep::builder()
            .with_band_structure(&structure)
            .with_scattering_model(&scattering)
            .with_temperatures(vec![300.])
            .with_abscissa(Abscissa::ChemicalPotentials(vec![0.05]))
            .with_properties(vec![PropertyRequest::new(Property::Conductivity)])
            .with_settings(settings)
            .build()
            .unwrap()
            .run()
            .unwrap();
        let moments = structure
            .moments(0.05, 300., &scattering, &settings.integration)
            .unwrap();
        let expected = Property::Conductivity
            .evaluate(&moments, 300., false)
            .unwrap();
        assert_eq!(
            result.grid(Property::Conductivity).unwrap().values[[0, 0]],
            Some(expected)
        );
    }

    #[test]
    fn failures_are_recorded_per_point() {
        let structure = structure();
        // T₀ = 250 K makes the acoustic model undefined at 200 K only
        let scattering = ScatteringModel::acoustic(
            Acoustic::new(0., CarrierType::Electron)
                .with_prefactor(1e-12)
                .with_maximum_time(1e-13)
                .with_reference_temperature(250.),
        )
        .unwrap();
        let result = Sweep::builder()
            .with_band_structure(&structure)
            .with_scattering_model(&scattering)
            .with_temperatures(vec![200., 300.])
            .with_abscissa(Abscissa::ChemicalPotentials(vec![0.0, 0.1]))
            .with_properties(vec![
                PropertyRequest::new(Property::Seebeck),
                PropertyRequest::new(Property::Concentration),
            ])
            .build()
            .unwrap()
            .run()
            .unwrap();

        let seebeck = result.grid(Property::Seebeck).unwrap();
        assert!(seebeck.values.row(0).iter().all(Option::is_none));
        assert!(seebeck.values.row(1).iter().all(Option::is_some));
        // The concentration does not depend on the scattering model
        let concentration = result.grid(Property::Concentration).unwrap();
        assert!(concentration.values.iter().all(Option::is_some));

        assert_eq!(result.failures.len(), 2);
        for failure in &result.failures {
            assert_eq!(failure.property, Property::Seebeck);
            assert_eq!(failure.indices.0, 0);
            assert_eq!(failure.temperature, 200.);
            assert!(matches!(
                failure.error,
                TransportError::Domain(DomainError::BelowReferenceTemperature { .. })
            ));
        }
        let table = result.table(seebeck);
        assert_eq!(table.rows[0][2], None);
        assert!(table.rows[2][2].is_some());
    }

    #[test]
    fn density_abscissa_is_converted_at_each_temperature() {
        let structure = structure();
        let scattering = ScatteringModel::constant(1e-14).unwrap();
        let target = -1e24;
        let result = Sweep::builder()
            .with_band_structure(&structure)
            .with_scattering_model(&scattering)
            .with_temperatures(vec![150., 300., 450.])
            .with_abscissa(Abscissa::CarrierDensities(vec![target]))
            .with_properties(vec![PropertyRequest::new(Property::Concentration)])
            .build()
            .unwrap()
            .run()
            .unwrap();
        let grid = result.grid(Property::Concentration).unwrap();
        for value in grid.values.iter() {
            assert_relative_eq!(value.unwrap().scalar(), target, max_relative = 1e-8);
        }
        let potentials = result.chemical_potentials.column(0).to_vec();
        assert!(potentials.iter().all(Option::is_some));
        // A fixed electron density pushes the chemical potential down as the temperature rises
        assert!(potentials[0] > potentials[2]);
        assert_eq!(result.table(grid).columns.len(), 4);
    }

    #[test]
    fn cancelled_sweeps_discard_their_grid() {
        let structure = structure();
        let scattering = ScatteringModel::constant(1e-14).unwrap();
        let token = CancellationToken::new();
        let sweep = Sweep::builder()
            .with_band_structure(&structure)
            .with_scattering_model(&scattering)
            .with_temperatures(vec![300.])
            .with_properties(vec![PropertyRequest::new(Property::Conductivity)])
            .with_cancellation_token(token.clone())
            .build()
            .unwrap();
        token.cancel();
        assert!(matches!(sweep.run(), Err(SweepError::Cancelled)));
    }

    #[test]
    fn malformed_grids_are_rejected() {
        let structure = structure();
        let scattering = ScatteringModel::constant(1e-14).unwrap();
        let error = Sweep::builder()
            .with_band_structure(&structure)
            .with_scattering_model(&scattering)
            .with_temperatures(vec![300., -1.])
            .with_properties(vec![PropertyRequest::new(Property::Conductivity)])
            .build()
            .err();
        assert_eq!(
            error,
            Some(ConfigurationError::InvalidGridValue {
                grid: "temperature",
                value: -1.
            })
        );
        let error = Sweep::builder()
            .with_band_structure(&structure)
            .with_scattering_model(&scattering)
            .with_temperatures(vec![300.])
            .build()
            .err();
        assert_eq!(error, Some(ConfigurationError::NoProperties));
    }
}
