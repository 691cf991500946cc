// Copyright 2022 Chris Gubbin
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! # Parabolic
//!
//! A single anisotropic parabolic valley. The dispersion is fixed by three principal effective
//! masses and the orientation of the principal axes in the laboratory frame:
//!
//! E(k) = ħ² Σᵢ kᵢ² / (2 mᵢ mₑ)
//!
//! where `E` is the kinetic energy of the carrier, measured upward from the band edge for
//! electrons and downward for holes.

use crate::constants::{ELECTRON_CHARGE, ELECTRON_MASS, HBAR};
use crate::error::{DomainError, TransportError};
use crate::integrals::IntegrationSettings;
use nalgebra::{Matrix3, Rotation3, Vector3};
use serde::Deserialize;
use std::f64::consts::PI;
use std::fmt;

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
/// The species of carrier hosted by a band
pub enum CarrierType {
    /// Conduction band, disperses upward from the edge
    Electron,
    /// Valence band, disperses downward from the edge
    Hole,
}

impl CarrierType {
    /// +1 for electrons, -1 for holes
    pub fn sign(&self) -> f64 {
        match self {
            CarrierType::Electron => 1.,
            CarrierType::Hole => -1.,
        }
    }
}

impl fmt::Display for CarrierType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CarrierType::Electron => write!(f, "electron"),
            CarrierType::Hole => write!(f, "hole"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
/// One of the three principal axes of a valley
pub enum PrincipalAxis {
    /// The axis of the first principal mass
    First,
    /// The axis of the second principal mass
    Second,
    /// The axis of the third principal mass
    Third,
}

impl PrincipalAxis {
    /// All three axes in order
    pub const ALL: [PrincipalAxis; 3] = [
        PrincipalAxis::First,
        PrincipalAxis::Second,
        PrincipalAxis::Third,
    ];

    pub(crate) fn index(&self) -> usize {
        match self {
            PrincipalAxis::First => 0,
            PrincipalAxis::Second => 1,
            PrincipalAxis::Third => 2,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
/// Principal effective masses in units of the free electron mass, and their orientation
pub struct EffectiveMass {
    principal: Vector3<f64>,
    orientation: Rotation3<f64>,
}

fn validate_masses(masses: [f64; 3]) -> Result<Vector3<f64>, DomainError> {
    for (index, &value) in masses.iter().enumerate() {
        if !(value > 0.) || !value.is_finite() {
            return Err(DomainError::NonPositiveMass { index, value });
        }
    }
    Ok(Vector3::from(masses))
}

impl EffectiveMass {
    /// A spherical valley
    pub fn isotropic(mass: f64) -> Result<Self, DomainError> {
        Self::principal([mass; 3])
    }

    /// An ellipsoidal valley whose principal axes coincide with the laboratory axes
    pub fn principal(masses: [f64; 3]) -> Result<Self, DomainError> {
        Ok(Self {
            principal: validate_masses(masses)?,
            orientation: Rotation3::identity(),
        })
    }

    /// An ellipsoidal valley rotated by the Euler angles `[roll, pitch, yaw]` in radians
    pub fn with_euler_angles(masses: [f64; 3], angles: [f64; 3]) -> Result<Self, DomainError> {
        if angles.iter().any(|angle| !angle.is_finite()) {
            return Err(DomainError::InvalidMassTensor);
        }
        Ok(Self {
            principal: validate_masses(masses)?,
            orientation: Rotation3::from_euler_angles(angles[0], angles[1], angles[2]),
        })
    }

    /// Diagonalise a symmetric positive-definite mass tensor in the laboratory frame
    pub fn from_tensor(tensor: Matrix3<f64>) -> Result<Self, DomainError> {
        if tensor.iter().any(|value| !value.is_finite()) {
            return Err(DomainError::InvalidMassTensor);
        }
        let asymmetry = (tensor - tensor.transpose()).abs().max();
        if asymmetry > 1e-12 * tensor.abs().max() {
            return Err(DomainError::InvalidMassTensor);
        }
        let decomposition = tensor.symmetric_eigen();
        if decomposition.eigenvalues.iter().any(|value| *value <= 0.) {
            return Err(DomainError::InvalidMassTensor);
        }
        let mut axes = decomposition.eigenvectors;
        // Eigenvectors may form a left-handed set, which is not a rotation
        if axes.determinant() < 0. {
            axes.column_mut(2).neg_mut();
        }
        Ok(Self {
            principal: decomposition.eigenvalues,
            orientation: Rotation3::from_matrix_unchecked(axes),
        })
    }

    /// The principal masses in units of the free electron mass
    pub fn principal_masses(&self) -> [f64; 3] {
        [self.principal[0], self.principal[1], self.principal[2]]
    }

    /// The principal mass along `axis`
    pub fn along(&self, axis: PrincipalAxis) -> f64 {
        self.principal[axis.index()]
    }

    /// The rotation taking the principal frame into the laboratory frame
    pub fn orientation(&self) -> &Rotation3<f64> {
        &self.orientation
    }

    /// The density-of-states mass `(m₁ m₂ m₃)^(1/3)`
    pub fn density_of_states_mass(&self) -> f64 {
        self.principal.product().cbrt()
    }

    /// Rotate a tensor which is diagonal in the principal frame into the laboratory frame
    pub(crate) fn rotate_diagonal(&self, diagonal: Vector3<f64>) -> Matrix3<f64> {
        let rotation = self.orientation.matrix();
        rotation * Matrix3::from_diagonal(&diagonal) * rotation.transpose()
    }

    /// The inverse mass tensor `R diag(1 / mᵢ) Rᵀ` in units of the inverse free electron mass
    pub fn inverse_mass_tensor(&self) -> Matrix3<f64> {
        self.rotate_diagonal(self.principal.map(|mass| 1. / mass))
    }

    /// The mass tensor `R diag(mᵢ) Rᵀ` in units of the free electron mass
    pub fn tensor(&self) -> Matrix3<f64> {
        self.rotate_diagonal(self.principal)
    }
}

#[derive(Clone, Debug, PartialEq)]
/// A single parabolic valley
pub struct ParabBand {
    mass: EffectiveMass,
    edge: f64,
    carrier: CarrierType,
    degeneracy: u32,
}

impl ParabBand {
    /// Create a band with edge `edge` in eV hosting `degeneracy` equivalent valleys
    pub fn new(
        mass: EffectiveMass,
        edge: f64,
        carrier: CarrierType,
        degeneracy: u32,
    ) -> Result<Self, DomainError> {
        if !edge.is_finite() {
            return Err(DomainError::NonFiniteBandEdge(edge));
        }
        if degeneracy == 0 {
            return Err(DomainError::ZeroDegeneracy);
        }
        Ok(Self {
            mass,
            edge,
            carrier,
            degeneracy,
        })
    }

    /// The effective mass and its orientation
    pub fn mass(&self) -> &EffectiveMass {
        &self.mass
    }

    /// Band edge in eV
    pub fn edge(&self) -> f64 {
        self.edge
    }

    /// Whether the band holds electrons or holes
    pub fn carrier(&self) -> CarrierType {
        self.carrier
    }

    /// Number of equivalent valleys
    pub fn degeneracy(&self) -> u32 {
        self.degeneracy
    }

    /// The carrier kinetic energy in eV at absolute energy `energy`, negative in the gap
    pub fn kinetic_energy(&self, energy: f64) -> f64 {
        self.carrier.sign() * (energy - self.edge)
    }

    /// The absolute energy in eV at which a carrier has kinetic energy `kinetic`
    pub fn absolute_energy(&self, kinetic: f64) -> f64 {
        self.edge + self.carrier.sign() * kinetic
    }

    /// The reduced chemical potential `η = s β (μ - ε₀)`
    pub fn reduced_chemical_potential(&self, chemical_potential: f64, temperature: f64) -> f64 {
        self.kinetic_energy(chemical_potential)
            / (crate::constants::BOLTZMANN_EV * temperature)
    }

    /// The prefactor `C = N_v / (2π²) (2 m_d mₑ / ħ²)^(3/2)` of the density of states in J^(-3/2) m^-3
    pub(crate) fn density_of_states_prefactor(&self) -> f64 {
        let mass = self.mass.density_of_states_mass() * ELECTRON_MASS;
        self.degeneracy as f64 / (2. * PI * PI) * (2. * mass / (HBAR * HBAR)).powf(1.5)
    }

    /// The density of states including spin in states per eV per m³ at absolute energy `energy`
    ///
    /// Zero at and below the band edge.
    pub fn density_of_states(&self, energy: f64) -> f64 {
        let kinetic = self.kinetic_energy(energy);
        if kinetic <= 0. {
            return 0.;
        }
        let kinetic = kinetic * ELECTRON_CHARGE;
        self.density_of_states_prefactor() * kinetic.sqrt() * ELECTRON_CHARGE
    }

    /// The direction-averaged squared velocity `2E / (3 mᵢ mₑ)` along a principal axis in m² s^-2
    pub fn velocity_weight(&self, energy: f64, axis: PrincipalAxis) -> f64 {
        let kinetic = self.kinetic_energy(energy);
        if kinetic <= 0. {
            return 0.;
        }
        2. * kinetic * ELECTRON_CHARGE / (3. * self.mass.along(axis) * ELECTRON_MASS)
    }

    /// The carrier density in m^-3 at chemical potential `chemical_potential` eV and temperature
    /// `temperature` K
    pub fn carrier_density(
        &self,
        chemical_potential: f64,
        temperature: f64,
        settings: &IntegrationSettings,
    ) -> Result<f64, TransportError> {
        crate::integrals::carrier_density(self, chemical_potential, temperature, settings)
    }

    /// The velocity weight tensor `v_i v_j` in the laboratory frame in m² s^-2
    pub fn velocity_weight_tensor(&self, energy: f64) -> Matrix3<f64> {
        let kinetic = self.kinetic_energy(energy).max(0.);
        self.mass.inverse_mass_tensor() * (2. * kinetic * ELECTRON_CHARGE / (3. * ELECTRON_MASS))
    }
}
