// Copyright 2022 Chris Gubbin
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

use crate::bands::CarrierType;
use crate::error::ConfigurationError;
use crate::sweep::PropertyRequest;
use config::{Config, File, FileFormat};
use serde::Deserialize;
use std::path::Path;

/// Grids longer than this are assumed to be typos
const MAXIMUM_GRID_LENGTH: usize = 1_000_000;

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(untagged)]
/// A list of values, or a `[start:stop:step]` range whose stop is included within half a step
pub enum Grid {
    /// An explicit list
    Values(Vec<f64>),
    /// An evenly spaced range
    Range {
        /// First value
        start: f64,
        /// Last value, included within half a step
        stop: f64,
        /// Spacing, negative to step downwards
        step: f64,
    },
}

impl Grid {
    /// Expand the grid into its values
    pub fn values(&self) -> Result<Vec<f64>, ConfigurationError> {
        match self {
            Grid::Values(values) => Ok(values.clone()),
            &Grid::Range { start, stop, step } => {
                let invalid = ConfigurationError::InvalidRange { start, stop, step };
                if !start.is_finite() || !stop.is_finite() || !step.is_finite() || step == 0. {
                    return Err(invalid);
                }
                let intervals = ((stop - start) / step + 0.5).floor();
                if intervals < 0. || intervals >= MAXIMUM_GRID_LENGTH as f64 {
                    return Err(invalid);
                }
                Ok((0..=intervals as usize)
                    .map(|index| start + index as f64 * step)
                    .collect())
            }
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
/// One parabolic band of the job
pub struct BandDescription {
    /// Principal masses in units of the free electron mass
    pub masses: Option<[f64; 3]>,
    /// Euler angles `[roll, pitch, yaw]` in radians orienting the principal masses
    pub angles: Option<[f64; 3]>,
    /// The mass tensor in the laboratory frame, instead of `masses` and `angles`
    pub tensor: Option<[[f64; 3]; 3]>,
    /// Band edge in eV
    pub edge: f64,
    /// Whether the band holds electrons or holes
    pub carrier: CarrierType,
    /// Number of equivalent valleys, one if omitted
    #[serde(default = "unit_degeneracy")]
    pub degeneracy: u32,
}

fn unit_degeneracy() -> u32 {
    1
}

fn unity() -> f64 {
    1.
}

fn conventional_exponent() -> f64 {
    -1.
}

fn acoustic_reference_temperature() -> f64 {
    50.
}

fn acoustic_window() -> f64 {
    2.
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(tag = "model", rename_all = "snake_case")]
/// A node of the scattering tree
pub enum ScatteringDescription {
    /// Energy-independent relaxation time
    Constant {
        /// τ in s
        #[serde(default = "unity")]
        value: f64,
    },
    /// Impurity resonance
    Impurity {
        /// Centre of the resonance in eV
        energy: f64,
        /// Peak relaxation time in s
        #[serde(default = "unity")]
        prefactor: f64,
        /// Half width in eV
        #[serde(default = "unity")]
        width: f64,
    },
    /// Acoustic-phonon relaxation time around a band minimum
    Acoustic {
        /// Edge of the scattering band in eV
        band_minimum: f64,
        /// Carrier type of the scattering band
        carrier: CarrierType,
        /// The prefactor A
        #[serde(default = "unity")]
        prefactor: f64,
        /// Upper bound on τ in s
        #[serde(default = "unity")]
        maximum_time: f64,
        /// T0 in K
        #[serde(default = "acoustic_reference_temperature")]
        reference_temperature: f64,
        /// Extent of the window below the band minimum in eV
        #[serde(default = "acoustic_window")]
        window_below: f64,
        /// Extent of the window above the band minimum in eV
        #[serde(default = "acoustic_window")]
        window_above: f64,
    },
    /// τ = prefactor · T^exponent
    TemperaturePowerLaw {
        /// Prefactor in s
        prefactor: f64,
        /// Temperature exponent
        exponent: f64,
    },
    /// A generalised Matthiessen combination of child models
    Matthiessen {
        /// The child models
        models: Vec<ScatteringDescription>,
        /// Exponent γ, -1 for the conventional sum of rates
        #[serde(default = "conventional_exponent")]
        gamma: f64,
    },
}

impl Default for ScatteringDescription {
    fn default() -> Self {
        ScatteringDescription::Constant { value: 1. }
    }
}

fn room_temperature() -> f64 {
    300.
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
/// A transport job as read from a TOML description
pub struct JobDescription {
    /// Temperatures of the sweep in K
    pub temperatures: Grid,
    /// Chemical potentials of the sweep in eV
    pub chemical_potentials: Option<Grid>,
    /// Net carrier densities `p - n` of the sweep in m^-3
    pub carrier_densities: Option<Grid>,
    /// Temperature in K at which the reference state is fixed
    #[serde(default = "room_temperature")]
    pub reference_temperature: f64,
    /// Reference chemical potential in eV
    pub chemical_potential: Option<f64>,
    /// Reference net carrier density in m^-3
    pub carrier_density: Option<f64>,
    /// The bands of the structure
    pub bands: Vec<BandDescription>,
    /// The relaxation-time model
    #[serde(default)]
    pub scattering: ScatteringDescription,
    /// Properties to evaluate
    #[serde(default)]
    pub properties: Vec<PropertyRequest>,
}

impl JobDescription {
    /// Read a job from a TOML file
    pub fn build(path: &Path) -> Result<Self, ConfigurationError> {
        let s = Config::builder()
            .add_source(File::from(path))
            .build()
            .map_err(|e| ConfigurationError::Read(e.to_string()))?;
        s.try_deserialize()
            .map_err(|e| ConfigurationError::Read(format!("failed to deserialize job: {e}")))
    }

    /// Read a job from a TOML string
    pub fn from_toml(source: &str) -> Result<Self, ConfigurationError> {
        let s = Config::builder()
            .add_source(File::from_str(source, FileFormat::Toml))
            .build()
            .map_err(|e| ConfigurationError::Read(e.to_string()))?;
        s.try_deserialize()
            .map_err(|e| ConfigurationError::Read(format!("failed to deserialize job: {e}")))
    }
}
