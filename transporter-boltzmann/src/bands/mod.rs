// Copyright 2022 Chris Gubbin
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! Parabolic valleys and the band structures assembled from them

/// Single anisotropic parabolic valleys
pub mod parabolic;
/// Collections of bands sharing a chemical potential
pub mod structure;

pub use parabolic::{CarrierType, EffectiveMass, ParabBand, PrincipalAxis};
pub use structure::{
    carrier_densities, chemical_potential_for_density, BandStructure, BandStructureBuilder,
    CarrierDensities, RootFindingSettings,
};
