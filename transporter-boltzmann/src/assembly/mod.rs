// Copyright 2022 Chris Gubbin
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! # Assembly
//!
//! Transport tensors from the band moments. For each band the moment tensors are
//!
//! K_n = M⁻¹ C (2/3) (k_BT)^(3/2) (s k_BT)ⁿ Rₙ
//!
//! with `M⁻¹` the inverse mass tensor in the laboratory frame. The macroscopic coefficients
//! follow from the moments summed over all bands:
//!
//! - σ = e² K₀
//! - S = -K₀⁻¹ K₁ / (e T)
//! - κ = (K₂ - K₁ K₀⁻¹ K₁) / T
//! - L = κ σ⁻¹ / T
//!
//! Ratios are only ever formed from summed moments. In a bipolar structure the first moments of
//! electron and hole bands carry opposite signs and partially cancel, which a band-by-band ratio
//! would miss.

mod moments;
mod properties;

pub use moments::{band_moments, Moments};
pub use properties::{
    carrier_concentration, conductivity, lorenz, seebeck, thermal_conductivity, Property,
    PropertyTensor,
};
