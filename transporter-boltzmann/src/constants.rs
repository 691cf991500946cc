// Copyright 2022 Chris Gubbin
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! # Constants
//!
//! Defines physical constants used in the transport integrals

/// The Boltzmann constant in m^2 kg / s^2 K
pub const BOLTZMANN: f64 = 1.38064852e-23;
/// Single electron charge in C
pub const ELECTRON_CHARGE: f64 = 1.60217662e-19;
/// Single electron mass in kg
pub const ELECTRON_MASS: f64 = 9.10938356e-31;
/// Reduced Planck constant in J s
pub const HBAR: f64 = 1.0545718e-34;
/// The Boltzmann constant in eV / K
pub const BOLTZMANN_EV: f64 = BOLTZMANN / ELECTRON_CHARGE;

/// The Sommerfeld value of the Lorenz number, pi^2 / 3 (k_B / e)^2, in W Ohm / K^2
pub const SOMMERFELD_LORENZ: f64 =
    std::f64::consts::PI * std::f64::consts::PI / 3. * BOLTZMANN_EV * BOLTZMANN_EV;
