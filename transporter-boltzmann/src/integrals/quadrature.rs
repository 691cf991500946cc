// Copyright 2022 Chris Gubbin
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! # Quadrature
//!
//! Globally adaptive Gauss-Kronrod integration on a finite interval. The interval is split at a set
//! of breakpoints, each piece is integrated with the 7-point Gauss and 15-point Kronrod pair, and
//! the piece with the largest error estimate is bisected until the summed error estimate meets
//! the tolerance or the subdivision budget runs out.
//!
//! Integrands are fallible, so a domain error raised at any node aborts the integration and is
//! propagated to the caller unchanged.

use crate::error::{ConfigurationError, ConvergenceError, DomainError, TransportError};
use serde::Deserialize;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// Kronrod abscissae on [-1, 1], the odd entries are shared with the Gauss rule
const KRONROD_NODES: [f64; 8] = [
    0.991_455_371_120_812_6,
    0.949_107_912_342_758_5,
    0.864_864_423_359_769_1,
    0.741_531_185_599_394_4,
    0.586_087_235_467_691_1,
    0.405_845_151_377_397_2,
    0.207_784_955_007_898_5,
    0.0,
];

const KRONROD_WEIGHTS: [f64; 8] = [
    0.022_935_322_010_529_22,
    0.063_092_092_629_978_55,
    0.104_790_010_322_250_18,
    0.140_653_259_715_525_92,
    0.169_004_726_639_267_9,
    0.190_350_578_064_785_4,
    0.204_432_940_075_298_9,
    0.209_482_141_084_727_83,
];

const GAUSS_WEIGHTS: [f64; 4] = [
    0.129_484_966_168_869_7,
    0.279_705_391_489_276_7,
    0.381_830_050_505_118_9,
    0.417_959_183_673_469_4,
];

#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
#[serde(default)]
/// Tolerances and budgets of the transport integrals
pub struct IntegrationSettings {
    /// Requested error relative to the magnitude of the integral
    pub relative_tolerance: f64,
    /// Requested absolute error, zero disables the absolute criterion
    pub absolute_tolerance: f64,
    /// The number of intervals after which the integration gives up
    pub maximum_subdivisions: usize,
    /// Integration stops `energy_cutoff` reduced energies past the chemical potential
    pub energy_cutoff: f64,
}

impl Default for IntegrationSettings {
    fn default() -> Self {
        Self {
            relative_tolerance: 1e-8,
            absolute_tolerance: 0.,
            maximum_subdivisions: 500,
            energy_cutoff: 60.,
        }
    }
}

impl IntegrationSettings {
    pub(crate) fn validate(&self) -> Result<(), ConfigurationError> {
        if !(self.relative_tolerance >= 0.) || !self.relative_tolerance.is_finite() {
            return Err(ConfigurationError::InvalidSetting {
                name: "relative_tolerance",
                value: self.relative_tolerance,
            });
        }
        if !(self.absolute_tolerance >= 0.) || !self.absolute_tolerance.is_finite() {
            return Err(ConfigurationError::InvalidSetting {
                name: "absolute_tolerance",
                value: self.absolute_tolerance,
            });
        }
        if self.relative_tolerance == 0. && self.absolute_tolerance == 0. {
            return Err(ConfigurationError::InvalidSetting {
                name: "relative_tolerance",
                value: 0.,
            });
        }
        if self.maximum_subdivisions == 0 {
            return Err(ConfigurationError::InvalidSetting {
                name: "maximum_subdivisions",
                value: 0.,
            });
        }
        if !(self.energy_cutoff > 0.) || !self.energy_cutoff.is_finite() {
            return Err(ConfigurationError::InvalidSetting {
                name: "energy_cutoff",
                value: self.energy_cutoff,
            });
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
/// A converged integral
pub struct Quadrature {
    /// The value of the integral
    pub value: f64,
    /// The absolute error estimate
    pub error: f64,
    /// The number of intervals in the final partition
    pub subdivisions: usize,
}

#[derive(Clone, Copy, Debug)]
struct Segment {
    lower: f64,
    upper: f64,
    estimate: f64,
    error: f64,
    magnitude: f64,
}

impl PartialEq for Segment {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Segment {}

impl PartialOrd for Segment {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Segment {
    fn cmp(&self, other: &Self) -> Ordering {
        self.error.total_cmp(&other.error)
    }
}

/// Apply the 15-point Kronrod rule and its embedded 7-point Gauss rule on `[lower, upper]`
fn gauss_kronrod<F>(integrand: &F, lower: f64, upper: f64) -> Result<Segment, TransportError>
where
    F: Fn(f64) -> Result<f64, TransportError>,
{
    let centre = 0.5 * (lower + upper);
    let half_width = 0.5 * (upper - lower);

    let sample = |x: f64| -> Result<f64, TransportError> {
        let value = integrand(x)?;
        if value.is_finite() {
            Ok(value)
        } else {
            Err(DomainError::NonFiniteIntegrand(x).into())
        }
    };

    let f_centre = sample(centre)?;
    let mut kronrod = f_centre * KRONROD_WEIGHTS[7];
    let mut gauss = f_centre * GAUSS_WEIGHTS[3];
    let mut absolute = kronrod.abs();
    let mut left = [0_f64; 7];
    let mut right = [0_f64; 7];

    for (j, (node, weight)) in KRONROD_NODES
        .iter()
        .zip(KRONROD_WEIGHTS.iter())
        .take(7)
        .enumerate()
    {
        let offset = half_width * node;
        let f_left = sample(centre - offset)?;
        let f_right = sample(centre + offset)?;
        kronrod += weight * (f_left + f_right);
        absolute += weight * (f_left.abs() + f_right.abs());
        if j % 2 == 1 {
            gauss += GAUSS_WEIGHTS[j / 2] * (f_left + f_right);
        }
        left[j] = f_left;
        right[j] = f_right;
    }

    let mean = 0.5 * kronrod;
    let deviation = KRONROD_WEIGHTS[7] * (f_centre - mean).abs()
        + left
            .iter()
            .zip(right.iter())
            .zip(KRONROD_WEIGHTS.iter())
            .map(|((l, r), w)| w * ((l - mean).abs() + (r - mean).abs()))
            .sum::<f64>();

    let scale = half_width.abs();
    let estimate = kronrod * half_width;
    let magnitude = absolute * scale;
    let deviation = deviation * scale;

    let mut error = ((kronrod - gauss) * half_width).abs();
    if deviation != 0. && error != 0. {
        error = deviation * (200. * error / deviation).powf(1.5).min(1.);
    }
    if magnitude > f64::MIN_POSITIVE / (50. * f64::EPSILON) {
        error = error.max(50. * f64::EPSILON * magnitude);
    }

    Ok(Segment {
        lower,
        upper,
        estimate,
        error,
        magnitude,
    })
}

/// Integrate `integrand` over `[breakpoints[0], breakpoints[last]]`
///
/// The breakpoints must be finite and are sorted and deduplicated before use, the initial
/// partition has one interval between each distinct pair. An interval of zero length integrates
/// to zero.
pub fn integrate<F>(
    integrand: F,
    breakpoints: &[f64],
    settings: &IntegrationSettings,
) -> Result<Quadrature, TransportError>
where
    F: Fn(f64) -> Result<f64, TransportError>,
{
    let mut points = breakpoints.to_vec();
    points.sort_by(f64::total_cmp);
    points.dedup();

    let mut segments = BinaryHeap::with_capacity(settings.maximum_subdivisions + 1);
    for window in points.windows(2) {
        segments.push(gauss_kronrod(&integrand, window[0], window[1])?);
    }

    loop {
        let (estimate, error, magnitude) = segments.iter().fold(
            (0., 0., 0.),
            |(estimate, error, magnitude), segment: &Segment| {
                (
                    estimate + segment.estimate,
                    error + segment.error,
                    magnitude + segment.magnitude,
                )
            },
        );

        // The per-segment round-off floor is 50 ε, leave headroom for summation order
        let requested = (settings.relative_tolerance * estimate.abs())
            .max(settings.absolute_tolerance)
            .max(100. * f64::EPSILON * magnitude);

        if error <= requested {
            tracing::trace!(
                "Quadrature converged on {} intervals with error {:e}",
                segments.len(),
                error
            );
            return Ok(Quadrature {
                value: estimate,
                error,
                subdivisions: segments.len(),
            });
        }

        let failure = ConvergenceError::Quadrature {
            estimate,
            achieved: error,
            requested,
            subdivisions: segments.len(),
        };

        if segments.len() >= settings.maximum_subdivisions {
            return Err(failure.into());
        }

        let worst = match segments.pop() {
            Some(worst) => worst,
            None => return Err(failure.into()),
        };
        let midpoint = 0.5 * (worst.lower + worst.upper);
        if midpoint <= worst.lower || midpoint >= worst.upper {
            // The interval cannot be split further in floating point
            return Err(failure.into());
        }
        segments.push(gauss_kronrod(&integrand, worst.lower, midpoint)?);
        segments.push(gauss_kronrod(&integrand, midpoint, worst.upper)?);
    }
}

#[cfg(test)]
mod test {
    use super::{integrate, IntegrationSettings};
    use crate::error::{ConvergenceError, DomainError, TransportError};
    use approx::assert_relative_eq;

    #[test]
    fn polynomials_are_integrated_exactly_on_a_single_interval() {
        let settings = IntegrationSettings::default();
        let result = integrate(|x| Ok(x.powi(7) - 3. * x.powi(2)), &[0., 2.], &settings).unwrap();
        assert_relative_eq!(result.value, 256. / 8. - 8., max_relative = 1e-14);
        assert_eq!(result.subdivisions, 1);
    }

    #[test]
    fn peaked_integrand_is_refined_until_converged() {
        // ∫ 1 / (1 + 10^4 x^2) over [-1, 1] = 2 atan(100) / 100
        let settings = IntegrationSettings::default();
        let result = integrate(|x| Ok(1. / (1. + 1e4 * x * x)), &[-1., 1.], &settings).unwrap();
        let expected = 2. * 100_f64.atan() / 100.;
        assert_relative_eq!(result.value, expected, max_relative = 1e-8);
        assert!(result.subdivisions > 1);
    }

    #[test]
    fn repeated_breakpoints_are_ignored() {
        let settings = IntegrationSettings::default();
        let result = integrate(|x| Ok(x.exp()), &[1., 0., 0., 1., 0.5], &settings).unwrap();
        assert_relative_eq!(result.value, 1_f64.exp() - 1., max_relative = 1e-14);
        assert_eq!(result.subdivisions, 2);
    }

    #[test]
    fn exhausted_budget_is_reported_with_the_best_estimate() {
        let settings = IntegrationSettings {
            maximum_subdivisions: 3,
            relative_tolerance: 1e-14,
            ..IntegrationSettings::default()
        };
        // The square root singularity of x^-1/2 defeats the rule with only three intervals
        let result = integrate(|x: f64| Ok(1. / x.sqrt()), &[0., 1.], &settings);
        match result {
            Err(TransportError::Convergence(ConvergenceError::Quadrature {
                estimate,
                subdivisions,
                ..
            })) => {
                assert_eq!(subdivisions, 3);
                assert!(estimate > 1.5 && estimate < 2.5);
            }
            other => panic!("expected a quadrature convergence error, found {:?}", other),
        }
    }

    #[test]
    fn integrand_errors_are_propagated_unchanged() {
        let settings = IntegrationSettings::default();
        let result = integrate(
            |x| {
                if x > 0.5 {
                    Err(DomainError::InvalidTemperature(-1.).into())
                } else {
                    Ok(x)
                }
            },
            &[0., 1.],
            &settings,
        );
        assert_eq!(
            result.unwrap_err(),
            TransportError::Domain(DomainError::InvalidTemperature(-1.))
        );
    }

    #[test]
    fn non_finite_samples_are_domain_errors() {
        let settings = IntegrationSettings::default();
        let result = integrate(|_| Ok(f64::NAN), &[0., 1.], &settings);
        assert!(matches!(
            result,
            Err(TransportError::Domain(DomainError::NonFiniteIntegrand(_)))
        ));
    }

    #[test]
    fn zero_integrand_converges_immediately() {
        let settings = IntegrationSettings::default();
        let result = integrate(|_| Ok(0.), &[0., 1., 2.], &settings).unwrap();
        assert_eq!(result.value, 0.);
        assert_eq!(result.subdivisions, 2);
    }

    #[test]
    fn settings_reject_a_vanishing_tolerance() {
        let settings = IntegrationSettings {
            relative_tolerance: 0.,
            absolute_tolerance: 0.,
            ..IntegrationSettings::default()
        };
        assert!(settings.validate().is_err());
        assert!(IntegrationSettings::default().validate().is_ok());
    }
}
