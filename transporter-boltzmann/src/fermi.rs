// Copyright 2022 Chris Gubbin
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! # Fermi
//!
//! Fermi-Dirac kernels in reduced units. All functions take the reduced energy `t = β(ε - μ)`
//! measured along the carrier dispersion, so they serve electron and hole bands alike.
//! The kernels are written to neither overflow nor lose precision for `|t|` of several hundred,
//! which is where the degenerate and non-degenerate limits of the transport integrals live.

/// The occupation `1 / (1 + exp(t))`
pub fn occupation(t: f64) -> f64 {
    if t > 0. {
        let decay = (-t).exp();
        decay / (1. + decay)
    } else {
        1. / (1. + t.exp())
    }
}

/// The Fermi window `-∂f/∂t = f (1 - f)`
///
/// This is the bell-shaped kernel of unit area and width of order one centred on `t = 0`.
pub fn fermi_window(t: f64) -> f64 {
    let decay = (-t.abs()).exp();
    decay / ((1. + decay) * (1. + decay))
}

/// The normalised complete Fermi-Dirac integral `F_j(η)` for `η < 0`
///
/// Evaluated from the alternating series `Σ (-1)^(k+1) exp(kη) / k^(j+1)`, which converges
/// geometrically for negative reduced chemical potentials. It is used as an analytic reference
/// for the quadrature in the non-degenerate regime. Returns `None` where the series diverges.
pub fn nondegenerate_fermi_dirac_integral(order: f64, eta: f64) -> Option<f64> {
    if eta.is_nan() || eta >= 0. {
        return None;
    }
    let ratio = eta.exp();
    let mut term_exponential = ratio;
    let mut sum = 0.;
    for k in 1..=500 {
        let term = term_exponential / (k as f64).powf(order + 1.);
        sum += if k % 2 == 1 { term } else { -term };
        if term < f64::EPSILON * sum.abs() {
            break;
        }
        term_exponential *= ratio;
    }
    Some(sum)
}

#[cfg(test)]
mod test {
    use approx::assert_relative_eq;
    use rand::Rng;

    #[test]
    fn occupation_is_half_at_the_chemical_potential() {
        assert_relative_eq!(super::occupation(0.), 0.5);
    }

    #[test]
    fn occupation_of_particles_and_holes_sums_to_unity() {
        let mut rng = rand::thread_rng();
        for _ in 0..100 {
            let t: f64 = rng.gen_range(-40.0..40.0);
            assert_relative_eq!(super::occupation(t) + super::occupation(-t), 1.);
        }
    }

    #[test]
    fn kernels_do_not_overflow_in_the_extreme_limits() {
        for t in [-1e4, -800., 800., 1e4] {
            assert!(super::occupation(t).is_finite());
            assert!(super::fermi_window(t).is_finite());
        }
        assert_eq!(super::fermi_window(1e4), 0.);
        assert_eq!(super::occupation(-1e4), 1.);
    }

    #[test]
    fn fermi_window_is_the_derivative_of_the_occupation() {
        // The central difference loses precision to cancellation once the window is tiny
        let h = 1e-5;
        for i in -32..=32 {
            let t = i as f64 * 0.25;
            let derivative = (super::occupation(t - h) - super::occupation(t + h)) / (2. * h);
            assert_relative_eq!(super::fermi_window(t), derivative, max_relative = 1e-6);
        }
    }

    #[test]
    fn fermi_window_is_the_product_of_particle_and_hole_occupations() {
        for i in -400..=400 {
            let t = i as f64 * 0.1;
            let product = super::occupation(t) * super::occupation(-t);
            assert_relative_eq!(super::fermi_window(t), product, max_relative = 1e-12);
        }
    }

    #[test]
    fn fermi_window_has_unit_area() {
        let h = 1e-3;
        let area: f64 = (-40_000..=40_000)
            .map(|i| super::fermi_window(i as f64 * h) * h)
            .sum();
        assert_relative_eq!(area, 1., max_relative = 1e-8);
    }

    #[test]
    fn series_reduces_to_boltzmann_statistics_deep_in_the_gap() {
        let eta: f64 = -30.;
        assert_relative_eq!(
            super::nondegenerate_fermi_dirac_integral(0.5, eta).unwrap(),
            eta.exp(),
            max_relative = 1e-12
        );
    }

    #[test]
    fn zeroth_order_integral_matches_the_closed_form() {
        // F_0(η) = ln(1 + exp(η))
        for eta in [-5., -1., -0.1] {
            let expected = (1_f64 + f64::exp(eta)).ln();
            assert_relative_eq!(
                super::nondegenerate_fermi_dirac_integral(0., eta).unwrap(),
                expected,
                max_relative = 1e-12
            );
        }
    }

    #[test]
    fn series_is_unavailable_for_degenerate_statistics() {
        for eta in [0., 0.5, f64::NAN] {
            assert_eq!(super::nondegenerate_fermi_dirac_integral(0.5, eta), None);
        }
    }
}
