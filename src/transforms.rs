//! Clarke and Park transforms between phase quantities and the rotor frame.
//!
//! Space vectors are carried as [`Complex64`]: `re` holds the α (or d)
//! component and `im` the β (or q) component. All functions are pure and
//! apply equally to currents, voltages and back-EMF.

use core::f64::consts::{FRAC_PI_3, TAU};
use num_complex::Complex64;

const SQRT_3: f64 = 1.732_050_807_568_877_2;

/// Amplitude-invariant Clarke transform (abc -> αβ).
pub fn clarke(x_abc: [f64; 3]) -> Complex64 {
    let [a, b, c] = x_abc;
    Complex64::new(
        (2. / 3.) * (a - 0.5 * b - 0.5 * c),
        (2. / 3.) * (SQRT_3 / 2. * (b - c)),
    )
}

/// Inverse Clarke transform (αβ -> abc).
pub fn inverse_clarke(x: Complex64) -> [f64; 3] {
    [
        x.re,
        0.5 * (-x.re + SQRT_3 * x.im),
        0.5 * (-x.re - SQRT_3 * x.im),
    ]
}

/// Rotate a stationary vector into the frame at electrical angle `theta`.
pub fn park(x: Complex64, theta: f64) -> Complex64 {
    Complex64::from_polar(1., -theta) * x
}

/// Rotate a rotor-frame vector back into the stationary frame.
pub fn inverse_park(x: Complex64, theta: f64) -> Complex64 {
    Complex64::from_polar(1., theta) * x
}

/// Phase quantities to rotor-frame `(d, q)` at electrical angle `theta`.
pub fn abc_to_dq(x_abc: [f64; 3], theta: f64) -> Complex64 {
    park(clarke(x_abc), theta)
}

/// Rotor-frame `(d, q)` to phase quantities at electrical angle `theta`.
///
/// Exact algebraic inverse of [`abc_to_dq`] for balanced inputs.
pub fn dq_to_abc(x_dq: Complex64, theta: f64) -> [f64; 3] {
    inverse_clarke(inverse_park(x_dq, theta))
}

/// Two-wire variant of [`abc_to_dq`].
///
/// Only phases `a` and `b` are read; the third phase is assumed to close
/// the balance `a + b + c = 0`.
pub fn abc_to_dq_two_wire(x_a: f64, x_b: f64, theta: f64) -> Complex64 {
    let x = Complex64::new(x_a, (x_a + 2. * x_b) / SQRT_3);
    park(x, theta)
}

/// Direct three-phase cosine form of [`abc_to_dq`].
pub fn abc_to_dq_direct(x_abc: [f64; 3], theta: f64) -> Complex64 {
    let [a, b, c] = x_abc;
    let shift = 2. * FRAC_PI_3;
    Complex64::new(
        (2. / 3.) * (a * theta.cos() + b * (theta - shift).cos() + c * (theta + shift).cos()),
        (2. / 3.) * (-a * theta.sin() - b * (theta - shift).sin() - c * (theta + shift).sin()),
    )
}

/// Direct three-phase cosine form of [`dq_to_abc`].
pub fn dq_to_abc_direct(x_dq: Complex64, theta: f64) -> [f64; 3] {
    let shift = 2. * FRAC_PI_3;
    let phase = |angle: f64| angle.cos() * x_dq.re - angle.sin() * x_dq.im;
    [phase(theta), phase(theta - shift), phase(theta + shift)]
}

/// Wrap an angle into `[0, 2π)`.
pub fn wrap_angle(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(TAU);
    // rem_euclid rounds tiny negative inputs up to exactly TAU
    if wrapped >= TAU {
        0.
    } else {
        wrapped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const EPSILON: f64 = 1e-9;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < EPSILON
    }

    #[test]
    fn clarke_of_phase_a_only() {
        let x = clarke([1., -0.5, -0.5]);
        assert!(approx_eq(x.re, 1.));
        assert!(approx_eq(x.im, 0.));
    }

    #[test]
    fn inverse_clarke_is_balanced() {
        let [a, b, c] = inverse_clarke(Complex64::new(0.3, -1.7));
        assert!(approx_eq(a + b + c, 0.));
    }

    #[test]
    fn park_at_zero_angle_is_identity() {
        let x = Complex64::new(2., -3.);
        let y = park(x, 0.);
        assert!(approx_eq(y.re, 2.));
        assert!(approx_eq(y.im, -3.));
    }

    #[test]
    fn park_quarter_turn() {
        // β-aligned vector seen from a frame at 90° lies on the d axis
        let y = park(Complex64::new(0., 1.), core::f64::consts::FRAC_PI_2);
        assert!(approx_eq(y.re, 1.));
        assert!(approx_eq(y.im, 0.));
    }

    #[test]
    fn wrap_angle_range() {
        assert_eq!(wrap_angle(0.), 0.);
        assert!(approx_eq(wrap_angle(7.), 7. - TAU));
        assert!(approx_eq(wrap_angle(-1.), TAU - 1.));
        assert!(wrap_angle(-1e-18) < TAU);
        assert!(wrap_angle(TAU) < TAU);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(1000))]

        #[test]
        fn dq_round_trip(
            a in -100.0f64..100.0,
            b in -100.0f64..100.0,
            theta in -20.0f64..20.0,
        ) {
            let c = -a - b;
            let [ra, rb, rc] = dq_to_abc(abc_to_dq([a, b, c], theta), theta);
            prop_assert!((ra - a).abs() < EPSILON);
            prop_assert!((rb - b).abs() < EPSILON);
            prop_assert!((rc - c).abs() < EPSILON);
        }

        #[test]
        fn two_wire_matches_three_wire(
            a in -100.0f64..100.0,
            b in -100.0f64..100.0,
            theta in 0.0f64..TAU,
        ) {
            let full = abc_to_dq([a, b, -a - b], theta);
            let two = abc_to_dq_two_wire(a, b, theta);
            prop_assert!((full - two).norm() < EPSILON);
        }

        #[test]
        fn direct_forms_match(
            d in -50.0f64..50.0,
            q in -50.0f64..50.0,
            theta in 0.0f64..TAU,
        ) {
            let x = Complex64::new(d, q);
            let abc = dq_to_abc(x, theta);
            let abc_direct = dq_to_abc_direct(x, theta);
            for (p, r) in abc.iter().zip(abc_direct) {
                prop_assert!((p - r).abs() < EPSILON);
            }
            prop_assert!((abc_to_dq_direct(abc, theta) - x).norm() < EPSILON);
        }
    }
}
