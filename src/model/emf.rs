//! Back-EMF waveforms.

use crate::transforms::abc_to_dq;
use core::f64::consts::{FRAC_PI_3, FRAC_PI_6, PI, TAU};
use num_complex::Complex64;
use serde::{Deserialize, Serialize};

/// Normalized trapezoid with period `2π`.
///
/// Ramps 0 -> 1 over `[0, π/6)`, holds `+1` until `5π/6`, ramps to `-1` by
/// `7π/6`, holds `-1` until `11π/6` and ramps back to 0 at `2π`.
pub fn trapezoidal_shape(theta: f64) -> f64 {
    let t = theta.rem_euclid(TAU);

    let s = if t < FRAC_PI_6 {
        t * (6. / PI)
    } else if t < 5. * PI / 6. {
        1.
    } else if t < 7. * PI / 6. {
        1. - (t - 5. * PI / 6.) * (6. / PI)
    } else if t < 11. * PI / 6. {
        -1.
    } else {
        -1. + (t - 11. * PI / 6.) * (6. / PI)
    };
    // ramps may round one ulp past the plateaus
    s.clamp(-1., 1.)
}

/// Shape of the per-phase back-EMF.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmfShape {
    /// BLAC / PMSM
    Sinusoidal,
    /// BLDC
    Trapezoidal,
}

impl EmfShape {
    pub fn shape(self, theta: f64) -> f64 {
        match self {
            Self::Sinusoidal => theta.sin(),
            Self::Trapezoidal => trapezoidal_shape(theta),
        }
    }

    /// Phase back-EMF `e_x = -e_mag·shape(θe ∓ 2π/3)` for phases a, b, c.
    pub fn phase_emf(self, theta_e: f64, e_mag: f64) -> [f64; 3] {
        let shift = 2. * FRAC_PI_3;
        [
            -e_mag * self.shape(theta_e),
            -e_mag * self.shape(theta_e - shift),
            -e_mag * self.shape(theta_e + shift),
        ]
    }

    /// Back-EMF in the rotor frame.
    pub fn dq_emf(self, theta_e: f64, e_mag: f64) -> Complex64 {
        match self {
            // Closed form of the Park transform of the sine set
            Self::Sinusoidal => Complex64::new(0., e_mag),
            Self::Trapezoidal => abc_to_dq(self.phase_emf(theta_e, e_mag), theta_e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    #[test]
    fn breakpoints() {
        assert_eq!(trapezoidal_shape(0.), 0.);
        assert_eq!(trapezoidal_shape(FRAC_PI_6), 1.);
        assert!((trapezoidal_shape(PI / 2.) - 1.).abs() < EPSILON);
        assert!((trapezoidal_shape(5. * PI / 6.) - 1.).abs() < EPSILON);
        assert!(trapezoidal_shape(PI).abs() < EPSILON);
        assert!((trapezoidal_shape(7. * PI / 6.) + 1.).abs() < EPSILON);
        assert!((trapezoidal_shape(11. * PI / 6.) + 1.).abs() < EPSILON);
    }

    #[test]
    fn bounded_and_periodic() {
        for k in 0..2000 {
            let theta = -2. * TAU + k as f64 * (4. * TAU / 2000.);
            let s = trapezoidal_shape(theta);
            assert!((-1. ..=1.).contains(&s), "shape({theta}) = {s}");
            assert!((trapezoidal_shape(theta + TAU) - s).abs() < EPSILON);
        }
    }

    #[test]
    fn descending_ramp_crosses_zero_at_pi() {
        assert!(trapezoidal_shape(PI - 0.1) > 0.);
        assert!(trapezoidal_shape(PI + 0.1) < 0.);
    }

    #[test]
    fn sinusoidal_dq_matches_park_of_phases() {
        for k in 0..64 {
            let theta = k as f64 * TAU / 64.;
            let closed = EmfShape::Sinusoidal.dq_emf(theta, 3.);
            let park = abc_to_dq(EmfShape::Sinusoidal.phase_emf(theta, 3.), theta);
            assert!((closed - park).norm() < EPSILON);
        }
    }

    #[test]
    fn trapezoidal_dq_ripple_bounds() {
        for k in 0..64 {
            let theta = k as f64 * TAU / 64.;
            let e = EmfShape::Trapezoidal.dq_emf(theta, 1.);
            assert!(e.im > 1.15 && e.im < 1.34, "eq({theta}) = {}", e.im);
            assert!(e.re.abs() < 0.03, "ed({theta}) = {}", e.re);
        }
    }
}
