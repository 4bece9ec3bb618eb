use crate::transforms::wrap_angle;
use core::f64::consts::PI;
use num_complex::Complex64;

/// Electromechanical state of the plant.
///
/// The electrical angle is not stored; it is derived from `theta` so the
/// two can never disagree.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MotorState {
    /// D-axis current [A]
    pub i_d: f64,

    /// Q-axis current [A]
    pub i_q: f64,

    /// Mechanical speed [rad/s]
    pub w_r: f64,

    /// Mechanical angle [rad], in `[0, 2π)`
    pub theta: f64,
}

impl MotorState {
    /// Rotor-frame current vector `i_d + j·i_q`.
    pub fn i_dq(&self) -> Complex64 {
        Complex64::new(self.i_d, self.i_q)
    }

    /// Electrical angle `(npp·theta) mod 2π`.
    pub fn theta_e(&self, npp: f64) -> f64 {
        wrap_angle(npp * self.theta)
    }

    /// Electrical speed [rad/s].
    pub fn w_e(&self, npp: f64) -> f64 {
        npp * self.w_r
    }

    /// Mechanical speed in revolutions per minute.
    pub fn rpm(&self) -> f64 {
        self.w_r * 60. / (2. * PI)
    }
}

/// Convert a speed in RPM to mechanical rad/s.
pub fn rpm_to_rad_per_s(rpm: f64) -> f64 {
    rpm * 2. * PI / 60.
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::f64::consts::TAU;

    #[test]
    fn electrical_angle_wraps() {
        let state = MotorState {
            theta: 1.,
            ..Default::default()
        };
        let theta_e = state.theta_e(21.);
        assert!((0. ..TAU).contains(&theta_e));
        assert!((theta_e - (21f64).rem_euclid(TAU)).abs() < 1e-12);
    }

    #[test]
    fn rpm_conversion() {
        let state = MotorState {
            w_r: rpm_to_rad_per_s(40.),
            ..Default::default()
        };
        assert!((state.rpm() - 40.).abs() < 1e-12);
    }
}
