//! Discrete PI stage with forward-Euler integration.

use serde::{Deserialize, Serialize};

/// How the integrator behaves while the output is clamped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AntiWindup {
    /// Keep the previous integral whenever the clamp changes the output.
    #[default]
    ClampAndFreeze,
    /// Commit the integral every step regardless of saturation.
    Unconditional,
}

/// Proportional-integral controller.
#[derive(Debug, Clone)]
pub struct PiController {
    kp: f64,
    ki: f64,
    ts: f64,
    /// Symmetric output limit, `None` for an unbounded output.
    limit: Option<f64>,
    anti_windup: AntiWindup,
    integral: f64,
    saturated: bool,
}

impl PiController {
    /// Unbounded PI stage; the integral is committed every step.
    pub fn new(kp: f64, ki: f64, ts: f64) -> Self {
        Self {
            kp,
            ki,
            ts,
            limit: None,
            anti_windup: AntiWindup::Unconditional,
            integral: 0.,
            saturated: false,
        }
    }

    /// Clamp the output to `[-limit, limit]`.
    pub fn with_limit(mut self, limit: f64, anti_windup: AntiWindup) -> Self {
        self.limit = Some(limit);
        self.anti_windup = anti_windup;
        self
    }

    pub fn update(&mut self, error: f64) -> f64 {
        let p_term = self.kp * error;
        let integral_next = self.integral + self.ki * self.ts * error;
        let unlimited = p_term + integral_next;

        // `clamp` panics on a NaN or inverted range
        let output = match self.limit.map(f64::abs) {
            Some(limit) => unlimited.max(-limit).min(limit),
            None => unlimited,
        };
        self.saturated = output != unlimited;

        if !self.saturated || self.anti_windup == AntiWindup::Unconditional {
            self.integral = integral_next;
        }

        output
    }

    /// Integral accumulator.
    pub fn integral(&self) -> f64 {
        self.integral
    }

    pub fn set_integral(&mut self, integral: f64) {
        self.integral = integral;
    }

    /// Whether the last update was clamped.
    pub fn is_saturated(&self) -> bool {
        self.saturated
    }

    pub fn anti_windup(&self) -> AntiWindup {
        self.anti_windup
    }

    pub fn reset(&mut self) {
        self.integral = 0.;
        self.saturated = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TS: f64 = 0.1;

    #[test]
    fn proportional_only() {
        let mut pi = PiController::new(2., 0., TS);
        assert_eq!(pi.update(5.), 10.);
        assert_eq!(pi.integral(), 0.);
    }

    #[test]
    fn integral_accumulates() {
        let mut pi = PiController::new(0., 1., TS);
        pi.update(10.);
        assert!((pi.integral() - 1.).abs() < 1e-12);
        let out = pi.update(10.);
        assert!((pi.integral() - 2.).abs() < 1e-12);
        assert!((out - 2.).abs() < 1e-12);
    }

    #[test]
    fn output_is_clamped() {
        let mut pi = PiController::new(1., 0., TS).with_limit(10., AntiWindup::ClampAndFreeze);
        assert_eq!(pi.update(20.), 10.);
        assert!(pi.is_saturated());
        assert_eq!(pi.update(-20.), -10.);
        assert_eq!(pi.update(3.), 3.);
        assert!(!pi.is_saturated());
    }

    #[test]
    fn frozen_integral_while_saturated() {
        let mut pi = PiController::new(1., 1., TS).with_limit(5., AntiWindup::ClampAndFreeze);
        for _ in 0..100 {
            pi.update(10.);
        }
        assert_eq!(pi.integral(), 0.);
    }

    #[test]
    fn unconditional_integral_winds_up() {
        let mut pi = PiController::new(1., 1., TS).with_limit(5., AntiWindup::Unconditional);
        for _ in 0..100 {
            assert_eq!(pi.update(10.), 5.);
        }
        assert!((pi.integral() - 100.).abs() < 1e-9);
    }

    #[test]
    fn malformed_limit_does_not_panic() {
        let mut pi = PiController::new(1., 0., TS).with_limit(-5., AntiWindup::ClampAndFreeze);
        assert_eq!(pi.update(20.), 5.);
        assert_eq!(pi.update(-20.), -5.);

        let mut pi = PiController::new(1., 0., TS).with_limit(f64::NAN, AntiWindup::ClampAndFreeze);
        assert_eq!(pi.update(3.), 3.);
    }

    #[test]
    fn reset_clears_integral() {
        let mut pi = PiController::new(0., 1., TS);
        pi.update(3.);
        pi.reset();
        assert_eq!(pi.integral(), 0.);
    }
}
