use super::Motor;
use crate::transforms::dq_to_abc;

/// Quantities fed back to the controller every tick.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Measurement {
    /// Phase currents [A]
    pub i_abc: [f64; 3],

    /// Electrical angle [rad]
    pub theta_e: f64,

    /// Mechanical speed [rad/s]
    pub w_r: f64,
}

/// Ideal position, speed and phase-current sensing.
///
/// No noise, delay or quantization: the phase currents are the inverse
/// Park/Clarke transform of the plant's dq currents at its current angle.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sensor;

impl Sensor {
    pub fn new() -> Self {
        Self
    }

    pub fn measure(&self, motor: &Motor) -> Measurement {
        let state = motor.state();
        let theta_e = motor.theta_e();

        Measurement {
            i_abc: dq_to_abc(state.i_dq(), theta_e),
            theta_e,
            w_r: state.w_r,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{MotorState, PlantModel};
    use crate::transforms::abc_to_dq;

    #[test]
    fn measured_currents_reproduce_plant_state() {
        let state = MotorState {
            i_d: 1.5,
            i_q: -2.,
            w_r: 3.,
            theta: 0.3,
        };
        let motor = Motor::builder()
            .model(PlantModel::Bldc)
            .initial_state(state)
            .build(1e-4);

        let m = Sensor::new().measure(&motor);
        assert_eq!(m.w_r, 3.);
        assert_eq!(m.theta_e, motor.theta_e());

        let i = abc_to_dq(m.i_abc, m.theta_e);
        assert!((i.re - 1.5).abs() < 1e-12);
        assert!((i.im + 2.).abs() < 1e-12);
        assert!(m.i_abc.iter().sum::<f64>().abs() < 1e-12);
    }
}
