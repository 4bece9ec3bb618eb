use crate::model::Measurement;
use num_complex::Complex64;

mod foc;
pub use foc::{
    Builder, ControlInput, ControlReferences, ControllerParameters, ControllerState, FocController,
};

pub mod pi;
pub use pi::{AntiWindup, PiController};

pub trait Control {
    /// Calculate the 3-phase voltage references [V] from this tick's
    /// measurement, the speed reference [RPM] and the DC-bus voltage [V].
    fn control(&mut self, measurement: &Measurement, rpm_ref: f64, v_bus: f64) -> [f64; 3];
}

/// Limit a rotor-frame voltage vector to a circle of radius `max_voltage`.
///
/// The vector keeps its angle; both axes are scaled by the same ratio.
pub fn limit_voltage(v: Complex64, max_voltage: f64) -> Complex64 {
    let magnitude = v.norm();

    if magnitude > max_voltage {
        v * (max_voltage / magnitude)
    } else {
        v
    }
}
