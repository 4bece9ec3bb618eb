use super::{limit_voltage, AntiWindup, Control, PiController};
use crate::error::{ensure_positive, ConfigError};
use crate::model::{rpm_to_rad_per_s, Measurement};
use crate::transforms::{abc_to_dq, dq_to_abc};
use num_complex::Complex64;
use num_traits::Zero;
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Gains and limits of the cascaded controller.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ControllerParameters {
    /// Speed loop proportional gain [A·s/rad]
    pub kps: f64,
    /// Speed loop integral gain [A/rad]
    pub kis: f64,
    pub kp_id: f64,
    pub ki_id: f64,
    pub kp_iq: f64,
    pub ki_iq: f64,
    /// Q-axis current reference limit [A]
    pub imax: f64,
    /// Speed loop integrator policy while the current reference is clamped.
    pub anti_windup: AntiWindup,
}

impl Default for ControllerParameters {
    fn default() -> Self {
        Self {
            kps: 1.25,
            kis: 55.,
            kp_id: 119.,
            ki_id: 4015.,
            kp_iq: 119.,
            ki_iq: 4015.,
            imax: 8.,
            anti_windup: AntiWindup::ClampAndFreeze,
        }
    }
}

impl ControllerParameters {
    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure_positive("imax", self.imax)?;
        for (name, gain) in [
            ("kps", self.kps),
            ("kis", self.kis),
            ("kp_id", self.kp_id),
            ("ki_id", self.ki_id),
            ("kp_iq", self.kp_iq),
            ("ki_iq", self.ki_iq),
        ] {
            crate::error::ensure_non_negative(name, gain)?;
        }
        Ok(())
    }
}

/// Integrator accumulators of the three PI loops.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ControllerState {
    pub ui_s: f64,
    pub ui_id: f64,
    pub ui_iq: f64,
}

/// Inputs of one control step.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ControlInput {
    /// Speed reference [RPM]
    pub rpm_ref: f64,
    /// Measured mechanical speed [rad/s]
    pub w_r: f64,
    /// Measured phase currents [A]
    pub i_abc: [f64; 3],
    /// Measured electrical angle [rad]
    pub theta_e: f64,
    pub v_bus: f64,
}

/// Intermediate references of the last control step.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ControlReferences {
    pub id_ref: f64,
    pub iq_ref: f64,
    /// Rotor-frame voltage reference after the circular limit [V]
    pub v_dq_ref: Complex64,
    /// The speed loop clamped the current reference.
    pub current_limited: bool,
    /// The voltage vector was scaled onto the modulation circle.
    pub voltage_limited: bool,
}

#[derive(Default)]
pub struct Builder {
    params: ControllerParameters,
}

impl Builder {
    pub fn parameters(mut self, params: ControllerParameters) -> Self {
        self.params = params;
        self
    }

    pub fn imax(mut self, imax: f64) -> Self {
        self.params.imax = imax;
        self
    }

    pub fn speed_gains(mut self, kps: f64, kis: f64) -> Self {
        self.params.kps = kps;
        self.params.kis = kis;
        self
    }

    pub fn anti_windup(mut self, anti_windup: AntiWindup) -> Self {
        self.params.anti_windup = anti_windup;
        self
    }

    pub fn build(self, ts: f64) -> FocController {
        let p = self.params;

        FocController {
            speed: PiController::new(p.kps, p.kis, ts).with_limit(p.imax, p.anti_windup),
            id: PiController::new(p.kp_id, p.ki_id, ts),
            iq: PiController::new(p.kp_iq, p.ki_iq, ts),
            params: p,
            ts,
            references: ControlReferences::default(),
        }
    }
}

/// Field-oriented speed control.
///
/// A speed PI loop produces the q-axis current reference (the d-axis
/// reference is held at zero), two current PI loops produce the rotor-frame
/// voltage reference, which is limited to the linear modulation circle
/// `v_bus/√3` before the inverse transform to phase voltages.
#[derive(Debug, Clone)]
pub struct FocController {
    speed: PiController,
    id: PiController,
    iq: PiController,
    params: ControllerParameters,
    ts: f64,
    references: ControlReferences,
}

impl FocController {
    pub fn builder() -> Builder {
        Builder::default()
    }

    /// Controller with the reference gains and the given current limit.
    pub fn new(ts: f64, imax: f64) -> Self {
        Self::builder().imax(imax).build(ts)
    }

    pub fn parameters(&self) -> &ControllerParameters {
        &self.params
    }

    pub fn ts(&self) -> f64 {
        self.ts
    }

    pub fn state(&self) -> ControllerState {
        ControllerState {
            ui_s: self.speed.integral(),
            ui_id: self.id.integral(),
            ui_iq: self.iq.integral(),
        }
    }

    pub fn references(&self) -> &ControlReferences {
        &self.references
    }

    /// Continue from previously captured integrator accumulators.
    pub fn restore(&mut self, state: &ControllerState) {
        self.speed.set_integral(state.ui_s);
        self.id.set_integral(state.ui_id);
        self.iq.set_integral(state.ui_iq);
    }

    /// Advance `state` by one step without mutating this controller.
    ///
    /// Returns the next accumulators and the phase voltage references [V].
    pub fn next_state(
        &self,
        state: &ControllerState,
        input: &ControlInput,
    ) -> (ControllerState, [f64; 3]) {
        let mut next = self.clone();
        next.restore(state);
        let v_abc = next.control_step(
            input.rpm_ref,
            input.w_r,
            input.i_abc,
            input.theta_e,
            input.v_bus,
        );
        (next.state(), v_abc)
    }

    /// Run one control step and return the phase voltage references [V].
    pub fn control_step(
        &mut self,
        rpm_ref: f64,
        w_r: f64,
        i_abc: [f64; 3],
        theta_e: f64,
        v_bus: f64,
    ) -> [f64; 3] {
        let i_dq = abc_to_dq(i_abc, theta_e);

        // Speed loop
        let error_speed = rpm_to_rad_per_s(rpm_ref) - w_r;
        let iq_ref = self.speed.update(error_speed);
        let id_ref = 0.;

        // Current loops
        let v_q = self.iq.update(iq_ref - i_dq.im);
        let v_d = self.id.update(id_ref - i_dq.re);
        let v_dq = Complex64::new(v_d, v_q);

        let max_v = v_bus / 3f64.sqrt();
        let v_dq_ref = if v_bus > 0. {
            limit_voltage(v_dq, max_v)
        } else {
            Complex64::zero()
        };

        let current_limited = self.speed.is_saturated();
        let voltage_limited = v_dq_ref != v_dq;
        if current_limited || voltage_limited {
            trace!(
                iq_ref,
                current_limited,
                voltage_limited,
                v_mag = v_dq.norm(),
                max_v,
                "control output saturated"
            );
        }

        self.references = ControlReferences {
            id_ref,
            iq_ref,
            v_dq_ref,
            current_limited,
            voltage_limited,
        };

        dq_to_abc(v_dq_ref, theta_e)
    }

    pub fn reset(&mut self) {
        self.speed.reset();
        self.id.reset();
        self.iq.reset();
        self.references = ControlReferences::default();
    }
}

impl Control for FocController {
    fn control(&mut self, measurement: &Measurement, rpm_ref: f64, v_bus: f64) -> [f64; 3] {
        self.control_step(
            rpm_ref,
            measurement.w_r,
            measurement.i_abc,
            measurement.theta_e,
            v_bus,
        )
    }
}
