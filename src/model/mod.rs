//! Discrete-time permanent-magnet motor plant.

pub mod emf;
mod params;
mod sensor;
mod state;

pub use emf::{trapezoidal_shape, EmfShape};
pub use params::MotorParameters;
pub use sensor::{Measurement, Sensor};
pub use state::{rpm_to_rad_per_s, MotorState};

use crate::transforms::{abc_to_dq, wrap_angle};
use num_complex::Complex64;
use serde::{Deserialize, Serialize};

/// Electrical speed below which torque is not computed by power balance.
pub const MIN_POWER_BALANCE_SPEED: f64 = 1e-3;

/// Which electrical update rule the plant uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlantModel {
    /// Sinusoidal back-EMF, currents carried as internal state and driven
    /// by the applied voltages only.
    ///
    /// The explicit recursion is only stable while `|We·Ts|` stays small
    /// against `Rs·Ts/L`; at high electrical speed use a smaller step.
    Pmsm,
    /// Sinusoidal back-EMF, currents re-derived from the measured phase
    /// currents every tick.
    Blac,
    /// Trapezoidal back-EMF, currents re-derived from the measured phase
    /// currents every tick.
    #[default]
    Bldc,
}

impl PlantModel {
    pub fn emf_shape(self) -> EmfShape {
        match self {
            Self::Pmsm | Self::Blac => EmfShape::Sinusoidal,
            Self::Bldc => EmfShape::Trapezoidal,
        }
    }

    /// Whether the update rule reads the measured phase currents.
    pub fn uses_measured_currents(self) -> bool {
        !matches!(self, Self::Pmsm)
    }
}

/// Inputs applied to the plant for one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PlantInput {
    /// Applied phase voltages [V]
    pub v_abc: [f64; 3],

    /// Load torque [N·m]
    pub t_load: f64,

    /// Measured phase currents [A], ignored by [`PlantModel::Pmsm`]
    pub i_abc: [f64; 3],
}

pub struct Builder {
    model: PlantModel,
    params: MotorParameters,
    state: MotorState,
}

impl Default for Builder {
    fn default() -> Self {
        Self {
            model: PlantModel::default(),
            params: MotorParameters::default(),
            state: MotorState::default(),
        }
    }
}

impl Builder {
    pub fn model(mut self, model: PlantModel) -> Self {
        self.model = model;
        self
    }

    pub fn parameters(mut self, params: MotorParameters) -> Self {
        self.params = params;
        self
    }

    /// Start from a state other than rest.
    pub fn initial_state(mut self, state: MotorState) -> Self {
        self.state = state;
        self
    }

    pub fn build(self, ts: f64) -> Motor {
        let mut state = self.state;
        state.theta = wrap_angle(state.theta);

        Motor {
            model: self.model,
            params: self.params,
            ts,
            state,
        }
    }
}

/// Motor plant advanced with a fixed step `ts`.
#[derive(Debug, Clone)]
pub struct Motor {
    model: PlantModel,
    params: MotorParameters,
    ts: f64,
    state: MotorState,
}

impl Motor {
    pub fn builder() -> Builder {
        Builder::default()
    }

    /// Plant at rest with the reference parameters.
    pub fn new(model: PlantModel, ts: f64) -> Self {
        Self::builder().model(model).build(ts)
    }

    pub fn model(&self) -> PlantModel {
        self.model
    }

    pub fn parameters(&self) -> &MotorParameters {
        &self.params
    }

    pub fn ts(&self) -> f64 {
        self.ts
    }

    pub fn state(&self) -> &MotorState {
        &self.state
    }

    /// Electrical angle of the current state.
    pub fn theta_e(&self) -> f64 {
        self.state.theta_e(self.params.npp)
    }

    /// Advance the plant one step in place and return the electromagnetic
    /// torque [N·m].
    pub fn physics_step(&mut self, v_abc: [f64; 3], t_load: f64, i_abc: [f64; 3]) -> f64 {
        let input = PlantInput {
            v_abc,
            t_load,
            i_abc,
        };
        let (state, t_e) = self.next_state(&self.state, &input);
        self.state = state;
        t_e
    }

    /// Compute the state one step after `state` without mutating the plant.
    pub fn next_state(&self, state: &MotorState, input: &PlantInput) -> (MotorState, f64) {
        let p = &self.params;
        let w_e = state.w_e(p.npp);
        let theta_e = state.theta_e(p.npp);

        let v_dq = abc_to_dq(input.v_abc, theta_e);

        let (i_dq, t_e) = match self.model {
            PlantModel::Pmsm => self.voltage_driven(state.i_dq(), v_dq, w_e),
            PlantModel::Blac | PlantModel::Bldc => {
                let i_meas = abc_to_dq(input.i_abc, theta_e);
                let e_dq = self.model.emf_shape().dq_emf(theta_e, w_e * p.lambda_m);
                self.current_corrected(i_meas, v_dq, e_dq, w_e)
            }
        };

        // Mechanical dynamics (semi-implicit Euler)
        let t_c = if state.w_r > 0. {
            p.tc
        } else if state.w_r < 0. {
            -p.tc
        } else {
            0.
        };
        let accel = (t_e - input.t_load - p.bn * state.w_r - t_c) / p.j;
        let w_r = state.w_r + accel * self.ts;
        let theta = wrap_angle(state.theta + w_r * self.ts);

        let next = MotorState {
            i_d: i_dq.re,
            i_q: i_dq.im,
            w_r,
            theta,
        };
        (next, t_e)
    }

    /// Discrete dq recursion with speed-dependent coefficients.
    fn voltage_driven(&self, i: Complex64, v: Complex64, w_e: f64) -> (Complex64, f64) {
        let p = &self.params;
        let ts = self.ts;

        let g1 = 1. - ts * (p.rs / p.ld);
        let g2 = w_e * p.lq * ts / p.ld;
        let g3 = -w_e * p.ld * ts / p.lq;
        let g4 = 1. - p.rs * ts / p.lq;
        let h1 = ts / p.ld;
        let h2 = ts / p.lq;
        let i2 = -w_e * p.lambda_m * ts / p.lq;

        let i_d = g1 * i.re + g2 * i.im + h1 * v.re;
        let i_q = g3 * i.re + g4 * i.im + h2 * v.im + i2;

        let t_e = 1.5 * p.npp * (p.lambda_m * i_q + (p.ld - p.lq) * i_d * i_q);
        (Complex64::new(i_d, i_q), t_e)
    }

    /// Forward-Euler dq update from measured currents and explicit back-EMF.
    fn current_corrected(
        &self,
        i: Complex64,
        v: Complex64,
        e: Complex64,
        w_e: f64,
    ) -> (Complex64, f64) {
        let p = &self.params;

        let di_d = (v.re - p.rs * i.re - e.re + w_e * p.lq * i.im) / p.ld;
        let di_q = (v.im - p.rs * i.im - e.im - w_e * p.ld * i.re) / p.lq;

        let i_d = i.re + self.ts * di_d;
        let i_q = i.im + self.ts * di_q;

        let t_e = if w_e.abs() > MIN_POWER_BALANCE_SPEED {
            1.5 * p.npp * (e.re * i_d + e.im * i_q) / w_e + 1.5 * p.npp * (p.ld - p.lq) * i_d * i_q
        } else {
            1.5 * p.npp * p.lambda_m * i_q
        };
        (Complex64::new(i_d, i_q), t_e)
    }
}
