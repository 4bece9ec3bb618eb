//! Fixed-step closed-loop simulation.
//!
//! Every tick runs sensor, controller, inverter and plant in that order;
//! the controller always acts on the measurement taken in the same tick.

use crate::control::{Control, FocController};
use crate::drive::{Drive, Inverter};
use crate::error::{ensure_positive, ConfigError};
use crate::model::{Motor, Sensor};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Driver inputs for one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Setpoint {
    /// Speed reference [RPM]
    pub rpm_ref: f64,
    /// Load torque [N·m]
    pub t_load: f64,
}

pub trait Profile {
    /// Setpoint at simulation time `t` [s].
    fn setpoint(&self, t: f64) -> Setpoint;
}

impl<F> Profile for F
where
    F: Fn(f64) -> Setpoint,
{
    fn setpoint(&self, t: f64) -> Setpoint {
        self(t)
    }
}

/// Value that takes effect at time `at` and holds until the next step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Step {
    pub at: f64,
    pub value: f64,
}

impl Step {
    pub fn new(at: f64, value: f64) -> Self {
        Self { at, value }
    }
}

/// Piecewise-constant speed and load profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StepProfile {
    /// Speed reference before the first speed step [RPM]
    pub initial_rpm: f64,
    /// Load torque before the first load step [N·m]
    pub initial_load: f64,
    pub speed: Vec<Step>,
    pub load: Vec<Step>,
}

impl Default for StepProfile {
    /// 40 RPM, 80 RPM over `[0.4, 0.6)`, 20 N·m load over `[0.2, 0.8)`.
    fn default() -> Self {
        Self {
            initial_rpm: 40.,
            initial_load: 0.,
            speed: vec![Step::new(0.4, 80.), Step::new(0.6, 40.)],
            load: vec![Step::new(0.2, 20.), Step::new(0.8, 0.)],
        }
    }
}

impl StepProfile {
    /// Constant speed reference without load.
    pub fn constant(rpm: f64) -> Self {
        Self {
            initial_rpm: rpm,
            initial_load: 0.,
            speed: Vec::new(),
            load: Vec::new(),
        }
    }

    fn value_at(initial: f64, steps: &[Step], t: f64) -> f64 {
        steps
            .iter()
            .filter(|step| t >= step.at)
            .max_by(|a, b| a.at.total_cmp(&b.at))
            .map_or(initial, |step| step.value)
    }
}

impl Profile for StepProfile {
    fn setpoint(&self, t: f64) -> Setpoint {
        Setpoint {
            rpm_ref: Self::value_at(self.initial_rpm, &self.speed, t),
            t_load: Self::value_at(self.initial_load, &self.load, t),
        }
    }
}

/// Recorded quantities of one tick, taken after the plant step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Sample {
    pub t: f64,
    pub rpm_ref: f64,
    pub rpm: f64,
    pub i_d: f64,
    pub i_q: f64,
    /// Electromagnetic torque [N·m]
    pub torque: f64,
    pub t_load: f64,
    pub v_bus: f64,
}

/// Closed loop of plant, sensor, controller and drive.
pub struct Simulation<C = FocController, D = Inverter> {
    pub motor: Motor,
    pub control: C,
    pub drive: D,
    pub sensor: Sensor,
    pub v_bus: f64,
    ticks: u64,
}

impl Simulation {
    /// Loop with the reference controller and an ideal inverter.
    pub fn new(motor: Motor, control: FocController, v_bus: f64) -> Result<Self, ConfigError> {
        if control.ts() != motor.ts() {
            return Err(ConfigError::ValidationError(format!(
                "controller step {} differs from plant step {}",
                control.ts(),
                motor.ts()
            )));
        }
        control.parameters().validate()?;
        Self::with_parts(motor, control, Inverter::new(), v_bus)
    }
}

impl<C, D> Simulation<C, D>
where
    C: Control,
    D: Drive,
{
    pub fn with_parts(motor: Motor, control: C, drive: D, v_bus: f64) -> Result<Self, ConfigError> {
        ensure_positive("ts", motor.ts())?;
        ensure_positive("v_bus", v_bus)?;
        motor.parameters().validate()?;

        Ok(Self {
            motor,
            control,
            drive,
            sensor: Sensor::new(),
            v_bus,
            ticks: 0,
        })
    }

    pub fn ts(&self) -> f64 {
        self.motor.ts()
    }

    /// Time of the next tick, `k·ts`.
    pub fn time(&self) -> f64 {
        self.ticks as f64 * self.ts()
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Run one tick and return the recorded sample.
    pub fn tick(&mut self, setpoint: Setpoint) -> Sample {
        let t = self.time();

        let measurement = self.sensor.measure(&self.motor);
        let v_abc_ref = self
            .control
            .control(&measurement, setpoint.rpm_ref, self.v_bus);
        let v_abc = self.drive.drive(v_abc_ref, self.v_bus);
        let torque = self
            .motor
            .physics_step(v_abc, setpoint.t_load, measurement.i_abc);

        self.ticks += 1;

        let state = self.motor.state();
        Sample {
            t,
            rpm_ref: setpoint.rpm_ref,
            rpm: state.rpm(),
            i_d: state.i_d,
            i_q: state.i_q,
            torque,
            t_load: setpoint.t_load,
            v_bus: self.v_bus,
        }
    }

    /// Run `floor(t_end / ts)` ticks driven by `profile`.
    pub fn run<P: Profile>(&mut self, profile: &P, t_end: f64) -> Vec<Sample> {
        let steps = (t_end / self.ts()).floor().max(0.) as usize;
        info!(
            model = ?self.motor.model(),
            current_feedback = self.motor.model().uses_measured_currents(),
            steps,
            ts = self.ts(),
            v_bus = self.v_bus,
            "starting simulation"
        );

        let mut trace = Vec::with_capacity(steps);
        let mut last: Option<Setpoint> = None;
        for _ in 0..steps {
            let setpoint = profile.setpoint(self.time());
            if last != Some(setpoint) {
                debug!(
                    t = self.time(),
                    rpm_ref = setpoint.rpm_ref,
                    t_load = setpoint.t_load,
                    "setpoint changed"
                );
                last = Some(setpoint);
            }
            trace.push(self.tick(setpoint));
        }

        if let Some(end) = trace.last() {
            info!(t = end.t, rpm = end.rpm, torque = end.torque, "simulation finished");
        }
        trace
    }
}
