//! Closed-loop field-oriented control of permanent-magnet motors.
//!
//! A discrete-time FOC speed controller drives a motor plant (sinusoidal
//! or trapezoidal back-EMF) through an ideal inverter and sensor chain,
//! all advanced with one fixed step size.

pub mod config;
pub use config::SimulationConfig;

pub mod control;
pub use control::{Control, FocController};

pub mod drive;
pub use drive::{Drive, Inverter};

pub mod error;
pub use error::ConfigError;

pub mod model;
pub use model::{Motor, PlantModel, Sensor};

pub mod sim;
pub use sim::{Profile, Sample, Setpoint, Simulation, StepProfile};

pub mod transforms;
