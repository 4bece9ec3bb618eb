//! TOML configuration of a complete simulation run.
//!
//! Every section is optional; omitted values fall back to the reference
//! BLDC scenario.
//!
//! ```toml
//! ts = 1e-4
//! t_end = 1.0
//! v_bus = 311.0
//!
//! [plant]
//! model = "bldc"
//!
//! [plant.parameters]
//! npp = 21.0
//!
//! [controller]
//! kps = 1.25
//! anti_windup = "clamp_and_freeze"
//!
//! [profile]
//! initial_rpm = 40.0
//! speed = [{ at = 0.4, value = 80.0 }, { at = 0.6, value = 40.0 }]
//! load = [{ at = 0.2, value = 20.0 }, { at = 0.8, value = 0.0 }]
//! ```

use crate::control::{ControllerParameters, FocController};
use crate::error::{ensure_non_negative, ensure_positive, ConfigError};
use crate::model::{Motor, MotorParameters, PlantModel};
use crate::sim::{Simulation, StepProfile};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlantConfig {
    pub model: PlantModel,
    pub parameters: MotorParameters,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// Step size shared by plant and controller [s]
    pub ts: f64,
    /// Simulated duration [s]
    pub t_end: f64,
    /// DC-bus voltage [V]
    pub v_bus: f64,
    pub plant: PlantConfig,
    pub controller: ControllerParameters,
    pub profile: StepProfile,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            ts: 1e-4,
            t_end: 1.,
            v_bus: 311.,
            plant: PlantConfig::default(),
            controller: ControllerParameters::default(),
            profile: StepProfile::default(),
        }
    }
}

impl SimulationConfig {
    /// Load and validate a TOML configuration file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::FileNotFound
            } else {
                ConfigError::ParseError(e.to_string())
            }
        })?;
        debug!(path = %path.display(), "loaded simulation config");

        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure_positive("ts", self.ts)?;
        ensure_non_negative("t_end", self.t_end)?;
        ensure_positive("v_bus", self.v_bus)?;
        self.plant.parameters.validate()?;
        self.controller.validate()?;
        Ok(())
    }

    /// Assemble a simulation at rest from this configuration.
    pub fn build(&self) -> Result<Simulation, ConfigError> {
        self.validate()?;

        let motor = Motor::builder()
            .model(self.plant.model)
            .parameters(self.plant.parameters)
            .build(self.ts);
        let control = FocController::builder()
            .parameters(self.controller)
            .build(self.ts);

        Simulation::new(motor, control, self.v_bus)
    }
}
