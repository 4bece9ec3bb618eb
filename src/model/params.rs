use crate::error::{ensure_non_negative, ensure_positive, ConfigError};
use serde::{Deserialize, Serialize};

/// Electromechanical constants of a permanent-magnet motor (SI units).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MotorParameters {
    /// Pole pairs
    pub npp: f64,

    /// Stator resistance [Ω]
    pub rs: f64,

    /// D-axis inductance [H]
    pub ld: f64,

    /// Q-axis inductance [H]
    pub lq: f64,

    /// Magnet flux linkage [Wb]
    pub lambda_m: f64,

    /// Viscous friction [N·m·s]
    pub bn: f64,

    /// Rotor inertia [kg·m²]
    pub j: f64,

    /// Coulomb friction magnitude [N·m]
    pub tc: f64,
}

impl Default for MotorParameters {
    fn default() -> Self {
        Self {
            npp: 21.,
            rs: 4.485,
            ld: 0.0548,
            lq: 0.0548,
            lambda_m: 0.201,
            bn: 0.0057,
            j: 0.1444,
            tc: 0.3006,
        }
    }
}

impl MotorParameters {
    /// Torque per q-axis ampere, `1.5·Npp·Lambda_m`.
    pub fn torque_constant(&self) -> f64 {
        1.5 * self.npp * self.lambda_m
    }

    /// Reject parameter sets the discrete plant cannot be advanced with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure_positive("npp", self.npp)?;
        ensure_positive("ld", self.ld)?;
        ensure_positive("lq", self.lq)?;
        ensure_positive("j", self.j)?;
        ensure_non_negative("rs", self.rs)?;
        ensure_non_negative("lambda_m", self.lambda_m)?;
        ensure_non_negative("bn", self.bn)?;
        ensure_non_negative("tc", self.tc)?;
        Ok(())
    }
}
