use thiserror::Error;

/// Error type for configuration loading and simulation assembly.
///
/// The per-tick path never fails; only building a simulation from
/// parameters can be rejected.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// Configuration file not found at specified path.
    #[error("Configuration file not found")]
    FileNotFound,

    /// TOML parsing failed.
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    /// Semantic validation failed.
    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

/// Reject values that are not strictly positive (NaN included).
pub(crate) fn ensure_positive(name: &str, value: f64) -> Result<(), ConfigError> {
    if value > 0. && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::ValidationError(format!(
            "{name} must be a positive finite number, got {value}"
        )))
    }
}

/// Reject negative or non-finite values.
pub(crate) fn ensure_non_negative(name: &str, value: f64) -> Result<(), ConfigError> {
    if value >= 0. && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::ValidationError(format!(
            "{name} must be a non-negative finite number, got {value}"
        )))
    }
}
