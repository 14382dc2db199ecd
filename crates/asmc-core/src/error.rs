//! Crate-level error type

use thiserror::Error;

use crate::config::ConfigError;
use crate::control::AttitudeReferenceError;

/// Errors surfaced by the ASMC core
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ControlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Attitude reference error: {0}")]
    AttitudeReference(#[from] AttitudeReferenceError),
}
