//! Controller configuration
//!
//! Constants and initial adaptive gains for the position and attitude
//! sliding-mode loops. Defaults reproduce the flight-tested tuning of the
//! position loop. Each part has its own `validate`, called by the
//! constructor that consumes it; [`ControllerConfig::validate`] runs them all.

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::gravity_enu;

/// Lower bound applied to every adaptive gain component
pub const GAIN_FLOOR: f64 = 1e-4;

/// Lower bound for the adaptive mass estimate [kg]
pub const MASS_FLOOR: f64 = 0.1;

/// Configuration errors, all fatal at construction
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("Boundary layer width must be positive and finite, got {0}")]
    InvalidBoundaryLayer(f64),
    #[error("Vehicle mass must be positive and finite, got {0}")]
    InvalidMass(f64),
    #[error("Gain `{name}` has invalid component {value} on axis {axis}")]
    InvalidGain {
        name: &'static str,
        axis: usize,
        value: f64,
    },
    #[error("Limit `{name}` is out of range: {value}")]
    InvalidLimit { name: &'static str, value: f64 },
}

/// Position loop constants
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControlConstants {
    /// Sliding-surface gain `Lam`
    pub lam: Vector3<f64>,
    /// Position error blend `Phi` in `sv = e_v + Phi ⊙ e_p`
    pub phi: Vector3<f64>,
    /// Leak rate for `Kp0`
    pub alpha_0: Vector3<f64>,
    /// Leak rate for `Kp1`
    pub alpha_1: Vector3<f64>,
    /// Leak rate for the mass estimate
    pub alpha_m: f64,
    /// Boundary layer width `v`
    pub boundary_layer: f64,
    /// Vehicle mass `M` [kg] (initial estimate when `adapt_mass` is set)
    pub mass: f64,
    /// Adapt the mass estimate online from the vertical sliding variable
    pub adapt_mass: bool,
    /// Maximum thrust vector magnitude [N]
    pub max_thrust: f64,
    /// Maximum normalized collective throttle
    pub max_throttle: f64,
    /// Thrust [N] to normalized throttle scale
    pub norm_thrust_const: f64,
    /// Gravity compensation vector [m/s²], pointing up
    pub gravity: Vector3<f64>,
}

impl Default for ControlConstants {
    fn default() -> Self {
        Self {
            lam: Vector3::new(2.0, 2.0, 3.0),
            phi: Vector3::new(1.5, 1.5, 1.0),
            alpha_0: Vector3::new(1.0, 1.0, 1.0),
            alpha_1: Vector3::new(3.0, 3.0, 3.0),
            alpha_m: 0.01,
            boundary_layer: 0.1,
            mass: 0.1,
            adapt_mass: false,
            max_thrust: 16.0,
            max_throttle: 0.96,
            norm_thrust_const: 0.06,
            gravity: gravity_enu(),
        }
    }
}

/// Attitude loop constants
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttitudeConstants {
    /// Sliding-surface gain `Lam_q`
    pub lam: Vector3<f64>,
    /// Rotation error blend `Phi_q`
    pub phi: Vector3<f64>,
    /// Leak rate for `Kp0_q`
    pub alpha_0: Vector3<f64>,
    /// Leak rate for `Kp1_q`
    pub alpha_1: Vector3<f64>,
    /// Boundary layer width; `None` reuses the position loop width
    pub boundary_layer: Option<f64>,
}

impl Default for AttitudeConstants {
    fn default() -> Self {
        Self {
            lam: Vector3::new(2.0, 2.0, 1.0),
            phi: Vector3::new(4.0, 4.0, 2.0),
            alpha_0: Vector3::new(1.0, 1.0, 1.0),
            alpha_1: Vector3::new(3.0, 3.0, 3.0),
            boundary_layer: None,
        }
    }
}

/// Initial values of one pair of adaptive gain vectors
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InitialGains {
    pub k0: Vector3<f64>,
    pub k1: Vector3<f64>,
}

/// Full controller configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControllerConfig {
    pub position: ControlConstants,
    pub attitude: AttitudeConstants,
    /// `Kp0`, `Kp1`
    pub position_gains: InitialGains,
    /// `Kp0_q`, `Kp1_q`
    pub attitude_gains: InitialGains,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            position: ControlConstants::default(),
            attitude: AttitudeConstants::default(),
            position_gains: InitialGains {
                k0: Vector3::new(1.0, 1.0, 1.0),
                k1: Vector3::new(2.0, 2.0, 1.0),
            },
            attitude_gains: InitialGains {
                k0: Vector3::new(0.1, 0.1, 0.1),
                k1: Vector3::new(0.2, 0.2, 0.1),
            },
        }
    }
}

impl ControlConstants {
    /// Check the position loop constants, returning the first violation found
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_width(self.boundary_layer)?;

        if !(self.mass.is_finite() && self.mass > 0.0) {
            return Err(ConfigError::InvalidMass(self.mass));
        }

        check_positive("lam", &self.lam)?;
        check_positive("phi", &self.phi)?;
        check_positive("alpha_0", &self.alpha_0)?;
        check_positive("alpha_1", &self.alpha_1)?;

        if let Some((axis, &value)) = self.gravity.iter().enumerate().find(|(_, g)| !g.is_finite()) {
            return Err(ConfigError::InvalidGain { name: "gravity", axis, value });
        }

        check_limit("alpha_m", self.alpha_m, self.alpha_m >= 0.0)?;
        check_limit("max_thrust", self.max_thrust, self.max_thrust > 0.0)?;
        check_limit("max_throttle", self.max_throttle, self.max_throttle > 0.0 && self.max_throttle <= 1.0)?;
        check_limit("norm_thrust_const", self.norm_thrust_const, self.norm_thrust_const > 0.0)?;

        Ok(())
    }
}

impl AttitudeConstants {
    /// Check the attitude loop constants, returning the first violation found
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(width) = self.boundary_layer {
            check_width(width)?;
        }

        check_positive("lam_q", &self.lam)?;
        check_positive("phi_q", &self.phi)?;
        check_positive("alpha_0_q", &self.alpha_0)?;
        check_positive("alpha_1_q", &self.alpha_1)?;

        Ok(())
    }
}

impl InitialGains {
    /// Every component must be positive and finite
    pub fn validate(&self, k0_name: &'static str, k1_name: &'static str) -> Result<(), ConfigError> {
        check_positive(k0_name, &self.k0)?;
        check_positive(k1_name, &self.k1)
    }
}

impl ControllerConfig {
    /// Check every constant, returning the first violation found
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.position.validate()?;
        self.attitude.validate()?;
        self.position_gains.validate("kp0", "kp1")?;
        self.attitude_gains.validate("kp0_q", "kp1_q")
    }

    /// Boundary layer width used by the attitude loop
    pub fn attitude_boundary_layer(&self) -> f64 {
        self.attitude.boundary_layer.unwrap_or(self.position.boundary_layer)
    }
}

fn check_width(width: f64) -> Result<(), ConfigError> {
    if width.is_finite() && width > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidBoundaryLayer(width))
    }
}

fn check_positive(name: &'static str, v: &Vector3<f64>) -> Result<(), ConfigError> {
    match v.iter().enumerate().find(|(_, x)| !(x.is_finite() && **x > 0.0)) {
        Some((axis, &value)) => Err(ConfigError::InvalidGain { name, axis, value }),
        None => Ok(()),
    }
}

fn check_limit(name: &'static str, value: f64, in_range: bool) -> Result<(), ConfigError> {
    if value.is_finite() && in_range {
        Ok(())
    } else {
        Err(ConfigError::InvalidLimit { name, value })
    }
}
