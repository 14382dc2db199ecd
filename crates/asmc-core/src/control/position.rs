//! Position sliding-mode law
//!
//! Adaptive sliding-mode controller for the translational subsystem. The
//! sliding variable blends velocity and position error,
//!
//! s = e_v + Φ ⊙ e_p
//!
//! and the desired thrust vector (world frame) is
//!
//! T_des = -Λ ⊙ s - ρ ⊙ sat(s, v) + M g,    ρ = K0 + K1 ⊙ e_p
//!
//! rescaled to at most `max_thrust`. `K0`, `K1` follow the leaky adaptation
//! law in [`super::adaptive`] while the vehicle is armed.

use nalgebra::Vector3;

use crate::clock::clamp_dt;
use crate::config::{ConfigError, ControlConstants, InitialGains, MASS_FLOOR};

use super::adaptive::{AdaptationRates, AdaptiveGains};
use super::saturation::BoundaryLayer;

/// Result of one position law evaluation
#[derive(Debug, Clone)]
pub struct PositionLawOutput {
    /// Desired thrust vector [N] (world frame)
    pub thrust: Vector3<f64>,
    /// Sliding variable `s`
    pub sliding: Vector3<f64>,
    /// Position error `p - p_des`
    pub position_error: Vector3<f64>,
    /// Velocity error `v - v_des`
    pub velocity_error: Vector3<f64>,
    /// Robustness gain ρ
    pub rho: Vector3<f64>,
    /// Switching term ρ ⊙ sat(s, v)
    pub del_tau: Vector3<f64>,
    /// Adaptive gains after this tick's update
    pub gains: AdaptiveGains,
    /// Mass estimate used for gravity compensation [kg]
    pub mass: f64,
    /// The raw thrust vector exceeded `max_thrust` and was rescaled
    pub rescaled: bool,
}

/// Adaptive sliding-mode position controller
#[derive(Debug, Clone)]
pub struct PositionSlidingModeLaw {
    constants: ControlConstants,
    layer: BoundaryLayer,
    rates: AdaptationRates,
    gains: AdaptiveGains,
    mass: f64,
}

impl PositionSlidingModeLaw {
    /// # Errors
    /// [`ConfigError`] if any constant or initial gain is invalid.
    pub fn new(constants: ControlConstants, initial: &InitialGains) -> Result<Self, ConfigError> {
        constants.validate()?;
        let layer = BoundaryLayer::new(constants.boundary_layer)?;

        Ok(Self {
            rates: AdaptationRates {
                alpha_0: constants.alpha_0,
                alpha_1: constants.alpha_1,
            },
            gains: AdaptiveGains::new(initial)?,
            mass: constants.mass,
            layer,
            constants,
        })
    }

    /// Compute the desired thrust vector
    ///
    /// # Arguments
    /// * `pos` - Current position [m]
    /// * `vel` - Current velocity [m/s]
    /// * `pos_des` - Desired position [m]
    /// * `vel_des` - Desired velocity [m/s]
    /// * `dt` - Time since the previous tick [s], clamped to 40 ms
    /// * `armed` - Adapt gains this tick; frozen otherwise
    pub fn compute(
        &mut self,
        pos: &Vector3<f64>,
        vel: &Vector3<f64>,
        pos_des: &Vector3<f64>,
        vel_des: &Vector3<f64>,
        dt: f64,
        armed: bool,
    ) -> PositionLawOutput {
        let dt = clamp_dt(dt);
        let c = &self.constants;

        let position_error = pos - pos_des;
        let velocity_error = vel - vel_des;
        let sliding = velocity_error + c.phi.component_mul(&position_error);

        if armed {
            self.gains.update(&sliding, &self.rates, dt);

            if c.adapt_mass {
                self.mass += (-sliding.z - c.alpha_m * self.mass) * dt;
                self.mass = self.mass.max(MASS_FLOOR);
            }
        }

        let rho = self.gains.robustness(&position_error);
        let del_tau = rho.component_mul(&self.layer.saturate_vector(&sliding));

        let mut thrust = -c.lam.component_mul(&sliding) - del_tau + self.mass * c.gravity;

        // Rescale the whole vector so the direction is preserved
        let magnitude = thrust.norm();
        let rescaled = magnitude > c.max_thrust;
        if rescaled {
            thrust *= c.max_thrust / magnitude;
        }

        PositionLawOutput {
            thrust,
            sliding,
            position_error,
            velocity_error,
            rho,
            del_tau,
            gains: self.gains,
            mass: self.mass,
            rescaled,
        }
    }

    pub fn gains(&self) -> &AdaptiveGains {
        &self.gains
    }

    pub fn mass(&self) -> f64 {
        self.mass
    }

    pub fn constants(&self) -> &ControlConstants {
        &self.constants
    }
}
