//! Attitude sliding-mode law
//!
//! Rotational counterpart of the position law, driven by the SO(3) errors:
//!
//! s_q = e_ω + Φ_q ⊙ e_R
//! M_des = -Λ_q ⊙ s_q - ρ_q ⊙ sat(s_q, v_q),    ρ_q = K0_q + K1_q ⊙ e_R
//!
//! There is no gravity feed-forward on this axis.

use nalgebra::Vector3;

use crate::clock::clamp_dt;
use crate::config::{AttitudeConstants, ConfigError, InitialGains};

use super::adaptive::{AdaptationRates, AdaptiveGains};
use super::saturation::BoundaryLayer;

/// Result of one attitude law evaluation
#[derive(Debug, Clone)]
pub struct MomentLawOutput {
    /// Desired body moment
    pub moment: Vector3<f64>,
    /// Sliding variable `s_q`
    pub sliding: Vector3<f64>,
    /// Robustness gain ρ_q
    pub rho: Vector3<f64>,
    /// Switching term ρ_q ⊙ sat(s_q, v_q)
    pub del_tau: Vector3<f64>,
    /// Adaptive gains after this tick's update
    pub gains: AdaptiveGains,
}

/// Adaptive sliding-mode attitude controller
#[derive(Debug, Clone)]
pub struct AttitudeSlidingModeLaw {
    lam: Vector3<f64>,
    phi: Vector3<f64>,
    layer: BoundaryLayer,
    rates: AdaptationRates,
    gains: AdaptiveGains,
}

impl AttitudeSlidingModeLaw {
    /// `boundary_layer` is the resolved width (see
    /// [`ControllerConfig::attitude_boundary_layer`](crate::config::ControllerConfig::attitude_boundary_layer))
    ///
    /// # Errors
    /// [`ConfigError`] if any constant, initial gain or the width is invalid.
    pub fn new(
        constants: &AttitudeConstants,
        initial: &InitialGains,
        boundary_layer: f64,
    ) -> Result<Self, ConfigError> {
        constants.validate()?;

        Ok(Self {
            lam: constants.lam,
            phi: constants.phi,
            layer: BoundaryLayer::new(boundary_layer)?,
            rates: AdaptationRates {
                alpha_0: constants.alpha_0,
                alpha_1: constants.alpha_1,
            },
            gains: AdaptiveGains::new(initial)?,
        })
    }

    /// Compute the desired moment
    ///
    /// # Arguments
    /// * `rotation_error` - e_R
    /// * `rate_error` - e_ω
    /// * `dt` - Time since the previous tick [s], clamped to 40 ms
    /// * `armed` - Adapt gains this tick; frozen otherwise
    pub fn compute(
        &mut self,
        rotation_error: &Vector3<f64>,
        rate_error: &Vector3<f64>,
        dt: f64,
        armed: bool,
    ) -> MomentLawOutput {
        let sliding = rate_error + self.phi.component_mul(rotation_error);

        if armed {
            self.gains.update(&sliding, &self.rates, clamp_dt(dt));
        }

        let rho = self.gains.robustness(rotation_error);
        let del_tau = rho.component_mul(&self.layer.saturate_vector(&sliding));
        let moment = -self.lam.component_mul(&sliding) - del_tau;

        MomentLawOutput {
            moment,
            sliding,
            rho,
            del_tau,
            gains: self.gains,
        }
    }

    pub fn gains(&self) -> &AdaptiveGains {
        &self.gains
    }
}
