//! Adaptive robustness gains
//!
//! Leaky-integrator adaptation shared by the position and attitude loops:
//!
//! K0 += (s - α0 ⊙ K0) dt
//! K1 += (s - α1 ⊙ K1) dt
//!
//! Gains grow while the sliding variable `s` stays positive and leak back
//! otherwise. Every component is floored at [`GAIN_FLOOR`].

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::config::{ConfigError, InitialGains, GAIN_FLOOR};

/// Leak rates α0, α1
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AdaptationRates {
    pub alpha_0: Vector3<f64>,
    pub alpha_1: Vector3<f64>,
}

/// Adaptive gain pair `(K0, K1)`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AdaptiveGains {
    /// Constant robustness term
    pub k0: Vector3<f64>,
    /// Error-proportional robustness term
    pub k1: Vector3<f64>,
}

impl AdaptiveGains {
    /// Create from initial values, applying the floor
    ///
    /// # Errors
    /// [`ConfigError::InvalidGain`] for a non-positive or non-finite component.
    pub fn new(initial: &InitialGains) -> Result<Self, ConfigError> {
        initial.validate("k0", "k1")?;

        Ok(Self {
            k0: floor(initial.k0),
            k1: floor(initial.k1),
        })
    }

    /// Advance the adaptation law by `dt` seconds
    pub fn update(&mut self, sliding: &Vector3<f64>, rates: &AdaptationRates, dt: f64) {
        self.k0 += (sliding - rates.alpha_0.component_mul(&self.k0)) * dt;
        self.k1 += (sliding - rates.alpha_1.component_mul(&self.k1)) * dt;
        self.k0 = floor(self.k0);
        self.k1 = floor(self.k1);
    }

    /// Instantaneous robustness gain ρ = K0 + K1 ⊙ e
    pub fn robustness(&self, error: &Vector3<f64>) -> Vector3<f64> {
        self.k0 + self.k1.component_mul(error)
    }
}

fn floor(v: Vector3<f64>) -> Vector3<f64> {
    v.map(|x| x.max(GAIN_FLOOR))
}
