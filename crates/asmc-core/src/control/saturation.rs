//! Boundary-layer saturation
//!
//! Continuous replacement for `sign(s)` inside a band of width `v` around the
//! sliding surface, used by both sliding-mode loops to suppress chatter.

use nalgebra::Vector3;

use crate::config::ConfigError;

/// Validated boundary layer width
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundaryLayer {
    width: f64,
}

impl BoundaryLayer {
    /// Create a boundary layer, rejecting non-positive or non-finite widths
    pub fn new(width: f64) -> Result<Self, ConfigError> {
        if width.is_finite() && width > 0.0 {
            Ok(Self { width })
        } else {
            Err(ConfigError::InvalidBoundaryLayer(width))
        }
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    /// `sign(s)` outside the layer, `s / v` inside
    pub fn saturate(&self, s: f64) -> f64 {
        if s.abs() > self.width {
            s.signum()
        } else {
            s / self.width
        }
    }

    /// Per-axis [`saturate`](Self::saturate)
    pub fn saturate_vector(&self, s: &Vector3<f64>) -> Vector3<f64> {
        s.map(|si| self.saturate(si))
    }
}
