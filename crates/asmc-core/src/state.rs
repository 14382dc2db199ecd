//! Vehicle state and setpoint value types
//!
//! Everything the controller consumes per tick, as plain copyable values.

use nalgebra::{UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::math::{quaternion_from_xyzw, quaternion_to_xyzw};

/// Position and orientation estimate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    /// Position [m] (world frame, ENU)
    pub position: Vector3<f64>,
    /// Orientation (body to world)
    pub orientation: UnitQuaternion<f64>,
}

impl Default for Pose {
    fn default() -> Self {
        Self {
            position: Vector3::zeros(),
            orientation: UnitQuaternion::identity(),
        }
    }
}

impl Pose {
    pub fn new(position: Vector3<f64>, orientation: UnitQuaternion<f64>) -> Self {
        Self { position, orientation }
    }

    /// From wire components; orientation is scalar-last `[x, y, z, w]`
    pub fn from_wire(position: [f64; 3], orientation_xyzw: [f64; 4]) -> Self {
        Self {
            position: Vector3::from(position),
            orientation: quaternion_from_xyzw(orientation_xyzw),
        }
    }

    /// Wire components; orientation is scalar-last `[x, y, z, w]`
    pub fn to_wire(&self) -> ([f64; 3], [f64; 4]) {
        (self.position.into(), quaternion_to_xyzw(&self.orientation))
    }
}

/// Linear and angular velocity, used as received
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Velocity {
    /// Linear velocity [m/s]
    pub linear: Vector3<f64>,
    /// Angular velocity [rad/s]
    pub angular: Vector3<f64>,
}

impl Velocity {
    pub fn new(linear: Vector3<f64>, angular: Vector3<f64>) -> Self {
        Self { linear, angular }
    }
}

/// Tracking target for one tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Setpoint {
    /// Desired position [m]
    pub position: Vector3<f64>,
    /// Desired velocity [m/s]
    pub velocity: Vector3<f64>,
    /// Desired heading [rad]
    pub yaw: f64,
    /// Desired body rate [rad/s], zero without a rate trajectory
    #[serde(default)]
    pub angular_velocity: Vector3<f64>,
}

impl Setpoint {
    /// Hold a position with zero velocity and heading
    pub fn hold(position: Vector3<f64>) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    pub fn with_velocity(mut self, velocity: Vector3<f64>) -> Self {
        self.velocity = velocity;
        self
    }

    pub fn with_yaw(mut self, yaw: f64) -> Self {
        self.yaw = yaw;
        self
    }

    pub fn with_angular_velocity(mut self, angular_velocity: Vector3<f64>) -> Self {
        self.angular_velocity = angular_velocity;
        self
    }

    /// Re-target x/y to the current position, keeping the altitude target
    pub fn hold_horizontal(&self, pose: &Pose) -> Self {
        Self {
            position: Vector3::new(pose.position.x, pose.position.y, self.position.z),
            ..*self
        }
    }
}

/// Snapshot rejected before it reaches the control laws
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SnapshotError {
    #[error("Non-finite `{0}` in vehicle snapshot")]
    NonFinite(&'static str),
}

/// Consistent pose/velocity/setpoint/armed triple read by one tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct VehicleSnapshot {
    pub pose: Pose,
    pub velocity: Velocity,
    pub setpoint: Setpoint,
    pub armed: bool,
}

impl VehicleSnapshot {
    /// Every numeric field is finite
    ///
    /// # Errors
    /// [`SnapshotError::NonFinite`] naming the first offending field.
    pub fn check_finite(&self) -> Result<(), SnapshotError> {
        let fields: [(&'static str, &[f64]); 7] = [
            ("pose.position", self.pose.position.as_slice()),
            ("pose.orientation", self.pose.orientation.coords.as_slice()),
            ("velocity.linear", self.velocity.linear.as_slice()),
            ("velocity.angular", self.velocity.angular.as_slice()),
            ("setpoint.position", self.setpoint.position.as_slice()),
            ("setpoint.velocity", self.setpoint.velocity.as_slice()),
            ("setpoint.angular_velocity", self.setpoint.angular_velocity.as_slice()),
        ];

        for (name, values) in fields {
            if !values.iter().all(|x| x.is_finite()) {
                return Err(SnapshotError::NonFinite(name));
            }
        }
        if !self.setpoint.yaw.is_finite() {
            return Err(SnapshotError::NonFinite("setpoint.yaw"));
        }

        Ok(())
    }
}
