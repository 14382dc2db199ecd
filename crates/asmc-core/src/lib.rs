//! # ASMC Core
//!
//! Adaptive sliding-mode control (ASMC) for multirotors.
//!
//! Each control tick maps the latest pose/velocity estimate and setpoint to
//! a desired thrust vector, a commanded attitude, a collective throttle and
//! a desired body moment.
//!
//! ## Modules
//!
//! - [`math`]: SO(3) utilities (hat/vee, quaternion <-> rotation matrix)
//! - [`control`]: Sliding-mode laws, boundary layer, attitude construction
//! - [`controller`]: Per-vehicle controller running one tick at a time
//! - [`state`]: Pose, velocity and setpoint value types
//! - [`handoff`]: Single-writer snapshot exchange between threads
//! - [`clock`]: Monotonic time source and dt clamping
//! - [`config`]: Controller constants and validation
//! - [`simulation`]: Rigid-body plant for closed-loop testing

pub mod math;
pub mod control;
pub mod controller;
pub mod state;
pub mod handoff;
pub mod clock;
pub mod config;
pub mod error;
pub mod simulation;

pub use config::{AttitudeConstants, ConfigError, ControlConstants, ControllerConfig};
pub use controller::{AsmcController, ControlOutput, ThrustCommand};
pub use error::ControlError;
pub use state::{Pose, Setpoint, SnapshotError, VehicleSnapshot, Velocity};

// Common type aliases
use nalgebra::{Matrix3, UnitQuaternion, Vector3};

/// 3D vector type
pub type Vec3 = Vector3<f64>;

/// 3x3 matrix type
pub type Mat3 = Matrix3<f64>;

/// Unit quaternion type for rotations
pub type Quat = UnitQuaternion<f64>;

/// Gravity constant [m/s²]
pub const GRAVITY: f64 = 9.8;

/// Gravity compensation direction in ENU convention (z-up).
///
/// The position law adds `M * gravity` to the thrust vector, so this points
/// up, opposite to the gravitational acceleration.
pub fn gravity_enu() -> Vec3 {
    Vec3::new(0.0, 0.0, GRAVITY)
}
