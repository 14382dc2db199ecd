//! Desired attitude from a thrust vector
//!
//! Builds the desired body frame from the thrust direction (body z-axis) and
//! a heading reference in the horizontal plane:
//!
//! z_b = T / ‖T‖
//! x_c = [cos ψ, sin ψ, 0]
//! y_b = (z_b × x_c) / ‖z_b × x_c‖
//! x_b = (y_b × z_b) / ‖y_b × z_b‖
//! R_des = [x_b y_b z_b]

use nalgebra::{Matrix3, Vector3};
use thiserror::Error;

/// Below this norm of `z_b × x_c` the heading reference is unusable
pub const SINGULARITY_EPSILON: f64 = 1e-6;

/// Thrust vectors shorter than this [N] carry no usable direction
pub const MIN_THRUST_NORM: f64 = 1e-9;

/// Attitude reference errors
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum AttitudeReferenceError {
    #[error("Singular attitude reference: thrust is collinear with the heading axis (|z_b x x_c| = {norm:e})")]
    Singular { norm: f64 },
}

/// Desired rotation matrix (body to world) from thrust vector and yaw
///
/// A thrust vector shorter than [`MIN_THRUST_NORM`] (zero included) falls
/// back to world up `[0, 0, 1]` as the body z-axis; roll and pitch are then meaningless and the result should
/// only be trusted transiently.
///
/// # Errors
/// [`AttitudeReferenceError::Singular`] when the thrust direction is
/// (nearly) parallel to the heading reference `[cos ψ, sin ψ, 0]`.
pub fn attitude_from_thrust(
    thrust: &Vector3<f64>,
    yaw: f64,
) -> Result<Matrix3<f64>, AttitudeReferenceError> {
    let x_c = Vector3::new(yaw.cos(), yaw.sin(), 0.0);

    let magnitude = thrust.norm();
    let z_b = if magnitude < MIN_THRUST_NORM {
        Vector3::z()
    } else {
        thrust / magnitude
    };

    let y_b = z_b.cross(&x_c);
    let y_norm = y_b.norm();
    if y_norm.is_nan() || y_norm < SINGULARITY_EPSILON {
        return Err(AttitudeReferenceError::Singular { norm: y_norm });
    }
    let y_b = y_b / y_norm;

    // Unit length already since y_b ⟂ z_b, normalized again against rounding
    let x_b = y_b.cross(&z_b).normalize();

    Ok(Matrix3::from_columns(&[x_b, y_b, z_b]))
}

/// Level attitude at the given heading, `Rz(ψ)`
pub fn level_attitude(yaw: f64) -> Matrix3<f64> {
    let (s, c) = yaw.sin_cos();
    Matrix3::new(
        c, -s, 0.0,
        s, c, 0.0,
        0.0, 0.0, 1.0,
    )
}
