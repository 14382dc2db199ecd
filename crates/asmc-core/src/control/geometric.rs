//! Geometric attitude command and attitude feedback errors
//!
//! Attitude errors are formed directly on SO(3):
//!
//! e_R = 1/2 (R_desᵀ R - Rᵀ R_des)^∨
//! e_ω = ω - R_desᵀ R ω_des
//!
//! The collective throttle is the desired thrust vector projected onto the
//! current body z-axis, scaled to the normalized throttle range.

use nalgebra::{Matrix3, UnitQuaternion, Vector3};

use crate::config::{ConfigError, ControlConstants};
use crate::math::{body_z_axis, quaternion_from_rotation_matrix, rotation_matrix_from_quaternion, vee};

use super::attitude::{attitude_from_thrust, AttitudeReferenceError};

/// Desired attitude in both representations
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttitudeCommand {
    /// Desired rotation (body to world), columns `[x_b, y_b, z_b]`
    pub rotation: Matrix3<f64>,
    /// Same rotation as a unit quaternion
    pub orientation: UnitQuaternion<f64>,
}

impl AttitudeCommand {
    pub fn from_rotation(rotation: Matrix3<f64>) -> Self {
        Self {
            orientation: quaternion_from_rotation_matrix(&rotation),
            rotation,
        }
    }
}

/// Orientation command for a desired thrust vector and heading
pub fn geometric_attitude_command(
    thrust: &Vector3<f64>,
    yaw: f64,
) -> Result<AttitudeCommand, AttitudeReferenceError> {
    attitude_from_thrust(thrust, yaw).map(AttitudeCommand::from_rotation)
}

/// Rotation error e_R between desired and current attitude
pub fn rotation_error(r_des: &Matrix3<f64>, r_curr: &Matrix3<f64>) -> Vector3<f64> {
    let e = 0.5 * (r_des.transpose() * r_curr - r_curr.transpose() * r_des);
    vee(&e)
}

/// Angular rate error e_ω
pub fn rate_error(
    r_des: &Matrix3<f64>,
    r_curr: &Matrix3<f64>,
    angular_velocity: &Vector3<f64>,
    angular_velocity_des: &Vector3<f64>,
) -> Vector3<f64> {
    angular_velocity - r_des.transpose() * r_curr * angular_velocity_des
}

/// Collective throttle and attitude errors for one tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttitudeErrorEstimate {
    /// Normalized collective throttle in `[0, max_throttle]`
    pub thrust: f64,
    /// Rotation error e_R
    pub rotation_error: Vector3<f64>,
    /// Angular rate error e_ω
    pub rate_error: Vector3<f64>,
}

/// Computes throttle and SO(3) errors from the current attitude
#[derive(Debug, Clone)]
pub struct FeedbackAttitudeErrorEstimator {
    norm_thrust_const: f64,
    max_throttle: f64,
}

impl FeedbackAttitudeErrorEstimator {
    pub fn new(norm_thrust_const: f64, max_throttle: f64) -> Result<Self, ConfigError> {
        if !(norm_thrust_const.is_finite() && norm_thrust_const > 0.0) {
            return Err(ConfigError::InvalidLimit { name: "norm_thrust_const", value: norm_thrust_const });
        }
        if !(max_throttle.is_finite() && max_throttle > 0.0 && max_throttle <= 1.0) {
            return Err(ConfigError::InvalidLimit { name: "max_throttle", value: max_throttle });
        }
        Ok(Self { norm_thrust_const, max_throttle })
    }

    pub fn from_constants(constants: &ControlConstants) -> Result<Self, ConfigError> {
        Self::new(constants.norm_thrust_const, constants.max_throttle)
    }

    /// Normalized throttle: thrust vector projected onto the current body z
    pub fn collective_thrust(&self, thrust: &Vector3<f64>, orientation: &UnitQuaternion<f64>) -> f64 {
        let throttle = self.norm_thrust_const * thrust.dot(&body_z_axis(orientation));
        throttle.clamp(0.0, self.max_throttle)
    }

    /// Throttle, rotation error and rate error
    ///
    /// # Arguments
    /// * `orientation` - Current orientation (body to world)
    /// * `angular_velocity` - Current angular rate [rad/s]
    /// * `thrust` - Desired thrust vector (world frame)
    /// * `r_des` - Desired rotation matrix
    /// * `angular_velocity_des` - Desired angular rate, zero when no rate
    ///   trajectory is available
    pub fn estimate(
        &self,
        orientation: &UnitQuaternion<f64>,
        angular_velocity: &Vector3<f64>,
        thrust: &Vector3<f64>,
        r_des: &Matrix3<f64>,
        angular_velocity_des: &Vector3<f64>,
    ) -> AttitudeErrorEstimate {
        let r_curr = rotation_matrix_from_quaternion(orientation);

        AttitudeErrorEstimate {
            thrust: self.collective_thrust(thrust, orientation),
            rotation_error: rotation_error(r_des, &r_curr),
            rate_error: rate_error(r_des, &r_curr, angular_velocity, angular_velocity_des),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::skew;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    fn estimator() -> FeedbackAttitudeErrorEstimator {
        FeedbackAttitudeErrorEstimator::new(0.06, 0.96).unwrap()
    }

    #[test]
    fn test_hover_command_is_identity() {
        let cmd = geometric_attitude_command(&Vector3::new(0.0, 0.0, 9.8), 0.0).unwrap();

        assert_relative_eq!(cmd.orientation.w, 1.0, epsilon = 1e-12);
        assert_relative_eq!(cmd.orientation.angle(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_command_quaternion_matches_rotation() {
        let cmd = geometric_attitude_command(&Vector3::new(-2.0, 1.0, 6.0), 1.2).unwrap();
        let r = rotation_matrix_from_quaternion(&cmd.orientation);

        assert_relative_eq!(r, cmd.rotation, epsilon = 1e-12);
    }

    #[test]
    fn test_rotation_error_zero_when_aligned() {
        let q = UnitQuaternion::from_euler_angles(0.1, -0.2, 0.7);
        let r = rotation_matrix_from_quaternion(&q);

        assert_relative_eq!(rotation_error(&r, &r).norm(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_rotation_error_small_roll() {
        // Current attitude rolled by θ relative to a level desired attitude
        let theta = 0.2;
        let r_curr = rotation_matrix_from_quaternion(&UnitQuaternion::from_axis_angle(&Vector3::x_axis(), theta));

        let e = rotation_error(&Matrix3::identity(), &r_curr);

        assert_relative_eq!(e, Vector3::new(theta.sin(), 0.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn test_rotation_error_yaw() {
        let psi = -PI / 6.0;
        let r_curr = rotation_matrix_from_quaternion(&UnitQuaternion::from_axis_angle(&Vector3::z_axis(), psi));

        let e = rotation_error(&Matrix3::identity(), &r_curr);

        assert_relative_eq!(e, Vector3::new(0.0, 0.0, psi.sin()), epsilon = 1e-12);
    }

    #[test]
    fn test_rotation_error_uses_matrix_products() {
        // e_R for R_des = I, R = exp([ω]×) equals sin|ω| ω/|ω|
        let w = Vector3::new(0.1, -0.3, 0.2);
        let r_curr = rotation_matrix_from_quaternion(&UnitQuaternion::from_scaled_axis(w));
        let e = rotation_error(&Matrix3::identity(), &r_curr);

        assert_relative_eq!(e, w.normalize() * w.norm().sin(), epsilon = 1e-12);
        // The error matrix is skew-symmetric, so hat(vee) reconstructs it
        let e_mat = 0.5 * (r_curr - r_curr.transpose());
        assert_relative_eq!(skew(&e), e_mat, epsilon = 1e-12);
    }

    #[test]
    fn test_rate_error_with_zero_desired_rate() {
        let r_des = Matrix3::identity();
        let r_curr = rotation_matrix_from_quaternion(&UnitQuaternion::from_euler_angles(0.3, 0.1, -0.4));
        let omega = Vector3::new(0.5, -0.1, 2.0);

        let e = rate_error(&r_des, &r_curr, &omega, &Vector3::zeros());

        assert_relative_eq!(e, omega, epsilon = 1e-12);
    }

    #[test]
    fn test_rate_error_with_desired_rate() {
        let r_des = Matrix3::identity();
        let q = UnitQuaternion::from_axis_angle(&Vector3::z_axis(), PI / 2.0);
        let r_curr = rotation_matrix_from_quaternion(&q);
        let omega = Vector3::zeros();
        let omega_des = Vector3::new(1.0, 0.0, 0.0);

        let e = rate_error(&r_des, &r_curr, &omega, &omega_des);

        // R_desᵀ R maps body x onto world y
        assert_relative_eq!(e, Vector3::new(0.0, -1.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn test_collective_thrust_projection_and_clamp() {
        let est = estimator();
        let level = UnitQuaternion::identity();

        assert_relative_eq!(est.collective_thrust(&Vector3::new(0.0, 0.0, 0.98), &level), 0.0588, epsilon = 1e-12);
        // Thrust pointing down gives zero, not negative throttle
        assert_eq!(est.collective_thrust(&Vector3::new(0.0, 0.0, -5.0), &level), 0.0);
        // Saturates at max throttle
        assert_eq!(est.collective_thrust(&Vector3::new(0.0, 0.0, 100.0), &level), 0.96);

        // Tilted by 60° only half of the vertical thrust is along body z
        let tilted = UnitQuaternion::from_axis_angle(&Vector3::y_axis(), PI / 3.0);
        assert_relative_eq!(est.collective_thrust(&Vector3::new(0.0, 0.0, 10.0), &tilted), 0.3, epsilon = 1e-12);
    }

    #[test]
    fn test_estimate_combines_parts() {
        let est = estimator();
        let q = UnitQuaternion::from_axis_angle(&Vector3::x_axis(), 0.1);
        let omega = Vector3::new(0.2, 0.0, 0.0);
        let thrust = Vector3::new(0.0, 0.0, 1.0);

        let out = est.estimate(&q, &omega, &thrust, &Matrix3::identity(), &Vector3::zeros());

        assert_relative_eq!(out.thrust, 0.06 * 0.1_f64.cos(), epsilon = 1e-12);
        assert_relative_eq!(out.rotation_error.x, 0.1_f64.sin(), epsilon = 1e-12);
        assert_relative_eq!(out.rate_error, omega, epsilon = 1e-12);
    }

    #[test]
    fn test_rejects_invalid_limits() {
        assert!(FeedbackAttitudeErrorEstimator::new(0.0, 0.9).is_err());
        assert!(FeedbackAttitudeErrorEstimator::new(0.06, 0.0).is_err());
        assert!(FeedbackAttitudeErrorEstimator::new(0.06, 1.2).is_err());
    }
}
