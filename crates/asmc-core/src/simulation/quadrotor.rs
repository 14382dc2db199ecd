//! Multirotor rigid-body dynamics
//!
//! ṗ = v
//! v̇ = -g e₃ + T/m · R(q)e₃
//! q̇ = 1/2 Λ(q)[0; ω]
//! Jω̇ = -ω × Jω + τ
//!
//! with ENU axes, so gravity points along -z and a level vehicle thrusts
//! along +z.

use nalgebra::{Matrix3, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

use crate::math::{body_z_axis, integrate_quaternion, quaternion_derivative};
use crate::state::{Pose, Velocity};
use crate::GRAVITY;

/// Multirotor state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuadrotorState {
    /// Position [m] (world frame)
    pub position: Vector3<f64>,
    /// Velocity [m/s] (world frame)
    pub velocity: Vector3<f64>,
    /// Orientation (body to world)
    pub orientation: UnitQuaternion<f64>,
    /// Angular velocity [rad/s] (body frame)
    pub angular_velocity: Vector3<f64>,
}

impl Default for QuadrotorState {
    fn default() -> Self {
        Self {
            position: Vector3::zeros(),
            velocity: Vector3::zeros(),
            orientation: UnitQuaternion::identity(),
            angular_velocity: Vector3::zeros(),
        }
    }
}

impl QuadrotorState {
    /// Pose as the controller sees it
    pub fn pose(&self) -> Pose {
        Pose::new(self.position, self.orientation)
    }

    /// Velocity as the controller sees it
    pub fn twist(&self) -> Velocity {
        Velocity::new(self.velocity, self.angular_velocity)
    }
}

/// Multirotor parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuadrotorParams {
    /// Mass [kg]
    pub mass: f64,
    /// Inertia tensor [kg·m²] (body frame)
    pub inertia: Matrix3<f64>,
    /// Inverse inertia tensor
    pub inertia_inv: Matrix3<f64>,
    /// Newtons produced per unit of normalized throttle
    pub thrust_per_throttle: f64,
}

impl QuadrotorParams {
    /// Create parameters with diagonal inertia
    pub fn new(mass: f64, inertia_diag: Vector3<f64>, thrust_per_throttle: f64) -> Self {
        Self {
            mass,
            inertia: Matrix3::from_diagonal(&inertia_diag),
            inertia_inv: Matrix3::from_diagonal(&inertia_diag.map(|j| 1.0 / j)),
            thrust_per_throttle,
        }
    }
}

impl Default for QuadrotorParams {
    /// Matches the default controller tuning: 0.1 kg, throttle scale 1/0.06
    fn default() -> Self {
        Self::new(0.1, Vector3::new(0.02, 0.02, 0.04), 1.0 / 0.06)
    }
}

/// Plant input
#[derive(Debug, Clone, Default)]
pub struct QuadrotorInput {
    /// Normalized collective throttle
    pub throttle: f64,
    /// Body moment [N·m]
    pub torque: Vector3<f64>,
}

impl QuadrotorInput {
    pub fn new(throttle: f64, torque: Vector3<f64>) -> Self {
        Self { throttle, torque }
    }
}

/// Multirotor dynamics model
#[derive(Debug, Clone)]
pub struct QuadrotorDynamics {
    pub params: QuadrotorParams,
}

impl QuadrotorDynamics {
    pub fn new(params: QuadrotorParams) -> Self {
        Self { params }
    }

    /// Translational acceleration (world frame)
    pub fn acceleration(&self, state: &QuadrotorState, input: &QuadrotorInput) -> Vector3<f64> {
        let thrust = input.throttle * self.params.thrust_per_throttle;
        body_z_axis(&state.orientation) * thrust / self.params.mass - Vector3::new(0.0, 0.0, GRAVITY)
    }

    /// Angular acceleration (body frame)
    pub fn angular_acceleration(&self, state: &QuadrotorState, input: &QuadrotorInput) -> Vector3<f64> {
        let omega = &state.angular_velocity;
        let gyro = -omega.cross(&(self.params.inertia * omega));
        self.params.inertia_inv * (gyro + input.torque)
    }

    /// Semi-implicit Euler step of the full rigid body
    pub fn step(&self, state: &QuadrotorState, input: &QuadrotorInput, dt: f64) -> QuadrotorState {
        let velocity = state.velocity + self.acceleration(state, input) * dt;
        let angular_velocity = state.angular_velocity + self.angular_acceleration(state, input) * dt;
        let q_dot = quaternion_derivative(&state.orientation, &angular_velocity);

        QuadrotorState {
            position: state.position + velocity * dt,
            velocity,
            orientation: integrate_quaternion(&state.orientation, &q_dot, dt),
            angular_velocity,
        }
    }

    /// Translational step with an ideal attitude loop
    ///
    /// The vehicle snaps to `orientation` before thrusting; angular
    /// velocity is zeroed. Isolates the position law from attitude dynamics.
    pub fn step_with_attitude(
        &self,
        state: &QuadrotorState,
        throttle: f64,
        orientation: UnitQuaternion<f64>,
        dt: f64,
    ) -> QuadrotorState {
        let snapped = QuadrotorState {
            orientation,
            angular_velocity: Vector3::zeros(),
            ..state.clone()
        };
        let input = QuadrotorInput::new(throttle, Vector3::zeros());
        let velocity = state.velocity + self.acceleration(&snapped, &input) * dt;

        QuadrotorState {
            position: state.position + velocity * dt,
            velocity,
            ..snapped
        }
    }
}
