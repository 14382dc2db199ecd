//! Quaternion operations for attitude representation
//!
//! - Scalar-last `[x, y, z, w]` wire ordering used by the pose/attitude
//!   messages the controller exchanges with the outside world
//! - Quaternion derivative: q̇ = 1/2 Λ(q)[0;ω]
//! - Quaternion integration

use nalgebra::{Matrix4, Quaternion, UnitQuaternion, Vector3, Vector4};

/// Build a unit quaternion from scalar-last `[x, y, z, w]` components
///
/// The input is normalized. An all-zero input (an uninitialized message)
/// maps to the identity rotation.
pub fn quaternion_from_xyzw(xyzw: [f64; 4]) -> UnitQuaternion<f64> {
    let [x, y, z, w] = xyzw;
    let q = Quaternion::new(w, x, y, z);
    if q.norm() < 1e-12 {
        return UnitQuaternion::identity();
    }
    UnitQuaternion::from_quaternion(q)
}

/// Scalar-last `[x, y, z, w]` components of a unit quaternion
pub fn quaternion_to_xyzw(q: &UnitQuaternion<f64>) -> [f64; 4] {
    [q.i, q.j, q.k, q.w]
}

/// Compute the quaternion derivative given angular velocity
///
/// q̇ = 1/2 Λ(q)[0;ω]
///
/// # Arguments
/// * `q` - Current orientation as unit quaternion
/// * `omega` - Angular velocity in body frame [rad/s]
///
/// # Returns
/// Quaternion derivative as Vector4 (w, x, y, z)
pub fn quaternion_derivative(q: &UnitQuaternion<f64>, omega: &Vector3<f64>) -> Vector4<f64> {
    let (w, x, y, z) = (q.w, q.i, q.j, q.k);

    let omega_quat = Vector4::new(0.0, omega.x, omega.y, omega.z);

    // Quaternion multiplication matrix Λ(q)
    let lambda = Matrix4::new(
        w, -x, -y, -z,
        x,  w, -z,  y,
        y,  z,  w, -x,
        z, -y,  x,  w,
    );

    0.5 * lambda * omega_quat
}

/// Integrate quaternion using the derivative
///
/// q_new = normalize(q + q̇ * dt)
pub fn integrate_quaternion(
    q: &UnitQuaternion<f64>,
    q_dot: &Vector4<f64>,
    dt: f64,
) -> UnitQuaternion<f64> {
    let q_vec = Vector4::new(q.w, q.i, q.j, q.k);
    let q_new = q_vec + q_dot * dt;

    UnitQuaternion::from_quaternion(Quaternion::new(q_new[0], q_new[1], q_new[2], q_new[3]))
}
