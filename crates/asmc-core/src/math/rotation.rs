//! SO(3) rotation utilities
//!
//! Provides the hat/vee maps, rotation matrix <-> quaternion conversion and
//! orthonormality checks used by the geometric attitude construction.

use nalgebra::{Matrix3, Quaternion, UnitQuaternion, Vector3};

/// Skew-symmetric matrix from vector (hat operator)
///
/// For v = [x, y, z]^T:
/// ```text
/// [v]× = [ 0  -z   y]
///        [ z   0  -x]
///        [-y   x   0]
/// ```
pub fn skew(v: &Vector3<f64>) -> Matrix3<f64> {
    Matrix3::new(
        0.0, -v.z, v.y,
        v.z, 0.0, -v.x,
        -v.y, v.x, 0.0,
    )
}

/// Vee map, the inverse of [`skew`]
///
/// Reads the 3-vector out of a skew-symmetric matrix. Only the lower
/// triangle is used, so the caller is responsible for passing a matrix that
/// is (numerically) skew-symmetric.
pub fn vee(m: &Matrix3<f64>) -> Vector3<f64> {
    Vector3::new(m[(2, 1)], m[(0, 2)], m[(1, 0)])
}

/// Rotation matrix from quaternion
///
/// Extracts the 3x3 rotation matrix R(q) ∈ SO(3) from unit quaternion
pub fn rotation_matrix_from_quaternion(q: &UnitQuaternion<f64>) -> Matrix3<f64> {
    *q.to_rotation_matrix().matrix()
}

/// Body z-axis in world frame (thrust direction for a multirotor)
///
/// z_body = R(q) * [0, 0, 1]^T
pub fn body_z_axis(q: &UnitQuaternion<f64>) -> Vector3<f64> {
    q.transform_vector(&Vector3::z())
}

/// Quaternion from rotation matrix
///
/// Picks one of four branches depending on the trace and the largest
/// diagonal element, so the square root is always taken of a quantity
/// bounded away from zero. The result has a non-negative scalar part when
/// the trace branch is taken.
///
/// `r` must be a proper rotation matrix; the result is renormalized to absorb
/// rounding.
pub fn quaternion_from_rotation_matrix(r: &Matrix3<f64>) -> UnitQuaternion<f64> {
    let trace = r.trace();

    let (w, x, y, z) = if trace > 0.0 {
        let s = 2.0 * (trace + 1.0).sqrt(); // s = 4w
        (
            0.25 * s,
            (r[(2, 1)] - r[(1, 2)]) / s,
            (r[(0, 2)] - r[(2, 0)]) / s,
            (r[(1, 0)] - r[(0, 1)]) / s,
        )
    } else if r[(0, 0)] > r[(1, 1)] && r[(0, 0)] > r[(2, 2)] {
        let s = 2.0 * (1.0 + r[(0, 0)] - r[(1, 1)] - r[(2, 2)]).sqrt(); // s = 4x
        (
            (r[(2, 1)] - r[(1, 2)]) / s,
            0.25 * s,
            (r[(0, 1)] + r[(1, 0)]) / s,
            (r[(0, 2)] + r[(2, 0)]) / s,
        )
    } else if r[(1, 1)] > r[(2, 2)] {
        let s = 2.0 * (1.0 + r[(1, 1)] - r[(0, 0)] - r[(2, 2)]).sqrt(); // s = 4y
        (
            (r[(0, 2)] - r[(2, 0)]) / s,
            (r[(0, 1)] + r[(1, 0)]) / s,
            0.25 * s,
            (r[(1, 2)] + r[(2, 1)]) / s,
        )
    } else {
        let s = 2.0 * (1.0 + r[(2, 2)] - r[(0, 0)] - r[(1, 1)]).sqrt(); // s = 4z
        (
            (r[(1, 0)] - r[(0, 1)]) / s,
            (r[(0, 2)] + r[(2, 0)]) / s,
            (r[(1, 2)] + r[(2, 1)]) / s,
            0.25 * s,
        )
    };

    UnitQuaternion::from_quaternion(Quaternion::new(w, x, y, z))
}

/// Check that `r` is a proper rotation: orthonormal columns, det = +1
pub fn is_rotation_matrix(r: &Matrix3<f64>, tol: f64) -> bool {
    let orthogonality = (r.transpose() * r - Matrix3::identity()).abs().max();
    orthogonality < tol && (r.determinant() - 1.0).abs() < tol
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Unit;
    use std::f64::consts::PI;

    fn rot(axis: Vector3<f64>, angle: f64) -> Matrix3<f64> {
        rotation_matrix_from_quaternion(&UnitQuaternion::from_axis_angle(
            &Unit::new_normalize(axis),
            angle,
        ))
    }

    fn assert_round_trip(r: Matrix3<f64>) {
        let q = quaternion_from_rotation_matrix(&r);
        let r_back = rotation_matrix_from_quaternion(&q);
        assert_relative_eq!(r_back, r, epsilon = 1e-12);
    }

    #[test]
    fn test_skew_symmetric() {
        let v = Vector3::new(1.0, 2.0, 3.0);
        let s = skew(&v);

        // Skew symmetric: S^T = -S
        assert_relative_eq!(s, -s.transpose(), epsilon = 1e-10);
        assert_relative_eq!(s.diagonal().norm(), 0.0, epsilon = 1e-10);
    }

    #[test]
    fn test_vee_inverts_skew() {
        let v = Vector3::new(-0.3, 1.7, 4.2);
        assert_relative_eq!(vee(&skew(&v)), v, epsilon = 1e-12);
    }

    #[test]
    fn test_skew_is_cross_product() {
        let a = Vector3::new(1.0, 0.0, 0.0);
        let b = Vector3::new(0.0, 1.0, 0.0);

        // x × y = z
        assert_relative_eq!(skew(&a) * b, Vector3::new(0.0, 0.0, 1.0), epsilon = 1e-10);
    }

    #[test]
    fn test_body_z_axis_rotated() {
        // 90 degrees around y moves body z onto world x
        let q = UnitQuaternion::from_axis_angle(&Vector3::y_axis(), PI / 2.0);
        assert_relative_eq!(body_z_axis(&q), Vector3::new(1.0, 0.0, 0.0), epsilon = 1e-10);
    }

    #[test]
    fn test_round_trip_trace_positive() {
        let r = rot(Vector3::new(1.0, 2.0, 3.0), 0.7);
        assert!(r.trace() > 0.0);
        assert_round_trip(r);
    }

    #[test]
    fn test_round_trip_x_dominant() {
        let r = rot(Vector3::new(1.0, 0.1, -0.1), 3.0);
        assert!(r.trace() <= 0.0);
        assert!(r[(0, 0)] > r[(1, 1)] && r[(0, 0)] > r[(2, 2)]);
        assert_round_trip(r);
    }

    #[test]
    fn test_round_trip_y_dominant() {
        let r = rot(Vector3::new(0.1, 1.0, 0.2), 2.8);
        assert!(r.trace() <= 0.0);
        assert!(r[(1, 1)] > r[(0, 0)] && r[(1, 1)] > r[(2, 2)]);
        assert_round_trip(r);
    }

    #[test]
    fn test_round_trip_z_dominant() {
        let r = rot(Vector3::new(-0.2, 0.1, 1.0), PI);
        assert!(r.trace() <= 0.0);
        assert!(r[(2, 2)] > r[(0, 0)] && r[(2, 2)] > r[(1, 1)]);
        assert_round_trip(r);
    }

    #[test]
    fn test_half_turns_about_axes() {
        for axis in [Vector3::x(), Vector3::y(), Vector3::z()] {
            assert_round_trip(rot(axis, PI));
        }
    }

    #[test]
    fn test_identity_gives_identity_quaternion() {
        let q = quaternion_from_rotation_matrix(&Matrix3::identity());
        assert_relative_eq!(q.w, 1.0, epsilon = 1e-12);
        assert_relative_eq!(q.imag().norm(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_rotation_matrix_check() {
        let r = rot(Vector3::new(1.0, 1.0, 1.0), 1.0);
        assert!(is_rotation_matrix(&r, 1e-9));

        // Reflection: orthonormal but det = -1
        let reflection = Matrix3::from_diagonal(&Vector3::new(1.0, 1.0, -1.0));
        assert!(!is_rotation_matrix(&reflection, 1e-9));
    }
}
