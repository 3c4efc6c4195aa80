//! Test support library
//! Provides matrix builders and comparison helpers shared by the integration tests.

use affine_parts::float_types::Real;
use nalgebra::{Matrix3, Matrix4, Rotation3, Translation3, Vector3};

/// Quick helper to compare floating-point results with an acceptable tolerance.
pub fn approx_eq(a: Real, b: Real, eps: Real) -> bool {
    (a - b).abs() < eps
}

/// Largest absolute entry-wise difference of two matrices.
pub fn max_diff(a: &Matrix4<Real>, b: &Matrix4<Real>) -> Real {
    (a - b).abs().max()
}

/// `T · R · L` with `R` from Euler angles (radians) and `L` an arbitrary
/// linear block.
pub fn affine(translation: [Real; 3], euler: [Real; 3], linear: Matrix3<Real>) -> Matrix4<Real> {
    let t = Translation3::new(translation[0], translation[1], translation[2]).to_homogeneous();
    let r = Rotation3::from_euler_angles(euler[0], euler[1], euler[2]).to_homogeneous();
    let mut l = Matrix4::identity();
    l.fixed_view_mut::<3, 3>(0, 0).copy_from(&linear);
    t * r * l
}

/// A spread of non-singular affine matrices: rotations, non-uniform and
/// repeated scales, shears, with and without reflection.
pub fn sample_matrices() -> Vec<Matrix4<Real>> {
    let linears = [
        Matrix3::identity(),
        Matrix3::from_diagonal(&Vector3::new(2.0, 3.0, 4.0)),
        Matrix3::from_diagonal(&Vector3::new(0.5, 0.5, 3.0)),
        Matrix3::from_diagonal(&Vector3::new(1.5, 1.5, 1.5)),
        Matrix3::new(1.0, 0.6, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0),
        Matrix3::new(2.0, -0.3, 0.7, 0.1, 0.9, 0.4, -0.5, 0.2, 1.8),
        Matrix3::from_diagonal(&Vector3::new(-1.0, 2.0, 2.5)),
        Matrix3::new(-1.2, 0.3, 0.0, 0.4, 0.8, -0.6, 0.0, 0.5, -2.0),
    ];
    let eulers = [
        [0.0, 0.0, 0.0],
        [0.3, -0.2, 1.1],
        [2.9, 0.4, -2.2],
        [-1.0, 1.4, 0.6],
        [3.1, -3.0, 0.1],
    ];
    let mut out = Vec::new();
    for (i, linear) in linears.iter().enumerate() {
        for (j, euler) in eulers.iter().enumerate() {
            let t = [i as Real - 3.0, j as Real * 0.5, 7.0 - (i * j) as Real];
            out.push(affine(t, *euler, *linear));
        }
    }
    out
}
