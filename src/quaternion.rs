//! Quaternion helpers on top of [`nalgebra::Quaternion`].
//!
//! Quaternions here are plain 4-vectors `(x, y, z, w)`: a rotation when of unit
//! norm, but the algebra is also used on non-unit and pure (`w = 0`)
//! quaternions while decomposing. Every function returns a new value.

use crate::float_types::Real;
use nalgebra::{Matrix4, Quaternion, UnitQuaternion, Vector3};

/// Pivot orderings for [`from_matrix`]: the pivot axis followed by the next two
/// axes in cyclic order.
const CYCLIC_AXES: [[usize; 3]; 3] = [[0, 1, 2], [1, 2, 0], [2, 0, 1]];

/// Below this sine of the half angle, [`slerp`] blends linearly.
const NLERP_SINE: Real = 0.03;

/// Build a (possibly non-unit) quaternion from its components.
#[inline]
pub fn from_xyzw(x: Real, y: Real, z: Real, w: Real) -> Quaternion<Real> {
    Quaternion::new(w, x, y, z)
}

/// `(-x, -y, -z, w)`
#[inline]
pub fn conjugate(q: &Quaternion<Real>) -> Quaternion<Real> {
    from_xyzw(-q.i, -q.j, -q.k, q.w)
}

/// Hamilton product `l · r`. Not commutative: rotating by `first` and then by
/// `second` is `mul(second, first)`.
pub fn mul(l: &Quaternion<Real>, r: &Quaternion<Real>) -> Quaternion<Real> {
    from_xyzw(
        l.w * r.i + l.i * r.w + l.j * r.k - l.k * r.j,
        l.w * r.j + l.j * r.w + l.k * r.i - l.i * r.k,
        l.w * r.k + l.k * r.w + l.i * r.j - l.j * r.i,
        l.w * r.w - l.i * r.i - l.j * r.j - l.k * r.k,
    )
}

/// Component-wise product with a scalar.
#[inline]
pub fn scale(q: &Quaternion<Real>, s: Real) -> Quaternion<Real> {
    from_xyzw(q.i * s, q.j * s, q.k * s, q.w * s)
}

/// Unit quaternion in the direction of `q`; the zero quaternion maps to the
/// identity.
pub fn normalize(q: &Quaternion<Real>) -> Quaternion<Real> {
    let norm = q.norm();
    if norm == 0.0 {
        Quaternion::identity()
    } else {
        scale(q, 1.0 / norm)
    }
}

/// Quaternion of the linear block of `mat`, which multiplies column vectors
/// (`v' = M v`) in a right-handed frame. Translation and perspective entries are
/// ignored, except that a homogeneous corner `m[3][3] ≠ 1` rescales the result
/// by `1/√m[3][3]`.
///
/// The result is only unit-length when the block is a rotation; callers
/// normalise when they need a rotation.
///
/// To avoid dividing by a small number the largest component is extracted
/// first: `w` when the trace is non-negative (then `|w| ≥ ½`), otherwise the
/// component matching the largest diagonal entry, which is then at least ½.
pub fn from_matrix(mat: &Matrix4<Real>) -> Quaternion<Real> {
    let mut qu: [Real; 4] = [0.0; 4];
    let tr = mat[(0, 0)] + mat[(1, 1)] + mat[(2, 2)];
    if tr >= 0.0 {
        let s = (tr + mat[(3, 3)]).sqrt();
        qu[3] = s * 0.5;
        let s = 0.5 / s;
        qu[0] = (mat[(2, 1)] - mat[(1, 2)]) * s;
        qu[1] = (mat[(0, 2)] - mat[(2, 0)]) * s;
        qu[2] = (mat[(1, 0)] - mat[(0, 1)]) * s;
    } else {
        let mut h = 0;
        if mat[(1, 1)] > mat[(0, 0)] {
            h = 1;
        }
        if mat[(2, 2)] > mat[(h, h)] {
            h = 2;
        }
        let [i, j, k] = CYCLIC_AXES[h];
        let s = ((mat[(i, i)] - (mat[(j, j)] + mat[(k, k)])) + mat[(3, 3)]).sqrt();
        qu[i] = s * 0.5;
        let s = 0.5 / s;
        qu[j] = (mat[(i, j)] + mat[(j, i)]) * s;
        qu[k] = (mat[(k, i)] + mat[(i, k)]) * s;
        qu[3] = (mat[(k, j)] - mat[(j, k)]) * s;
    }
    let q = from_xyzw(qu[0], qu[1], qu[2], qu[3]);
    if mat[(3, 3)] != 1.0 {
        scale(&q, 1.0 / mat[(3, 3)].sqrt())
    } else {
        q
    }
}

/// Homogeneous rotation matrix of `q`. Non-unit quaternions are accepted and
/// give the rotation of `q / |q|`; the zero quaternion gives the identity.
#[rustfmt::skip]
pub fn to_matrix(q: &Quaternion<Real>) -> Matrix4<Real> {
    let nq = q.norm_squared();
    let s = if nq > 0.0 { 2.0 / nq } else { 0.0 };
    let (xs, ys, zs) = (q.i * s, q.j * s, q.k * s);
    let (wx, wy, wz) = (q.w * xs, q.w * ys, q.w * zs);
    let (xx, xy, xz) = (q.i * xs, q.i * ys, q.i * zs);
    let (yy, yz, zz) = (q.j * ys, q.j * zs, q.k * zs);
    Matrix4::new(
        1.0 - (yy + zz), xy - wz,         xz + wy,         0.0,
        xy + wz,         1.0 - (xx + zz), yz - wx,         0.0,
        xz - wy,         yz + wx,         1.0 - (xx + yy), 0.0,
        0.0,             0.0,             0.0,             1.0,
    )
}

/// Rotate `v` by the unit quaternion `q` (`q v q*`).
pub fn rotate_vector(q: &Quaternion<Real>, v: &Vector3<Real>) -> Vector3<Real> {
    let p = from_xyzw(v.x, v.y, v.z, 0.0);
    let r = mul(q, &mul(&p, &conjugate(q)));
    Vector3::new(r.i, r.j, r.k)
}

/// Spherical interpolation along the shorter arc between two unit quaternions.
/// Falls back to a normalised lerp when they are nearly parallel.
pub fn slerp(a: &Quaternion<Real>, b: &Quaternion<Real>, t: Real) -> Quaternion<Real> {
    let ua = UnitQuaternion::new_unchecked(*a);
    let ub = UnitQuaternion::new_unchecked(*b);
    match ua.try_slerp(&ub, t, NLERP_SINE) {
        Some(q) => q.into_inner(),
        None => nlerp(a, b, t),
    }
}

fn nlerp(a: &Quaternion<Real>, b: &Quaternion<Real>, t: Real) -> Quaternion<Real> {
    let b = if a.coords.dot(&b.coords) < 0.0 { scale(b, -1.0) } else { *b };
    normalize(&(scale(a, 1.0 - t) + scale(&b, t)))
}

/// Rotation axis and angle (radians, in `[0, π]`) of `q`. A zero rotation
/// reports the x axis.
pub fn axis_angle(q: &Quaternion<Real>) -> (Vector3<Real>, Real) {
    UnitQuaternion::new_unchecked(normalize(q))
        .axis_angle()
        .map_or((Vector3::x(), 0.0), |(axis, angle)| (axis.into_inner(), angle))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::linear_block;
    use approx::assert_relative_eq;
    use nalgebra::{Rotation3, Unit};

    fn same_rotation(a: &Quaternion<Real>, b: &Quaternion<Real>) -> bool {
        (a.coords - b.coords).norm() < 1e-9 || (a.coords + b.coords).norm() < 1e-9
    }

    #[test]
    fn conjugate_and_scale() {
        let q = from_xyzw(1.0, -2.0, 3.0, 4.0);
        assert_eq!(conjugate(&q), from_xyzw(-1.0, 2.0, -3.0, 4.0));
        assert_eq!(scale(&q, 2.0), from_xyzw(2.0, -4.0, 6.0, 8.0));
    }

    #[test]
    fn mul_matches_hamilton_product() {
        let a = from_xyzw(0.1, 0.2, -0.3, 0.9);
        let b = from_xyzw(-0.5, 0.4, 0.2, 0.7);
        assert_relative_eq!(mul(&a, &b), a * b, epsilon = 1e-12);
        // i * j = k, j * i = -k
        let i = from_xyzw(1.0, 0.0, 0.0, 0.0);
        let j = from_xyzw(0.0, 1.0, 0.0, 0.0);
        assert_eq!(mul(&i, &j), from_xyzw(0.0, 0.0, 1.0, 0.0));
        assert_eq!(mul(&j, &i), from_xyzw(0.0, 0.0, -1.0, 0.0));
    }

    #[test]
    fn composition_order() {
        let first = UnitQuaternion::from_euler_angles(0.4, 0.0, 0.0).into_inner();
        let second = UnitQuaternion::from_euler_angles(0.0, 0.0, 1.2).into_inner();
        let v = Vector3::new(0.3, -1.0, 2.0);
        let both = rotate_vector(&mul(&second, &first), &v);
        let stepwise = rotate_vector(&second, &rotate_vector(&first, &v));
        assert_relative_eq!(both, stepwise, epsilon = 1e-12);
    }

    #[test]
    fn from_matrix_round_trips_every_branch() {
        // trace >= 0, and pivots on x, y and z for half turns
        let rotations = [
            Rotation3::from_euler_angles(0.2, -0.4, 0.9),
            Rotation3::from_axis_angle(&Vector3::x_axis(), 3.0),
            Rotation3::from_axis_angle(&Vector3::y_axis(), 3.0),
            Rotation3::from_axis_angle(&Vector3::z_axis(), 3.0),
            Rotation3::from_axis_angle(&Unit::new_normalize(Vector3::new(1.0, 1.0, -1.0)), 2.9),
        ];
        for rot in rotations {
            let m = rot.to_homogeneous();
            let q = from_matrix(&m);
            assert_relative_eq!(q.norm(), 1.0, epsilon = 1e-12);
            let expected = UnitQuaternion::from_rotation_matrix(&rot).into_inner();
            assert!(same_rotation(&q, &expected), "{q:?} vs {expected:?}");
            assert_relative_eq!(linear_block(&to_matrix(&q)), *rot.matrix(), epsilon = 1e-12);
        }
    }

    #[test]
    fn from_matrix_rescales_homogeneous_corner() {
        let mut m = Rotation3::from_euler_angles(0.1, 0.2, 0.3).to_homogeneous() * 4.0;
        m[(3, 3)] = 4.0;
        let q = from_matrix(&m);
        assert_relative_eq!(q.norm(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn to_matrix_accepts_non_unit() {
        let q = from_xyzw(0.0, 0.0, 2.0, 2.0);
        let m = to_matrix(&q);
        // quarter turn about z
        assert_relative_eq!(m[(0, 1)], -1.0, epsilon = 1e-12);
        assert_relative_eq!(m[(1, 0)], 1.0, epsilon = 1e-12);
        assert_eq!(to_matrix(&from_xyzw(0.0, 0.0, 0.0, 0.0)), Matrix4::identity());
    }

    #[test]
    fn normalize_zero_is_identity() {
        assert_eq!(normalize(&from_xyzw(0.0, 0.0, 0.0, 0.0)), Quaternion::identity());
        assert_relative_eq!(normalize(&from_xyzw(0.0, 3.0, 0.0, 4.0)).norm(), 1.0);
    }

    #[test]
    fn slerp_endpoints_and_shortest_arc() {
        let a = UnitQuaternion::from_euler_angles(0.0, 0.0, 0.2).into_inner();
        let b = UnitQuaternion::from_euler_angles(0.0, 0.0, 1.4).into_inner();
        assert_relative_eq!(slerp(&a, &b, 0.0), a, epsilon = 1e-12);
        assert_relative_eq!(slerp(&a, &b, 1.0), b, epsilon = 1e-12);
        let mid = slerp(&a, &b, 0.5);
        let (_, angle) = axis_angle(&mid);
        assert_relative_eq!(angle, 0.8, epsilon = 1e-9);
        // -b is the same rotation, the interpolation must not take the long way
        let mid_neg = slerp(&a, &scale(&b, -1.0), 0.5);
        assert!(same_rotation(&mid, &mid_neg));
        // nearly parallel inputs take the linear path and stay unit length
        let c = UnitQuaternion::from_euler_angles(0.0, 0.0, 0.2 + 1e-6).into_inner();
        let near = slerp(&a, &c, 0.5);
        assert_relative_eq!(near.norm(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(axis_angle(&near).1, 0.2 + 5e-7, epsilon = 1e-9);
    }

    #[test]
    fn axis_angle_of_quarter_turn() {
        let q = UnitQuaternion::from_axis_angle(&Vector3::y_axis(), crate::float_types::PI / 2.0);
        let (axis, angle) = axis_angle(q.quaternion());
        assert_relative_eq!(axis, Vector3::y(), epsilon = 1e-12);
        assert_relative_eq!(angle, crate::float_types::PI / 2.0, epsilon = 1e-12);
        // -q is the same rotation, reported with the short angle
        let (axis, angle) = axis_angle(&scale(q.quaternion(), -1.0));
        assert_relative_eq!(axis, Vector3::y(), epsilon = 1e-12);
        assert_relative_eq!(angle, crate::float_types::PI / 2.0, epsilon = 1e-12);
        let (axis, angle) = axis_angle(&Quaternion::identity());
        assert_eq!(axis, Vector3::x());
        assert_eq!(angle, 0.0);
    }
}
