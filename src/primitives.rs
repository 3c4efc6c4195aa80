//! Fixed-size vector and matrix kernels used by the decompositions.
//!
//! The decompositions only ever look at the upper-left 3×3 block of a
//! homogeneous matrix, so most kernels here take that block as a
//! [`Matrix3`] and [`linear_block`] / [`pad`] move between the two forms.

use crate::float_types::Real;
use nalgebra::{Matrix3, Matrix4, Vector3};

/// Dot product of two 3-vectors.
#[inline]
pub fn dot(a: &Vector3<Real>, b: &Vector3<Real>) -> Real {
    a.x * b.x + a.y * b.y + a.z * b.z
}

/// Cross product of two 3-vectors, `a × b = -(b × a)`.
#[inline]
pub fn cross(a: &Vector3<Real>, b: &Vector3<Real>) -> Vector3<Real> {
    Vector3::new(
        a.y * b.z - a.z * b.y,
        a.z * b.x - a.x * b.z,
        a.x * b.y - a.y * b.x,
    )
}

/// Row `i` of a 3×3 block as a column vector.
#[inline]
pub fn row(m: &Matrix3<Real>, i: usize) -> Vector3<Real> {
    Vector3::new(m[(i, 0)], m[(i, 1)], m[(i, 2)])
}

#[inline]
fn set_row(m: &mut Matrix3<Real>, i: usize, v: &Vector3<Real>) {
    m[(i, 0)] = v.x;
    m[(i, 1)] = v.y;
    m[(i, 2)] = v.z;
}

/// Copy of the upper-left 3×3 (linear) block of a homogeneous matrix.
#[inline]
pub fn linear_block(m: &Matrix4<Real>) -> Matrix3<Real> {
    m.fixed_view::<3, 3>(0, 0).into_owned()
}

/// Embed a 3×3 block into a 4×4 matrix whose last row and column are those of
/// the identity.
#[inline]
pub fn pad(block: &Matrix3<Real>) -> Matrix4<Real> {
    let mut out = Matrix4::identity();
    out.fixed_view_mut::<3, 3>(0, 0).copy_from(block);
    out
}

/// Product of the upper-left 3×3 blocks of `a` and `b`, padded to 4×4.
/// Row and column 3 of the inputs are ignored.
pub fn mat_mul_3x3(a: &Matrix4<Real>, b: &Matrix4<Real>) -> Matrix4<Real> {
    let (a, b) = (linear_block(a), linear_block(b));
    let mut ab = Matrix3::zeros();
    for i in 0..3 {
        for j in 0..3 {
            ab[(i, j)] = a[(i, 0)] * b[(0, j)] + a[(i, 1)] * b[(1, j)] + a[(i, 2)] * b[(2, j)];
        }
    }
    pad(&ab)
}

/// 1-norm: the largest absolute column sum.
pub fn norm_one(m: &Matrix3<Real>) -> Real {
    let mut max: Real = 0.0;
    for i in 0..3 {
        let sum = m[(0, i)].abs() + m[(1, i)].abs() + m[(2, i)].abs();
        if max < sum {
            max = sum;
        }
    }
    max
}

/// ∞-norm: the largest absolute row sum, i.e. the 1-norm of the transpose.
pub fn norm_inf(m: &Matrix3<Real>) -> Real {
    let mut max: Real = 0.0;
    for i in 0..3 {
        let sum = m[(i, 0)].abs() + m[(i, 1)].abs() + m[(i, 2)].abs();
        if max < sum {
            max = sum;
        }
    }
    max
}

/// `det(M) · M⁻ᵀ`, built row by row from cross products of the other two rows.
///
/// Unlike an explicit inverse this stays defined for singular `M`, where it
/// carries the rank information the polar fallback needs.
pub fn adjoint_transpose(m: &Matrix3<Real>) -> Matrix3<Real> {
    let (r0, r1, r2) = (row(m, 0), row(m, 1), row(m, 2));
    let mut madj_t = Matrix3::zeros();
    set_row(&mut madj_t, 0, &cross(&r1, &r2));
    set_row(&mut madj_t, 1, &cross(&r2, &r0));
    set_row(&mut madj_t, 2, &cross(&r0, &r1));
    madj_t
}

/// Index of the column holding the largest absolute entry, or `None` when the
/// block is exactly zero. Ties keep the first entry found scanning row-major.
pub fn find_max_col(m: &Matrix3<Real>) -> Option<usize> {
    let mut max: Real = 0.0;
    let mut col = None;
    for i in 0..3 {
        for j in 0..3 {
            let abs = m[(i, j)].abs();
            if abs > max {
                max = abs;
                col = Some(j);
            }
        }
    }
    col
}

/// Householder vector `u` such that `(I - u uᵀ) v` has only its last
/// component non-zero. The zero vector gives `u = 0`, the identity.
///
/// `v` is divided by its largest component first, so tiny or huge inputs do
/// not underflow or overflow in `v·v`.
pub fn make_reflector(v: &Vector3<Real>) -> Vector3<Real> {
    let peak = v.amax();
    if peak == 0.0 {
        return Vector3::zeros();
    }
    let v = v / peak;
    let s = dot(&v, &v).sqrt();
    let u = Vector3::new(v.x, v.y, v.z + if v.z < 0.0 { -s } else { s });
    let s = (2.0 / dot(&u, &u)).sqrt();
    u * s
}

/// Apply the reflection `I - u uᵀ` to every column of `m` (left multiply).
pub fn reflect_cols(m: &mut Matrix3<Real>, u: &Vector3<Real>) {
    for i in 0..3 {
        let s = u.x * m[(0, i)] + u.y * m[(1, i)] + u.z * m[(2, i)];
        for j in 0..3 {
            m[(j, i)] -= u[j] * s;
        }
    }
}

/// Apply the reflection `I - u uᵀ` to every row of `m` (right multiply).
pub fn reflect_rows(m: &mut Matrix3<Real>, u: &Vector3<Real>) {
    for i in 0..3 {
        let s = dot(u, &row(m, i));
        for j in 0..3 {
            m[(i, j)] -= u[j] * s;
        }
    }
}

/// True when the bottom row is exactly `(0, 0, 0, 1)`, i.e. the matrix is not
/// a projection.
pub fn is_affine(m: &Matrix4<Real>) -> bool {
    m[(3, 0)] == 0.0 && m[(3, 1)] == 0.0 && m[(3, 2)] == 0.0 && m[(3, 3)] == 1.0
}

/// Columns have unit length and are pairwise orthogonal, each within `epsilon`.
pub fn is_orthogonal(m: &Matrix3<Real>, epsilon: Real) -> bool {
    for i in 0..3 {
        for j in i..3 {
            let ip = m.column(i).dot(&m.column(j));
            let expected = if i == j { 1.0 } else { 0.0 };
            if (ip - expected).abs() > epsilon {
                return false;
            }
        }
    }
    true
}

/// Orthogonal linear block and an exact affine bottom row.
pub fn is_rigid(m: &Matrix4<Real>, epsilon: Real) -> bool {
    is_orthogonal(&linear_block(m), epsilon) && is_affine(m)
}

pub fn is_symmetric(m: &Matrix3<Real>, epsilon: Real) -> bool {
    (m[(0, 1)] - m[(1, 0)]).abs() < epsilon
        && (m[(0, 2)] - m[(2, 0)]).abs() < epsilon
        && (m[(1, 2)] - m[(2, 1)]).abs() < epsilon
}

/// Snap entries lying within `epsilon` of 0, 1 or -1 onto that value.
pub fn smooth(m: &Matrix3<Real>, epsilon: Real) -> Matrix3<Real> {
    m.map(|x| {
        if x.abs() < epsilon {
            0.0
        } else if (x - 1.0).abs() < epsilon {
            1.0
        } else if (x + 1.0).abs() < epsilon {
            -1.0
        } else {
            x
        }
    })
}
