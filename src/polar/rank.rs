//! Orthogonal factor recovery for singular matrices.
//!
//! Both routines reduce the matrix with Householder reflections until its
//! non-zero part sits in a corner block, pick the orthogonal factor of that
//! block in closed form, and reflect it back.

use crate::float_types::Real;
use crate::primitives::{cross, find_max_col, make_reflector, reflect_cols, reflect_rows, row};
use log::trace;
use nalgebra::{Matrix3, Vector3};

/// Orthogonal factor of a matrix of rank 1 or less. The zero matrix yields the
/// identity.
pub fn do_rank1(m: &Matrix3<Real>) -> Matrix3<Real> {
    let mut q = Matrix3::identity();
    let Some(col) = find_max_col(m) else {
        trace!("polar: rank 0 input, orthogonal factor is the identity");
        return q;
    };
    trace!("polar: rank 1 fallback pivoting on column {col}");

    let mut m = *m;
    let v1 = make_reflector(&column(&m, col));
    reflect_cols(&mut m, &v1);
    // every column is now a multiple of e3, so row 2 holds everything
    let v2 = make_reflector(&row(&m, 2));
    reflect_rows(&mut m, &v2);

    if m[(2, 2)] < 0.0 {
        q[(2, 2)] = -1.0;
    }
    reflect_cols(&mut q, &v1);
    reflect_rows(&mut q, &v2);
    q
}

/// Orthogonal factor of a matrix of rank 2 or less, given its adjoint
/// transpose. Falls through to [`do_rank1`] when the adjoint vanishes.
pub fn do_rank2(m: &Matrix3<Real>, madj_t: &Matrix3<Real>) -> Matrix3<Real> {
    // a rank 2 matrix has a non-zero adjoint
    let Some(col) = find_max_col(madj_t) else {
        return do_rank1(m);
    };
    trace!("polar: rank 2 fallback pivoting on adjoint column {col}");

    let mut m = *m;
    let v1 = make_reflector(&column(madj_t, col));
    reflect_cols(&mut m, &v1);
    let v2 = make_reflector(&cross(&row(&m, 0), &row(&m, 1)));
    reflect_rows(&mut m, &v2);

    // m is now [[w, x, 0], [y, z, 0], [0, 0, 0]]
    let (w, x, y, z) = (m[(0, 0)], m[(0, 1)], m[(1, 0)], m[(1, 1)]);
    let mut q = Matrix3::identity();
    if w * z > x * y {
        let (c, s) = unit_pair(z + w, y - x);
        q[(0, 0)] = c;
        q[(1, 1)] = c;
        q[(1, 0)] = s;
        q[(0, 1)] = -s;
    } else {
        let (c, s) = unit_pair(z - w, y + x);
        q[(1, 1)] = c;
        q[(0, 0)] = -c;
        q[(0, 1)] = s;
        q[(1, 0)] = s;
    }
    reflect_cols(&mut q, &v1);
    reflect_rows(&mut q, &v2);
    q
}

#[inline]
fn column(m: &Matrix3<Real>, col: usize) -> Vector3<Real> {
    Vector3::new(m[(0, col)], m[(1, col)], m[(2, col)])
}

#[inline]
fn unit_pair(c: Real, s: Real) -> (Real, Real) {
    let d = c.hypot(s);
    if d == 0.0 {
        (1.0, 0.0)
    } else {
        (c / d, s / d)
    }
}
