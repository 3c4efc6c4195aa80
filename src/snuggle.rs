//! Choosing the stretch-rotation closest to the identity.
//!
//! A spectral decomposition only fixes the eigenvector frame `U` up to
//! permutations and sign flips of its axes, plus any rotation inside an
//! eigenspace when scale factors repeat. [`snuggle`] picks the equivalent frame
//! whose quaternion is nearest the identity and permutes the scale factors to
//! match, following Shoemake's "Matrix Animation and Polar Decomposition".

use crate::float_types::{Real, SQRT_HALF};
use crate::quaternion::{conjugate, from_xyzw, mul};
use log::trace;
use nalgebra::{Quaternion, Vector3};

/// Which scale factors coincide.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Degeneracy {
    /// `k.y == k.z`, free rotation about x
    X,
    /// `k.x == k.z`, free rotation about y
    Y,
    /// `k.x == k.y`, free rotation about z
    Z,
    /// all three equal
    All,
}

impl Degeneracy {
    /// Exact comparisons: nearly equal factors are treated as distinct.
    fn of(k: &Vector3<Real>) -> Option<Self> {
        if k.x == k.y {
            Some(if k.x == k.z { Self::All } else { Self::Z })
        } else if k.x == k.z {
            Some(Self::Y)
        } else if k.y == k.z {
            Some(Self::X)
        } else {
            None
        }
    }
}

/// Find the quaternion `p` that, post-multiplied onto the stretch rotation `q`,
/// brings it closest to the identity while describing the same stretch, and
/// permute `k` accordingly.
///
/// The caller replaces `q` with `mul(&q, &p)`. `k` is only reordered, never
/// rescaled or negated.
pub fn snuggle(q: Quaternion<Real>, k: &mut Vector3<Real>) -> Quaternion<Real> {
    match Degeneracy::of(k) {
        Some(Degeneracy::All) => {
            trace!("snuggle: uniform scale, stretch rotation is arbitrary");
            conjugate(&q)
        },
        Some(axis) => snuggle_degenerate(q, k, axis),
        None => snuggle_distinct(q, k),
    }
}

/// Two equal factors: rotate the free axis onto z, then pick the in-plane
/// angle in closed form.
fn snuggle_degenerate(
    mut q: Quaternion<Real>,
    k: &mut Vector3<Real>,
    axis: Degeneracy,
) -> Quaternion<Real> {
    let qtoz = match axis {
        Degeneracy::X => {
            let qxtoz = from_xyzw(0.0, SQRT_HALF, 0.0, SQRT_HALF);
            q = mul(&q, &qxtoz);
            k.swap_rows(0, 2);
            qxtoz
        },
        Degeneracy::Y => {
            let qytoz = from_xyzw(SQRT_HALF, 0.0, 0.0, SQRT_HALF);
            q = mul(&q, &qytoz);
            k.swap_rows(1, 2);
            qytoz
        },
        _ => Quaternion::identity(),
    };
    let q = conjugate(&q);

    // where the frame sends the free (z) axis
    let mag = [
        q.k * q.k + q.w * q.w - 0.5,
        q.i * q.k - q.j * q.w,
        q.j * q.k + q.i * q.w,
    ];
    let neg = mag.map(|m| m < 0.0);
    let mag = mag.map(Real::abs);
    let win = if mag[0] > mag[1] {
        if mag[0] > mag[2] { 0 } else { 2 }
    } else if mag[1] > mag[2] {
        1
    } else {
        2
    };
    trace!("snuggle: {axis:?} degenerate scale, free axis lands on axis {win}");

    let p = match win {
        0 => {
            if neg[0] {
                from_xyzw(1.0, 0.0, 0.0, 0.0)
            } else {
                Quaternion::identity()
            }
        },
        1 => {
            *k = Vector3::new(k.z, k.x, k.y);
            if neg[1] {
                from_xyzw(0.5, 0.5, -0.5, -0.5)
            } else {
                from_xyzw(0.5, 0.5, 0.5, 0.5)
            }
        },
        _ => {
            *k = Vector3::new(k.y, k.z, k.x);
            if neg[2] {
                from_xyzw(-0.5, 0.5, -0.5, -0.5)
            } else {
                from_xyzw(0.5, 0.5, 0.5, -0.5)
            }
        },
    };

    let qp = mul(&q, &p);
    let t = (mag[win] + 0.5).sqrt();
    let p = mul(&p, &from_xyzw(0.0, 0.0, -qp.k / t, qp.w / t));
    mul(&qtoz, &conjugate(&p))
}

/// Distinct factors: choose among the 24 axis permutations and sign flips the
/// one whose quaternion has the largest `w` after the product.
fn snuggle_distinct(q: Quaternion<Real>, k: &mut Vector3<Real>) -> Quaternion<Real> {
    // components in x, y, z, w order
    let mut qa = [q.i, q.j, q.k, q.w];
    let mut neg = [false; 4];
    let mut par = false;
    for (v, n) in qa.iter_mut().zip(neg.iter_mut()) {
        *n = *v < 0.0;
        if *n {
            *v = -*v;
        }
        par ^= *n;
    }

    // the two largest magnitudes, hi >= lo
    let mut lo = if qa[0] > qa[1] { 0 } else { 1 };
    let mut hi = if qa[2] > qa[3] { 2 } else { 3 };
    if qa[lo] > qa[hi] {
        if qa[lo ^ 1] > qa[hi] {
            hi = lo;
            lo ^= 1;
        } else {
            std::mem::swap(&mut hi, &mut lo);
        }
    } else if qa[hi ^ 1] > qa[lo] {
        lo = hi ^ 1;
    }

    let all = (qa[0] + qa[1] + qa[2] + qa[3]) * 0.5;
    let two = (qa[hi] + qa[lo]) * SQRT_HALF;
    let big = qa[hi];
    let signed = |i: usize, v: Real| if neg[i] { -v } else { v };

    let mut pa = [0.0; 4];
    if all > two && all > big {
        trace!("snuggle: distinct scale, 3-fold turn (odd parity: {par})");
        for (i, p) in pa.iter_mut().enumerate() {
            *p = signed(i, 0.5);
        }
        *k = if par {
            Vector3::new(k.y, k.z, k.x)
        } else {
            Vector3::new(k.z, k.x, k.y)
        };
    } else if all <= two && two > big {
        trace!("snuggle: distinct scale, quarter turn mixing components {lo} and {hi}");
        pa[hi] = signed(hi, SQRT_HALF);
        pa[lo] = signed(lo, SQRT_HALF);
        if lo > hi {
            std::mem::swap(&mut hi, &mut lo);
        }
        if hi == 3 {
            // a turn about axis lo swaps the other two factors
            hi = [1, 2, 0][lo];
            lo = 3 - hi - lo;
        }
        k.swap_rows(hi, lo);
    } else {
        trace!("snuggle: distinct scale, half turn on component {hi}");
        pa[hi] = signed(hi, 1.0);
    }

    from_xyzw(-pa[0], -pa[1], -pa[2], pa[3])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::linear_block;
    use crate::quaternion::{normalize, to_matrix};
    use approx::assert_relative_eq;
    use nalgebra::{Matrix3, UnitQuaternion};

    fn rotation(axis: Vector3<Real>, angle: Real) -> Quaternion<Real> {
        UnitQuaternion::from_axis_angle(&nalgebra::Unit::new_normalize(axis), angle).into_inner()
    }

    fn stretch(q: &Quaternion<Real>, k: &Vector3<Real>) -> Matrix3<Real> {
        let u = linear_block(&to_matrix(q));
        u * Matrix3::from_diagonal(k) * u.transpose()
    }

    fn assert_identity(q: &Quaternion<Real>) {
        assert_relative_eq!(q.w.abs(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(q.imag().norm(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn degenerate_rotation_about_free_axis_is_removed() {
        let cases = [
            (Vector3::x(), 0.7, Vector3::new(1.0, 2.0, 2.0)),
            (Vector3::z(), 1.1, Vector3::new(3.0, 3.0, 5.0)),
            (Vector3::y(), -0.4, Vector3::new(2.0, 7.0, 2.0)),
        ];
        for (axis, angle, k0) in cases {
            let u = rotation(axis, angle);
            let mut k = k0;
            let p = snuggle(u, &mut k);
            assert_identity(&mul(&u, &p));
            assert_eq!(k, k0);
        }
    }

    #[test]
    fn uniform_scale_returns_conjugate() {
        let u = rotation(Vector3::new(1.0, -2.0, 0.5), 2.3);
        let mut k = Vector3::new(4.0, 4.0, 4.0);
        let p = snuggle(u, &mut k);
        assert_eq!(p, conjugate(&u));
        assert_eq!(k, Vector3::new(4.0, 4.0, 4.0));
        assert_identity(&mul(&u, &p));
    }

    #[test]
    fn identity_frame_stays_put() {
        let mut k = Vector3::new(2.0, 3.0, 4.0);
        let p = snuggle(Quaternion::identity(), &mut k);
        assert_identity(&p);
        assert_eq!(k, Vector3::new(2.0, 3.0, 4.0));
    }

    #[test]
    fn permuted_frame_is_undone() {
        // a frame that cycles the axes: snuggling should remove the cycle
        let u = from_xyzw(0.5, 0.5, 0.5, 0.5);
        let k0 = Vector3::new(2.0, 3.0, 4.0);
        let mut k = k0;
        let p = snuggle(u, &mut k);
        assert_identity(&mul(&u, &p));
        assert_relative_eq!(stretch(&u, &k0), stretch(&mul(&u, &p), &k), epsilon = 1e-12);
    }

    #[test]
    fn stretch_is_preserved_and_w_never_decreases() {
        let axes = [
            Vector3::new(1.0, 0.3, -0.2),
            Vector3::new(-0.4, 1.0, 0.9),
            Vector3::new(0.1, -0.7, 0.6),
            Vector3::new(0.5, 0.5, -1.0),
        ];
        let scales = [
            Vector3::new(1.0, 1.0, 3.0),
            Vector3::new(1.0, 3.0, 1.0),
            Vector3::new(3.0, 1.0, 1.0),
            Vector3::new(2.0, 4.0, 5.0),
            Vector3::new(2.0, 2.0, 2.0),
        ];
        for (n, axis) in axes.iter().enumerate() {
            for angle in [-2.9, -1.2, 0.4, 1.9, 3.0] {
                for k0 in scales {
                    let u = rotation(*axis, angle + n as Real * 0.1);
                    let mut k = k0;
                    let p = snuggle(u, &mut k);
                    let up = normalize(&mul(&u, &p));
                    assert_relative_eq!(stretch(&u, &k0), stretch(&up, &k), epsilon = 1e-9);
                    assert!(up.w.abs() >= u.w.abs() - 1e-12, "{u:?} -> {up:?}");
                    let mut sorted = [k.x, k.y, k.z];
                    let mut sorted0 = [k0.x, k0.y, k0.z];
                    sorted.sort_by(|a, b| a.total_cmp(b));
                    sorted0.sort_by(|a, b| a.total_cmp(b));
                    assert_eq!(sorted, sorted0);
                }
            }
        }
    }
}
