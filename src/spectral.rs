//! Spectral decomposition of a symmetric 3×3 block by cyclic Jacobi rotations.

use crate::float_types::{JACOBI_SWEEPS, Real};
use log::debug;
use nalgebra::{Matrix4, Vector3};

/// `S = U · diag(k) · Uᵀ` with `U` orthonormal (padded to 4×4).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpectralDecomposition {
    /// Eigenvectors in columns. Row and column 3 are those of the identity.
    pub u: Matrix4<Real>,
    /// Eigenvalues, in the same order as the columns of `u`. Not sorted.
    pub k: Vector3<Real>,
}

/// Axis following each axis in cyclic order.
const NEXT: [usize; 3] = [1, 2, 0];

/// Diagonalize the upper-left 3×3 block of `s`, which must be symmetric.
///
/// Off-diagonal entry `i` is the one not
/// involving axis `i`, so rotating in the `(NEXT[i], NEXT[NEXT[i]])` plane
/// annihilates it. Gives up after [`JACOBI_SWEEPS`] sweeps and returns the
/// current estimate; in practice a handful of sweeps reach exact zero.
pub fn spectral_decompose(s: &Matrix4<Real>) -> SpectralDecomposition {
    let mut u = Matrix4::identity();
    let mut diag = [s[(0, 0)], s[(1, 1)], s[(2, 2)]];
    let mut off_d = [s[(1, 2)], s[(2, 0)], s[(0, 1)]];

    for _ in 0..JACOBI_SWEEPS {
        if off_d.iter().all(|&x| x == 0.0) {
            break;
        }
        for i in (0..3).rev() {
            let p = NEXT[i];
            let q = NEXT[p];
            let fabs_off_di = off_d[i].abs();
            if fabs_off_di <= 0.0 {
                continue;
            }
            let g = 100.0 * fabs_off_di;
            let h = diag[q] - diag[p];
            let fabs_h = h.abs();
            let t = if fabs_h + g == fabs_h {
                off_d[i] / h
            } else {
                let theta = 0.5 * h / off_d[i];
                let t = 1.0 / (theta.abs() + (theta * theta + 1.0).sqrt());
                if theta < 0.0 { -t } else { t }
            };
            let c = 1.0 / (t * t + 1.0).sqrt();
            let sin = t * c;
            let tau = sin / (c + 1.0);
            let ta = t * off_d[i];
            off_d[i] = 0.0;
            diag[p] -= ta;
            diag[q] += ta;
            let off_dq = off_d[q];
            off_d[q] -= sin * (off_d[p] + tau * off_d[q]);
            off_d[p] += sin * (off_dq - tau * off_d[p]);
            for j in (0..3).rev() {
                let a = u[(j, p)];
                let b = u[(j, q)];
                u[(j, p)] -= sin * (b + tau * a);
                u[(j, q)] += sin * (a - tau * b);
            }
        }
    }
    if off_d.iter().any(|&x| x != 0.0) {
        debug!("spectral: off-diagonal residual {off_d:?} left after {JACOBI_SWEEPS} sweeps");
    }

    SpectralDecomposition {
        u,
        k: Vector3::new(diag[0], diag[1], diag[2]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::{is_orthogonal, linear_block, pad};
    use approx::assert_relative_eq;
    use nalgebra::{Matrix3, Rotation3};

    fn reconstruct(sd: &SpectralDecomposition) -> Matrix3<Real> {
        let u = linear_block(&sd.u);
        u * Matrix3::from_diagonal(&sd.k) * u.transpose()
    }

    #[test]
    fn diagonal_input_is_untouched() {
        let s = Matrix4::new_nonuniform_scaling(&Vector3::new(2.0, 3.0, 4.0));
        let sd = spectral_decompose(&s);
        assert_eq!(sd.u, Matrix4::identity());
        assert_eq!(sd.k, Vector3::new(2.0, 3.0, 4.0));
    }

    #[test]
    fn rotated_stretch_is_diagonalized() {
        let rot = Rotation3::from_euler_angles(0.7, 0.2, -1.3);
        let d = Matrix3::from_diagonal(&Vector3::new(0.5, 2.0, 3.5));
        let s3 = rot.matrix() * d * rot.matrix().transpose();
        let sd = spectral_decompose(&pad(&s3));

        assert!(is_orthogonal(&linear_block(&sd.u), 1e-12));
        assert_relative_eq!(reconstruct(&sd), s3, epsilon = 1e-12);
        let mut k: Vec<Real> = sd.k.iter().copied().collect();
        k.sort_by(|a, b| a.total_cmp(b));
        assert_relative_eq!(k[0], 0.5, epsilon = 1e-12);
        assert_relative_eq!(k[1], 2.0, epsilon = 1e-12);
        assert_relative_eq!(k[2], 3.5, epsilon = 1e-12);
        assert_eq!(sd.u[(3, 3)], 1.0);
        assert_eq!(sd.u[(0, 3)], 0.0);
    }

    #[test]
    fn repeated_eigenvalues() {
        let s3 = Matrix3::new(2.0, 1.0, 0.0, 1.0, 2.0, 0.0, 0.0, 0.0, 3.0);
        let sd = spectral_decompose(&pad(&s3));
        assert!(is_orthogonal(&linear_block(&sd.u), 1e-12));
        assert_relative_eq!(reconstruct(&sd), s3, epsilon = 1e-12);
        assert_relative_eq!(sd.k.sum(), 7.0, epsilon = 1e-12);
    }

    #[test]
    fn mirrored_entries_are_not_read() {
        let mut s = pad(&Matrix3::new(1.0, 0.5, 0.25, 0.5, 2.0, 0.125, 0.25, 0.125, 3.0));
        let expected = spectral_decompose(&s);
        // off-diagonals come from (1, 2), (2, 0) and (0, 1)
        s[(1, 0)] = 100.0;
        s[(2, 1)] = -7.0;
        assert_eq!(spectral_decompose(&s).k, expected.k);
    }
}
