//! Polar decomposition `M = Q S` of the linear block of a homogeneous matrix.
//!
//! `Q` is orthogonal and `S` symmetric positive semi-definite. The factors are
//! found with the scaled Newton iteration of Higham & Schreiber ("Fast Polar
//! Decomposition of an Arbitrary Matrix", 1988) applied to `Mᵀ`; singular
//! matrices are finished off by the Householder routines in [`rank`].

use crate::errors::{DecompositionError, DecompositionResult};
use crate::float_types::{Real, max_polar_iterations, polar_tolerance};
use crate::primitives::{
    adjoint_transpose, dot, linear_block, norm_inf, norm_one, pad, row, smooth,
};
use log::{debug, warn};
use nalgebra::{Matrix3, Matrix4};

pub mod rank;

/// Blocks whose largest entry lies within this factor of 1 are iterated as given.
const RESCALE_LIMIT: Real = 65536.0;

/// Stopping rule for the Newton iteration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolarOptions {
    /// Iteration stops once the 1-norm of the last update is at most
    /// `tolerance` times the 1-norm of the current iterate.
    pub tolerance: Real,
    /// Number of Newton steps after which the decomposition gives up.
    pub max_iterations: usize,
}

impl Default for PolarOptions {
    /// The process-wide settings from [`float_types`](crate::float_types).
    fn default() -> Self {
        Self {
            tolerance: polar_tolerance(),
            max_iterations: max_polar_iterations(),
        }
    }
}

/// How the stretch factor `S` of a polar decomposition scales space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalingType {
    /// No scaling at all
    Identity,
    /// The same factor along every axis
    Uniform,
    /// Different factors along the coordinate axes
    Aligned,
    /// Scaling along rotated axes (non-zero off-diagonal entries)
    Skew,
    /// The input was singular
    Undefined,
}

/// Result of [`polar_decompose`], both factors padded to homogeneous 4×4 form.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolarDecomposition {
    /// Orthogonal factor. Carries a reflection (`det = -1`) when `det < 0`.
    pub q: Matrix4<Real>,
    /// Symmetric stretch factor, exactly symmetric.
    pub s: Matrix4<Real>,
    /// Determinant of the last Newton iterate; only its sign is meaningful.
    /// Exactly zero when the input was singular.
    pub det: Real,
}

impl PolarDecomposition {
    /// The 3×3 stretch block.
    #[inline]
    pub fn stretch(&self) -> Matrix3<Real> {
        linear_block(&self.s)
    }

    /// Classify the stretch after snapping entries within `epsilon` of 0 and ±1.
    pub fn scaling_type(&self, epsilon: Real) -> ScalingType {
        classify_stretch(&self.stretch(), self.det, epsilon)
    }
}

/// Classify a stretch matrix. `det` is the determinant reported alongside it;
/// a zero determinant marks the stretch as undefined.
pub fn classify_stretch(stretch: &Matrix3<Real>, det: Real, epsilon: Real) -> ScalingType {
    if det == 0.0 {
        return ScalingType::Undefined;
    }
    let s = smooth(stretch, epsilon);
    let off_diagonal = [s[(0, 1)], s[(0, 2)], s[(1, 2)], s[(1, 0)], s[(2, 0)], s[(2, 1)]];
    if off_diagonal.iter().any(|&x| x != 0.0) {
        return ScalingType::Skew;
    }
    let d = s.diagonal();
    if d.iter().all(|&x| x == 1.0) {
        ScalingType::Identity
    } else if (d.x - d.y).abs() < epsilon && (d.x - d.z).abs() < epsilon {
        ScalingType::Uniform
    } else {
        ScalingType::Aligned
    }
}

/// Polar decomposition with the process-wide [`PolarOptions`].
pub fn polar_decompose(m: &Matrix4<Real>) -> DecompositionResult<PolarDecomposition> {
    polar_decompose_with(m, &PolarOptions::default())
}

/// Polar decomposition of the upper-left 3×3 block of `m`.
///
/// A block whose largest entry is outside `[2⁻¹⁶, 2¹⁶]` is first scaled by a
/// power of two, so the determinant and adjoint norms stay in range for any
/// finite input. `Q` does not depend on the scale and `S` is formed from the
/// unscaled block.
///
/// Returns [`DecompositionError::NoConvergence`] when the iteration needs more
/// than `options.max_iterations` steps or an iterate stops being finite. Both
/// only happen for non-finite or wildly ill-conditioned input.
pub fn polar_decompose_with(
    m: &Matrix4<Real>,
    options: &PolarOptions,
) -> DecompositionResult<PolarDecomposition> {
    let m = linear_block(m);
    let mut mk = rescaled(&m).transpose();
    let mut m_one = norm_one(&mk);
    let mut m_inf = norm_inf(&mk);
    let mut iterations = 0;

    let det = loop {
        let madj_tk = adjoint_transpose(&mk);
        let det = dot(&row(&mk, 0), &row(&madj_tk, 0));
        if det == 0.0 {
            mk = rank::do_rank2(&mk, &madj_tk);
            if mk.iter().any(|x| !x.is_finite()) {
                warn!("polar: singular fallback produced a non-finite factor");
                return Err(DecompositionError::NoConvergence { iterations, residual: Real::NAN });
            }
            break det;
        }

        let madj_t_one = norm_one(&madj_tk);
        let madj_t_inf = norm_inf(&madj_tk);
        let gamma = (((madj_t_one * madj_t_inf) / (m_one * m_inf)).sqrt() / det.abs()).sqrt();
        let g1 = gamma * 0.5;
        let g2 = 0.5 / (gamma * det);

        let previous = mk;
        mk = mk * g1 + madj_tk * g2;
        iterations += 1;
        if mk.iter().any(|x| !x.is_finite()) {
            warn!("polar: iterate became non-finite after {iterations} iterations");
            return Err(DecompositionError::NoConvergence { iterations, residual: Real::NAN });
        }

        let e_one = norm_one(&(previous - mk));
        m_one = norm_one(&mk);
        m_inf = norm_inf(&mk);

        if e_one <= m_one * options.tolerance {
            debug!("polar: converged after {iterations} iterations");
            break det;
        }
        if iterations >= options.max_iterations {
            let residual = e_one / m_one;
            warn!("polar: no convergence after {iterations} iterations, residual {residual:e}");
            return Err(DecompositionError::NoConvergence { iterations, residual });
        }
    };

    let q = pad(&mk.transpose());
    let mut s = mk * m;
    for i in 0..3 {
        for j in i..3 {
            let v = 0.5 * (s[(i, j)] + s[(j, i)]);
            s[(i, j)] = v;
            s[(j, i)] = v;
        }
    }

    Ok(PolarDecomposition { q, s: pad(&s), det })
}

/// `m` times the power of two that brings its largest entry near 1, or `m`
/// itself when that entry is already within [`RESCALE_LIMIT`] of 1.
fn rescaled(m: &Matrix3<Real>) -> Matrix3<Real> {
    let peak = m.amax();
    if peak == 0.0 || !peak.is_finite() || (1.0 / RESCALE_LIMIT..=RESCALE_LIMIT).contains(&peak) {
        return *m;
    }
    let exponent = -(peak.log2().round() as i32);
    debug!("polar: rescaling input by 2^{exponent}");
    // two steps, since 2^exponent alone may not be representable for subnormal peaks
    let half = exponent / 2;
    m * Real::powi(2.0, half) * Real::powi(2.0, exponent - half)
}
