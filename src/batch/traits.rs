//! Traits for batch decomposition.

use crate::affine::AffineParts;
use crate::errors::DecompositionResult;
use crate::float_types::Real;
use nalgebra::Matrix4;

/// Element-wise operations over slices. Output `i` always belongs to input `i`.
pub trait BatchOps {
    /// Decompose every matrix. A failure only affects its own slot.
    fn decompose_all(&self, matrices: &[Matrix4<Real>]) -> Vec<DecompositionResult<AffineParts>>;

    /// Invert every decomposition.
    fn invert_all(&self, parts: &[AffineParts]) -> Vec<AffineParts>;

    /// Blend `from[i]` towards `to[i]` by `t`. Stops at the shorter slice.
    fn interpolate_all(&self, from: &[AffineParts], to: &[AffineParts], t: Real) -> Vec<AffineParts>;

    /// Recompose every decomposition into its matrix.
    fn compose_all(&self, parts: &[AffineParts]) -> Vec<Matrix4<Real>>;
}
