//! Serial implementation of batch decomposition.

use super::traits::BatchOps;
use crate::affine::{AffineParts, decompose_affine_with, invert_affine};
use crate::errors::DecompositionResult;
use crate::float_types::Real;
use crate::polar::PolarOptions;
use nalgebra::Matrix4;

/// Serial implementation of `BatchOps`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SerialBatchOps {
    options: PolarOptions,
}

impl SerialBatchOps {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `options` for every decomposition in the batch.
    pub const fn with_options(options: PolarOptions) -> Self {
        Self { options }
    }
}

impl BatchOps for SerialBatchOps {
    fn decompose_all(&self, matrices: &[Matrix4<Real>]) -> Vec<DecompositionResult<AffineParts>> {
        matrices
            .iter()
            .map(|m| decompose_affine_with(m, &self.options))
            .collect()
    }

    fn invert_all(&self, parts: &[AffineParts]) -> Vec<AffineParts> {
        parts.iter().map(invert_affine).collect()
    }

    fn interpolate_all(&self, from: &[AffineParts], to: &[AffineParts], t: Real) -> Vec<AffineParts> {
        from.iter().zip(to).map(|(a, b)| a.interpolate(b, t)).collect()
    }

    fn compose_all(&self, parts: &[AffineParts]) -> Vec<Matrix4<Real>> {
        parts.iter().map(AffineParts::to_matrix).collect()
    }
}
