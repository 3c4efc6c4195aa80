//! Parallel implementation of batch decomposition.

use super::traits::BatchOps;
use crate::affine::{AffineParts, decompose_affine_with, invert_affine};
use crate::errors::DecompositionResult;
use crate::float_types::Real;
use crate::polar::PolarOptions;
use nalgebra::Matrix4;
use rayon::prelude::*;

/// Parallel implementation of `BatchOps`, one rayon task per element.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParallelBatchOps {
    options: PolarOptions,
}

impl ParallelBatchOps {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `options` for every decomposition in the batch.
    pub const fn with_options(options: PolarOptions) -> Self {
        Self { options }
    }
}

impl BatchOps for ParallelBatchOps {
    fn decompose_all(&self, matrices: &[Matrix4<Real>]) -> Vec<DecompositionResult<AffineParts>> {
        matrices
            .par_iter()
            .map(|m| decompose_affine_with(m, &self.options))
            .collect()
    }

    fn invert_all(&self, parts: &[AffineParts]) -> Vec<AffineParts> {
        parts.par_iter().map(invert_affine).collect()
    }

    fn interpolate_all(&self, from: &[AffineParts], to: &[AffineParts], t: Real) -> Vec<AffineParts> {
        from.par_iter()
            .zip(to.par_iter())
            .map(|(a, b)| a.interpolate(b, t))
            .collect()
    }

    fn compose_all(&self, parts: &[AffineParts]) -> Vec<Matrix4<Real>> {
        parts.par_iter().map(AffineParts::to_matrix).collect()
    }
}
