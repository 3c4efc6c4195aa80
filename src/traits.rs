use crate::affine::{AffineParts, TrsDecomposition};
use crate::errors::DecompositionResult;
use crate::float_types::{EPSILON, Real};
use crate::polar::{PolarDecomposition, PolarOptions};
use nalgebra::{Affine3, Isometry3, Matrix4, Similarity3};

/// Decompositions for anything that can be written as a homogeneous 4×4
/// matrix. Implementors only provide [`to_affine_matrix`](Self::to_affine_matrix).
pub trait AffineDecompose {
    /// The homogeneous matrix of this transform, multiplying column vectors.
    fn to_affine_matrix(&self) -> Matrix4<Real>;

    /// Split into translation, rotation, stretch and sign.
    fn decompose_affine(&self) -> DecompositionResult<AffineParts> {
        crate::affine::decompose_affine(&self.to_affine_matrix())
    }

    /// Like [`decompose_affine`](Self::decompose_affine) with explicit
    /// iteration settings.
    fn decompose_affine_with(&self, options: &PolarOptions) -> DecompositionResult<AffineParts> {
        crate::affine::decompose_affine_with(&self.to_affine_matrix(), options)
    }

    /// Split into translation, proper rotation and a full stretch matrix.
    fn decompose_trs(&self) -> DecompositionResult<TrsDecomposition> {
        crate::affine::decompose_trs(&self.to_affine_matrix())
    }

    /// Polar decomposition of the linear part.
    fn polar_decompose(&self) -> DecompositionResult<PolarDecomposition> {
        crate::polar::polar_decompose(&self.to_affine_matrix())
    }

    /// Bottom row is exactly `(0, 0, 0, 1)`.
    fn is_affine(&self) -> bool {
        crate::primitives::is_affine(&self.to_affine_matrix())
    }

    /// Affine with an orthogonal linear part, within [`EPSILON`].
    fn is_rigid(&self) -> bool {
        crate::primitives::is_rigid(&self.to_affine_matrix(), EPSILON)
    }
}

impl AffineDecompose for Matrix4<Real> {
    fn to_affine_matrix(&self) -> Matrix4<Real> {
        *self
    }
}

impl AffineDecompose for Affine3<Real> {
    fn to_affine_matrix(&self) -> Matrix4<Real> {
        self.to_homogeneous()
    }
}

impl AffineDecompose for Isometry3<Real> {
    fn to_affine_matrix(&self) -> Matrix4<Real> {
        self.to_homogeneous()
    }
}

impl AffineDecompose for Similarity3<Real> {
    fn to_affine_matrix(&self) -> Matrix4<Real> {
        self.to_homogeneous()
    }
}

impl AffineDecompose for AffineParts {
    fn to_affine_matrix(&self) -> Matrix4<Real> {
        self.to_matrix()
    }
}
