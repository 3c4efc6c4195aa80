//! Decomposition of a homogeneous affine matrix into animation-friendly parts.
//!
//! An affine matrix `A` is split as
//!
//! ```text
//! A = T · F · R(q) · R(u) · K · R(u)ᵀ
//! ```
//!
//! with `T` the translation, `F = f·I` the sign of the determinant, `R(q)` the
//! essential rotation and `R(u) K R(u)ᵀ` the stretch: scale factors `K` along
//! the axes of the stretch rotation `u`. Unlike a TRS split this handles shear
//! and reflections, and the parts interpolate sensibly.

use crate::errors::DecompositionResult;
use crate::float_types::{PI, Real};
use crate::polar::{PolarOptions, ScalingType, classify_stretch, polar_decompose_with};
use crate::primitives::{linear_block, pad};
use crate::quaternion::{axis_angle, conjugate, from_matrix, mul, normalize, rotate_vector, slerp};
use crate::snuggle::snuggle;
use crate::spectral::spectral_decompose;
use nalgebra::{Matrix3, Matrix4, Quaternion, Vector3};
use std::fmt::Display;

/// The parts of an affine matrix. See the [module docs](self) for how they
/// compose.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AffineParts {
    /// Translation component `t`.
    pub translation: Vector3<Real>,
    /// Essential rotation `q`.
    pub rotation: Quaternion<Real>,
    /// Stretch rotation `u`, the frame the scale factors act in.
    pub stretch_rotation: Quaternion<Real>,
    /// Stretch factors `k`, one per axis of `u`. Zero for a singular matrix.
    pub scale: Vector3<Real>,
    /// Sign `f` of the determinant, `1.0` or `-1.0`.
    pub sign: Real,
}

impl Default for AffineParts {
    fn default() -> Self {
        Self::identity()
    }
}

impl AffineParts {
    /// Parts of the identity matrix.
    pub fn identity() -> Self {
        Self {
            translation: Vector3::zeros(),
            rotation: Quaternion::identity(),
            stretch_rotation: Quaternion::identity(),
            scale: Vector3::new(1.0, 1.0, 1.0),
            sign: 1.0,
        }
    }

    /// Recompose the homogeneous matrix these parts describe.
    pub fn to_matrix(&self) -> Matrix4<Real> {
        let r = linear_block(&crate::quaternion::to_matrix(&self.rotation));
        let u = linear_block(&crate::quaternion::to_matrix(&self.stretch_rotation));
        let stretch = u * Matrix3::from_diagonal(&self.scale) * u.transpose();
        let mut m = pad(&(r * stretch * self.sign));
        m.fixed_view_mut::<3, 1>(0, 3).copy_from(&self.translation);
        m
    }

    /// Parts of the inverse matrix. Same as [`invert_affine`].
    #[inline]
    pub fn inverse(&self) -> Self {
        invert_affine(self)
    }

    /// Blend towards `other`: translation and scale linearly, both rotations
    /// along the shorter arc. The sign cannot be blended and is taken from the
    /// nearer endpoint.
    pub fn interpolate(&self, other: &Self, t: Real) -> Self {
        Self {
            translation: self.translation.lerp(&other.translation, t),
            rotation: slerp(&self.rotation, &other.rotation, t),
            stretch_rotation: slerp(&self.stretch_rotation, &other.stretch_rotation, t),
            scale: self.scale.lerp(&other.scale, t),
            sign: if t < 0.5 { self.sign } else { other.sign },
        }
    }

    /// Classify the stretch `R(u)·K·R(u)ᵀ` rebuilt from these parts, snapping
    /// within `epsilon`. `Undefined` when a scale factor is within `epsilon`
    /// of zero.
    ///
    /// A uniform scale is uniform under any stretch rotation. Non-uniform
    /// factors under a rotated `u` give `Skew`.
    pub fn scaling_type(&self, epsilon: Real) -> ScalingType {
        let k = &self.scale;
        if k.iter().any(|&x| x.abs() < epsilon) {
            ScalingType::Undefined
        } else {
            let u = linear_block(&crate::quaternion::to_matrix(&self.stretch_rotation));
            classify_stretch(&(u * Matrix3::from_diagonal(k) * u.transpose()), self.sign, epsilon)
        }
    }
}

impl Display for AffineParts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (axis, angle) = axis_angle(&self.rotation);
        let (stretch_axis, stretch_angle) = axis_angle(&self.stretch_rotation);
        let t = &self.translation;
        let k = &self.scale;
        write!(
            f,
            "translate ({:.4}, {:.4}, {:.4}) rotate {:.4}° about ({:.4}, {:.4}, {:.4}) \
             scale ({:.4}, {:.4}, {:.4}) in a frame rotated {:.4}° about ({:.4}, {:.4}, {:.4})",
            t.x,
            t.y,
            t.z,
            angle * 180.0 / PI,
            axis.x,
            axis.y,
            axis.z,
            k.x,
            k.y,
            k.z,
            stretch_angle * 180.0 / PI,
            stretch_axis.x,
            stretch_axis.y,
            stretch_axis.z,
        )?;
        if self.sign < 0.0 {
            write!(f, ", reflected")?;
        }
        Ok(())
    }
}

/// Component-wise comparison with one tolerance for every field. `q` and `-q`
/// describe the same rotation but do not compare equal here.
impl approx::AbsDiffEq for AffineParts {
    type Epsilon = Real;

    fn default_epsilon() -> Self::Epsilon {
        <Real as approx::AbsDiffEq>::default_epsilon()
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: Self::Epsilon) -> bool {
        approx::AbsDiffEq::abs_diff_eq(&self.translation, &other.translation, epsilon)
            && approx::AbsDiffEq::abs_diff_eq(&self.rotation, &other.rotation, epsilon)
            && approx::AbsDiffEq::abs_diff_eq(
                &self.stretch_rotation,
                &other.stretch_rotation,
                epsilon,
            )
            && approx::AbsDiffEq::abs_diff_eq(&self.scale, &other.scale, epsilon)
            && self.sign == other.sign
    }
}

impl approx::RelativeEq for AffineParts {
    fn default_max_relative() -> Self::Epsilon {
        <Real as approx::RelativeEq>::default_max_relative()
    }

    fn relative_eq(
        &self,
        other: &Self,
        epsilon: Self::Epsilon,
        max_relative: Self::Epsilon,
    ) -> bool {
        approx::RelativeEq::relative_eq(
            &self.translation,
            &other.translation,
            epsilon,
            max_relative,
        ) && approx::RelativeEq::relative_eq(&self.rotation, &other.rotation, epsilon, max_relative)
            && approx::RelativeEq::relative_eq(
                &self.stretch_rotation,
                &other.stretch_rotation,
                epsilon,
                max_relative,
            )
            && approx::RelativeEq::relative_eq(&self.scale, &other.scale, epsilon, max_relative)
            && self.sign == other.sign
    }
}

impl approx::UlpsEq for AffineParts {
    fn default_max_ulps() -> u32 {
        <Real as approx::UlpsEq>::default_max_ulps()
    }

    fn ulps_eq(&self, other: &Self, epsilon: Self::Epsilon, max_ulps: u32) -> bool {
        approx::UlpsEq::ulps_eq(&self.translation, &other.translation, epsilon, max_ulps)
            && approx::UlpsEq::ulps_eq(&self.rotation, &other.rotation, epsilon, max_ulps)
            && approx::UlpsEq::ulps_eq(
                &self.stretch_rotation,
                &other.stretch_rotation,
                epsilon,
                max_ulps,
            )
            && approx::UlpsEq::ulps_eq(&self.scale, &other.scale, epsilon, max_ulps)
            && self.sign == other.sign
    }
}

/// Decompose an affine matrix with the process-wide [`PolarOptions`].
pub fn decompose_affine(a: &Matrix4<Real>) -> DecompositionResult<AffineParts> {
    decompose_affine_with(a, &PolarOptions::default())
}

/// Decompose an affine matrix into [`AffineParts`].
///
/// The bottom row of `a` is ignored. Singular matrices decompose too, with
/// zero scale factors along the collapsed directions.
pub fn decompose_affine_with(
    a: &Matrix4<Real>,
    options: &PolarOptions,
) -> DecompositionResult<AffineParts> {
    let translation = Vector3::new(a[(0, 3)], a[(1, 3)], a[(2, 3)]);
    let polar = polar_decompose_with(a, options)?;

    let mut q = polar.q;
    let sign = if polar.det < 0.0 {
        q.fixed_view_mut::<3, 3>(0, 0).neg_mut();
        -1.0
    } else {
        1.0
    };
    let rotation = normalize(&from_matrix(&q));

    let spectral = spectral_decompose(&polar.s);
    let mut scale = spectral.k;
    let u = normalize(&from_matrix(&spectral.u));
    let p = snuggle(u, &mut scale);

    Ok(AffineParts {
        translation,
        rotation,
        stretch_rotation: mul(&u, &p),
        scale,
        sign,
    })
}

/// Parts of the inverse of the matrix `parts` describe, computed without
/// decomposing again.
///
/// A zero scale factor inverts to zero, so singular parts give the parts of a
/// pseudo-inverse rather than an error.
pub fn invert_affine(parts: &AffineParts) -> AffineParts {
    let rotation = conjugate(&parts.rotation);
    let stretch_rotation = mul(&parts.rotation, &parts.stretch_rotation);
    let scale = parts.scale.map(|k| if k == 0.0 { 0.0 } else { 1.0 / k });

    // undo the translation with the inverse linear part
    let t = rotate_vector(&conjugate(&stretch_rotation), &-parts.translation);
    let t = t.component_mul(&scale);
    let t = rotate_vector(&mul(&rotation, &stretch_rotation), &t);

    AffineParts {
        translation: if parts.sign > 0.0 { t } else { -t },
        rotation,
        stretch_rotation,
        scale,
        sign: parts.sign,
    }
}

/// Translation, proper rotation and general stretch of an affine matrix.
///
/// Closer to a conventional TRS split than [`AffineParts`]: the stretch stays
/// a full 3×3 matrix and a reflection, if any, is folded into it so that the
/// rotation is always proper.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrsDecomposition {
    pub translation: Vector3<Real>,
    pub rotation: Quaternion<Real>,
    /// Symmetric unless `det < 0`, in which case its last row is negated.
    pub stretch: Matrix3<Real>,
    /// Sign-carrying determinant reported by the polar decomposition.
    pub det: Real,
}

impl TrsDecomposition {
    /// Recompose the homogeneous matrix.
    pub fn to_matrix(&self) -> Matrix4<Real> {
        let r = linear_block(&crate::quaternion::to_matrix(&self.rotation));
        let mut m = pad(&(r * self.stretch));
        m.fixed_view_mut::<3, 1>(0, 3).copy_from(&self.translation);
        m
    }

    pub fn scaling_type(&self, epsilon: Real) -> ScalingType {
        classify_stretch(&self.stretch, self.det, epsilon)
    }
}

/// Split `a` into translation, rotation and stretch with the process-wide
/// [`PolarOptions`].
pub fn decompose_trs(a: &Matrix4<Real>) -> DecompositionResult<TrsDecomposition> {
    let translation = Vector3::new(a[(0, 3)], a[(1, 3)], a[(2, 3)]);
    let polar = polar_decompose_with(a, &PolarOptions::default())?;
    let mut q = linear_block(&polar.q);
    let mut stretch = polar.stretch();
    if polar.det < 0.0 {
        // Q diag(1, 1, -1) · diag(1, 1, -1) S
        q.column_mut(2).neg_mut();
        stretch.row_mut(2).neg_mut();
    }
    Ok(TrsDecomposition {
        translation,
        rotation: normalize(&from_matrix(&pad(&q))),
        stretch,
        det: polar.det,
    })
}
