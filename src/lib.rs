//! Decomposition of **4×4 affine matrices** into parts that can be stored,
//! inverted and interpolated: translation, rotation, stretch rotation, scale
//! and reflection sign.
//!
//! ```text
//! A = T · F · R(q) · R(u) · K · R(u)ᵀ
//! ```
//!
//! The linear block is split with a polar decomposition (`M = Q S`, Higham's
//! scaled Newton iteration), the stretch `S` is diagonalized by cyclic Jacobi
//! rotations, and the eigenvector frame is "snuggled" towards the identity so
//! that nearby matrices get nearby parts. See Ken Shoemake and Tom Duff,
//! "Matrix Animation and Polar Decomposition" (1992).
//!
//! ```
//! use affine_parts::{decompose_affine, invert_affine};
//! use nalgebra::{Matrix4, Vector3};
//!
//! let m = Matrix4::new_nonuniform_scaling(&Vector3::new(2.0, 3.0, 4.0));
//! let parts = decompose_affine(&m).unwrap();
//! assert_eq!(parts.scale, Vector3::new(2.0, 3.0, 4.0));
//! let inverse = invert_affine(&parts).to_matrix();
//! assert!((inverse[(1, 1)] - 1.0 / 3.0).abs() < 1e-12);
//! ```
//!
//! # Features
//! #### Default
//! - **f64**: use f64 as Real
//!
//! #### Optional
//! - **f32**: use f32 as Real, this conflicts with f64
//! - **parallel**: use rayon for batch decomposition

#![forbid(unsafe_code)]
#![deny(unused)]
#![warn(clippy::missing_const_for_fn, clippy::approx_constant, clippy::all)]

pub mod affine;
pub mod batch;
pub mod errors;
pub mod float_types;
pub mod polar;
pub mod primitives;
pub mod quaternion;
pub mod snuggle;
pub mod spectral;
pub mod traits;

#[cfg(any(all(feature = "f64", feature = "f32"), not(any(feature = "f64", feature = "f32"))))]
compile_error!("Either 'f64' or 'f32' feature must be specified, but not both");

pub use affine::{AffineParts, TrsDecomposition, decompose_affine, decompose_trs, invert_affine};
pub use errors::{DecompositionError, DecompositionResult};
pub use polar::{PolarDecomposition, PolarOptions, ScalingType, polar_decompose};
pub use snuggle::snuggle;
pub use spectral::{SpectralDecomposition, spectral_decompose};
pub use traits::AffineDecompose;
