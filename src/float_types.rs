// Our Real scalar type:
#[cfg(feature = "f32")]
pub type Real = f32;
#[cfg(feature = "f64")]
pub type Real = f64;

use core::str::FromStr;
use std::sync::OnceLock;

/// Lazily-initialized convergence tolerance of the polar decomposition.
/// Defaults depend on precision (`f32` vs `f64`), but can be overridden:
///  1) **Build-time**: set env var `AFFINE_PARTS_TOLERANCE` (e.g. `AFFINE_PARTS_TOLERANCE=1e-7 cargo build`)
///  2) **Runtime**: call [`set_polar_tolerance`] once before using the library
static TOLERANCE_CELL: OnceLock<Real> = OnceLock::new();

/// Lazily-initialized iteration cap of the polar decomposition.
/// Same override rules as the tolerance, with env var `AFFINE_PARTS_MAX_ITERATIONS`
/// and [`set_max_polar_iterations`].
static MAX_ITERATIONS_CELL: OnceLock<usize> = OnceLock::new();

const DEFAULT_MAX_ITERATIONS: usize = 100;

#[inline]
const fn default_tolerance() -> Real {
    #[cfg(feature = "f32")]
    {
        1e-5
    }
    #[cfg(feature = "f64")]
    {
        1e-6
    }
}

/// Returns the relative tolerance used to stop the polar Newton iteration.
/// If not set yet, it tries `AFFINE_PARTS_TOLERANCE` (parsed as the active `Real`)
/// and falls back to a sensible default.
pub fn polar_tolerance() -> Real {
    *TOLERANCE_CELL.get_or_init(|| {
        // Compile-time env if provided, inherited by dependencies
        if let Some(environment_variable) = option_env!("AFFINE_PARTS_TOLERANCE") {
            if let Ok(value) = Real::from_str(environment_variable) {
                return value.max(Real::EPSILON);
            }
        }
        default_tolerance()
    })
}

/// Set the polar tolerance programmatically once (subsequent calls are ignored).
/// Call near program start: `affine_parts::float_types::set_polar_tolerance(1e-7);`
pub fn set_polar_tolerance(value: Real) {
    let _ = TOLERANCE_CELL.set(value.max(Real::EPSILON));
}

/// Returns the maximum number of Newton steps the polar decomposition may take
/// before reporting [`DecompositionError::NoConvergence`](crate::errors::DecompositionError::NoConvergence).
pub fn max_polar_iterations() -> usize {
    *MAX_ITERATIONS_CELL.get_or_init(|| {
        if let Some(environment_variable) = option_env!("AFFINE_PARTS_MAX_ITERATIONS") {
            if let Ok(value) = usize::from_str(environment_variable) {
                return value.max(1);
            }
        }
        DEFAULT_MAX_ITERATIONS
    })
}

/// Set the polar iteration cap once (subsequent calls are ignored).
pub fn set_max_polar_iterations(value: usize) {
    let _ = MAX_ITERATIONS_CELL.set(value.max(1));
}

/// Comparison tolerance for approximate equality of decomposition results.
#[cfg(feature = "f32")]
pub const EPSILON: Real = 1e-4;
/// Comparison tolerance for approximate equality of decomposition results.
#[cfg(feature = "f64")]
pub const EPSILON: Real = 1e-8;

// Pi
/// Archimedes' constant (π)
#[cfg(feature = "f32")]
pub const PI: Real = core::f32::consts::PI;
/// Archimedes' constant (π)
#[cfg(feature = "f64")]
pub const PI: Real = core::f64::consts::PI;

// Sqrt 1/2
/// √½, the component magnitude of a quarter-turn quaternion
#[cfg(feature = "f32")]
pub const SQRT_HALF: Real = core::f32::consts::FRAC_1_SQRT_2;
/// √½, the component magnitude of a quarter-turn quaternion
#[cfg(feature = "f64")]
pub const SQRT_HALF: Real = core::f64::consts::FRAC_1_SQRT_2;

/// Upper bound on Jacobi sweeps in the spectral decomposition.
pub const JACOBI_SWEEPS: usize = 20;
