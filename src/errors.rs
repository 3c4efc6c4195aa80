//! Decomposition errors

use crate::float_types::Real;

/// The only failure a decomposition can report. Singular input is handled by
/// the rank-deficient fallback and never surfaces as an error.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DecompositionError {
    /// (NoConvergence) The polar Newton iteration hit its step cap
    #[error(
        "(NoConvergence) Polar decomposition did not converge after {iterations} iterations (relative residual: {residual:.2e})"
    )]
    NoConvergence { iterations: usize, residual: Real },
}

/// Convenience alias for `Result<T, DecompositionError>`.
pub type DecompositionResult<T> = Result<T, DecompositionError>;
