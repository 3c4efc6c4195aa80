//! Decomposing many transforms at once, e.g. every joint of an animated
//! skeleton for every frame.

pub mod serial;
pub mod traits;

#[cfg(feature = "parallel")]
pub mod parallel;

pub use traits::BatchOps;

pub use serial::SerialBatchOps;

#[cfg(feature = "parallel")]
pub use parallel::ParallelBatchOps;
