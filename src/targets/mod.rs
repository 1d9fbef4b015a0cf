//! Target sets and the delta between them.
//!
//! - [`set`]: a declared target set with per-target answers, validation and
//!   output ordering
//! - [`delta`]: computing the add/remove operations that turn one target set
//!   into another

pub mod delta;
pub mod set;

pub use delta::{DeltaEntry, TargetDelta, compute_delta};
pub use set::{TargetSet, TargetSetError, order_targets_like};
