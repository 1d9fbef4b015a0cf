//! The multi-cluster app lifecycle.
//!
//! # Update Paths
//!
//! | Change | Effects issued |
//! |--------|----------------|
//! | `revision_id` set to a new value | `Rollback` only |
//! | target list changed | `RemoveProjects`, `AddProjects` (each only if non-empty), then `UpdateApp` if targets were removed and answers changed, or if only the order changed |
//! | anything else | `UpdateApp` with every updatable field |
//!
//! Every path finishes with a wait for `active` when `wait` is set, and a
//! fresh read.

pub mod convert;
pub mod error;
pub mod mode;
pub mod orchestrator;
pub mod template;


pub use error::{LifecycleError, ResolutionError};
pub use mode::{SpecChanges, UpdateMode};
pub use orchestrator::{DeleteOutcome, Orchestrator};
pub use template::CatalogRef;
