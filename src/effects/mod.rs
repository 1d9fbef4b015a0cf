//! Effects-as-data for management API operations.
//!
//! This module defines effect types that describe operations without executing them.
//! This enables:
//! - Lifecycle logic that is testable via recording interpreters
//! - Logging/tracing of intended operations
//! - Asserting exactly which remote calls an update issued

pub mod interpreter;
pub mod management;

pub use interpreter::ManagementInterpreter;
pub use management::{AppUpdate, ManagementEffect, ManagementResponse, TargetsInput};
