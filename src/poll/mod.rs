//! Convergence polling.
//!
//! After every mutation the management API converges asynchronously. This
//! module waits for that convergence:
//!
//! - [`config`]: intervals, not-found tolerance and per-operation timeouts
//! - [`source`]: the [`StatusSource`] capability and its implementations for
//!   multi-cluster apps and their per-target child apps
//! - [`wait`]: the poll loop itself

pub mod config;
pub mod source;
pub mod wait;

pub use config::{PollConfig, Timeouts};
pub use source::{AppStatus, ChildAppStatus, Observation, StatusSource};
pub use wait::{PollError, StateSpec, wait_for_state};
