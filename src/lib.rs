//! Multi-cluster app reconciler - lifecycle management for an app deployed
//! into several project targets at once.
//!
//! This library provides the target diff engine, the convergence poller, and
//! the orchestrator that sequences create, read, update and delete against
//! the management API.

pub mod effects;
pub mod lifecycle;
pub mod management;
pub mod poll;
pub mod targets;
pub mod types;

#[cfg(test)]
mod test_utils;
