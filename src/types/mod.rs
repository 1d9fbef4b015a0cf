//! Core domain types for the multi-cluster app reconciler.
//!
//! This module contains identifiers, remote object snapshots, and the
//! caller-facing desired-state representation.

pub mod app;
pub mod ids;
pub mod spec;
pub mod target;

// Re-export commonly used types at the module level
pub use app::{
    Member, MultiClusterApp, MultiClusterAppStatus, ProjectApp, RollingUpdate, STATE_ACTIVE,
    STATE_REMOVED, STATE_REMOVING, Template, TemplateVersion, UpgradeStrategy,
};
pub use ids::{AppId, ChildAppId, MultiClusterAppId, ProjectId, RevisionId, TemplateVersionId};
pub use spec::{AppRecord, MultiClusterAppSpec};
pub use target::{Answer, Target};
