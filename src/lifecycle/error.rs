//! Lifecycle error types.

use thiserror::Error;

use crate::management::ApiError;
use crate::poll::PollError;
use crate::targets::TargetSetError;
use crate::types::MultiClusterAppId;

/// The template or template version could not be resolved.
#[derive(Debug, Error)]
pub enum ResolutionError {
    /// The catalog has no such template.
    #[error("template {template_id} not found")]
    TemplateNotFound { template_id: String },

    /// The template exists but publishes no versions.
    #[error("template {template_id} has no versions")]
    NoVersions { template_id: String },

    /// A published version string could not be compared.
    #[error("template {template_id} has unparseable version {version:?}")]
    InvalidVersion {
        template_id: String,
        version: String,
    },

    /// A template version's external reference is malformed.
    #[error("malformed catalog reference {external_id:?}: {reason}")]
    InvalidExternalId {
        external_id: String,
        reason: &'static str,
    },
}

/// Errors from a lifecycle operation.
#[derive(Debug, Error)]
pub enum LifecycleError {
    /// A remote call failed.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The template could not be resolved.
    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    /// Waiting for convergence failed.
    #[error("waiting for {id} to {operation} failed: {source}")]
    Wait {
        id: MultiClusterAppId,
        operation: &'static str,
        #[source]
        source: PollError,
    },

    /// The desired target set is malformed.
    #[error("invalid targets: {0}")]
    InvalidSpec(#[from] TargetSetError),

    /// The app disappeared right after it was written.
    #[error("multi-cluster app {id} not found after write")]
    Vanished { id: MultiClusterAppId },
}

impl LifecycleError {
    /// Returns true if the operation was interrupted by cancellation.
    pub fn is_cancelled(&self) -> bool {
        matches!(
            self,
            LifecycleError::Wait {
                source: PollError::Cancelled,
                ..
            }
        )
    }
}
