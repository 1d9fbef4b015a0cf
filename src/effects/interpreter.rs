//! Effect interpreter trait.
//!
//! The trait-based design enables:
//! - Mock interpreters for testing
//! - Handing the reconciler an already-authenticated client without it ever
//!   seeing credentials

use std::future::Future;

use crate::management::ApiError;

use super::management::{ManagementEffect, ManagementResponse};

/// Interprets management effects against the management API.
///
/// Errors are always [`ApiError`] so callers can tell "object is gone" apart
/// from transport failures regardless of the implementation.
///
/// # Example (mock for testing)
///
/// ```ignore
/// struct StaticApp(MultiClusterApp);
///
/// impl ManagementInterpreter for StaticApp {
///     async fn interpret(&self, effect: ManagementEffect) -> Result<ManagementResponse, ApiError> {
///         match effect {
///             ManagementEffect::GetApp { .. } => Ok(ManagementResponse::App(Box::new(self.0.clone()))),
///             other => Err(ApiError::unexpected_response(other.operation(), "unsupported")),
///         }
///     }
/// }
/// ```
pub trait ManagementInterpreter {
    /// Execute a management effect and return its response.
    fn interpret(
        &self,
        effect: ManagementEffect,
    ) -> impl Future<Output = Result<ManagementResponse, ApiError>> + Send;
}
