//! Status sources: the remote objects a poll can watch.
//!
//! The poller only needs "fetch the current status of some object". Each
//! resource kind implements [`StatusSource`] once, so the polling loop itself
//! stays generic.

use std::future::Future;

use crate::effects::{ManagementEffect, ManagementInterpreter, ManagementResponse};
use crate::management::ApiError;
use crate::types::{ChildAppId, MultiClusterAppId, ProjectId};

/// One observation of a remote object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Observation {
    /// The object exists and reports this state.
    Status(String),

    /// The API says the object does not exist (or is no longer visible to us).
    Gone,
}

/// Something whose status can be polled.
pub trait StatusSource {
    /// Identifier used in logs and errors.
    fn object_id(&self) -> &str;

    /// Fetches the current status.
    ///
    /// Implementations report absence as `Ok(Observation::Gone)`; any `Err` is
    /// a failed fetch and aborts the poll.
    fn fetch_status(&self) -> impl Future<Output = Result<Observation, ApiError>> + Send;
}

/// Maps an absent-object error to `Gone` and passes other errors through.
fn observe(
    result: Result<ManagementResponse, ApiError>,
    operation: &str,
    state_of: impl FnOnce(ManagementResponse) -> Option<String>,
) -> Result<Observation, ApiError> {
    match result {
        Ok(response) => {
            let kind = response.kind();
            state_of(response)
                .map(Observation::Status)
                .ok_or_else(|| ApiError::unexpected_response(operation, kind))
        }
        Err(e) if e.is_absent() => Ok(Observation::Gone),
        Err(e) => Err(e),
    }
}

/// Status of a multi-cluster app.
pub struct AppStatus<'a, I> {
    api: &'a I,
    id: MultiClusterAppId,
}

impl<'a, I> AppStatus<'a, I> {
    pub fn new(api: &'a I, id: MultiClusterAppId) -> Self {
        AppStatus { api, id }
    }
}

impl<I> StatusSource for AppStatus<'_, I>
where
    I: ManagementInterpreter + Sync,
{
    fn object_id(&self) -> &str {
        self.id.as_str()
    }

    fn fetch_status(&self) -> impl Future<Output = Result<Observation, ApiError>> + Send {
        let effect = ManagementEffect::GetApp {
            id: self.id.clone(),
        };
        async move {
            let operation = effect.operation();
            let result = self.api.interpret(effect).await;
            observe(result, operation, |response| match response {
                ManagementResponse::App(app) => Some(app.state().to_string()),
                _ => None,
            })
        }
    }
}

/// Status of a per-target child app, read through its project's API.
pub struct ChildAppStatus<'a, I> {
    api: &'a I,
    project_id: ProjectId,
    id: ChildAppId,
}

impl<'a, I> ChildAppStatus<'a, I> {
    pub fn new(api: &'a I, project_id: ProjectId, id: ChildAppId) -> Self {
        ChildAppStatus {
            api,
            project_id,
            id,
        }
    }
}

impl<I> StatusSource for ChildAppStatus<'_, I>
where
    I: ManagementInterpreter + Sync,
{
    fn object_id(&self) -> &str {
        self.id.as_str()
    }

    fn fetch_status(&self) -> impl Future<Output = Result<Observation, ApiError>> + Send {
        let effect = ManagementEffect::GetProjectApp {
            project_id: self.project_id.clone(),
            id: self.id.clone(),
        };
        async move {
            let operation = effect.operation();
            let result = self.api.interpret(effect).await;
            observe(result, operation, |response| match response {
                ManagementResponse::ProjectApp(app) => Some(app.state),
                _ => None,
            })
        }
    }
}
