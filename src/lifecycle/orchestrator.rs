//! Create, read, update and delete for multi-cluster apps.
//!
//! The orchestrator turns a desired state into management effects, hands
//! the resulting object to the poller, and re-reads the outcome. It never
//! retries a failed call; the poll loop is the only repetition.

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::effects::{ManagementEffect, ManagementInterpreter, ManagementResponse};
use crate::management::ApiError;
use crate::poll::{
    AppStatus, ChildAppStatus, PollConfig, PollError, StateSpec, Timeouts, wait_for_state,
};
use crate::targets::{TargetSet, compute_delta};
use crate::types::{
    AppRecord, ChildAppId, MultiClusterApp, MultiClusterAppId, MultiClusterAppSpec, Template,
    TemplateVersion, TemplateVersionId,
};

use super::convert::{app_update, new_app, to_record};
use super::error::{LifecycleError, ResolutionError};
use super::mode::{SpecChanges, UpdateMode};
use super::template::{CatalogRef, latest_version, template_id, template_version_id};

const KIND: &str = "multi_cluster_app";

/// How a delete ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// The app was already gone; nothing was deleted.
    AlreadyAbsent,

    /// The app was deleted. Child app waits are best-effort and only counted.
    Removed {
        children_confirmed: usize,
        children_unconfirmed: usize,
    },
}

/// Drives the lifecycle of multi-cluster apps through a management API.
pub struct Orchestrator<I> {
    api: I,
    poll: PollConfig,
    timeouts: Timeouts,
    cancel: CancellationToken,
}

impl<I> Orchestrator<I>
where
    I: ManagementInterpreter + Sync,
{
    /// Creates an orchestrator with default polling and timeouts.
    pub fn new(api: I) -> Self {
        Orchestrator {
            api,
            poll: PollConfig::new(),
            timeouts: Timeouts::new(),
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_poll_config(mut self, poll: PollConfig) -> Self {
        self.poll = poll;
        self
    }

    pub fn with_timeouts(mut self, timeouts: Timeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    /// Uses `cancel` to abort waits in progress.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn api(&self) -> &I {
        &self.api
    }

    // ─── Create ───────────────────────────────────────────────────────────────

    /// Creates the app, waits for it to become active if requested, and
    /// returns the reconciled record.
    #[instrument(skip(self, spec), fields(kind = KIND, name = %spec.name))]
    pub async fn create(&self, spec: &MultiClusterAppSpec) -> Result<AppRecord, LifecycleError> {
        TargetSet::new(&spec.targets, &spec.answers).validate()?;

        let version = match &spec.template_version {
            Some(version) => version.clone(),
            None => self.resolve_latest(&spec.catalog_name, &spec.template_name).await?,
        };
        let template_version_id = template_version_id(&spec.catalog_name, &spec.template_name, &version);

        info!(
            kind = KIND,
            name = %spec.name,
            template_version_id = %template_version_id,
            action = "create",
            "Creating multi-cluster app"
        );

        let effect = ManagementEffect::CreateApp {
            app: Box::new(new_app(spec, template_version_id)),
        };
        let operation = effect.operation();
        let created = into_app(self.api.interpret(effect).await?, operation)?;
        let id = created
            .id
            .ok_or_else(|| ApiError::unexpected_response(operation, "created object has no id"))?;

        if spec.wait {
            self.wait(&id, StateSpec::active(), self.timeouts.create, "create")
                .await?;
        }

        let record = self.read(&id, Some(spec)).await?;
        record.ok_or(LifecycleError::Vanished { id })
    }

    /// Resolves the newest published version of a global catalog template.
    async fn resolve_latest(&self, catalog: &str, template: &str) -> Result<String, LifecycleError> {
        let template_id = template_id(catalog, template);
        let effect = ManagementEffect::GetTemplate {
            id: template_id.clone(),
        };
        let operation = effect.operation();

        let template = match self.api.interpret(effect).await {
            Ok(response) => into_template(response, operation)?,
            Err(e) if e.is_absent() => {
                return Err(ResolutionError::TemplateNotFound { template_id }.into());
            }
            Err(e) => return Err(e.into()),
        };

        let version = latest_version(&template)?;
        debug!(template_id = %template.id, version = %version, "Resolved latest template version");
        Ok(version)
    }

    // ─── Read ─────────────────────────────────────────────────────────────────

    /// Reads the app. Returns `None` if it no longer exists.
    ///
    /// `declared` supplies the caller's target order and `wait` flag.
    #[instrument(skip(self, declared), fields(kind = KIND, id = %id))]
    pub async fn read(
        &self,
        id: &MultiClusterAppId,
        declared: Option<&MultiClusterAppSpec>,
    ) -> Result<Option<AppRecord>, LifecycleError> {
        info!(kind = KIND, id = %id, action = "read", "Refreshing multi-cluster app");

        let Some(app) = self.find_app(id).await? else {
            info!(kind = KIND, id = %id, action = "read", "Multi-cluster app not found");
            return Ok(None);
        };

        let effect = ManagementEffect::GetTemplateVersion {
            id: app.template_version_id.clone(),
        };
        let operation = effect.operation();
        let version = into_template_version(self.api.interpret(effect).await?, operation)?;
        let catalog = CatalogRef::parse(&version.external_id)?;

        Ok(Some(to_record(id.clone(), &app, catalog, declared)))
    }

    // ─── Update ───────────────────────────────────────────────────────────────

    /// Moves the app from `prior` to `desired` along exactly one update path.
    #[instrument(skip(self, prior, desired), fields(kind = KIND, id = %prior.id))]
    pub async fn update(
        &self,
        prior: &AppRecord,
        desired: &MultiClusterAppSpec,
    ) -> Result<AppRecord, LifecycleError> {
        TargetSet::new(&desired.targets, &desired.answers).validate()?;

        let id = &prior.id;
        let mode = UpdateMode::from_changes(&SpecChanges::between(&prior.spec, desired));
        info!(kind = KIND, id = %id, action = "update", mode = mode.name(), "Updating multi-cluster app");

        let remote = self.get_app(id).await?;

        match mode {
            UpdateMode::Rollback { revision } => {
                info!(kind = KIND, id = %id, action = "rollback", revision = %revision, "Rolling back multi-cluster app");
                self.act(ManagementEffect::Rollback {
                    id: id.clone(),
                    revision_id: revision,
                })
                .await?;
            }
            UpdateMode::MutateTargets { answers_changed } => {
                let delta = compute_delta(
                    &remote.targets,
                    &desired.targets,
                    &remote.answers,
                    &desired.answers,
                    answers_changed,
                );

                if !delta.to_remove.is_empty() {
                    info!(kind = KIND, id = %id, action = "remove_targets", count = delta.to_remove.len(), "Removing targets");
                    self.act(ManagementEffect::RemoveProjects {
                        id: id.clone(),
                        input: delta.removal_input(),
                    })
                    .await?;
                }
                if !delta.to_add.is_empty() {
                    info!(kind = KIND, id = %id, action = "add_targets", count = delta.to_add.len(), "Adding targets");
                    self.act(ManagementEffect::AddProjects {
                        id: id.clone(),
                        input: delta.addition_input(),
                    })
                    .await?;
                }

                // Removing a target does not drop its answer.
                if delta.is_empty() || (answers_changed && !delta.to_remove.is_empty()) {
                    self.update_fields(id, prior, desired).await?;
                }
            }
            UpdateMode::UpdateFields => self.update_fields(id, prior, desired).await?,
        }

        if desired.wait {
            self.wait(id, StateSpec::active(), self.timeouts.update, "update")
                .await?;
        }

        self.read(id, Some(desired))
            .await?
            .ok_or_else(|| LifecycleError::Vanished { id: id.clone() })
    }

    async fn update_fields(
        &self,
        id: &MultiClusterAppId,
        prior: &AppRecord,
        desired: &MultiClusterAppSpec,
    ) -> Result<(), LifecycleError> {
        let template_version_id = self.desired_template_version(prior, desired).await?;
        info!(kind = KIND, id = %id, action = "update_fields", template_version_id = %template_version_id, "Updating multi-cluster app fields");

        let effect = ManagementEffect::UpdateApp {
            id: id.clone(),
            update: Box::new(app_update(desired, template_version_id)),
        };
        let operation = effect.operation();
        into_app(self.api.interpret(effect).await?, operation)?;
        Ok(())
    }

    /// The template version to submit: the pinned one, else the one already
    /// deployed, else the newest published.
    async fn desired_template_version(
        &self,
        prior: &AppRecord,
        desired: &MultiClusterAppSpec,
    ) -> Result<TemplateVersionId, LifecycleError> {
        let version = match desired
            .template_version
            .as_ref()
            .or(prior.spec.template_version.as_ref())
        {
            Some(version) => version.clone(),
            None => {
                self.resolve_latest(&desired.catalog_name, &desired.template_name)
                    .await?
            }
        };
        Ok(template_version_id(
            &desired.catalog_name,
            &desired.template_name,
            &version,
        ))
    }

    // ─── Delete ───────────────────────────────────────────────────────────────

    /// Deletes the app and waits for it and its child apps to go away.
    ///
    /// Child app waits never fail the delete, cancellation included.
    #[instrument(skip(self), fields(kind = KIND, id = %id))]
    pub async fn delete(&self, id: &MultiClusterAppId) -> Result<DeleteOutcome, LifecycleError> {
        info!(kind = KIND, id = %id, action = "delete", "Deleting multi-cluster app");

        let Some(app) = self.find_app(id).await? else {
            info!(kind = KIND, id = %id, action = "delete", "Multi-cluster app not found");
            return Ok(DeleteOutcome::AlreadyAbsent);
        };

        let effect = ManagementEffect::DeleteApp { id: id.clone() };
        let operation = effect.operation();
        match self.api.interpret(effect).await? {
            ManagementResponse::Deleted | ManagementResponse::ActionAccepted => {}
            other => return Err(ApiError::unexpected_response(operation, other.kind()).into()),
        }

        self.wait(id, StateSpec::removed(), self.timeouts.delete, "delete")
            .await?;

        let mut confirmed = 0;
        let mut unconfirmed = 0;
        for target in &app.targets {
            let Some(app_id) = &target.app_id else {
                continue;
            };
            let child = ChildAppId::for_target(&target.project_id, app_id);
            let source = ChildAppStatus::new(&self.api, target.project_id.clone(), child.clone());

            match wait_for_state(
                &source,
                &StateSpec::removed(),
                self.timeouts.delete,
                &self.poll,
                &self.cancel,
            )
            .await
            {
                Ok(_) => confirmed += 1,
                Err(e) => {
                    warn!(
                        kind = KIND,
                        id = %id,
                        child = %child,
                        project = %target.project_id,
                        error = %e,
                        "Child app not confirmed removed; continuing"
                    );
                    unconfirmed += 1;
                }
            }
        }

        // The parent is already gone; cancellation only cuts the settle short.
        tokio::select! {
            biased;

            _ = self.cancel.cancelled() => {
                debug!(kind = KIND, id = %id, "Settle delay cancelled");
            }
            _ = tokio::time::sleep(self.poll.settle_delay) => {}
        }

        Ok(DeleteOutcome::Removed {
            children_confirmed: confirmed,
            children_unconfirmed: unconfirmed,
        })
    }

    // ─── Helpers ──────────────────────────────────────────────────────────────

    async fn get_app(&self, id: &MultiClusterAppId) -> Result<MultiClusterApp, ApiError> {
        let effect = ManagementEffect::GetApp { id: id.clone() };
        let operation = effect.operation();
        into_app(self.api.interpret(effect).await?, operation)
    }

    /// Like `get_app`, but an absent app is `None`.
    async fn find_app(&self, id: &MultiClusterAppId) -> Result<Option<MultiClusterApp>, ApiError> {
        match self.get_app(id).await {
            Ok(app) => Ok(Some(app)),
            Err(e) if e.is_absent() => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Issues an action effect that answers with an acknowledgement.
    async fn act(&self, effect: ManagementEffect) -> Result<(), ApiError> {
        let operation = effect.operation();
        match self.api.interpret(effect).await? {
            ManagementResponse::ActionAccepted => Ok(()),
            other => Err(ApiError::unexpected_response(operation, other.kind())),
        }
    }

    async fn wait(
        &self,
        id: &MultiClusterAppId,
        states: StateSpec,
        timeout: std::time::Duration,
        operation: &'static str,
    ) -> Result<String, LifecycleError> {
        let source = AppStatus::new(&self.api, id.clone());
        wait_for_state(&source, &states, timeout, &self.poll, &self.cancel)
            .await
            .map_err(|source| wait_error(id, operation, source))
    }
}

fn wait_error(id: &MultiClusterAppId, operation: &'static str, source: PollError) -> LifecycleError {
    LifecycleError::Wait {
        id: id.clone(),
        operation,
        source,
    }
}

fn into_app(response: ManagementResponse, operation: &str) -> Result<MultiClusterApp, ApiError> {
    match response {
        ManagementResponse::App(app) => Ok(*app),
        other => Err(ApiError::unexpected_response(operation, other.kind())),
    }
}

fn into_template(response: ManagementResponse, operation: &str) -> Result<Template, ApiError> {
    match response {
        ManagementResponse::Template(template) => Ok(template),
        other => Err(ApiError::unexpected_response(operation, other.kind())),
    }
}

fn into_template_version(
    response: ManagementResponse,
    operation: &str,
) -> Result<TemplateVersion, ApiError> {
    match response {
        ManagementResponse::TemplateVersion(version) => Ok(version),
        other => Err(ApiError::unexpected_response(operation, other.kind())),
    }
}
