//! Management effect interpreter using reqwest.
//!
//! This module implements the `ManagementInterpreter` trait, executing effects
//! against the real management API. Every effect maps to exactly one HTTP
//! request; failures are categorized but never retried.

use crate::effects::{ManagementEffect, ManagementInterpreter, ManagementResponse, TargetsInput};
use crate::types::{
    ChildAppId, MultiClusterApp, MultiClusterAppId, ProjectApp, ProjectId, RevisionId, Template,
    TemplateVersion, TemplateVersionId,
};

use super::client::ManagementClient;
use super::error::ApiError;

const APPS_PATH: &str = "multiclusterapps";

impl ManagementInterpreter for ManagementClient {
    async fn interpret(&self, effect: ManagementEffect) -> Result<ManagementResponse, ApiError> {
        execute_effect(self, effect).await
    }
}

/// Executes a single effect.
pub async fn execute_effect(
    client: &ManagementClient,
    effect: ManagementEffect,
) -> Result<ManagementResponse, ApiError> {
    match effect {
        ManagementEffect::GetApp { id } => get_app(client, &id).await,
        ManagementEffect::CreateApp { app } => create_app(client, &app).await,
        ManagementEffect::UpdateApp { id, update } => {
            let path = app_path(&id);
            let app: MultiClusterApp = client.put(&path, update.as_ref()).await?;
            Ok(ManagementResponse::App(Box::new(app)))
        }
        ManagementEffect::DeleteApp { id } => {
            client.delete(&app_path(&id)).await?;
            Ok(ManagementResponse::Deleted)
        }
        ManagementEffect::Rollback { id, revision_id } => rollback(client, &id, revision_id).await,
        ManagementEffect::AddProjects { id, input } => {
            targets_action(client, &id, "addProjects", &input).await
        }
        ManagementEffect::RemoveProjects { id, input } => {
            targets_action(client, &id, "removeProjects", &input).await
        }
        ManagementEffect::GetTemplate { id } => {
            let template: Template = client.get(&format!("templates/{}", id)).await?;
            Ok(ManagementResponse::Template(template))
        }
        ManagementEffect::GetTemplateVersion { id } => get_template_version(client, &id).await,
        ManagementEffect::GetProjectApp { project_id, id } => {
            get_project_app(client, &project_id, &id).await
        }
    }
}

fn app_path(id: &MultiClusterAppId) -> String {
    format!("{}/{}", APPS_PATH, id)
}

// ─── Multi-cluster App Operations ─────────────────────────────────────────────

async fn get_app(
    client: &ManagementClient,
    id: &MultiClusterAppId,
) -> Result<ManagementResponse, ApiError> {
    let app: MultiClusterApp = client.get(&app_path(id)).await?;
    Ok(ManagementResponse::App(Box::new(app)))
}

async fn create_app(
    client: &ManagementClient,
    app: &MultiClusterApp,
) -> Result<ManagementResponse, ApiError> {
    let created: MultiClusterApp = client.post(APPS_PATH, app).await?;
    if created.id.is_none() {
        return Err(ApiError::unexpected_response(
            "create multi-cluster app",
            "created object has no id",
        ));
    }
    Ok(ManagementResponse::App(Box::new(created)))
}

async fn rollback(
    client: &ManagementClient,
    id: &MultiClusterAppId,
    revision_id: RevisionId,
) -> Result<ManagementResponse, ApiError> {
    let body = serde_json::json!({ "revisionId": revision_id });
    client.action(&app_path(id), "rollback", &body).await?;
    Ok(ManagementResponse::ActionAccepted)
}

async fn targets_action(
    client: &ManagementClient,
    id: &MultiClusterAppId,
    action: &str,
    input: &TargetsInput,
) -> Result<ManagementResponse, ApiError> {
    client.action(&app_path(id), action, input).await?;
    Ok(ManagementResponse::ActionAccepted)
}

// ─── Catalog and Project Operations ───────────────────────────────────────────

async fn get_template_version(
    client: &ManagementClient,
    id: &TemplateVersionId,
) -> Result<ManagementResponse, ApiError> {
    let version: TemplateVersion = client.get(&format!("templateversions/{}", id)).await?;
    Ok(ManagementResponse::TemplateVersion(version))
}

async fn get_project_app(
    client: &ManagementClient,
    project_id: &ProjectId,
    id: &ChildAppId,
) -> Result<ManagementResponse, ApiError> {
    let app: ProjectApp = client
        .get(&format!("project/{}/apps/{}", project_id, id))
        .await?;
    Ok(ManagementResponse::ProjectApp(app))
}
