//! Management API effect types.
//!
//! These types describe management API operations as data, without executing
//! them. An interpreter (see [`super::ManagementInterpreter`]) executes them
//! against the real API or a test double.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::{
    Answer, ChildAppId, Member, MultiClusterApp, MultiClusterAppId, ProjectApp, ProjectId,
    RevisionId, Template, TemplateVersion, TemplateVersionId, UpgradeStrategy,
};

/// Payload of the add-projects and remove-projects actions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetsInput {
    pub projects: Vec<ProjectId>,

    #[serde(default)]
    pub answers: Vec<Answer>,
}

/// The fields a full update replaces, submitted as one atomic call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppUpdate {
    pub answers: Vec<Answer>,
    pub members: Vec<Member>,
    pub revision_history_limit: u32,
    pub roles: Vec<String>,
    pub template_version_id: TemplateVersionId,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upgrade_strategy: Option<UpgradeStrategy>,

    pub annotations: BTreeMap<String, String>,
    pub labels: BTreeMap<String, String>,
}

/// A management API effect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ManagementEffect {
    // ─── Multi-cluster app CRUD ───────────────────────────────────────────────
    /// Fetch a multi-cluster app by ID.
    GetApp { id: MultiClusterAppId },

    /// Create a multi-cluster app. The `id` of the payload is ignored.
    CreateApp { app: Box<MultiClusterApp> },

    /// Replace the updatable fields of a multi-cluster app.
    UpdateApp {
        id: MultiClusterAppId,
        update: Box<AppUpdate>,
    },

    /// Delete a multi-cluster app. Child apps are removed by the API's cascade.
    DeleteApp { id: MultiClusterAppId },

    // ─── Multi-cluster app actions ────────────────────────────────────────────
    /// Roll the app back to a previous revision.
    Rollback {
        id: MultiClusterAppId,
        revision_id: RevisionId,
    },

    /// Deploy the app into additional projects.
    AddProjects {
        id: MultiClusterAppId,
        input: TargetsInput,
    },

    /// Withdraw the app from projects.
    RemoveProjects {
        id: MultiClusterAppId,
        input: TargetsInput,
    },

    // ─── Catalog ──────────────────────────────────────────────────────────────
    /// Fetch a catalog template with its version links.
    GetTemplate { id: String },

    /// Fetch a template version.
    GetTemplateVersion { id: TemplateVersionId },

    // ─── Project API ──────────────────────────────────────────────────────────
    /// Fetch a child app through the API of the project it lives in.
    GetProjectApp {
        project_id: ProjectId,
        id: ChildAppId,
    },
}

impl ManagementEffect {
    /// A short name for the operation, for logs and error messages.
    pub fn operation(&self) -> &'static str {
        match self {
            ManagementEffect::GetApp { .. } => "get multi-cluster app",
            ManagementEffect::CreateApp { .. } => "create multi-cluster app",
            ManagementEffect::UpdateApp { .. } => "update multi-cluster app",
            ManagementEffect::DeleteApp { .. } => "delete multi-cluster app",
            ManagementEffect::Rollback { .. } => "rollback multi-cluster app",
            ManagementEffect::AddProjects { .. } => "add projects",
            ManagementEffect::RemoveProjects { .. } => "remove projects",
            ManagementEffect::GetTemplate { .. } => "get template",
            ManagementEffect::GetTemplateVersion { .. } => "get template version",
            ManagementEffect::GetProjectApp { .. } => "get project app",
        }
    }
}

// ─── Response Types ───────────────────────────────────────────────────────────

/// Response from a management effect.
///
/// Each variant corresponds to the response from a particular effect type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum ManagementResponse {
    /// Response to `GetApp`, `CreateApp` and `UpdateApp`.
    App(Box<MultiClusterApp>),

    /// Response to `DeleteApp`.
    Deleted,

    /// Response to `Rollback`, `AddProjects` and `RemoveProjects`.
    ActionAccepted,

    /// Response to `GetTemplate`.
    Template(Template),

    /// Response to `GetTemplateVersion`.
    TemplateVersion(TemplateVersion),

    /// Response to `GetProjectApp`.
    ProjectApp(ProjectApp),
}

impl ManagementResponse {
    /// A short name for the variant, for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            ManagementResponse::App(_) => "app",
            ManagementResponse::Deleted => "deleted",
            ManagementResponse::ActionAccepted => "action accepted",
            ManagementResponse::Template(_) => "template",
            ManagementResponse::TemplateVersion(_) => "template version",
            ManagementResponse::ProjectApp(_) => "project app",
        }
    }
}
