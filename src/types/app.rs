//! Snapshots of remote management API objects.
//!
//! These mirror the management API's JSON shapes closely enough to be sent and
//! received as-is. The reconciler treats every snapshot as read-only: changes
//! are expressed as new effects, never by mutating a snapshot in place.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::ids::{ChildAppId, MultiClusterAppId, RevisionId, TemplateVersionId};
use super::target::{Answer, Target};

/// State reported by a multi-cluster app that has converged.
pub const STATE_ACTIVE: &str = "active";

/// State reported while an app is being torn down.
pub const STATE_REMOVING: &str = "removing";

/// Synthetic state for an object the API no longer returns.
pub const STATE_REMOVED: &str = "removed";

/// A multi-cluster app as returned by the management API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MultiClusterApp {
    /// Empty on create requests; assigned by the API.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<MultiClusterAppId>,

    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,

    #[serde(default)]
    pub targets: Vec<Target>,

    #[serde(default)]
    pub answers: Vec<Answer>,

    pub template_version_id: TemplateVersionId,

    #[serde(default)]
    pub members: Vec<Member>,

    #[serde(default)]
    pub roles: Vec<String>,

    #[serde(default)]
    pub revision_history_limit: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upgrade_strategy: Option<UpgradeStrategy>,

    #[serde(default)]
    pub labels: BTreeMap<String, String>,

    #[serde(default)]
    pub annotations: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<MultiClusterAppStatus>,
}

impl MultiClusterApp {
    /// Returns the revision the app currently runs, if the API reported one.
    pub fn revision_id(&self) -> Option<&RevisionId> {
        self.status.as_ref().and_then(|s| s.revision_id.as_ref())
    }

    /// Returns the reported state, or the empty string if none was reported.
    pub fn state(&self) -> &str {
        self.state.as_deref().unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MultiClusterAppStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revision_id: Option<RevisionId>,
}

/// A principal granted access to the multi-cluster app.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_principal_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_principal_id: Option<String>,
}

/// How the API rolls changes out across targets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpgradeStrategy {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rolling_update: Option<RollingUpdate>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RollingUpdate {
    #[serde(default)]
    pub batch_size: u32,

    /// Seconds between batches.
    #[serde(default)]
    pub interval: u32,
}

/// A catalog template. `version_links` maps each published version to its link.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub id: String,

    #[serde(default)]
    pub version_links: BTreeMap<String, String>,
}

/// A concrete template version.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateVersion {
    pub id: TemplateVersionId,

    /// Catalog reference in `catalog://?catalog=..&template=..&version=..` form.
    #[serde(default)]
    pub external_id: String,
}

/// A per-target child app, as returned by the project API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectApp {
    pub id: ChildAppId,

    #[serde(default)]
    pub state: String,
}
