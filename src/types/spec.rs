//! The caller-facing desired state of a multi-cluster app.
//!
//! `MultiClusterAppSpec` is what a caller declares; `AppRecord` is what the
//! reconciler hands back after reading the remote object, flattened into the
//! same shape so the two can be compared field by field.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::app::{Member, UpgradeStrategy};
use super::ids::{MultiClusterAppId, RevisionId, TemplateVersionId};
use super::target::{Answer, Target};

const DEFAULT_REVISION_HISTORY_LIMIT: u32 = 10;

fn default_revision_history_limit() -> u32 {
    DEFAULT_REVISION_HISTORY_LIMIT
}

fn default_wait() -> bool {
    true
}

/// Desired state of a multi-cluster app.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiClusterAppSpec {
    pub name: String,

    /// Catalog the template lives in. Global catalogs are named plainly;
    /// cluster and project catalogs carry their scope as `scope:name`.
    pub catalog_name: String,

    pub template_name: String,

    /// Pinned template version. Resolved to the latest published version on
    /// create when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_version: Option<String>,

    /// Computed from catalog, template and version.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_version_id: Option<TemplateVersionId>,

    pub targets: Vec<Target>,

    #[serde(default)]
    pub answers: Vec<Answer>,

    #[serde(default)]
    pub members: Vec<Member>,

    pub roles: Vec<String>,

    #[serde(default = "default_revision_history_limit")]
    pub revision_history_limit: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upgrade_strategy: Option<UpgradeStrategy>,

    #[serde(default)]
    pub labels: BTreeMap<String, String>,

    #[serde(default)]
    pub annotations: BTreeMap<String, String>,

    /// Block until the app reports `active` after create and update.
    #[serde(default = "default_wait")]
    pub wait: bool,

    /// Revision to roll back to. Changing it triggers a rollback.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revision_id: Option<RevisionId>,
}

impl MultiClusterAppSpec {
    /// A minimal spec with defaults for every optional field.
    pub fn new(
        name: impl Into<String>,
        catalog_name: impl Into<String>,
        template_name: impl Into<String>,
        targets: Vec<Target>,
    ) -> Self {
        MultiClusterAppSpec {
            name: name.into(),
            catalog_name: catalog_name.into(),
            template_name: template_name.into(),
            template_version: None,
            template_version_id: None,
            targets,
            answers: Vec::new(),
            members: Vec::new(),
            roles: vec!["project-member".to_string()],
            revision_history_limit: DEFAULT_REVISION_HISTORY_LIMIT,
            upgrade_strategy: None,
            labels: BTreeMap::new(),
            annotations: BTreeMap::new(),
            wait: default_wait(),
            revision_id: None,
        }
    }
}

/// A reconciled multi-cluster app: the remote object's ID plus its fields
/// flattened into the desired-state representation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppRecord {
    pub id: MultiClusterAppId,

    #[serde(flatten)]
    pub spec: MultiClusterAppSpec,
}
