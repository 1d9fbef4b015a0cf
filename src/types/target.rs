//! Deployment targets and answer overrides.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::ids::{AppId, ProjectId};

/// One project a multi-cluster app is deployed into.
///
/// Within a target set, targets are keyed by project: `app_id` is assigned by
/// the management API once the child app exists and is absent on freshly
/// declared targets.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Target {
    pub project_id: ProjectId,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_id: Option<AppId>,

    /// Remote-reported state of the child app. Never sent back on writes.
    #[serde(default, skip_serializing)]
    pub state: Option<String>,
}

impl Target {
    /// A declared target with no remote assignment yet.
    pub fn new(project_id: impl Into<ProjectId>) -> Self {
        Target {
            project_id: project_id.into(),
            app_id: None,
            state: None,
        }
    }

    pub fn with_app(mut self, app_id: impl Into<AppId>) -> Self {
        self.app_id = Some(app_id.into());
        self
    }

    /// Returns true if both targets deploy into the same project.
    pub fn same_project(&self, other: &Target) -> bool {
        self.project_id == other.project_id
    }
}

/// A set of answer values supplied to the deployment.
///
/// An answer with no `project_id` (and no `cluster_id`) applies to every target.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Answer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<ProjectId>,

    #[serde(default)]
    pub values: BTreeMap<String, String>,
}

impl Answer {
    /// An answer applying to every target.
    pub fn global(values: BTreeMap<String, String>) -> Self {
        Answer {
            cluster_id: None,
            project_id: None,
            values,
        }
    }

    /// An answer scoped to one project.
    pub fn for_project(project_id: impl Into<ProjectId>, values: BTreeMap<String, String>) -> Self {
        Answer {
            cluster_id: None,
            project_id: Some(project_id.into()),
            values,
        }
    }

    /// Returns true if this answer is scoped to exactly the target's project.
    pub fn matches(&self, target: &Target) -> bool {
        self.project_id.as_ref() == Some(&target.project_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn answer_matches_only_its_project() {
        let answer = Answer::for_project("c-1:p-1", BTreeMap::new());
        assert!(answer.matches(&Target::new("c-1:p-1")));
        assert!(!answer.matches(&Target::new("c-1:p-2")));
    }

    #[test]
    fn global_answer_matches_no_target() {
        let answer = Answer::global(BTreeMap::from([("a".to_string(), "1".to_string())]));
        assert!(!answer.matches(&Target::new("c-1:p-1")));
    }

    #[test]
    fn target_deserializes_remote_shape() {
        let json = r#"{"projectId":"c-1:p-1","appId":"mcapp-x","state":"active","healthState":"healthy"}"#;
        let target: Target = serde_json::from_str(json).unwrap();
        assert_eq!(target.project_id, ProjectId::new("c-1:p-1"));
        assert_eq!(target.app_id, Some(AppId::new("mcapp-x")));
        assert_eq!(target.state.as_deref(), Some("active"));

        let back = serde_json::to_value(&target).unwrap();
        assert!(back.get("state").is_none());
    }

    #[test]
    fn same_project_ignores_assigned_app() {
        let declared = Target::new("c-1:p-1");
        let remote = Target::new("c-1:p-1").with_app("mcapp-x");
        assert!(declared.same_project(&remote));
        assert_ne!(declared, remote);
    }
}
