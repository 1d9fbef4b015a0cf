//! Choosing which update path fires.
//!
//! An update runs exactly one of three paths, chosen once up front from what
//! changed between the last reconciled state and the desired one. Revision
//! changes win over target changes, which win over everything else.

use crate::types::{MultiClusterAppSpec, RevisionId};

/// What differs between the prior and the desired state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecChanges {
    /// The desired revision, if it differs from the prior one and is set.
    pub revision: Option<RevisionId>,

    /// The declared target list differs, including its order.
    pub targets_changed: bool,

    pub answers_changed: bool,
}

impl SpecChanges {
    pub fn between(prior: &MultiClusterAppSpec, desired: &MultiClusterAppSpec) -> Self {
        let revision = match &desired.revision_id {
            Some(rev) if prior.revision_id.as_ref() != Some(rev) => Some(rev.clone()),
            _ => None,
        };

        let targets_changed = prior.targets.len() != desired.targets.len()
            || prior
                .targets
                .iter()
                .zip(&desired.targets)
                .any(|(p, d)| !p.same_project(d));

        SpecChanges {
            revision,
            targets_changed,
            answers_changed: prior.answers != desired.answers,
        }
    }
}

/// The update path to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateMode {
    /// Roll back to `revision`; nothing else is submitted.
    Rollback { revision: RevisionId },

    /// Add and remove targets, then update fields if needed.
    MutateTargets { answers_changed: bool },

    /// Submit every updatable field in one call.
    UpdateFields,
}

impl UpdateMode {
    pub fn from_changes(changes: &SpecChanges) -> Self {
        if let Some(revision) = &changes.revision {
            UpdateMode::Rollback {
                revision: revision.clone(),
            }
        } else if changes.targets_changed {
            UpdateMode::MutateTargets {
                answers_changed: changes.answers_changed,
            }
        } else {
            UpdateMode::UpdateFields
        }
    }

    /// Short name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            UpdateMode::Rollback { .. } => "rollback",
            UpdateMode::MutateTargets { .. } => "mutate_targets",
            UpdateMode::UpdateFields => "update_fields",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Answer, Target};
    use std::collections::BTreeMap;

    fn spec(projects: &[&str]) -> MultiClusterAppSpec {
        MultiClusterAppSpec::new(
            "wordpress",
            "library",
            "wordpress",
            projects.iter().map(|p| Target::new(*p)).collect(),
        )
    }

    fn mode(prior: &MultiClusterAppSpec, desired: &MultiClusterAppSpec) -> UpdateMode {
        UpdateMode::from_changes(&SpecChanges::between(prior, desired))
    }

    #[test]
    fn revision_change_wins() {
        let prior = spec(&["c-1:p-1"]);
        let mut desired = spec(&["c-1:p-2"]);
        desired.revision_id = Some(RevisionId::new("apprevision-3"));
        desired.labels.insert("tier".to_string(), "web".to_string());

        assert_eq!(
            mode(&prior, &desired),
            UpdateMode::Rollback {
                revision: RevisionId::new("apprevision-3")
            }
        );
    }

    #[test]
    fn clearing_revision_is_not_a_rollback() {
        let mut prior = spec(&["c-1:p-1"]);
        prior.revision_id = Some(RevisionId::new("apprevision-3"));
        let desired = spec(&["c-1:p-1"]);

        assert_eq!(mode(&prior, &desired), UpdateMode::UpdateFields);
    }

    #[test]
    fn unchanged_revision_is_not_a_rollback() {
        let mut prior = spec(&["c-1:p-1"]);
        prior.revision_id = Some(RevisionId::new("apprevision-3"));
        let desired = prior.clone();

        assert_eq!(mode(&prior, &desired), UpdateMode::UpdateFields);
    }

    #[test]
    fn target_change_carries_answer_change() {
        let prior = spec(&["c-1:p-1"]);
        let mut desired = spec(&["c-1:p-1", "c-1:p-2"]);
        desired.answers = vec![Answer::global(BTreeMap::from([(
            "replicas".to_string(),
            "3".to_string(),
        )]))];

        assert_eq!(
            mode(&prior, &desired),
            UpdateMode::MutateTargets {
                answers_changed: true
            }
        );
    }

    #[test]
    fn reorder_counts_as_target_change() {
        let prior = spec(&["c-1:p-1", "c-1:p-2"]);
        let desired = spec(&["c-1:p-2", "c-1:p-1"]);

        assert_eq!(
            mode(&prior, &desired),
            UpdateMode::MutateTargets {
                answers_changed: false
            }
        );
    }

    #[test]
    fn assigned_app_ids_are_not_a_target_change() {
        let mut prior = spec(&[]);
        prior.targets = vec![Target::new("c-1:p-1").with_app("mcapp-wordpress-1")];
        let desired = spec(&["c-1:p-1"]);

        assert_eq!(mode(&prior, &desired), UpdateMode::UpdateFields);
    }
}
