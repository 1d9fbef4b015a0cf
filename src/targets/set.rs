//! The declared target set and its per-target answer overrides.

use std::collections::HashSet;

use thiserror::Error;

use crate::types::{Answer, ProjectId, Target};

/// A target set is not well formed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TargetSetError {
    /// The same project is declared as a target more than once.
    #[error("project {0} is targeted more than once")]
    DuplicateTarget(ProjectId),

    /// More than one answer is scoped to the same project.
    #[error("project {0} has more than one answer")]
    DuplicateAnswer(ProjectId),
}

/// A borrowed view over targets and the answers that go with them.
#[derive(Debug, Clone, Copy)]
pub struct TargetSet<'a> {
    targets: &'a [Target],
    answers: &'a [Answer],
}

impl<'a> TargetSet<'a> {
    pub fn new(targets: &'a [Target], answers: &'a [Answer]) -> Self {
        TargetSet { targets, answers }
    }

    pub fn targets(&self) -> &'a [Target] {
        self.targets
    }

    /// Returns true if a target for the same project is in the set.
    pub fn contains(&self, target: &Target) -> bool {
        self.targets.iter().any(|t| t.same_project(target))
    }

    /// Returns the answer scoped to the target's project, if any.
    ///
    /// Answers without a project apply to every target and are never returned.
    pub fn answer_for(&self, target: &Target) -> Option<&'a Answer> {
        self.answers.iter().find(|a| a.matches(target))
    }

    /// Checks that each project is targeted at most once and has at most one
    /// scoped answer.
    pub fn validate(&self) -> Result<(), TargetSetError> {
        let mut seen = HashSet::new();
        for target in self.targets {
            if !seen.insert(&target.project_id) {
                return Err(TargetSetError::DuplicateTarget(target.project_id.clone()));
            }
        }

        let mut answered = HashSet::new();
        for project in self.answers.iter().filter_map(|a| a.project_id.as_ref()) {
            if !answered.insert(project) {
                return Err(TargetSetError::DuplicateAnswer(project.clone()));
            }
        }

        Ok(())
    }
}

/// Orders `remote` targets the way `declared` lists them.
///
/// Remote targets whose project is declared appear in declaration order;
/// any remaining remote targets follow in the order the API returned them.
/// Declared targets the remote does not have are dropped.
pub fn order_targets_like(remote: &[Target], declared: &[Target]) -> Vec<Target> {
    let mut ordered: Vec<Target> = declared
        .iter()
        .filter_map(|d| remote.iter().find(|r| r.same_project(d)))
        .cloned()
        .collect();

    for target in remote {
        if !declared.iter().any(|d| d.same_project(target)) {
            ordered.push(target.clone());
        }
    }

    ordered
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn values(k: &str, v: &str) -> BTreeMap<String, String> {
        BTreeMap::from([(k.to_string(), v.to_string())])
    }

    #[test]
    fn answer_for_finds_project_scoped_answer() {
        let targets = vec![Target::new("c-1:p-1"), Target::new("c-1:p-2")];
        let answers = vec![
            Answer::global(values("a", "0")),
            Answer::for_project("c-1:p-2", values("b", "2")),
        ];
        let set = TargetSet::new(&targets, &answers);

        assert_eq!(set.answer_for(&targets[0]), None);
        assert_eq!(set.answer_for(&targets[1]), Some(&answers[1]));
    }

    #[test]
    fn validate_rejects_duplicate_target() {
        let targets = vec![
            Target::new("c-1:p-1"),
            Target::new("c-1:p-1").with_app("x"),
        ];
        let err = TargetSet::new(&targets, &[]).validate().unwrap_err();
        assert_eq!(err, TargetSetError::DuplicateTarget(ProjectId::new("c-1:p-1")));
    }

    #[test]
    fn validate_rejects_duplicate_answer() {
        let targets = vec![Target::new("c-1:p-1")];
        let answers = vec![
            Answer::for_project("c-1:p-1", values("a", "1")),
            Answer::for_project("c-1:p-1", values("a", "2")),
        ];
        let err = TargetSet::new(&targets, &answers).validate().unwrap_err();
        assert_eq!(err, TargetSetError::DuplicateAnswer(ProjectId::new("c-1:p-1")));
    }

    #[test]
    fn validate_allows_several_global_answers() {
        let targets = vec![Target::new("c-1:p-1")];
        let answers = vec![
            Answer::global(values("a", "1")),
            Answer::global(values("b", "2")),
        ];
        assert!(TargetSet::new(&targets, &answers).validate().is_ok());
    }

    #[test]
    fn order_follows_declaration_then_remote() {
        let remote = vec![
            Target::new("c-1:p-3").with_app("c"),
            Target::new("c-1:p-1").with_app("a"),
            Target::new("c-1:p-2").with_app("b"),
        ];
        let declared = vec![Target::new("c-1:p-2"), Target::new("c-1:p-9"), Target::new("c-1:p-1")];

        let ordered = order_targets_like(&remote, &declared);
        let projects: Vec<_> = ordered.iter().map(|t| t.project_id.as_str()).collect();
        assert_eq!(projects, vec!["c-1:p-2", "c-1:p-1", "c-1:p-3"]);
        assert_eq!(ordered[0].app_id.as_ref().map(|a| a.as_str()), Some("b"));
    }
}
