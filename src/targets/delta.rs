//! Target delta computation.
//!
//! Turns a current and a desired target set into the minimal add/remove
//! operations, each carrying the answer that should travel with it.
//!
//! The computation is a pure function of its inputs. Output order follows the
//! input iteration order (removals in `current` order, additions in `desired`
//! order) so the effects issued from a delta are reproducible.

use crate::effects::TargetsInput;
use crate::types::{Answer, Target};

use super::set::TargetSet;

/// One target to add or remove, with the answer that goes with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeltaEntry {
    pub target: Target,
    pub answer: Option<Answer>,
}

/// The difference between two target sets.
///
/// `to_add` and `to_remove` are disjoint and together cover exactly the
/// symmetric difference of the desired and current sets, compared by project.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TargetDelta {
    pub to_add: Vec<DeltaEntry>,
    pub to_remove: Vec<DeltaEntry>,
}

impl TargetDelta {
    /// Returns true if neither side has entries.
    ///
    /// An empty delta means the target sets hold the same projects.
    pub fn is_empty(&self) -> bool {
        self.to_add.is_empty() && self.to_remove.is_empty()
    }

    /// Payload for the remove-projects action.
    pub fn removal_input(&self) -> TargetsInput {
        targets_input(&self.to_remove)
    }

    /// Payload for the add-projects action.
    pub fn addition_input(&self) -> TargetsInput {
        targets_input(&self.to_add)
    }
}

fn targets_input(entries: &[DeltaEntry]) -> TargetsInput {
    TargetsInput {
        projects: entries.iter().map(|e| e.target.project_id.clone()).collect(),
        answers: entries.iter().filter_map(|e| e.answer.clone()).collect(),
    }
}

/// Computes the delta from `current` to `desired`.
///
/// Answers are attached only when `answers_changed` is set: removals take the
/// matching answer from `current_answers`, additions from `desired_answers`.
pub fn compute_delta(
    current: &[Target],
    desired: &[Target],
    current_answers: &[Answer],
    desired_answers: &[Answer],
    answers_changed: bool,
) -> TargetDelta {
    let current = TargetSet::new(current, current_answers);
    let desired = TargetSet::new(desired, desired_answers);

    TargetDelta {
        to_add: missing_from(&desired, &current, answers_changed),
        to_remove: missing_from(&current, &desired, answers_changed),
    }
}

/// Entries for every target in `source` that `other` lacks, with answers taken
/// from `source`.
fn missing_from(
    source: &TargetSet<'_>,
    other: &TargetSet<'_>,
    with_answers: bool,
) -> Vec<DeltaEntry> {
    source
        .targets()
        .iter()
        .filter(|t| !other.contains(t))
        .map(|t| DeltaEntry {
            target: t.clone(),
            answer: if with_answers {
                source.answer_for(t).cloned()
            } else {
                None
            },
        })
        .collect()
}
