//! The convergence poll loop.
//!
//! [`wait_for_state`] fetches a [`StatusSource`] until it reports a target
//! state, reports a state it should never be in, disappears, or runs out of
//! time. It sleeps cooperatively between fetches and aborts promptly when the
//! cancellation token fires.

use std::collections::BTreeSet;
use std::time::Duration;

use thiserror::Error;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::management::ApiError;
use crate::types::{STATE_ACTIVE, STATE_REMOVED, STATE_REMOVING};

use super::config::PollConfig;
use super::source::{Observation, StatusSource};

/// The states a wait tolerates and the states it is waiting for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateSpec {
    /// States that mean "not there yet". Empty means any non-target state.
    pub pending: BTreeSet<String>,

    /// States that end the wait successfully.
    pub target: BTreeSet<String>,
}

impl StateSpec {
    pub fn new<P, T>(pending: P, target: T) -> Self
    where
        P: IntoIterator,
        P::Item: Into<String>,
        T: IntoIterator,
        T::Item: Into<String>,
    {
        StateSpec {
            pending: pending.into_iter().map(Into::into).collect(),
            target: target.into_iter().map(Into::into).collect(),
        }
    }

    /// Wait for `active`, tolerating any intermediate state.
    pub fn active() -> Self {
        Self::new(Vec::<String>::new(), [STATE_ACTIVE])
    }

    /// Wait for the object to be removed, tolerating only `removing`.
    pub fn removed() -> Self {
        Self::new([STATE_REMOVING], [STATE_REMOVED])
    }

    /// Returns true if the object disappearing counts as reaching the target.
    pub fn accepts_removal(&self) -> bool {
        self.target.contains(STATE_REMOVED)
    }

    fn is_target(&self, state: &str) -> bool {
        self.target.contains(state)
    }

    fn is_pending(&self, state: &str) -> bool {
        self.pending.is_empty() || self.pending.contains(state)
    }
}

/// Errors from a convergence wait.
#[derive(Debug, Error)]
pub enum PollError {
    /// The object entered a state outside the pending and target sets.
    #[error("{object} entered unexpected state {state:?} (expected one of {expected:?})")]
    UnexpectedState {
        object: String,
        state: String,
        expected: Vec<String>,
    },

    /// The deadline passed before the object reached a target state.
    #[error("timed out after {timeout:?} waiting for {object} (last state: {last_state:?})")]
    Timeout {
        object: String,
        last_state: Option<String>,
        timeout: Duration,
    },

    /// The object could not be found on `checks` consecutive fetches.
    #[error("{object} not found after {checks} consecutive checks")]
    NotFound { object: String, checks: u32 },

    /// The wait was cancelled.
    #[error("wait cancelled")]
    Cancelled,

    /// Fetching the status failed.
    #[error("fetching status failed: {0}")]
    Fetch(#[from] ApiError),
}

impl PollError {
    /// Returns true if this is a cancellation error.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, PollError::Cancelled)
    }
}

/// Transient bookkeeping for one wait call.
#[derive(Debug)]
struct PollState {
    object_id: String,
    last_status: Option<String>,
    started: Instant,
    timeout: Duration,
    /// `None` when `started + timeout` overflows: no deadline.
    deadline: Option<Instant>,
    not_found: u32,
}

impl PollState {
    fn new(object_id: &str, timeout: Duration) -> Self {
        let started = Instant::now();
        PollState {
            object_id: object_id.to_string(),
            last_status: None,
            started,
            timeout,
            deadline: started.checked_add(timeout),
            not_found: 0,
        }
    }

    fn remaining(&self) -> Duration {
        match self.deadline {
            Some(deadline) => deadline.saturating_duration_since(Instant::now()),
            None => Duration::MAX,
        }
    }

    fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    fn timeout_error(&self) -> PollError {
        PollError::Timeout {
            object: self.object_id.clone(),
            last_state: self.last_status.clone(),
            timeout: self.timeout,
        }
    }
}

/// What one fetch means for the wait.
enum Step {
    Done(String),
    Continue,
}

fn evaluate(
    observation: Observation,
    states: &StateSpec,
    poll: &mut PollState,
    config: &PollConfig,
) -> Result<Step, PollError> {
    match observation {
        Observation::Gone if states.accepts_removal() => Ok(Step::Done(STATE_REMOVED.to_string())),
        Observation::Gone => {
            poll.not_found += 1;
            if poll.not_found > config.not_found_checks {
                return Err(PollError::NotFound {
                    object: poll.object_id.clone(),
                    checks: poll.not_found,
                });
            }
            Ok(Step::Continue)
        }
        Observation::Status(status) => {
            poll.not_found = 0;
            if states.is_target(&status) {
                return Ok(Step::Done(status));
            }
            if !states.is_pending(&status) {
                return Err(PollError::UnexpectedState {
                    object: poll.object_id.clone(),
                    state: status,
                    expected: states.pending.iter().chain(&states.target).cloned().collect(),
                });
            }
            poll.last_status = Some(status);
            Ok(Step::Continue)
        }
    }
}

/// Polls `source` until it reaches one of `states.target`.
///
/// Returns the target state that was reached (`"removed"` if the object
/// disappeared while waiting for removal).
///
/// # Errors
///
/// - [`PollError::UnexpectedState`] if a status outside pending ∪ target is seen
/// - [`PollError::Timeout`] once `timeout` has elapsed
/// - [`PollError::NotFound`] if the object stays gone while removal is not a target
/// - [`PollError::Fetch`] on the first failed fetch
/// - [`PollError::Cancelled`] as soon as `cancel` fires
pub async fn wait_for_state<S: StatusSource>(
    source: &S,
    states: &StateSpec,
    timeout: Duration,
    config: &PollConfig,
    cancel: &CancellationToken,
) -> Result<String, PollError> {
    let mut poll = PollState::new(source.object_id(), timeout);
    let mut wait = config.delay;

    loop {
        if cancel.is_cancelled() {
            return Err(PollError::Cancelled);
        }

        let observation = tokio::select! {
            biased;

            _ = cancel.cancelled() => return Err(PollError::Cancelled),
            result = source.fetch_status() => result?,
        };
        trace!(object = %poll.object_id, ?observation, "Polled status");

        if let Step::Done(state) = evaluate(observation, states, &mut poll, config)? {
            debug!(
                object = %poll.object_id,
                state = %state,
                elapsed = ?poll.elapsed(),
                "Reached target state"
            );
            return Ok(state);
        }

        let remaining = poll.remaining();
        if remaining.is_zero() {
            return Err(poll.timeout_error());
        }

        tokio::select! {
            biased;

            _ = cancel.cancelled() => return Err(PollError::Cancelled),
            _ = tokio::time::sleep(wait.min(remaining)) => {}
        }

        if poll.remaining().is_zero() {
            return Err(poll.timeout_error());
        }
        wait = config.next_interval(wait);
    }
}
