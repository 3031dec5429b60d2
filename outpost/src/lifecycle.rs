//! Worker lifecycle states.

use std::fmt;

use tokio::sync::watch;
use tracing::info;

use crate::error::LifecycleError;

/// Lifecycle state of a worker version.
///
/// ```text
/// Parsed → Installing → Installed → Activating → Active
///              └──────→ Redundant
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkerState {
    /// Created, nothing stored yet.
    Parsed,
    /// Populating the generation with critical assets.
    Installing,
    /// Every critical asset is stored; waiting for activation.
    Installed,
    /// Removing superseded generations.
    Activating,
    /// Intercepting requests.
    Active,
    /// Installation failed; this version never serves.
    Redundant,
}

impl WorkerState {
    /// Returns the state as a string slice.
    pub const fn as_str(&self) -> &'static str {
        match self {
            WorkerState::Parsed => "parsed",
            WorkerState::Installing => "installing",
            WorkerState::Installed => "installed",
            WorkerState::Activating => "activating",
            WorkerState::Active => "active",
            WorkerState::Redundant => "redundant",
        }
    }
}

impl fmt::Display for WorkerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Current state plus its subscribers.
#[derive(Debug)]
pub(crate) struct Lifecycle {
    state: watch::Sender<WorkerState>,
}

impl Lifecycle {
    pub(crate) fn new() -> Self {
        Self {
            state: watch::Sender::new(WorkerState::Parsed),
        }
    }

    pub(crate) fn current(&self) -> WorkerState {
        *self.state.borrow()
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<WorkerState> {
        self.state.subscribe()
    }

    /// Moves from `expected` to `next`, failing if the worker is elsewhere.
    ///
    /// The check and the write happen under one lock, so two concurrent
    /// phases cannot both leave the same state.
    pub(crate) fn advance(
        &self,
        expected: WorkerState,
        next: WorkerState,
    ) -> Result<(), LifecycleError> {
        let mut actual = expected;
        let moved = self.state.send_if_modified(|state| {
            actual = *state;
            if *state == expected {
                *state = next;
                true
            } else {
                false
            }
        });
        if moved {
            info!(from = %expected, to = %next, "Lifecycle transition");
            Ok(())
        } else {
            Err(LifecycleError::InvalidState { expected, actual })
        }
    }

    /// Unconditionally sets the state.
    pub(crate) fn set(&self, next: WorkerState) {
        let previous = self.state.send_replace(next);
        info!(from = %previous, to = %next, "Lifecycle transition");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_checks_the_current_state() {
        let lifecycle = Lifecycle::new();
        lifecycle
            .advance(WorkerState::Parsed, WorkerState::Installing)
            .unwrap();

        let err = lifecycle
            .advance(WorkerState::Installed, WorkerState::Activating)
            .unwrap_err();
        assert!(matches!(
            err,
            LifecycleError::InvalidState {
                expected: WorkerState::Installed,
                actual: WorkerState::Installing,
            }
        ));
        assert_eq!(lifecycle.current(), WorkerState::Installing);
    }

    #[test]
    fn subscribers_observe_transitions() {
        let lifecycle = Lifecycle::new();
        let mut rx = lifecycle.subscribe();
        lifecycle.set(WorkerState::Redundant);
        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), WorkerState::Redundant);
    }
}
