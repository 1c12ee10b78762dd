//! Router state snapshots and change notification.

use crate::frame::InputId;
use crate::observability::events;
use std::fmt::{Display, Formatter};
use std::sync::Arc;
use tracing::debug;

const COMPONENT: &str = "state_notifier";

/// Availability of one input at snapshot time.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InputStatus {
    pub id: InputId,
    pub available: bool,
}

/// Connectivity of one output at snapshot time.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct OutputStatus {
    pub destination: String,
    pub connected: bool,
}

/// Immutable snapshot of router selection and connectivity.
///
/// Recomputed whole on every evaluation, never mutated in place; change
/// detection is value equality against the previously emitted snapshot.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RouterState {
    pub forced_input: Option<InputId>,
    pub current_input: Option<InputId>,
    pub inputs: Vec<InputStatus>,
    pub outputs: Vec<OutputStatus>,
}

impl Display for RouterState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.current_input {
            Some(current) => write!(f, "routing {current}")?,
            None => write!(f, "no-input")?,
        }
        if let Some(forced) = &self.forced_input {
            write!(f, " (forced {forced})")?;
        }
        for input in &self.inputs {
            write!(
                f,
                " input {}={}",
                input.id,
                if input.available { "up" } else { "down" }
            )?;
        }
        for output in &self.outputs {
            write!(
                f,
                " output {}={}",
                output.destination,
                if output.connected {
                    "connected"
                } else {
                    "disconnected"
                }
            )?;
        }
        Ok(())
    }
}

/// Callback invoked on every distinct state transition.
///
/// Observers run on the router's evaluation path and must not block; hand
/// long-running work off to a queue or task.
pub trait StateObserver: Send + Sync {
    fn on_state(&self, state: &RouterState);
}

/// Diffs successive snapshots and fans distinct ones out to observers.
pub(crate) struct StateNotifier {
    observers: Vec<Arc<dyn StateObserver>>,
    last: Option<RouterState>,
}

impl StateNotifier {
    pub(crate) fn new() -> Self {
        Self {
            observers: Vec::new(),
            last: None,
        }
    }

    pub(crate) fn register(&mut self, observer: Arc<dyn StateObserver>) {
        self.observers.push(observer);
    }

    /// Emits `next` to every observer iff it differs from the last emitted
    /// snapshot. Returns whether a notification happened.
    pub(crate) fn update(&mut self, next: RouterState) -> bool {
        if self.last.as_ref() == Some(&next) {
            return false;
        }

        debug!(
            event = events::STATE_CHANGED,
            component = COMPONENT,
            state = %next,
            "router state changed"
        );

        for observer in &self.observers {
            observer.on_state(&next);
        }
        self.last = Some(next);
        true
    }
}
