//! Routing state machine
//!
//! Every routing decision, at either level, walks the same three states:
//! - Deciding: a label is being resolved
//! - Executing: the resolved handler runs on the unmodified request
//! - Done: terminal, accepts no further events
//!
//! There are no retries and no backtracking between states.

use crate::errors::{DispatchError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Router states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RouteState {
    /// Resolving a label
    Deciding,

    /// Running the resolved handler
    Executing,

    /// Result is available (terminal)
    Done,
}

/// Events that trigger state transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteEvent {
    /// A label was recognized or defaulted
    LabelResolved,

    /// No label and no default: terminate with a "could not decide" result
    Undecided,

    /// The handler returned its result
    HandlerFinished,
}

impl RouteState {
    /// Check if this is a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(self, RouteState::Done)
    }

    /// Attempt state transition
    ///
    /// Valid transitions:
    /// 1. Deciding  → Executing (on: LabelResolved)
    /// 2. Deciding  → Done      (on: Undecided)
    /// 3. Executing → Done      (on: HandlerFinished)
    pub fn transition(&self, event: RouteEvent) -> Result<RouteState> {
        use RouteEvent::*;
        use RouteState::*;

        match (self, event) {
            (Deciding, LabelResolved) => Ok(Executing),
            (Deciding, Undecided) => Ok(Done),
            (Executing, HandlerFinished) => Ok(Done),
            (from, event) => Err(DispatchError::InvalidTransition {
                from: format!("{:?}", from),
                event: format!("{:?}", event),
                reason: if from.is_terminal() {
                    "Done is terminal".to_string()
                } else {
                    format!("No valid transition from {:?} on {:?}", from, event)
                },
            }),
        }
    }

    /// Get all valid events from this state
    pub fn valid_events(&self) -> Vec<RouteEvent> {
        match self {
            RouteState::Deciding => vec![RouteEvent::LabelResolved, RouteEvent::Undecided],
            RouteState::Executing => vec![RouteEvent::HandlerFinished],
            RouteState::Done => vec![],
        }
    }
}

impl fmt::Display for RouteState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RouteState::Deciding => "deciding",
            RouteState::Executing => "executing",
            RouteState::Done => "done",
        };
        f.write_str(name)
    }
}
