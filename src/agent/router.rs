//! Shared decide policy for both routing levels
//!
//! The two levels differ only in their fallback: the top level substitutes a
//! default label, the content agent terminates undecided.

use crate::agent::state::{RouteEvent, RouteState};
use crate::errors::Result;
use crate::llm::{Classifier, Label};
use tracing::{debug, info};

/// What to do with an unrecognized label
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fallback {
    /// Substitute this label
    Default(String),

    /// Terminate with a "could not decide" result
    Undecided,
}

/// Outcome of the Deciding state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// A label to execute; `defaulted` is set when the fallback supplied it
    Resolved { label: String, defaulted: bool },

    /// No label; carries the raw classifier text
    Undecided { raw: String },
}

/// One pass through the routing state machine
#[derive(Debug)]
pub struct Route {
    level: &'static str,
    state: RouteState,
}

impl Route {
    /// Start in `Deciding`
    pub fn new(level: &'static str) -> Self {
        Self {
            level,
            state: RouteState::Deciding,
        }
    }

    pub fn state(&self) -> RouteState {
        self.state
    }

    /// Apply an event, logging the transition
    pub fn advance(&mut self, event: RouteEvent) -> Result<RouteState> {
        let next = self.state.transition(event)?;
        debug!(level = self.level, from = %self.state, to = %next, event = ?event, "route transition");
        self.state = next;
        Ok(next)
    }
}

/// Resolve a label, applying the fallback to unrecognized replies
///
/// Transport failures propagate as `ClassifierUnavailable`; they are never
/// replaced by the default.
pub async fn decide(
    classifier: &Classifier,
    prompt: &str,
    labels: &[String],
    fallback: &Fallback,
) -> Result<Decision> {
    let decision = match classifier.classify(prompt, labels).await? {
        Label::Recognized(label) => Decision::Resolved {
            label,
            defaulted: false,
        },
        Label::Unrecognized(raw) => match fallback {
            Fallback::Default(label) => {
                info!(raw = %raw.trim(), default = %label, "unrecognized label, using default");
                Decision::Resolved {
                    label: label.clone(),
                    defaulted: true,
                }
            }
            Fallback::Undecided => Decision::Undecided { raw },
        },
    };
    Ok(decision)
}
