//! Agents and routing
//!
//! Routing state machine, the two agents and the top-level orchestrator.

pub mod state;
pub mod router;
pub mod tool_loop;
pub mod content;
pub mod employee;
pub mod orchestrator;

use crate::errors::DispatchError;
use crate::tools::{ToolResult, ToolStatus};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

// Re-export commonly used types
pub use state::{RouteEvent, RouteState};
pub use router::{decide, Decision, Fallback, Route};
pub use tool_loop::{extract_json_object, LoopMsg, ToolLoop};
pub use content::ContentAgent;
pub use employee::EmployeeAgent;
pub use orchestrator::{Collaborators, DispatchResponse, DispatchSettings, Orchestrator};

/// What an agent hands back to the orchestrator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentOutcome {
    /// Tool that produced the result, if any ran
    pub tool: Option<String>,
    pub status: ToolStatus,
    pub message: String,
}

impl AgentOutcome {
    pub fn new(tool: Option<String>, status: ToolStatus, message: impl Into<String>) -> Self {
        Self {
            tool,
            status,
            message: message.into(),
        }
    }

    /// Terminal result for an unrecognized tool label
    pub fn undecided(raw: &str) -> Self {
        Self::new(
            None,
            ToolStatus::Error,
            format!("I couldn't decide. My reasoning was: {}", raw.trim()),
        )
    }

    /// Degraded result for a routing failure
    pub fn failed(err: &DispatchError) -> Self {
        let message = match err {
            DispatchError::ClassifierUnavailable(_) => format!("Could not decide: {}", err),
            other => other.to_string(),
        };
        Self::new(None, ToolStatus::Error, message)
    }
}

impl From<ToolResult> for AgentOutcome {
    fn from(result: ToolResult) -> Self {
        Self::new(Some(result.tool), result.status, result.message)
    }
}

/// A named handler offering a bounded set of tools
#[async_trait]
pub trait Agent: Send + Sync {
    /// Label used by the orchestrator
    fn name(&self) -> &str;

    /// Description rendered into the orchestrator's decision prompt
    fn description(&self) -> &str;

    /// Handle the raw, unmodified request
    ///
    /// Never fails: every outcome becomes an `AgentOutcome`.
    async fn handle(&self, request: &str) -> AgentOutcome;
}
