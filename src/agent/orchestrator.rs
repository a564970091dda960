//! Top-level orchestrator
//!
//! Resolves a request to one agent, hands it the unmodified request and wraps
//! the outcome in `{agent, result, status}`. An unrecognized agent label
//! falls back to the first registered agent.

use crate::agent::content::ContentAgent;
use crate::agent::employee::EmployeeAgent;
use crate::agent::router::{decide, Decision, Fallback, Route};
use crate::agent::state::RouteEvent;
use crate::agent::tool_loop::DEFAULT_MAX_STEPS;
use crate::agent::{Agent, AgentOutcome};
use crate::errors::{DispatchError, Result};
use crate::llm::classifier::DEFAULT_CLASSIFY_TIMEOUT;
use crate::llm::{Classifier, RetryManager, TextGenerator};
use crate::mail::MailTransport;
use crate::memory::ContentMemory;
use crate::storage::EmployeeStore;
use crate::tools::{ToolStatus, DEFAULT_SUBJECT};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

/// Agent name reported when routing itself failed
pub const NO_AGENT: &str = "none";

/// Response returned for every request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchResponse {
    pub agent: String,
    pub result: String,
    pub status: ToolStatus,
}

/// Deadlines and limits for the standard pipeline
#[derive(Debug, Clone)]
pub struct DispatchSettings {
    pub classify_timeout: Duration,
    pub classify_attempts: u32,
    pub retry_base_delay_ms: u64,
    pub generation_timeout: Duration,
    pub db_timeout: Duration,
    pub mail_timeout: Duration,
    pub mail_subject: String,
    pub max_tool_steps: usize,
}

impl Default for DispatchSettings {
    fn default() -> Self {
        Self {
            classify_timeout: DEFAULT_CLASSIFY_TIMEOUT,
            classify_attempts: 2,
            retry_base_delay_ms: 250,
            generation_timeout: Duration::from_secs(60),
            db_timeout: Duration::from_secs(5),
            mail_timeout: Duration::from_secs(30),
            mail_subject: DEFAULT_SUBJECT.to_string(),
            max_tool_steps: DEFAULT_MAX_STEPS,
        }
    }
}

/// External collaborators the standard pipeline is built over
#[derive(Clone)]
pub struct Collaborators {
    pub generator: Arc<dyn TextGenerator>,
    pub store: Arc<dyn EmployeeStore>,
    pub mailer: Arc<dyn MailTransport>,
    pub memory: Arc<ContentMemory>,
}

pub struct Orchestrator {
    agents: Vec<Arc<dyn Agent>>,
    classifier: Classifier,
}

impl Orchestrator {
    /// Empty orchestrator; the first registered agent becomes the default
    pub fn new(classifier: Classifier) -> Self {
        Self {
            agents: Vec::new(),
            classifier,
        }
    }

    /// ContentAgent (default) followed by EmployeeAgent
    pub fn standard(collaborators: Collaborators, settings: &DispatchSettings) -> Result<Self> {
        let classifier = Classifier::with_config(
            collaborators.generator.clone(),
            RetryManager::with_config(settings.classify_attempts, settings.retry_base_delay_ms),
            settings.classify_timeout,
        );

        let content = ContentAgent::new(
            classifier.clone(),
            collaborators.memory,
            collaborators.generator.clone(),
            collaborators.mailer,
            &settings.mail_subject,
            settings.generation_timeout,
            settings.mail_timeout,
        )?;
        let employee = EmployeeAgent::new(
            collaborators.generator,
            collaborators.store,
            settings.db_timeout,
            settings.generation_timeout,
            settings.max_tool_steps,
        )?;

        let mut orchestrator = Self::new(classifier);
        orchestrator.register(Arc::new(content))?;
        orchestrator.register(Arc::new(employee))?;
        Ok(orchestrator)
    }

    /// Register an agent; names must be unique
    pub fn register(&mut self, agent: Arc<dyn Agent>) -> Result<()> {
        if self.agent(agent.name()).is_some() {
            return Err(DispatchError::Config(format!(
                "agent '{}' registered twice",
                agent.name()
            )));
        }
        self.agents.push(agent);
        Ok(())
    }

    pub fn agent(&self, name: &str) -> Option<&Arc<dyn Agent>> {
        self.agents
            .iter()
            .find(|agent| agent.name().eq_ignore_ascii_case(name))
    }

    /// Agent names in registration order
    pub fn agent_names(&self) -> Vec<String> {
        self.agents.iter().map(|agent| agent.name().to_string()).collect()
    }

    /// Agent-selection prompt
    pub fn decision_prompt(&self, request: &str) -> String {
        let catalog = self
            .agents
            .iter()
            .map(|agent| format!("- {}: {}", agent.name(), agent.description()))
            .collect::<Vec<_>>()
            .join("\n");
        let names = self
            .agent_names()
            .iter()
            .map(|name| format!("\"{}\"", name))
            .collect::<Vec<_>>()
            .join(" or ");

        format!(
            "You are an orchestrator AI.\n\
             Choose the best agent for the user task.\n\n\
             Available agents:\n{}\n\n\
             User prompt: \"{}\"\n\n\
             Rules:\n\
             - Reply with exactly one agent name: {}.",
            catalog, request, names
        )
    }

    /// Dispatch one request end to end
    pub async fn run(&self, prompt: &str) -> DispatchResponse {
        let request_id = Uuid::new_v4();
        let span = info_span!("dispatch", request_id = %request_id);

        async {
            info!(prompt = %prompt, "request received");
            let response = match self.route(prompt).await {
                Ok(response) => response,
                Err(e) => {
                    let outcome = AgentOutcome::failed(&e);
                    DispatchResponse {
                        agent: NO_AGENT.to_string(),
                        result: outcome.message,
                        status: outcome.status,
                    }
                }
            };
            info!(agent = %response.agent, status = %response.status, "request finished");
            response
        }
        .instrument(span)
        .await
    }

    async fn route(&self, prompt: &str) -> Result<DispatchResponse> {
        let default = self
            .agents
            .first()
            .ok_or_else(|| DispatchError::Config("no agents registered".to_string()))?
            .name()
            .to_string();

        let mut route = Route::new("orchestrator");
        let decision = decide(
            &self.classifier,
            &self.decision_prompt(prompt),
            &self.agent_names(),
            &Fallback::Default(default),
        )
        .await?;

        let label = match decision {
            Decision::Resolved { label, defaulted } => {
                info!(agent = %label, defaulted, "agent selected");
                label
            }
            // The top level always carries a default
            Decision::Undecided { raw } => {
                return Err(DispatchError::ClassifierUnavailable(format!(
                    "no agent for reply '{}'",
                    raw.trim()
                )))
            }
        };
        route.advance(RouteEvent::LabelResolved)?;

        let agent = self
            .agent(&label)
            .ok_or_else(|| DispatchError::Config(format!("agent '{}' is not registered", label)))?;
        let outcome = agent.handle(prompt).await;
        route.advance(RouteEvent::HandlerFinished)?;

        Ok(DispatchResponse {
            agent: agent.name().to_string(),
            result: outcome.message,
            status: outcome.status,
        })
    }
}
