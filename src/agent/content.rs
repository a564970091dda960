//! Content agent: store content, answer from it, send mail
//!
//! Routes with the classifier and has no default tool. An unrecognized label
//! ends the request with the raw classifier text.

use crate::agent::router::{decide, Decision, Fallback, Route};
use crate::agent::state::RouteEvent;
use crate::agent::{Agent, AgentOutcome};
use crate::errors::{DispatchError, Result};
use crate::llm::{Classifier, TextGenerator};
use crate::mail::MailTransport;
use crate::memory::ContentMemory;
use crate::tools::{AnswerTool, SendMailTool, StoreContentTool, ToolRegistry};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

pub const CONTENT_AGENT: &str = "ContentAgent";

const DESCRIPTION: &str = "Multi-purpose assistant. Stores user-provided content in memory, \
answers questions strictly from the stored content, and sends emails. Use it for storing \
or reading content, questions about stored content, or sending email.";

pub struct ContentAgent {
    registry: ToolRegistry,
    classifier: Classifier,
}

impl ContentAgent {
    /// Agent with the StoreContent, SendMail and Answer tools
    pub fn new(
        classifier: Classifier,
        memory: Arc<ContentMemory>,
        generator: Arc<dyn TextGenerator>,
        mailer: Arc<dyn MailTransport>,
        mail_subject: &str,
        answer_timeout: Duration,
        mail_timeout: Duration,
    ) -> Result<Self> {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(StoreContentTool::new(memory.clone())))?;
        registry.register(Arc::new(SendMailTool::new(mailer, mail_subject, mail_timeout)))?;
        registry.register(Arc::new(AnswerTool::new(memory, generator, answer_timeout)))?;
        Ok(Self::with_registry(classifier, registry))
    }

    pub fn with_registry(classifier: Classifier, registry: ToolRegistry) -> Self {
        Self {
            registry,
            classifier,
        }
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Tool-selection prompt
    pub fn decision_prompt(&self, request: &str) -> String {
        let names = self.registry.tool_names().join(", ");
        format!(
            "You are an AI agent with {count} tools.\n\
             Always select the correct tool for the user's request.\n\n\
             TOOLS:\n{catalog}\n\n\
             IMPORTANT RULES:\n\
             - If the user gives content, pick the tool that stores it.\n\
             - If the user mentions email or mail, pick the mail tool.\n\
             - If the user asks a question, pick the tool that answers it.\n\
             - Never answer directly. Always pick one tool.\n\
             - Output only the tool name ({names}).\n\n\
             User request: \"{request}\"\n\
             Which tool should be used?",
            count = self.registry.len(),
            catalog = self.registry.render_catalog(),
            names = names,
            request = request,
        )
    }

    async fn route(&self, request: &str) -> Result<AgentOutcome> {
        let mut route = Route::new(CONTENT_AGENT);
        let labels = self.registry.tool_names();
        let prompt = self.decision_prompt(request);

        let label = match decide(&self.classifier, &prompt, &labels, &Fallback::Undecided).await? {
            Decision::Resolved { label, .. } => label,
            Decision::Undecided { raw } => {
                route.advance(RouteEvent::Undecided)?;
                info!(agent = CONTENT_AGENT, raw = %raw.trim(), "no tool decided");
                return Ok(AgentOutcome::undecided(&raw));
            }
        };

        route.advance(RouteEvent::LabelResolved)?;
        info!(agent = CONTENT_AGENT, tool = %label, "tool selected");

        let result = self
            .registry
            .execute(&label, request)
            .await
            .ok_or_else(|| DispatchError::Config(format!("tool '{}' is not registered", label)))?;

        route.advance(RouteEvent::HandlerFinished)?;
        Ok(result.into())
    }
}

#[async_trait]
impl Agent for ContentAgent {
    fn name(&self) -> &str {
        CONTENT_AGENT
    }

    fn description(&self) -> &str {
        DESCRIPTION
    }

    async fn handle(&self, request: &str) -> AgentOutcome {
        match self.route(request).await {
            Ok(outcome) => outcome,
            Err(e) => AgentOutcome::failed(&e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::RetryManager;
    use crate::tools::{ToolStatus, ANSWER, STORE_CONTENT};
    use std::sync::Mutex;

    /// Replies from a script; the last reply repeats
    struct Script {
        replies: Mutex<Vec<String>>,
        prompts: Mutex<Vec<String>>,
    }

    impl Script {
        fn new(replies: &[&str]) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies.iter().map(|r| r.to_string()).collect()),
                prompts: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl TextGenerator for Script {
        async fn generate(&self, prompt: &str) -> Result<String> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            let mut replies = self.replies.lock().unwrap();
            if replies.len() > 1 {
                Ok(replies.remove(0))
            } else {
                Ok(replies[0].clone())
            }
        }
    }

    struct NoMail;

    #[async_trait]
    impl MailTransport for NoMail {
        async fn send(&self, _recipient: &str, _subject: &str, _body: &str) -> Result<()> {
            Err(DispatchError::Mail("not configured".into()))
        }
    }

    fn agent(script: Arc<Script>, memory: Arc<ContentMemory>) -> ContentAgent {
        let classifier = Classifier::with_config(
            script.clone(),
            RetryManager::with_config(1, 1),
            Duration::from_secs(1),
        );
        ContentAgent::new(
            classifier,
            memory,
            script,
            Arc::new(NoMail),
            "subject",
            Duration::from_secs(1),
            Duration::from_secs(1),
        )
        .unwrap()
    }

    #[test]
    fn test_decision_prompt_lists_tools_in_order() {
        let agent = agent(Script::new(&["x"]), ContentMemory::shared());
        let prompt = agent.decision_prompt("hello");
        let store = prompt.find("1. StoreContent").unwrap();
        let mail = prompt.find("2. SendMail").unwrap();
        let answer = prompt.find("3. Answer").unwrap();
        assert!(store < mail && mail < answer);
        assert!(prompt.contains("User request: \"hello\""));
    }

    #[tokio::test]
    async fn test_store_then_answer() {
        let memory = ContentMemory::shared();
        let script = Script::new(&["StoreContent", "Answer", "It hurts crops."]);
        let agent = agent(script.clone(), memory.clone());

        let stored = agent.handle("Climate change is affecting agriculture.").await;
        assert_eq!(stored.tool.as_deref(), Some(STORE_CONTENT));
        assert_eq!(memory.read().as_deref(), Some("Climate change is affecting agriculture."));

        let answered = agent.handle("What is climate change?").await;
        assert_eq!(answered.tool.as_deref(), Some(ANSWER));
        assert_eq!(answered.message, "It hurts crops.");
    }

    #[tokio::test]
    async fn test_unrecognized_label_is_terminal() {
        let memory = ContentMemory::shared();
        let agent = agent(Script::new(&["I would rather chat"]), memory.clone());

        let outcome = agent.handle("asdkjh qwe").await;
        assert_eq!(outcome.tool, None);
        assert_eq!(outcome.status, ToolStatus::Error);
        assert_eq!(outcome.message, "I couldn't decide. My reasoning was: I would rather chat");
        assert!(memory.is_empty());
    }
}
