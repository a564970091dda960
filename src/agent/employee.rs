//! Employee agent: HR database assistant
//!
//! Does not run its own Deciding state. Tool selection is delegated to the
//! tool loop and the loop's final text is passed through unchanged.

use crate::agent::tool_loop::ToolLoop;
use crate::agent::{Agent, AgentOutcome};
use crate::errors::Result;
use crate::llm::TextGenerator;
use crate::storage::EmployeeStore;
use crate::tools::{FetchEmployeeFieldTool, ToolRegistry, UpdateEmployeeFieldTool};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

pub const EMPLOYEE_AGENT: &str = "EmployeeAgent";

const DESCRIPTION: &str = "HR database assistant for employee management. Fetches employee \
details (id, name, office, address, experience, phone number, skill set) and updates employee \
records. Use it for employee data lookups or updates.";

const SYSTEM_PROMPT: &str = "You are EmployeeAgent, an HR database assistant.\n\
- If the user asks for existing employee details, call FetchEmployeeField.\n\
- If the user requests a change or update, call UpdateEmployeeField.\n\
- Pass the user's wording as the query; the tools extract field, identifier and value.\n\
- Never guess values. Only report results returned by the tools.\n\
- If unsure, ask the user for clarification in the final result.";

pub struct EmployeeAgent {
    tool_loop: ToolLoop,
}

impl EmployeeAgent {
    /// Agent with the FetchEmployeeField and UpdateEmployeeField tools
    pub fn new(
        generator: Arc<dyn TextGenerator>,
        store: Arc<dyn EmployeeStore>,
        db_timeout: Duration,
        generation_timeout: Duration,
        max_steps: usize,
    ) -> Result<Self> {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(FetchEmployeeFieldTool::new(store.clone(), db_timeout)))?;
        registry.register(Arc::new(UpdateEmployeeFieldTool::new(store, db_timeout)))?;

        Ok(Self {
            tool_loop: ToolLoop::new(registry, generator, SYSTEM_PROMPT, max_steps, generation_timeout),
        })
    }

    pub fn tool_loop(&self) -> &ToolLoop {
        &self.tool_loop
    }
}

#[async_trait]
impl Agent for EmployeeAgent {
    fn name(&self) -> &str {
        EMPLOYEE_AGENT
    }

    fn description(&self) -> &str {
        DESCRIPTION
    }

    async fn handle(&self, request: &str) -> AgentOutcome {
        info!(agent = EMPLOYEE_AGENT, "delegating to tool loop");
        self.tool_loop.run(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{Employee, SqliteEmployeeStore};
    use crate::tools::{ToolStatus, FETCH_EMPLOYEE_FIELD};
    use std::sync::Mutex;

    struct Script(Mutex<Vec<String>>);

    #[async_trait]
    impl TextGenerator for Script {
        async fn generate(&self, _prompt: &str) -> Result<String> {
            Ok(self.0.lock().unwrap().remove(0))
        }
    }

    #[tokio::test]
    async fn test_final_text_passes_through() {
        let store = SqliteEmployeeStore::in_memory().unwrap();
        let mut sunita = Employee::new(2, "Sunita");
        sunita.office = Some("Kolkata".into());
        store.insert(&sunita).unwrap();

        let script = Script(Mutex::new(vec![
            r#"{"type":"tool_call","tool":"FetchEmployeeField","args":{"query":"office of employee id 2"}}"#.to_string(),
            r#"{"type":"final","result":"Sunita works from the Kolkata office."}"#.to_string(),
        ]));
        let agent = EmployeeAgent::new(
            Arc::new(script),
            Arc::new(store),
            Duration::from_secs(1),
            Duration::from_secs(1),
            3,
        )
        .unwrap();

        let outcome = agent.handle("Where does employee 2 sit?").await;
        assert_eq!(outcome.message, "Sunita works from the Kolkata office.");
        assert_eq!(outcome.tool.as_deref(), Some(FETCH_EMPLOYEE_FIELD));
        assert_eq!(outcome.status, ToolStatus::Success);
    }

    #[test]
    fn test_registry_holds_both_tools() {
        let agent = EmployeeAgent::new(
            Arc::new(Script(Mutex::new(vec![]))),
            Arc::new(SqliteEmployeeStore::in_memory().unwrap()),
            Duration::from_secs(1),
            Duration::from_secs(1),
            3,
        )
        .unwrap();
        assert_eq!(
            agent.tool_loop().registry().tool_names(),
            vec!["FetchEmployeeField", "UpdateEmployeeField"]
        );
    }
}
