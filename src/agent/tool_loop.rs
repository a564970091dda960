//! Tool-calling loop for the employee agent
//!
//! The model drives tool selection by replying with JSON messages:
//!
//! ```text
//! {"type": "tool_call", "tool": "FetchEmployeeField", "args": {"query": "..."}}
//! {"type": "final", "result": "..."}
//! ```
//!
//! Each tool result is appended to the transcript as an observation. A reply
//! without a JSON object is taken as the final answer. The loop stops after
//! `max_steps` tool calls.

use crate::agent::AgentOutcome;
use crate::deadline::with_deadline;
use crate::llm::TextGenerator;
use crate::tools::{ToolRegistry, ToolStatus};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Default cap on tool calls per request
pub const DEFAULT_MAX_STEPS: usize = 4;

/// Messages parsed from model output
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LoopMsg {
    /// Model requests tool execution
    ToolCall {
        tool: String,
        #[serde(default)]
        args: HashMap<String, serde_json::Value>,
    },

    /// Model is done
    Final { result: String },
}

/// Find the first complete top-level JSON object in `text`
///
/// Braces inside string literals are ignored. Returns `None` when no object
/// closes or a closing brace has no opener.
pub fn extract_json_object(text: &str) -> Option<&str> {
    let mut depth = 0i32;
    let mut start: Option<usize> = None;
    let mut in_string = false;
    let mut escape_next = false;

    for (i, ch) in text.char_indices() {
        if escape_next {
            escape_next = false;
            continue;
        }
        if ch == '\\' && in_string {
            escape_next = true;
            continue;
        }
        if ch == '"' {
            in_string = !in_string;
            continue;
        }
        if in_string {
            continue;
        }

        match ch {
            '{' => {
                if depth == 0 {
                    start = Some(i);
                }
                depth += 1;
            }
            '}' => {
                depth -= 1;
                if depth < 0 {
                    return None;
                }
                if depth == 0 {
                    if let Some(s) = start {
                        return Some(&text[s..=i]);
                    }
                }
            }
            _ => {}
        }
    }

    None
}

/// Parse a reply; `None` when it holds no valid loop message
pub fn parse_loop_msg(reply: &str) -> Option<LoopMsg> {
    let json = extract_json_object(reply)?;
    match serde_json::from_str(json) {
        Ok(msg) => Some(msg),
        Err(e) => {
            debug!(error = %e, "reply holds JSON but no loop message");
            None
        }
    }
}

/// Agentic loop over a tool registry
pub struct ToolLoop {
    registry: ToolRegistry,
    generator: Arc<dyn TextGenerator>,
    system_prompt: String,
    max_steps: usize,
    timeout: Duration,
}

impl ToolLoop {
    pub fn new(
        registry: ToolRegistry,
        generator: Arc<dyn TextGenerator>,
        system_prompt: impl Into<String>,
        max_steps: usize,
        timeout: Duration,
    ) -> Self {
        Self {
            registry,
            generator,
            system_prompt: system_prompt.into(),
            max_steps: max_steps.max(1),
            timeout,
        }
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Opening transcript: role, tool catalog, protocol, request
    pub fn initial_transcript(&self, request: &str) -> String {
        format!(
            "{system}\n\nTOOLS:\n{catalog}\n\n\
             Reply with exactly one JSON object and nothing else:\n\
             - to call a tool: {{\"type\": \"tool_call\", \"tool\": \"<tool name>\", \"args\": {{\"query\": \"<request text for the tool>\"}}}}\n\
             - to finish: {{\"type\": \"final\", \"result\": \"<answer for the user>\"}}\n\
             Only report values returned by tools.\n\n\
             User request: \"{request}\"\n",
            system = self.system_prompt,
            catalog = self.registry.render_catalog(),
            request = request,
        )
    }

    /// Run until the model finishes or the step cap is hit
    pub async fn run(&self, request: &str) -> AgentOutcome {
        let mut transcript = self.initial_transcript(request);
        let mut last_tool: Option<String> = None;
        let mut last_status = ToolStatus::Success;
        let mut steps = 0;

        loop {
            let reply = match with_deadline(
                "tool loop generation",
                self.timeout,
                self.generator.generate(&transcript),
            )
            .await
            {
                Ok(reply) => reply,
                Err(e) => {
                    warn!(error = %e, steps, "tool loop generation failed");
                    return AgentOutcome::new(last_tool, ToolStatus::Error, e.to_string());
                }
            };

            let (tool, args) = match parse_loop_msg(&reply) {
                Some(LoopMsg::Final { result }) => {
                    info!(steps, "tool loop finished");
                    return AgentOutcome::new(last_tool, last_status, result);
                }
                Some(LoopMsg::ToolCall { tool, args }) => (tool, args),
                None => {
                    info!(steps, "tool loop finished with plain text");
                    return AgentOutcome::new(last_tool, last_status, reply.trim());
                }
            };

            if steps >= self.max_steps {
                warn!(max_steps = self.max_steps, "tool loop step limit reached");
                return AgentOutcome::new(
                    last_tool,
                    ToolStatus::Error,
                    format!(
                        "Stopped after {} tool calls without a final answer.",
                        self.max_steps
                    ),
                );
            }
            steps += 1;

            let query = args
                .get("query")
                .and_then(|v| v.as_str())
                .unwrap_or(request)
                .to_string();

            let observation = match self.registry.execute(&tool, &query).await {
                Some(result) => {
                    let observation = format!(
                        "Observation from {} ({}): {}",
                        result.tool, result.status, result.message
                    );
                    last_status = result.status;
                    last_tool = Some(result.tool);
                    observation
                }
                None => format!(
                    "Observation: unknown tool '{}'. Available tools: {}",
                    tool,
                    self.registry.tool_names().join(", ")
                ),
            };

            transcript.push_str(&format!("\nAssistant: {}\n{}\n", reply.trim(), observation));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::Result;
    use crate::tools::{SideEffect, ToolHandler, ToolResult, ToolSchema};
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[test]
    fn test_extract_plain_object() {
        let text = r#"Sure: {"type":"final","result":"ok"} bye"#;
        assert_eq!(extract_json_object(text), Some(r#"{"type":"final","result":"ok"}"#));
    }

    #[test]
    fn test_extract_ignores_braces_in_strings() {
        let text = r#"{"type":"final","result":"a } b { c \" }"}"#;
        assert_eq!(extract_json_object(text), Some(text));
    }

    #[test]
    fn test_extract_nested_object() {
        let text = r#"{"type":"tool_call","tool":"T","args":{"query":"q"}}"#;
        assert_eq!(extract_json_object(text), Some(text));
    }

    #[test]
    fn test_extract_rejects_unbalanced() {
        assert_eq!(extract_json_object("} {"), None);
        assert_eq!(extract_json_object(r#"{"type":"final""#), None);
        assert_eq!(extract_json_object("no json here"), None);
    }

    #[test]
    fn test_parse_loop_messages() {
        assert_eq!(
            parse_loop_msg(r#"{"type":"final","result":"done"}"#),
            Some(LoopMsg::Final { result: "done".into() })
        );
        match parse_loop_msg(r#"{"type":"tool_call","tool":"Fetch"}"#) {
            Some(LoopMsg::ToolCall { tool, args }) => {
                assert_eq!(tool, "Fetch");
                assert!(args.is_empty());
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(parse_loop_msg(r#"{"kind":"other"}"#), None);
    }

    struct Script {
        replies: Mutex<Vec<String>>,
        transcripts: Mutex<Vec<String>>,
    }

    impl Script {
        fn new(replies: &[&str]) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies.iter().map(|r| r.to_string()).collect()),
                transcripts: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl TextGenerator for Script {
        async fn generate(&self, prompt: &str) -> Result<String> {
            self.transcripts.lock().unwrap().push(prompt.to_string());
            let mut replies = self.replies.lock().unwrap();
            if replies.len() > 1 {
                Ok(replies.remove(0))
            } else {
                Ok(replies[0].clone())
            }
        }
    }

    struct Upper {
        schema: ToolSchema,
        calls: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl ToolHandler for Upper {
        fn schema(&self) -> &ToolSchema {
            &self.schema
        }

        async fn call(&self, input: &str) -> ToolResult {
            self.calls.lock().unwrap().push(input.to_string());
            ToolResult::success("Upper", input.to_uppercase())
        }
    }

    fn tool_loop(script: Arc<Script>, max_steps: usize) -> (ToolLoop, Arc<Upper>) {
        let upper = Arc::new(Upper {
            schema: ToolSchema::new("Upper", "uppercase text", "text", SideEffect::Read),
            calls: Mutex::new(Vec::new()),
        });
        let mut registry = ToolRegistry::new();
        registry.register(upper.clone()).unwrap();
        (
            ToolLoop::new(registry, script, "You are a test agent.", max_steps, Duration::from_secs(1)),
            upper,
        )
    }

    #[tokio::test]
    async fn test_call_then_final() {
        let script = Script::new(&[
            r#"{"type":"tool_call","tool":"Upper","args":{"query":"abc"}}"#,
            r#"{"type":"final","result":"The answer is ABC"}"#,
        ]);
        let (tool_loop, upper) = tool_loop(script.clone(), 3);

        let outcome = tool_loop.run("make abc loud").await;
        assert_eq!(outcome.message, "The answer is ABC");
        assert_eq!(outcome.tool.as_deref(), Some("Upper"));
        assert_eq!(outcome.status, ToolStatus::Success);
        assert_eq!(*upper.calls.lock().unwrap(), vec!["abc"]);

        let transcripts = script.transcripts.lock().unwrap();
        assert!(transcripts[1].contains("Observation from Upper (success): ABC"));
    }

    #[tokio::test]
    async fn test_missing_query_uses_request() {
        let script = Script::new(&[r#"{"type":"tool_call","tool":"upper"}"#, "done"]);
        let (tool_loop, upper) = tool_loop(script, 3);

        let outcome = tool_loop.run("hello").await;
        assert_eq!(outcome.message, "done");
        assert_eq!(*upper.calls.lock().unwrap(), vec!["hello"]);
    }

    #[tokio::test]
    async fn test_plain_text_is_final() {
        let (tool_loop, upper) = tool_loop(Script::new(&["  Please give an employee id.  "]), 3);
        let outcome = tool_loop.run("what?").await;
        assert_eq!(outcome.message, "Please give an employee id.");
        assert_eq!(outcome.tool, None);
        assert!(upper.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_tool_is_observed() {
        let script = Script::new(&[
            r#"{"type":"tool_call","tool":"Delete","args":{"query":"x"}}"#,
            r#"{"type":"final","result":"gave up"}"#,
        ]);
        let (tool_loop, _) = tool_loop(script.clone(), 3);

        let outcome = tool_loop.run("x").await;
        assert_eq!(outcome.message, "gave up");
        assert!(script.transcripts.lock().unwrap()[1].contains("unknown tool 'Delete'"));
    }

    #[tokio::test]
    async fn test_step_limit() {
        let script = Script::new(&[r#"{"type":"tool_call","tool":"Upper","args":{"query":"again"}}"#]);
        let (tool_loop, upper) = tool_loop(script, 2);

        let outcome = tool_loop.run("loop forever").await;
        assert_eq!(outcome.status, ToolStatus::Error);
        assert!(outcome.message.contains("Stopped after 2 tool calls"));
        assert_eq!(upper.calls.lock().unwrap().len(), 2);
    }
}
