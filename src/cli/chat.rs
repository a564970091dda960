//! Interactive console using rustyline
//!
//! `exit` / `quit` end the session, `/reset` clears content memory.

use crate::agent::content::CONTENT_AGENT;
use crate::agent::employee::EMPLOYEE_AGENT;
use crate::agent::Orchestrator;
use crate::cli::args::ChatTarget;
use crate::memory::ContentMemory;
use crate::tools::ToolStatus;
use anyhow::{Context, Result};
use colored::*;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::path::PathBuf;
use std::sync::Arc;

/// Parsed console line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatLine {
    Exit,
    Reset,
    Empty,
    Request(String),
}

impl ChatLine {
    pub fn parse(line: &str) -> Self {
        let trimmed = line.trim();
        match trimmed.to_lowercase().as_str() {
            "" => ChatLine::Empty,
            "exit" | "quit" | "/exit" | "/quit" => ChatLine::Exit,
            "/reset" => ChatLine::Reset,
            _ => ChatLine::Request(trimmed.to_string()),
        }
    }
}

/// Console session over one orchestrator
pub struct ChatSession {
    editor: DefaultEditor,
    history_path: Option<PathBuf>,
    orchestrator: Arc<Orchestrator>,
    memory: Arc<ContentMemory>,
    target: ChatTarget,
}

impl ChatSession {
    pub fn new(
        orchestrator: Arc<Orchestrator>,
        memory: Arc<ContentMemory>,
        target: ChatTarget,
        history_path: Option<PathBuf>,
    ) -> Result<Self> {
        let mut editor = DefaultEditor::new().context("Failed to initialize line editor")?;
        if let Some(path) = &history_path {
            if path.exists() {
                let _ = editor.load_history(path);
            }
        }

        Ok(Self {
            editor,
            history_path,
            orchestrator,
            memory,
            target,
        })
    }

    fn prompt(&self) -> &'static str {
        match self.target {
            ChatTarget::All => "You: ",
            ChatTarget::Content => "You (content): ",
            ChatTarget::Employee => "You (employee): ",
        }
    }

    /// Read-dispatch loop until exit or EOF
    pub async fn run(&mut self) -> Result<()> {
        println!(
            "Type a request ({} clears stored content, {} to quit)\n",
            "/reset".green(),
            "exit".green()
        );

        let prompt = self.prompt();
        loop {
            let line = match self.editor.readline(prompt) {
                Ok(line) => line,
                Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
                Err(e) => return Err(e).context("Readline error"),
            };

            match ChatLine::parse(&line) {
                ChatLine::Empty => continue,
                ChatLine::Exit => break,
                ChatLine::Reset => {
                    self.memory.reset();
                    println!("{}", "Stored content cleared.".dimmed());
                }
                ChatLine::Request(request) => {
                    let _ = self.editor.add_history_entry(request.as_str());
                    let (agent, status, result) = self.dispatch(&request).await;
                    let label = match status {
                        ToolStatus::Success => agent.green(),
                        ToolStatus::NotFound => agent.yellow(),
                        ToolStatus::Error => agent.red(),
                    };
                    println!("{} {}\n", format!("[{}]", label).bold(), result);
                }
            }
        }

        if let Some(path) = &self.history_path {
            let _ = self.editor.save_history(path);
        }
        println!("Agent stopped.");
        Ok(())
    }

    async fn dispatch(&self, request: &str) -> (String, ToolStatus, String) {
        let direct = match self.target {
            ChatTarget::All => None,
            ChatTarget::Content => Some(CONTENT_AGENT),
            ChatTarget::Employee => Some(EMPLOYEE_AGENT),
        };

        match direct.and_then(|name| self.orchestrator.agent(name)) {
            Some(agent) => {
                let outcome = agent.handle(request).await;
                (agent.name().to_string(), outcome.status, outcome.message)
            }
            None => {
                let response = self.orchestrator.run(request).await;
                (response.agent, response.status, response.result)
            }
        }
    }
}
