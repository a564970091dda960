//! Tool execution types and structures
//!
//! Core types shared by every tool handler: the uniform result, the status
//! taxonomy and the schema used to describe a tool to the classifier.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Outcome category of a tool execution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolStatus {
    Success,
    NotFound,
    Error,
}

impl fmt::Display for ToolStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ToolStatus::Success => "success",
            ToolStatus::NotFound => "not_found",
            ToolStatus::Error => "error",
        };
        f.write_str(name)
    }
}

/// Result of tool execution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolResult {
    /// Tool name that was executed
    pub tool: String,

    /// Outcome category
    pub status: ToolStatus,

    /// Human-readable result text
    pub message: String,

    /// Execution duration in milliseconds
    pub duration_ms: u64,
}

impl ToolResult {
    /// Create result with explicit status
    pub fn new(tool: impl Into<String>, status: ToolStatus, message: impl Into<String>) -> Self {
        Self {
            tool: tool.into(),
            status,
            message: message.into(),
            duration_ms: 0,
        }
    }

    /// Create successful result
    pub fn success(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(tool, ToolStatus::Success, message)
    }

    /// Create not-found result
    pub fn not_found(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(tool, ToolStatus::NotFound, message)
    }

    /// Create failed result
    pub fn error(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(tool, ToolStatus::Error, message)
    }

    /// Attach execution duration
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration_ms = duration.as_millis() as u64;
        self
    }

    /// Whether execution was successful
    pub fn is_success(&self) -> bool {
        self.status == ToolStatus::Success
    }
}

/// External side effect a tool performs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SideEffect {
    Read,
    Write,
    Notify,
}

/// Tool schema definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSchema {
    /// Tool name (the classifier label)
    pub name: String,

    /// When the tool should be chosen
    pub description: String,

    /// Expected input shape; rendered into prompts, not enforced
    pub input_shape: String,

    /// Example requests that select this tool
    pub examples: Vec<String>,

    pub side_effect: SideEffect,
}

impl ToolSchema {
    /// Create new tool schema
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        input_shape: impl Into<String>,
        side_effect: SideEffect,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_shape: input_shape.into(),
            examples: Vec::new(),
            side_effect,
        }
    }

    /// Add example requests
    pub fn with_examples<I, S>(mut self, examples: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.examples.extend(examples.into_iter().map(Into::into));
        self
    }

    /// Render the schema as a prompt block
    pub fn render(&self) -> String {
        let mut block = format!(
            "{}: {}\n   Input: {}",
            self.name, self.description, self.input_shape
        );
        for example in &self.examples {
            block.push_str(&format!("\n   Example: \"{}\"", example));
        }
        block
    }
}
