//! Content tools: remember text, answer questions from it

use crate::deadline::with_deadline;
use crate::llm::TextGenerator;
use crate::memory::ContentMemory;
use crate::tools::registry::ToolHandler;
use crate::tools::types::{SideEffect, ToolResult, ToolSchema};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

pub const STORE_CONTENT: &str = "StoreContent";
pub const ANSWER: &str = "Answer";

/// Message returned when `Answer` runs before anything was stored
pub const NO_CONTENT_MESSAGE: &str = "No content stored yet. Please provide content first.";

/// Stores the raw request text in content memory
pub struct StoreContentTool {
    schema: ToolSchema,
    memory: Arc<ContentMemory>,
}

impl StoreContentTool {
    pub fn new(memory: Arc<ContentMemory>) -> Self {
        let schema = ToolSchema::new(
            STORE_CONTENT,
            "Use ONLY when the user provides content that should be remembered for later questions.",
            "the raw content text",
            SideEffect::Write,
        )
        .with_examples([
            "Here is some content: Climate change is affecting agriculture.",
            "Save this text for later use.",
        ]);

        Self { schema, memory }
    }
}

#[async_trait]
impl ToolHandler for StoreContentTool {
    fn schema(&self) -> &ToolSchema {
        &self.schema
    }

    async fn call(&self, input: &str) -> ToolResult {
        self.memory.store(input);
        ToolResult::success(STORE_CONTENT, "Content stored successfully.")
    }
}

/// Answers a question strictly from the stored content
pub struct AnswerTool {
    schema: ToolSchema,
    memory: Arc<ContentMemory>,
    generator: Arc<dyn TextGenerator>,
    timeout: Duration,
}

impl AnswerTool {
    pub fn new(memory: Arc<ContentMemory>, generator: Arc<dyn TextGenerator>, timeout: Duration) -> Self {
        let schema = ToolSchema::new(
            ANSWER,
            "Use ONLY when the user asks a question about previously stored content.",
            "the question text",
            SideEffect::Read,
        )
        .with_examples([
            "What is climate change?",
            "Summarize the content I gave.",
            "Tell me the key points.",
        ]);

        Self {
            schema,
            memory,
            generator,
            timeout,
        }
    }
}

/// Prompt restricting the answer to the stored text
pub fn answer_prompt(content: &str, question: &str) -> String {
    format!(
        "You are a helpful assistant. Answer using ONLY the content below. \
         If the content does not contain the answer, say so.\n\n\
         Content: {}\n\nQuestion: {}\nAnswer:",
        content, question
    )
}

#[async_trait]
impl ToolHandler for AnswerTool {
    fn schema(&self) -> &ToolSchema {
        &self.schema
    }

    async fn call(&self, input: &str) -> ToolResult {
        let content = match self.memory.read() {
            Some(text) if !text.is_empty() => text,
            _ => return ToolResult::not_found(ANSWER, NO_CONTENT_MESSAGE),
        };

        let prompt = answer_prompt(&content, input);
        match with_deadline("answer generation", self.timeout, self.generator.generate(&prompt)).await {
            Ok(answer) => ToolResult::success(ANSWER, answer),
            Err(e) => {
                warn!(error = %e, "answer generation failed");
                ToolResult::error(ANSWER, format!("Failed to answer: {}", e))
            }
        }
    }
}
