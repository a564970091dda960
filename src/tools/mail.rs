//! Mail tool: "send email to <address> with message <text>"
//!
//! Split-based parsing, not a general email grammar. The first
//! "with message" separates the message; the first whole-word "to" before it
//! introduces the recipient.

use crate::deadline::with_deadline;
use crate::mail::MailTransport;
use crate::tools::registry::ToolHandler;
use crate::tools::types::{SideEffect, ToolResult, ToolSchema};
use async_trait::async_trait;
use regex::Regex;
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use tracing::warn;

pub const SEND_MAIL: &str = "SendMail";

/// Default subject line for outgoing mail
pub const DEFAULT_SUBJECT: &str = "AI Agent Message";

pub const MAIL_FORMAT_HINT: &str =
    "Invalid email input format. Example: send email to test@example.com with message Hello";

const MESSAGE_CONNECTIVE: &str = "with message";

/// Parsed mail request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailRequest {
    pub recipient: String,
    pub message: String,
}

fn recipient_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?i)\bto\s+(\S+)").expect("valid recipient pattern"))
}

/// Parse recipient and message out of the raw request
pub fn parse_mail_request(input: &str) -> Option<MailRequest> {
    // ASCII folding keeps byte offsets aligned with `input`
    let split_at = input.to_ascii_lowercase().find(MESSAGE_CONNECTIVE)?;
    let head = &input[..split_at];
    let message = input[split_at + MESSAGE_CONNECTIVE.len()..].trim();

    let recipient = recipient_pattern()
        .captures(head)?
        .get(1)?
        .as_str()
        .trim_end_matches(|c: char| matches!(c, ',' | ';' | ':'));

    if message.is_empty() || !recipient.contains('@') {
        return None;
    }

    Some(MailRequest {
        recipient: recipient.to_string(),
        message: message.to_string(),
    })
}

/// Sends a plain-text email through the mail transport
pub struct SendMailTool {
    schema: ToolSchema,
    transport: Arc<dyn MailTransport>,
    subject: String,
    timeout: Duration,
}

impl SendMailTool {
    pub fn new(transport: Arc<dyn MailTransport>, subject: impl Into<String>, timeout: Duration) -> Self {
        let schema = ToolSchema::new(
            SEND_MAIL,
            "Use ONLY when the user wants to send an email.",
            "a recipient email address and a message body",
            SideEffect::Notify,
        )
        .with_examples([
            "Send email to test@example.com with message Hello, how are you?",
            "Mail sujoy@example.com with message Your meeting is tomorrow.",
        ]);

        Self {
            schema,
            transport,
            subject: subject.into(),
            timeout,
        }
    }
}

#[async_trait]
impl ToolHandler for SendMailTool {
    fn schema(&self) -> &ToolSchema {
        &self.schema
    }

    async fn call(&self, input: &str) -> ToolResult {
        let request = match parse_mail_request(input) {
            Some(request) => request,
            None => return ToolResult::error(SEND_MAIL, MAIL_FORMAT_HINT),
        };

        let delivery = self
            .transport
            .send(&request.recipient, &self.subject, &request.message);

        match with_deadline("mail delivery", self.timeout, delivery).await {
            Ok(()) => ToolResult::success(
                SEND_MAIL,
                format!("Email successfully sent to {}", request.recipient),
            ),
            Err(e) => {
                warn!(recipient = %request.recipient, error = %e, "mail delivery failed");
                ToolResult::error(SEND_MAIL, format!("Failed to send email: {}", e))
            }
        }
    }
}
