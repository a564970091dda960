//! Mail transport collaborator

pub mod smtp;

pub use smtp::{SmtpMailer, SmtpSettings};

use crate::errors::Result;
use async_trait::async_trait;

/// Outbound mail transport
#[async_trait]
pub trait MailTransport: Send + Sync {
    /// Deliver one plain-text message; failure carries the transport reason
    async fn send(&self, recipient: &str, subject: &str, body: &str) -> Result<()>;
}
