//! SMTP delivery via lettre
//!
//! Implicit TLS (port 465) by default, STARTTLS when configured.

use crate::errors::{DispatchError, Result};
use crate::mail::MailTransport;
use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::info;

/// Connection settings for the SMTP relay
#[derive(Debug, Clone)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from: String,
    pub starttls: bool,
}

/// SMTP mail transport
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

fn mail_error(err: impl std::fmt::Display) -> DispatchError {
    DispatchError::Mail(err.to_string())
}

impl SmtpMailer {
    /// Build the transport; no connection is made until the first send
    pub fn new(settings: &SmtpSettings) -> Result<Self> {
        let builder = if settings.starttls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.host)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&settings.host)
        }
        .map_err(mail_error)?;

        let transport = builder
            .port(settings.port)
            .credentials(Credentials::new(
                settings.username.clone(),
                settings.password.clone(),
            ))
            .build();

        let from = settings
            .from
            .parse::<Mailbox>()
            .map_err(|e| DispatchError::Config(format!("invalid mail.from '{}': {}", settings.from, e)))?;

        Ok(Self { transport, from })
    }
}

/// Build a plain-text message
fn build_message(from: &Mailbox, recipient: &str, subject: &str, body: &str) -> Result<Message> {
    let to = recipient.parse::<Mailbox>().map_err(mail_error)?;

    Message::builder()
        .from(from.clone())
        .to(to)
        .subject(subject)
        .header(ContentType::TEXT_PLAIN)
        .body(body.to_string())
        .map_err(mail_error)
}

#[async_trait]
impl MailTransport for SmtpMailer {
    async fn send(&self, recipient: &str, subject: &str, body: &str) -> Result<()> {
        let message = build_message(&self.from, recipient, subject, body)?;
        self.transport.send(message).await.map_err(mail_error)?;
        info!(recipient = %recipient, "mail delivered");
        Ok(())
    }
}
