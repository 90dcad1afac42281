//! Email delivery of the finished sentence.

use std::time::Duration;

use async_trait::async_trait;
use lettre::message::{header::ContentType, Mailbox};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::EmailConfig;
use crate::error::NotifyError;

pub const SUBJECT: &str = "New Communication Message";

/// When the sentence is cleared after a mouth-open trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClearPolicy {
    /// Clear at trigger time, whether or not the email goes out.
    Always,
    /// Clear only what was sent, once the server accepted it.
    #[default]
    OnSuccess,
}

pub fn message_body(context: &str) -> String {
    format!("New Message: {context}")
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn deliver(&self, context: &str) -> Result<(), NotifyError>;
}

/// Deliver with an upper bound on how long the attempt may take.
pub async fn deliver_within(
    notifier: &dyn Notifier,
    context: &str,
    timeout: Duration,
) -> Result<(), NotifyError> {
    tokio::time::timeout(timeout, notifier.deliver(context))
        .await
        .map_err(|_| NotifyError::Timeout(timeout))?
}

/// SMTP with STARTTLS and username/password login.
pub struct SmtpNotifier {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Mailbox,
}

impl SmtpNotifier {
    pub fn new(
        config: &EmailConfig,
        address: String,
        password: String,
    ) -> Result<Self, NotifyError> {
        if address.is_empty() || password.is_empty() {
            return Err(NotifyError::Disabled("no email credentials configured".into()));
        }

        let from: Mailbox = address.parse()?;
        let to: Mailbox = config.recipient.parse()?;

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_server)?
            .port(config.smtp_port)
            .credentials(Credentials::new(address, password))
            .timeout(Some(config.timeout()))
            .build();

        Ok(Self {
            transport,
            from,
            to,
        })
    }

    pub fn compose(&self, context: &str) -> Result<Message, NotifyError> {
        compose(self.from.clone(), self.to.clone(), context)
    }
}

pub fn compose(from: Mailbox, to: Mailbox, context: &str) -> Result<Message, NotifyError> {
    let message = Message::builder()
        .from(from)
        .to(to)
        .subject(SUBJECT)
        .header(ContentType::TEXT_PLAIN)
        .body(message_body(context))?;
    Ok(message)
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn deliver(&self, context: &str) -> Result<(), NotifyError> {
        let message = self.compose(context)?;
        self.transport.send(message).await?;
        info!(to = %self.to, "email sent");
        Ok(())
    }
}

/// Stand-in when no credentials are configured.
pub struct DisabledNotifier {
    reason: String,
}

impl DisabledNotifier {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl Notifier for DisabledNotifier {
    async fn deliver(&self, _context: &str) -> Result<(), NotifyError> {
        Err(NotifyError::Disabled(self.reason.clone()))
    }
}
