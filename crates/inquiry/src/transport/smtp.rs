use std::time::Duration;

use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use tracing::{debug, warn};
use vercup_config::MailConfig;

use super::{MailCredentials, MailTransport, TransportError};
use crate::entities::EmailNotification;

/// STARTTLS SMTP delivery. Opens one authenticated session per message.
#[derive(Debug, Clone)]
pub struct SmtpMailTransport {
    host: String,
    port: u16,
    timeout: Duration,
}

impl SmtpMailTransport {
    pub fn new(host: impl Into<String>, port: u16, timeout: Duration) -> Self {
        Self {
            host: host.into(),
            port,
            timeout,
        }
    }

    pub fn from_config(config: &MailConfig) -> Self {
        Self::new(
            config.smtp_host.clone(),
            config.smtp_port,
            Duration::from_secs(config.timeout_seconds),
        )
    }

    fn build_message(notification: &EmailNotification) -> Result<Message, TransportError> {
        let from: Mailbox = notification
            .sender
            .parse()
            .map_err(|error| TransportError::new(format!("invalid sender address: {error}")))?;
        let to: Mailbox = notification
            .recipient
            .parse()
            .map_err(|error| TransportError::new(format!("invalid recipient address: {error}")))?;

        let mut builder = Message::builder()
            .from(from)
            .to(to)
            .subject(notification.subject.clone())
            .header(ContentType::TEXT_PLAIN);

        // Visitor addresses are not validated upstream; an unparsable one only loses Reply-To.
        if let Some(reply_to) = &notification.reply_to {
            match reply_to.parse::<Mailbox>() {
                Ok(mailbox) => builder = builder.reply_to(mailbox),
                Err(error) => debug!(%error, "skipping unparsable reply-to address"),
            }
        }

        builder
            .body(notification.body.clone())
            .map_err(|error| TransportError::new(format!("failed to build message: {error}")))
    }
}

#[async_trait]
impl MailTransport for SmtpMailTransport {
    async fn send(
        &self,
        credentials: &MailCredentials,
        notification: &EmailNotification,
    ) -> Result<(), TransportError> {
        let message = Self::build_message(notification)?;

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.host)
            .map_err(|error| TransportError::new(error.to_string()))?
            .port(self.port)
            .timeout(Some(self.timeout))
            .credentials(Credentials::new(
                credentials.username.clone(),
                credentials.password.clone(),
            ))
            .build();

        debug!(host = %self.host, port = self.port, "opening smtp session");

        mailer.send(message).await.map(|_| ()).map_err(|error| {
            warn!(host = %self.host, %error, "smtp delivery failed");
            TransportError::new(error.to_string())
        })
    }
}
