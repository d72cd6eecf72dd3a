//! Inquiry notifier: turns a validated inquiry into one delivered email.

use std::sync::Arc;

use tracing::{info, warn};
use vercup_config::MailConfig;

use crate::entities::{EmailNotification, InquiryForm, InquiryRequest};
use crate::transport::{MailCredentials, MailTransport};
use crate::types::{InquiryError, InquiryResult};

/// Sender credentials and recipient, resolved from configuration.
struct Mailboxes {
    credentials: MailCredentials,
    recipient: String,
}

/// Emails inquiries to the configured recipient.
///
/// Each call makes at most one delivery attempt. Missing configuration is
/// reported before the transport is touched.
pub struct InquiryNotifier {
    config: MailConfig,
    transport: Arc<dyn MailTransport>,
}

impl InquiryNotifier {
    pub fn new(config: &MailConfig, transport: Arc<dyn MailTransport>) -> Self {
        Self {
            config: config.clone(),
            transport,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.config.is_complete()
    }

    fn mailboxes(&self) -> InquiryResult<Mailboxes> {
        let present = |value: &Option<String>| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(str::to_string)
        };

        let sender = present(&self.config.sender);
        let password = present(&self.config.password);
        let receiver = present(&self.config.receiver);

        match (sender, password, receiver) {
            (Some(username), Some(password), Some(recipient)) => Ok(Mailboxes {
                credentials: MailCredentials { username, password },
                recipient,
            }),
            (sender, password, receiver) => {
                let missing: Vec<&str> = [
                    ("EMAIL_SENDER", sender.is_none()),
                    ("EMAIL_PASSWORD", password.is_none()),
                    ("EMAIL_RECEIVER", receiver.is_none()),
                ]
                .into_iter()
                .filter_map(|(name, absent)| absent.then_some(name))
                .collect();
                Err(InquiryError::configuration(missing.join(", ")))
            }
        }
    }

    /// Send the notification email for an already validated inquiry.
    pub async fn notify(&self, request: &InquiryRequest) -> InquiryResult<()> {
        let mailboxes = self.mailboxes().inspect_err(|error| {
            warn!(%error, "inquiry notifier is not configured");
        })?;

        let notification = EmailNotification::compose(
            request,
            mailboxes.credentials.username.clone(),
            mailboxes.recipient,
        );

        self.transport
            .send(&mailboxes.credentials, &notification)
            .await
            .map_err(|error| {
                warn!(category = request.category().as_str(), %error, "failed to deliver inquiry");
                InquiryError::from(error)
            })?;

        info!(category = request.category().as_str(), "inquiry delivered");
        Ok(())
    }

    /// Validate a raw submission and, if it is complete, email it.
    ///
    /// Returns the validated request so callers can address the visitor by name.
    pub async fn submit(&self, form: InquiryForm) -> InquiryResult<InquiryRequest> {
        let request = form.validate()?;
        self.notify(&request).await?;
        Ok(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::InquiryCategory;
    use crate::transport::{MockMailTransport, TransportError};

    fn complete_config() -> MailConfig {
        MailConfig {
            sender: Some("vercup@gmail.com".to_string()),
            password: Some("app-password".to_string()),
            receiver: Some("team@vercup.kr".to_string()),
            ..MailConfig::default()
        }
    }

    fn form() -> InquiryForm {
        InquiryForm {
            name: "Hong Gildong".to_string(),
            sender_email: "x@y.com".to_string(),
            category: Some(InquiryCategory::SampleRequest),
            message: "Please send a sample".to_string(),
        }
    }

    #[tokio::test]
    async fn submit_sends_exactly_one_email() {
        let mut transport = MockMailTransport::new();
        transport
            .expect_send()
            .withf(|credentials, mail| {
                credentials.username == "vercup@gmail.com"
                    && credentials.password == "app-password"
                    && mail.recipient == "team@vercup.kr"
                    && mail.subject.contains("Hong Gildong")
                    && mail.subject.contains("Sample Request")
            })
            .times(1)
            .returning(|_, _| Ok(()));

        let notifier = InquiryNotifier::new(&complete_config(), Arc::new(transport));
        let request = notifier.submit(form()).await.expect("send succeeds");
        assert_eq!(request.name(), "Hong Gildong");
    }

    #[tokio::test]
    async fn submit_skips_transport_when_form_is_incomplete() {
        let mut transport = MockMailTransport::new();
        transport.expect_send().never();

        let notifier = InquiryNotifier::new(&complete_config(), Arc::new(transport));
        let err = notifier
            .submit(InquiryForm {
                sender_email: String::new(),
                ..form()
            })
            .await
            .unwrap_err();

        assert!(matches!(err, InquiryError::Validation { .. }));
    }

    #[tokio::test]
    async fn notify_fails_fast_without_sender() {
        let mut transport = MockMailTransport::new();
        transport.expect_send().never();

        let config = MailConfig {
            sender: None,
            ..complete_config()
        };
        let notifier = InquiryNotifier::new(&config, Arc::new(transport));
        assert!(!notifier.is_configured());

        let err = notifier.submit(form()).await.unwrap_err();
        match err {
            InquiryError::Configuration { missing } => assert_eq!(missing, "EMAIL_SENDER"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn transport_failure_is_reported_verbatim() {
        let mut transport = MockMailTransport::new();
        transport
            .expect_send()
            .times(1)
            .returning(|_, _| Err(TransportError::new("535 Authentication failed")));

        let notifier = InquiryNotifier::new(&complete_config(), Arc::new(transport));
        let err = notifier.submit(form()).await.unwrap_err();

        match err {
            InquiryError::Transport { message } => {
                assert_eq!(message, "535 Authentication failed")
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
