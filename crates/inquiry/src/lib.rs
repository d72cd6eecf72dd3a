//! # Vercup Inquiry Crate
//!
//! Validates partnership/contact form submissions and forwards them to the
//! Vercup team as a single plain-text email.
//!
//! ## Architecture
//!
//! - **Entities**: `InquiryForm` (raw submission), `InquiryRequest` (validated), `EmailNotification`
//! - **Services**: `InquiryNotifier`, the validate-then-send flow
//! - **Transport**: the `MailTransport` seam and its SMTP implementation
//! - **Types**: error types shared by the crate
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use vercup_config::MailConfig;
//! use vercup_inquiry::{InquiryCategory, InquiryForm, InquiryNotifier, SmtpMailTransport};
//!
//! # async fn run(config: MailConfig) -> Result<(), vercup_inquiry::InquiryError> {
//! let transport = Arc::new(SmtpMailTransport::from_config(&config));
//! let notifier = InquiryNotifier::new(&config, transport);
//!
//! let form = InquiryForm {
//!     name: "Hong Gildong".to_string(),
//!     sender_email: "x@y.com".to_string(),
//!     category: Some(InquiryCategory::SampleRequest),
//!     message: "Please send a sample".to_string(),
//! };
//! notifier.submit(form).await?;
//! # Ok(())
//! # }
//! ```

pub mod entities;
pub mod services;
pub mod test_support;
pub mod transport;
pub mod types;

pub use entities::{EmailNotification, InquiryCategory, InquiryForm, InquiryRequest};
pub use services::InquiryNotifier;
pub use transport::{MailCredentials, MailTransport, SmtpMailTransport, TransportError};
pub use types::{InquiryError, InquiryResult};
