//! Domain entities for inquiries.

pub mod inquiry;
pub mod notification;

pub use inquiry::{InquiryCategory, InquiryForm, InquiryRequest};
pub use notification::EmailNotification;
