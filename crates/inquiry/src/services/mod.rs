//! Business logic for inquiries.

pub mod notifier;

pub use notifier::InquiryNotifier;
