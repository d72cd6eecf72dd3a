//! Shared types for the inquiry flow.

pub mod errors;

pub use errors::{InquiryError, InquiryResult};
