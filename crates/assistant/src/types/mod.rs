pub mod errors;

pub use errors::{AssistantError, AssistantResult};
