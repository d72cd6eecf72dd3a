//! The chat session loop.

pub mod assistant;

pub use assistant::{Assistant, AssistantSettings, ChatRound};
