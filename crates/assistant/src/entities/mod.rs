//! Domain entities for the chat assistant.

pub mod knowledge;
pub mod session;

pub use knowledge::KnowledgeDocument;
pub use session::{ChatPhase, ChatRole, ChatSession, ChatTurn};
