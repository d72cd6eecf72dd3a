//! # Vercup Assistant Crate
//!
//! A chat assistant that answers visitor questions about Vercup from a static
//! knowledge document, streaming the answer from a hosted chat-completion
//! endpoint.
//!
//! ## Architecture
//!
//! - **Entities**: `KnowledgeDocument`, `ChatSession`, `ChatTurn`
//! - **Prompt**: the system instruction derived from the knowledge document
//! - **Providers**: the `CompletionProvider` seam and the OpenAI-compatible client
//! - **Services**: `Assistant`, which drives one `ChatRound` per visitor message
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use vercup_assistant::{Assistant, KnowledgeDocument, OpenAiProvider};
//! use vercup_config::AssistantConfig;
//!
//! # async fn run(config: AssistantConfig) -> Result<(), vercup_assistant::AssistantError> {
//! let knowledge = Arc::new(KnowledgeDocument::embedded()?);
//! let provider = Arc::new(OpenAiProvider::from_config(&config)?);
//! let assistant = Assistant::new(&config, knowledge, provider)?;
//!
//! let mut session = assistant.start_session();
//! let answer = assistant
//!     .ask_with(&mut session, "컵홀더는 뜨거운 음료에도 안전한가요?", |partial| {
//!         println!("{partial}");
//!     })
//!     .await?;
//! # let _ = answer;
//! # Ok(())
//! # }
//! ```

pub mod entities;
pub mod prompt;
pub mod providers;
pub mod services;
pub mod test_support;
pub mod types;

pub use entities::{ChatPhase, ChatRole, ChatSession, ChatTurn, KnowledgeDocument};
pub use prompt::system_instruction;
pub use providers::{CompletionProvider, CompletionRequest, FragmentStream, OpenAiProvider};
pub use services::{Assistant, AssistantSettings, ChatRound};
pub use types::{AssistantError, AssistantResult};
