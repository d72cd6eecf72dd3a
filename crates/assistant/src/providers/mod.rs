//! Completion endpoints the assistant can stream answers from.

pub mod openai;
mod sse;

use std::pin::Pin;

use async_trait::async_trait;
use futures_util::Stream;
use serde::Serialize;

use crate::entities::ChatTurn;
use crate::types::AssistantResult;

pub use openai::OpenAiProvider;

/// Text fragments of one streamed answer, in arrival order.
pub type FragmentStream = Pin<Box<dyn Stream<Item = AssistantResult<String>> + Send>>;

/// Outbound chat-completion request: one system message followed by the history.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<ChatTurn>,
    pub temperature: f32,
    pub stream: bool,
}

#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Issue the request and return the fragment stream once the endpoint accepts it.
    async fn stream_chat(&self, request: CompletionRequest) -> AssistantResult<FragmentStream>;

    fn name(&self) -> &'static str;
}
