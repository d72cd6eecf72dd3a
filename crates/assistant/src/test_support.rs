//! Scripted [`CompletionProvider`] for tests in this and dependent crates.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use futures_util::stream;

use crate::providers::{CompletionProvider, CompletionRequest, FragmentStream};
use crate::types::{AssistantError, AssistantResult};

/// How the provider answers one request.
#[derive(Debug, Clone)]
pub enum Script {
    /// Stream these fragments, then end normally.
    Reply(Vec<String>),
    /// Stream these fragments, then fail with the message.
    FailMidStream(Vec<String>, String),
    /// Refuse the request before any fragment is produced.
    Reject(String),
    /// Never answer the request.
    Hang,
    /// Accept the request, then never send a fragment.
    Stall,
}

impl Script {
    pub fn reply(fragments: &[&str]) -> Self {
        Self::Reply(fragments.iter().map(|text| text.to_string()).collect())
    }

    pub fn fail_mid_stream(fragments: &[&str], message: impl Into<String>) -> Self {
        Self::FailMidStream(
            fragments.iter().map(|text| text.to_string()).collect(),
            message.into(),
        )
    }

    pub fn reject(message: impl Into<String>) -> Self {
        Self::Reject(message.into())
    }
}

/// Plays back queued scripts in order, then falls back to a default script if one is set.
pub struct ScriptedProvider {
    scripts: Mutex<VecDeque<Script>>,
    fallback: Option<Script>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedProvider {
    pub fn new(scripts: Vec<Script>) -> Self {
        Self {
            scripts: Mutex::new(scripts.into()),
            fallback: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Answers every request with the same fragments.
    pub fn repeating(fragments: &[&str]) -> Self {
        Self {
            fallback: Some(Script::reply(fragments)),
            ..Self::new(Vec::new())
        }
    }

    /// Every request received so far, in order.
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }

    fn next_script(&self) -> Option<Script> {
        self.scripts
            .lock()
            .ok()
            .and_then(|mut scripts| scripts.pop_front())
            .or_else(|| self.fallback.clone())
    }
}

#[async_trait]
impl CompletionProvider for ScriptedProvider {
    async fn stream_chat(&self, request: CompletionRequest) -> AssistantResult<FragmentStream> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request);
        }

        let items: Vec<AssistantResult<String>> = match self.next_script() {
            Some(Script::Reply(fragments)) => fragments.into_iter().map(Ok).collect(),
            Some(Script::FailMidStream(fragments, message)) => fragments
                .into_iter()
                .map(Ok)
                .chain(std::iter::once(Err(AssistantError::model(message))))
                .collect(),
            Some(Script::Reject(message)) => return Err(AssistantError::model(message)),
            Some(Script::Hang) => return std::future::pending().await,
            Some(Script::Stall) => return Ok(Box::pin(stream::pending())),
            None => return Err(AssistantError::model("no scripted reply left")),
        };

        Ok(Box::pin(stream::iter(items)))
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}
