//! OpenAI-compatible chat-completions endpoint with server-sent event streaming.

use std::collections::VecDeque;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::{stream, Stream, StreamExt};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};
use vercup_config::AssistantConfig;

use super::sse::SseDecoder;
use super::{CompletionProvider, CompletionRequest, FragmentStream};
use crate::types::{AssistantError, AssistantResult};

const DONE_MARKER: &str = "[DONE]";

pub struct OpenAiProvider {
    client: Client,
    base_url: String,
    api_key: String,
}

impl OpenAiProvider {
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        request_timeout: Duration,
    ) -> AssistantResult<Self> {
        // No overall deadline: a long answer keeps streaming as long as chunks keep arriving.
        let client = Client::builder()
            .connect_timeout(request_timeout)
            .read_timeout(request_timeout)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
        })
    }

    pub fn from_config(config: &AssistantConfig) -> AssistantResult<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| AssistantError::configuration("OPENAI_API_KEY is not set"))?;

        Self::new(
            api_key,
            config.base_url.clone(),
            Duration::from_secs(config.request_timeout_seconds),
        )
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl CompletionProvider for OpenAiProvider {
    async fn stream_chat(&self, request: CompletionRequest) -> AssistantResult<FragmentStream> {
        debug!(
            model = %request.model,
            messages = request.messages.len(),
            "requesting chat completion"
        );

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(%status, "completion endpoint rejected request");
            return Err(AssistantError::model(format!(
                "completion endpoint returned {status}: {}",
                error_message(&body)
            )));
        }

        Ok(Box::pin(fragments(Box::pin(response.bytes_stream()))))
    }

    fn name(&self) -> &'static str {
        "openai"
    }
}

struct StreamState<S> {
    body: S,
    decoder: SseDecoder,
    pending: VecDeque<String>,
    failure: Option<AssistantError>,
    finished: bool,
}

#[derive(Debug)]
enum Payload {
    Fragment(String),
    Done,
    Empty,
}

/// Turn the raw response body into content fragments, stopping at `[DONE]`.
fn fragments<S, B>(body: S) -> impl Stream<Item = AssistantResult<String>> + Send
where
    S: Stream<Item = Result<B, reqwest::Error>> + Unpin + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
{
    let state = StreamState {
        body,
        decoder: SseDecoder::default(),
        pending: VecDeque::new(),
        failure: None,
        finished: false,
    };

    stream::unfold(state, |mut state| async move {
        loop {
            if let Some(fragment) = state.pending.pop_front() {
                return Some((Ok(fragment), state));
            }
            if let Some(error) = state.failure.take() {
                return Some((Err(error), state));
            }
            if state.finished {
                return None;
            }

            let payloads = match state.body.next().await {
                Some(Ok(chunk)) => state.decoder.push(chunk.as_ref()),
                Some(Err(error)) => {
                    state.finished = true;
                    state.failure = Some(AssistantError::from(error));
                    continue;
                }
                None => {
                    state.finished = true;
                    state.decoder.finish().into_iter().collect()
                }
            };

            for payload in payloads {
                match parse_payload(&payload) {
                    Ok(Payload::Fragment(text)) => state.pending.push_back(text),
                    Ok(Payload::Empty) => {}
                    Ok(Payload::Done) => {
                        state.finished = true;
                        break;
                    }
                    Err(error) => {
                        state.finished = true;
                        state.failure = Some(error);
                        break;
                    }
                }
            }
        }
    })
}

#[derive(Debug, Deserialize)]
struct ChunkEnvelope {
    #[serde(default)]
    choices: Vec<ChunkChoice>,
    #[serde(default)]
    error: Option<ErrorBody>,
}

#[derive(Debug, Deserialize)]
struct ChunkChoice {
    #[serde(default)]
    delta: ChunkDelta,
}

#[derive(Debug, Default, Deserialize)]
struct ChunkDelta {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

fn parse_payload(payload: &str) -> AssistantResult<Payload> {
    if payload.trim() == DONE_MARKER {
        return Ok(Payload::Done);
    }

    let envelope: ChunkEnvelope = serde_json::from_str(payload)?;
    if let Some(error) = envelope.error {
        return Err(AssistantError::model(error.message));
    }

    let text: String = envelope
        .choices
        .into_iter()
        .take(1)
        .filter_map(|choice| choice.delta.content)
        .collect();

    Ok(if text.is_empty() {
        Payload::Empty
    } else {
        Payload::Fragment(text)
    })
}

/// Prefer the endpoint's own error message over the raw body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorEnvelope>(body)
        .map(|envelope| envelope.error.message)
        .unwrap_or_else(|_| body.trim().to_string())
}
