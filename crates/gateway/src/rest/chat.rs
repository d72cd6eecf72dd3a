//! Chat assistant endpoints
//!
//! A visitor opens a session, then posts messages to it. Each message answers
//! with a `text/event-stream`: one `delta` event per fragment carrying the
//! whole answer so far, then a single `done` event with the final answer, or an
//! `error` event if the model fails part way.

use std::convert::Infallible;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse,
    },
    routing, Json, Router,
};
use futures_util::{stream, Stream, StreamExt};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use vercup_assistant::{AssistantResult, ChatSession, ChatTurn};

use crate::error::{ErrorResponse, GatewayError, GatewayResult};
use crate::state::GatewayState;

#[derive(Debug, Serialize, ToSchema)]
pub struct ChatTurnResponse {
    /// `user` or `assistant`
    pub role: String,
    pub content: String,
}

impl From<&ChatTurn> for ChatTurnResponse {
    fn from(turn: &ChatTurn) -> Self {
        Self {
            role: turn.role.as_str().to_string(),
            content: turn.content.clone(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ChatSessionResponse {
    pub id: Uuid,
    pub created_at: String,
    /// Visible conversation; the system instruction is not included.
    pub turns: Vec<ChatTurnResponse>,
}

impl From<&ChatSession> for ChatSessionResponse {
    fn from(session: &ChatSession) -> Self {
        Self {
            id: session.id(),
            created_at: session.created_at().to_rfc3339(),
            turns: session.transcript().iter().map(ChatTurnResponse::from).collect(),
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SendMessageRequest {
    #[serde(default)]
    pub content: String,
}

pub fn create_chat_routes() -> Router<Arc<GatewayState>> {
    Router::new()
        .route("/api/chat/sessions", routing::post(create_session))
        .route(
            "/api/chat/sessions/:session_id",
            routing::get(get_session).delete(delete_session),
        )
        .route(
            "/api/chat/sessions/:session_id/messages",
            routing::post(send_message),
        )
}

#[utoipa::path(
    post,
    path = "/api/chat/sessions",
    tag = "Chat",
    responses(
        (status = 201, description = "Session created", body = ChatSessionResponse),
        (status = 503, description = "Chat is disabled", body = ErrorResponse)
    )
)]
pub async fn create_session(
    State(state): State<Arc<GatewayState>>,
) -> GatewayResult<impl IntoResponse> {
    let session = state.assistant()?.start_session();
    let response = ChatSessionResponse::from(&session);
    state.sessions.insert(session).await;

    tracing::info!(session_id = %response.id, "chat session created");
    Ok((StatusCode::CREATED, Json(response)))
}

#[utoipa::path(
    get,
    path = "/api/chat/sessions/{session_id}",
    tag = "Chat",
    params(
        ("session_id" = Uuid, Path, description = "Chat session id")
    ),
    responses(
        (status = 200, description = "Session transcript", body = ChatSessionResponse),
        (status = 404, description = "Session not found", body = ErrorResponse),
        (status = 409, description = "A reply is still streaming", body = ErrorResponse)
    )
)]
pub async fn get_session(
    Path(session_id): Path<Uuid>,
    State(state): State<Arc<GatewayState>>,
) -> GatewayResult<Json<ChatSessionResponse>> {
    let session = state.session(session_id).await?;
    let session = session.try_lock().map_err(|_| busy())?;
    Ok(Json(ChatSessionResponse::from(&*session)))
}

#[utoipa::path(
    delete,
    path = "/api/chat/sessions/{session_id}",
    tag = "Chat",
    params(
        ("session_id" = Uuid, Path, description = "Chat session id")
    ),
    responses(
        (status = 204, description = "Session ended"),
        (status = 404, description = "Session not found", body = ErrorResponse)
    )
)]
pub async fn delete_session(
    Path(session_id): Path<Uuid>,
    State(state): State<Arc<GatewayState>>,
) -> GatewayResult<StatusCode> {
    if !state.sessions.remove(session_id).await {
        return Err(GatewayError::NotFound(format!(
            "Chat session {session_id} not found"
        )));
    }

    tracing::info!(%session_id, "chat session ended");
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/chat/sessions/{session_id}/messages",
    tag = "Chat",
    params(
        ("session_id" = Uuid, Path, description = "Chat session id")
    ),
    request_body = SendMessageRequest,
    responses(
        (status = 200, description = "Event stream of `delta`, `done` and `error` events"),
        (status = 400, description = "Empty message", body = ErrorResponse),
        (status = 404, description = "Session not found", body = ErrorResponse),
        (status = 409, description = "A reply is still streaming", body = ErrorResponse),
        (status = 502, description = "Completion endpoint unreachable", body = ErrorResponse),
        (status = 503, description = "Chat is disabled", body = ErrorResponse)
    )
)]
pub async fn send_message(
    Path(session_id): Path<Uuid>,
    State(state): State<Arc<GatewayState>>,
    Json(payload): Json<SendMessageRequest>,
) -> GatewayResult<impl IntoResponse> {
    let assistant = state.assistant()?;
    let session = state.session(session_id).await?;

    // The round owns this guard until the answer ends or the client goes away.
    let guard = session.try_lock_owned().map_err(|_| busy())?;
    let round = assistant.begin_round(guard, &payload.content).await?;

    let events = answer_events(round.into_stream());
    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}

fn busy() -> GatewayError {
    GatewayError::Conflict("A reply is still being generated for this session".to_string())
}

struct EventState<S> {
    snapshots: S,
    last: String,
    closed: bool,
}

/// Map answer snapshots onto `delta` events, closing with `done` or `error`.
fn answer_events<S>(snapshots: S) -> impl Stream<Item = Result<Event, Infallible>> + Send + 'static
where
    S: Stream<Item = AssistantResult<String>> + Send + 'static,
{
    let state = EventState {
        snapshots: Box::pin(snapshots),
        last: String::new(),
        closed: false,
    };

    stream::unfold(state, |mut state| async move {
        if state.closed {
            return None;
        }

        let event = match state.snapshots.next().await {
            Some(Ok(snapshot)) => {
                let event = text_event("delta", &snapshot);
                state.last = snapshot;
                event
            }
            Some(Err(error)) => {
                state.closed = true;
                text_event("error", &error.to_string())
            }
            None => {
                state.closed = true;
                text_event("done", &state.last)
            }
        };

        Some((Ok(event), state))
    })
}

/// Multi-line text is split into several `data:` lines; bare carriage returns are not allowed.
fn text_event(name: &str, text: &str) -> Event {
    Event::default().event(name).data(text.replace('\r', ""))
}
