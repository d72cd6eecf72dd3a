//! Shared application state for the gateway

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;
use vercup_assistant::{Assistant, ChatSession};
use vercup_inquiry::InquiryNotifier;

use crate::error::{GatewayError, GatewayResult};

/// A session shared between requests. Holding its lock means a round is in flight.
pub type SharedSession = Arc<Mutex<ChatSession>>;

struct StoredSession {
    session: SharedSession,
    last_active: Instant,
}

/// In-memory chat sessions keyed by id.
///
/// A session lives until it is deleted or sits idle for longer than the
/// configured time-to-live. Expired sessions are pruned on every insert and
/// lookup; a session with a round in flight is never pruned.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<RwLock<HashMap<Uuid, StoredSession>>>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub async fn insert(&self, session: ChatSession) -> SharedSession {
        let id = session.id();
        let shared = Arc::new(Mutex::new(session));
        let mut sessions = self.inner.write().await;
        Self::prune(&mut sessions, self.ttl);
        sessions.insert(
            id,
            StoredSession {
                session: shared.clone(),
                last_active: Instant::now(),
            },
        );
        shared
    }

    /// Look up a session and mark it active.
    pub async fn get(&self, id: Uuid) -> Option<SharedSession> {
        let mut sessions = self.inner.write().await;
        Self::prune(&mut sessions, self.ttl);
        sessions.get_mut(&id).map(|stored| {
            stored.last_active = Instant::now();
            stored.session.clone()
        })
    }

    pub async fn remove(&self, id: Uuid) -> bool {
        self.inner.write().await.remove(&id).is_some()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    fn prune(sessions: &mut HashMap<Uuid, StoredSession>, ttl: Duration) {
        let now = Instant::now();
        let before = sessions.len();
        sessions.retain(|_, stored| {
            now.duration_since(stored.last_active) <= ttl || stored.session.try_lock().is_err()
        });
        let expired = before - sessions.len();
        if expired > 0 {
            tracing::debug!(expired, "pruned idle chat sessions");
        }
    }
}

/// Shared application state containing all services
#[derive(Clone)]
pub struct GatewayState {
    pub notifier: Arc<InquiryNotifier>,
    /// `None` when the chat panel is disabled.
    pub assistant: Option<Arc<Assistant>>,
    pub sessions: SessionStore,
}

impl GatewayState {
    pub fn new(
        notifier: Arc<InquiryNotifier>,
        assistant: Option<Arc<Assistant>>,
        session_ttl: Duration,
    ) -> Self {
        Self {
            notifier,
            assistant,
            sessions: SessionStore::new(session_ttl),
        }
    }

    pub fn assistant(&self) -> GatewayResult<&Assistant> {
        self.assistant.as_deref().ok_or_else(|| {
            GatewayError::ServiceUnavailable(
                "Chat is disabled: OPENAI_API_KEY is not set".to_string(),
            )
        })
    }

    pub async fn session(&self, id: Uuid) -> GatewayResult<SharedSession> {
        self.sessions
            .get(id)
            .await
            .ok_or_else(|| GatewayError::NotFound(format!("Chat session {id} not found")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vercup_assistant::KnowledgeDocument;
    use vercup_config::MailConfig;
    use vercup_inquiry::test_support::RecordingTransport;

    fn state() -> GatewayState {
        let notifier = InquiryNotifier::new(&MailConfig::default(), Arc::new(RecordingTransport::new()));
        GatewayState::new(Arc::new(notifier), None, Duration::from_secs(1800))
    }

    #[tokio::test]
    async fn sessions_can_be_inserted_and_removed() {
        let store = SessionStore::new(Duration::from_secs(60));
        let knowledge = KnowledgeDocument::embedded().unwrap();

        let session = ChatSession::new(&knowledge);
        let id = session.id();
        store.insert(session).await;

        assert!(store.get(id).await.is_some());
        assert_eq!(store.len().await, 1);
        assert!(store.remove(id).await);
        assert!(!store.remove(id).await);
        assert!(store.get(id).await.is_none());
    }

    #[tokio::test]
    async fn idle_sessions_expire() {
        let store = SessionStore::new(Duration::from_millis(10));
        let knowledge = KnowledgeDocument::embedded().unwrap();

        let session = ChatSession::new(&knowledge);
        let id = session.id();
        store.insert(session).await;

        tokio::time::sleep(Duration::from_millis(25)).await;

        assert!(store.get(id).await.is_none());
        assert_eq!(store.len().await, 0);
    }

    #[tokio::test]
    async fn lookups_keep_a_session_alive() {
        let store = SessionStore::new(Duration::from_millis(100));
        let knowledge = KnowledgeDocument::embedded().unwrap();

        let session = ChatSession::new(&knowledge);
        let id = session.id();
        store.insert(session).await;

        for _ in 0..3 {
            tokio::time::sleep(Duration::from_millis(40)).await;
            assert!(store.get(id).await.is_some());
        }
    }

    #[tokio::test]
    async fn busy_sessions_are_not_pruned() {
        let store = SessionStore::new(Duration::from_millis(10));
        let knowledge = KnowledgeDocument::embedded().unwrap();

        let busy = ChatSession::new(&knowledge);
        let busy_id = busy.id();
        let shared = store.insert(busy).await;
        let _round = shared.lock_owned().await;

        tokio::time::sleep(Duration::from_millis(25)).await;
        store.insert(ChatSession::new(&knowledge)).await;

        assert_eq!(store.len().await, 2);
        assert!(store.get(busy_id).await.is_some());
    }

    #[tokio::test]
    async fn unknown_session_is_not_found() {
        let err = state().session(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, GatewayError::NotFound(_)));
    }

    #[test]
    fn disabled_assistant_is_unavailable() {
        let err = state().assistant().err().expect("chat disabled");
        assert!(matches!(err, GatewayError::ServiceUnavailable(_)));
    }
}
