//! Knowledge-grounded chat loop over a streaming completion provider.

use std::ops::DerefMut;
use std::sync::Arc;

use futures_util::{stream, Stream, StreamExt};
use tracing::{debug, info, warn};
use vercup_config::AssistantConfig;

use crate::entities::{ChatPhase, ChatRole, ChatSession, ChatTurn, KnowledgeDocument};
use crate::prompt::system_instruction;
use crate::providers::{CompletionProvider, CompletionRequest, FragmentStream};
use crate::types::{AssistantError, AssistantResult};

/// Model parameters sent with every request.
#[derive(Debug, Clone, PartialEq)]
pub struct AssistantSettings {
    pub model: String,
    pub temperature: f32,
}

impl From<&AssistantConfig> for AssistantSettings {
    fn from(config: &AssistantConfig) -> Self {
        Self {
            model: config.model.clone(),
            temperature: config.temperature,
        }
    }
}

/// Answers visitor questions from the shared knowledge document.
pub struct Assistant {
    settings: AssistantSettings,
    knowledge: Arc<KnowledgeDocument>,
    provider: Arc<dyn CompletionProvider>,
}

impl Assistant {
    /// Build the assistant. Fails when no completion credential is configured.
    pub fn new(
        config: &AssistantConfig,
        knowledge: Arc<KnowledgeDocument>,
        provider: Arc<dyn CompletionProvider>,
    ) -> AssistantResult<Self> {
        if !config.is_enabled() {
            return Err(AssistantError::configuration("OPENAI_API_KEY is not set"));
        }

        Ok(Self::with_settings(AssistantSettings::from(config), knowledge, provider))
    }

    pub fn with_settings(
        settings: AssistantSettings,
        knowledge: Arc<KnowledgeDocument>,
        provider: Arc<dyn CompletionProvider>,
    ) -> Self {
        Self {
            settings,
            knowledge,
            provider,
        }
    }

    pub fn settings(&self) -> &AssistantSettings {
        &self.settings
    }

    pub fn knowledge(&self) -> &KnowledgeDocument {
        &self.knowledge
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }

    pub fn start_session(&self) -> ChatSession {
        ChatSession::new(&self.knowledge)
    }

    /// The request for the session's current history.
    ///
    /// The system message is rebuilt from the knowledge document every time;
    /// the system turn stored in the session is never replayed.
    pub fn build_request(&self, session: &ChatSession) -> CompletionRequest {
        let messages = std::iter::once(ChatTurn::system(system_instruction(&self.knowledge)))
            .chain(
                session
                    .turns()
                    .iter()
                    .filter(|turn| turn.role != ChatRole::System)
                    .cloned(),
            )
            .collect();

        CompletionRequest {
            model: self.settings.model.clone(),
            messages,
            temperature: self.settings.temperature,
            stream: true,
        }
    }

    /// Record the visitor's turn and open the answer stream.
    ///
    /// `session` is anything that mutably derefs to a [`ChatSession`]: a plain
    /// `&mut ChatSession` or an owned lock guard that keeps the session busy
    /// for the lifetime of the round. If the endpoint cannot be reached the
    /// user turn stays recorded and no assistant turn is added.
    pub async fn begin_round<S>(&self, mut session: S, input: &str) -> AssistantResult<ChatRound<S>>
    where
        S: DerefMut<Target = ChatSession>,
    {
        if input.trim().is_empty() {
            return Err(AssistantError::EmptyInput);
        }
        if session.phase() != ChatPhase::Idle {
            return Err(AssistantError::RoundInProgress);
        }

        session.push_user(input);
        session.set_phase(ChatPhase::AwaitingModel);

        let request = self.build_request(&session);
        info!(
            session_id = %session.id(),
            turns = session.len(),
            model = %request.model,
            "starting chat round"
        );

        // The round exists before the provider call so that dropping this
        // future while the endpoint is still connecting puts the session back to `Idle`.
        let mut round = ChatRound {
            session,
            fragments: Box::pin(stream::empty::<AssistantResult<String>>()),
            accumulator: String::new(),
            finished: false,
        };

        match self.provider.stream_chat(request).await {
            Ok(fragments) => {
                round.fragments = fragments;
                Ok(round)
            }
            Err(error) => {
                round.finished = true;
                round.session.set_phase(ChatPhase::Idle);
                warn!(session_id = %round.session.id(), %error, "chat round aborted before streaming");
                Err(error)
            }
        }
    }

    /// Run a full round, calling `on_snapshot` with the growing answer after each fragment.
    pub async fn ask_with<F>(
        &self,
        session: &mut ChatSession,
        input: &str,
        mut on_snapshot: F,
    ) -> AssistantResult<String>
    where
        F: FnMut(&str),
    {
        let mut round = self.begin_round(session, input).await?;
        while let Some(snapshot) = round.next_snapshot().await {
            on_snapshot(&snapshot?);
        }
        Ok(round.answer().to_string())
    }

    /// Run a full round and return the final answer.
    pub async fn ask(&self, session: &mut ChatSession, input: &str) -> AssistantResult<String> {
        self.ask_with(session, input, |_| {}).await
    }
}

/// One in-flight answer. Pull snapshots until `None`; dropping it early cancels the round.
pub struct ChatRound<S>
where
    S: DerefMut<Target = ChatSession>,
{
    session: S,
    fragments: FragmentStream,
    accumulator: String,
    finished: bool,
}

impl<S> ChatRound<S>
where
    S: DerefMut<Target = ChatSession>,
{
    /// Wait for the next fragment and return the whole answer so far.
    ///
    /// Returns `None` once the answer is complete (and recorded) or after an error.
    pub async fn next_snapshot(&mut self) -> Option<AssistantResult<String>> {
        if self.finished {
            return None;
        }

        match self.fragments.next().await {
            Some(Ok(fragment)) => {
                self.accumulator.push_str(&fragment);
                self.session.set_phase(ChatPhase::Streaming);
                Some(Ok(self.accumulator.clone()))
            }
            Some(Err(error)) => {
                self.finished = true;
                self.session.set_phase(ChatPhase::Idle);
                warn!(session_id = %self.session.id(), %error, "chat round aborted mid-stream");
                Some(Err(error))
            }
            None => {
                self.finished = true;
                self.session.push_assistant(self.accumulator.clone());
                self.session.set_phase(ChatPhase::Idle);
                debug!(
                    session_id = %self.session.id(),
                    chars = self.accumulator.chars().count(),
                    "chat round complete"
                );
                None
            }
        }
    }

    /// Everything received so far.
    pub fn answer(&self) -> &str {
        &self.accumulator
    }

    pub fn session(&self) -> &ChatSession {
        &self.session
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Adapt the round into a stream of snapshots.
    pub fn into_stream(self) -> impl Stream<Item = AssistantResult<String>> + Send
    where
        S: Send + 'static,
    {
        stream::unfold(self, |mut round| async move {
            let snapshot = round.next_snapshot().await?;
            Some((snapshot, round))
        })
    }
}

impl<S> Drop for ChatRound<S>
where
    S: DerefMut<Target = ChatSession>,
{
    fn drop(&mut self) {
        if !self.finished {
            self.session.set_phase(ChatPhase::Idle);
            debug!(session_id = %self.session.id(), "chat round cancelled");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{Script, ScriptedProvider};

    fn assistant(provider: Arc<ScriptedProvider>) -> Assistant {
        let config = AssistantConfig {
            api_key: Some("sk-test".to_string()),
            ..AssistantConfig::default()
        };
        Assistant::new(&config, Arc::new(KnowledgeDocument::embedded().unwrap()), provider)
            .expect("assistant builds")
    }

    #[test]
    fn new_requires_api_key() {
        let result = Assistant::new(
            &AssistantConfig::default(),
            Arc::new(KnowledgeDocument::embedded().unwrap()),
            Arc::new(ScriptedProvider::repeating(&["hi"])),
        );
        assert!(matches!(result, Err(AssistantError::Configuration { .. })));
    }

    #[test]
    fn settings_follow_the_config() {
        assert_eq!(
            AssistantSettings::from(&AssistantConfig::default()),
            AssistantSettings {
                model: "gpt-4o-mini".to_string(),
                temperature: 0.7,
            }
        );

        let config = AssistantConfig {
            model: "gpt-4o".to_string(),
            temperature: 0.2,
            ..AssistantConfig::default()
        };
        let settings = AssistantSettings::from(&config);
        assert_eq!(settings.model, "gpt-4o");
        assert!((settings.temperature - 0.2).abs() < f32::EPSILON);
    }

    #[tokio::test]
    async fn empty_input_leaves_history_untouched() {
        let provider = Arc::new(ScriptedProvider::repeating(&["hi"]));
        let assistant = assistant(provider.clone());
        let mut session = assistant.start_session();

        let err = assistant.ask(&mut session, "   ").await.unwrap_err();

        assert!(matches!(err, AssistantError::EmptyInput));
        assert_eq!(session.len(), 1);
        assert!(provider.requests().is_empty());
    }

    #[tokio::test]
    async fn snapshots_grow_one_fragment_at_a_time() {
        let provider = Arc::new(ScriptedProvider::new(vec![Script::reply(&["버", "컵", "!"])]));
        let assistant = assistant(provider);
        let mut session = assistant.start_session();

        let mut snapshots = Vec::new();
        let answer = assistant
            .ask_with(&mut session, "회사 이름이 뭐예요?", |snapshot| {
                snapshots.push(snapshot.to_string())
            })
            .await
            .unwrap();

        assert_eq!(snapshots, vec!["버", "버컵", "버컵!"]);
        assert_eq!(answer, "버컵!");
        assert_eq!(session.transcript().last(), Some(&ChatTurn::assistant("버컵!")));
    }

    #[tokio::test]
    async fn phase_follows_the_round() {
        let provider = Arc::new(ScriptedProvider::new(vec![Script::reply(&["a", "b"])]));
        let assistant = assistant(provider);
        let mut session = assistant.start_session();

        let mut round = assistant.begin_round(&mut session, "hello").await.unwrap();
        assert_eq!(round.session().phase(), ChatPhase::AwaitingModel);

        round.next_snapshot().await.unwrap().unwrap();
        assert_eq!(round.session().phase(), ChatPhase::Streaming);

        while round.next_snapshot().await.is_some() {}
        assert!(round.is_finished());
        drop(round);

        assert_eq!(session.phase(), ChatPhase::Idle);
        assert_eq!(session.len(), 3);
    }

    #[tokio::test]
    async fn dropping_a_round_cancels_without_assistant_turn() {
        let provider = Arc::new(ScriptedProvider::new(vec![Script::reply(&["a", "b"])]));
        let assistant = assistant(provider);
        let mut session = assistant.start_session();

        let mut round = assistant.begin_round(&mut session, "hello").await.unwrap();
        round.next_snapshot().await.unwrap().unwrap();
        drop(round);

        assert_eq!(session.phase(), ChatPhase::Idle);
        assert_eq!(session.len(), 2);
        assert_eq!(session.transcript()[0], ChatTurn::user("hello"));
    }

    #[tokio::test]
    async fn request_starts_with_fresh_system_message() {
        let provider = Arc::new(ScriptedProvider::repeating(&["ok"]));
        let assistant = assistant(provider.clone());
        let mut session = assistant.start_session();

        assistant.ask(&mut session, "first").await.unwrap();
        assistant.ask(&mut session, "second").await.unwrap();

        let requests = provider.requests();
        let last = requests.last().unwrap();
        let roles: Vec<ChatRole> = last.messages.iter().map(|turn| turn.role).collect();
        assert_eq!(
            roles,
            vec![
                ChatRole::System,
                ChatRole::User,
                ChatRole::Assistant,
                ChatRole::User
            ]
        );
        assert!((last.temperature - 0.7).abs() < f32::EPSILON);
        assert!(last.stream);
    }
}
