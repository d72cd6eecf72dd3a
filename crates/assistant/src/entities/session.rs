//! Chat sessions and their turns.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::knowledge::KnowledgeDocument;
use crate::prompt::system_instruction;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

impl ChatRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatRole::System => "system",
            ChatRole::User => "user",
            ChatRole::Assistant => "assistant",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub content: String,
}

impl ChatTurn {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// Where a session is in the `Idle -> AwaitingModel -> Streaming -> Idle` cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatPhase {
    #[default]
    Idle,
    AwaitingModel,
    Streaming,
}

/// One visitor's conversation. The first turn is always the single system turn.
#[derive(Debug, Clone, Serialize)]
pub struct ChatSession {
    id: Uuid,
    created_at: DateTime<Utc>,
    turns: Vec<ChatTurn>,
    phase: ChatPhase,
}

impl ChatSession {
    pub fn new(knowledge: &KnowledgeDocument) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            turns: vec![ChatTurn::system(system_instruction(knowledge))],
            phase: ChatPhase::Idle,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn phase(&self) -> ChatPhase {
        self.phase
    }

    /// Every turn including the leading system turn.
    pub fn turns(&self) -> &[ChatTurn] {
        &self.turns
    }

    /// Turns a visitor should see: everything after the system turn.
    pub fn transcript(&self) -> &[ChatTurn] {
        &self.turns[1..]
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transcript().is_empty()
    }

    pub(crate) fn set_phase(&mut self, phase: ChatPhase) {
        self.phase = phase;
    }

    pub(crate) fn push_user(&mut self, content: impl Into<String>) {
        self.turns.push(ChatTurn::user(content));
    }

    pub(crate) fn push_assistant(&mut self, content: impl Into<String>) {
        self.turns.push(ChatTurn::assistant(content));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_session_holds_only_the_system_turn() {
        let knowledge = KnowledgeDocument::embedded().unwrap();
        let session = ChatSession::new(&knowledge);

        assert_eq!(session.len(), 1);
        assert_eq!(session.turns()[0].role, ChatRole::System);
        assert!(session.transcript().is_empty());
        assert!(session.is_empty());
        assert_eq!(session.phase(), ChatPhase::Idle);
    }

    #[test]
    fn roles_serialize_lowercase() {
        let json = serde_json::to_string(&ChatTurn::assistant("hi")).unwrap();
        assert_eq!(json, r#"{"role":"assistant","content":"hi"}"#);
    }
}
