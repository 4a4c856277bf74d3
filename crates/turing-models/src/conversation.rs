//! The conversation aggregate and per-agent state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::{ConversationConfig, InterrogatorStyle};
use crate::ids::{ConversationId, MessageId};
use crate::message::{AgentRole, ChatRole, Message};
use crate::persona::Persona;
use crate::verdict::Verdict;

/// Lifecycle of a conversation. Transitions only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ConversationStatus {
    /// Created, waiting for start.
    #[default]
    Idle,
    /// Turns are being exchanged.
    Active,
    /// Verdict reached. Terminal.
    Completed,
}

impl fmt::Display for ConversationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Active => write!(f, "active"),
            Self::Completed => write!(f, "completed"),
        }
    }
}

/// One entry of an agent's private chat memory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub content: String,
}

impl ChatTurn {
    pub fn new(role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// Private conversational memory of one seat.
///
/// The counterpart's words are stored as `user` turns and the agent's own
/// words as `assistant` turns, after a single system prompt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentState {
    pub role: AgentRole,

    /// Model id used for this seat.
    pub model: String,

    /// System prompt followed by the alternating dialogue.
    pub messages: Vec<ChatTurn>,

    /// Number of turns this seat has produced.
    pub turn_count: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<InterrogatorStyle>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub persona: Option<Persona>,

    /// Last counterpart transcript message folded into `messages`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_observed: Option<MessageId>,
}

impl AgentState {
    /// Creates a state seeded with its system prompt.
    pub fn new(role: AgentRole, model: impl Into<String>, system_prompt: impl Into<String>) -> Self {
        Self {
            role,
            model: model.into(),
            messages: vec![ChatTurn::new(ChatRole::System, system_prompt)],
            turn_count: 0,
            style: None,
            persona: None,
            last_observed: None,
        }
    }

    pub fn with_style(mut self, style: InterrogatorStyle) -> Self {
        self.style = Some(style);
        self
    }

    pub fn with_persona(mut self, persona: Option<Persona>) -> Self {
        self.persona = persona;
        self
    }

    /// Returns the seeding system prompt.
    pub fn system_prompt(&self) -> Option<&str> {
        self.messages
            .first()
            .filter(|turn| turn.role == ChatRole::System)
            .map(|turn| turn.content.as_str())
    }

    /// Returns true if `message` was already folded into memory.
    pub fn has_observed(&self, message: &Message) -> bool {
        self.last_observed.as_ref() == Some(&message.id)
    }

    /// Folds a counterpart message into memory as a `user` turn.
    ///
    /// Folding the same message twice is a no-op.
    pub fn observe(&mut self, message: &Message) {
        if self.has_observed(message) {
            return;
        }
        self.messages
            .push(ChatTurn::new(ChatRole::User, message.content.clone()));
        self.last_observed = Some(message.id.clone());
    }

    /// Records something this seat said.
    pub fn record_own(&mut self, content: impl Into<String>) {
        self.messages
            .push(ChatTurn::new(ChatRole::Assistant, content));
        self.turn_count += 1;
    }

    /// Drops the private memory while keeping the bookkeeping fields.
    pub fn redact(&mut self) {
        self.messages.clear();
    }
}

/// Aggregate root of one experiment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: ConversationId,
    pub status: ConversationStatus,
    pub config: ConversationConfig,

    /// Shared ordered transcript.
    pub transcript: Vec<Message>,

    pub interrogator: AgentState,
    pub convincer: AgentState,

    #[serde(default)]
    pub verdict: Option<Verdict>,

    pub created_at: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Conversation {
    /// Creates an idle conversation with an empty transcript.
    pub fn new(config: ConversationConfig, interrogator: AgentState, convincer: AgentState) -> Self {
        Self {
            id: ConversationId::new(),
            status: ConversationStatus::Idle,
            config,
            transcript: Vec::new(),
            interrogator,
            convincer,
            verdict: None,
            created_at: Utc::now(),
            completed_at: None,
        }
    }

    /// Completed exchanges so far: `floor(len(transcript) / 2)`.
    pub fn current_turn(&self) -> u32 {
        (self.transcript.len() / 2) as u32
    }

    /// Returns true once `current_turn` has reached the configured limit.
    pub fn turn_limit_reached(&self) -> bool {
        self.current_turn() >= self.config.turn_limit
    }

    /// Seat expected to speak next according to transcript parity.
    pub fn expected_speaker(&self) -> AgentRole {
        AgentRole::for_transcript_len(self.transcript.len())
    }

    /// Seat that speaks next: the complement of the last speaker.
    pub fn next_speaker(&self) -> AgentRole {
        self.transcript
            .last()
            .and_then(|m| m.agent)
            .map(AgentRole::counterpart)
            .unwrap_or(AgentRole::Interrogator)
    }

    /// Most recent transcript message produced by `role`.
    pub fn last_from(&self, role: AgentRole) -> Option<&Message> {
        self.transcript.iter().rev().find(|m| m.is_from(role))
    }

    pub fn agent(&self, role: AgentRole) -> &AgentState {
        match role {
            AgentRole::Interrogator => &self.interrogator,
            AgentRole::Convincer => &self.convincer,
        }
    }

    pub fn agent_mut(&mut self, role: AgentRole) -> &mut AgentState {
        match role {
            AgentRole::Interrogator => &mut self.interrogator,
            AgentRole::Convincer => &mut self.convincer,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == ConversationStatus::Completed
    }

    /// Returns a copy with both agents' private memories removed.
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        copy.interrogator.redact();
        copy.convincer.redact();
        copy
    }
}
