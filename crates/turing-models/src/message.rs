//! Transcript message types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::ids::MessageId;

/// The two seats at the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentRole {
    /// Asks questions and decides whether the counterpart is human.
    Interrogator,
    /// Tries to pass as human.
    Convincer,
}

impl AgentRole {
    /// Returns the other role.
    pub fn counterpart(self) -> Self {
        match self {
            Self::Interrogator => Self::Convincer,
            Self::Convincer => Self::Interrogator,
        }
    }

    /// Returns the role expected to speak after `transcript_len` messages.
    ///
    /// The Interrogator always opens, so even lengths belong to it.
    pub fn for_transcript_len(transcript_len: usize) -> Self {
        if transcript_len % 2 == 0 {
            Self::Interrogator
        } else {
            Self::Convincer
        }
    }
}

impl fmt::Display for AgentRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Interrogator => write!(f, "interrogator"),
            Self::Convincer => write!(f, "convincer"),
        }
    }
}

impl std::str::FromStr for AgentRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "interrogator" => Ok(Self::Interrogator),
            "convincer" => Ok(Self::Convincer),
            other => Err(format!("unknown agent role: {}", other)),
        }
    }
}

/// Chat role of a message, as understood by chat-completion APIs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    /// Instructions.
    System,
    /// Counterpart (or human operator) speech.
    User,
    /// Model output.
    Assistant,
}

impl fmt::Display for ChatRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::System => write!(f, "system"),
            Self::User => write!(f, "user"),
            Self::Assistant => write!(f, "assistant"),
        }
    }
}

/// The Interrogator's private read on its counterpart after one turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuspicionAnalysis {
    /// Free-form private reasoning.
    pub thought: String,
    /// How strongly the Interrogator suspects an AI, 0 to 100.
    pub suspicion: u8,
}

impl SuspicionAnalysis {
    /// Creates an analysis, clamping suspicion into 0..=100.
    pub fn new(thought: impl Into<String>, suspicion: i64) -> Self {
        Self {
            thought: thought.into(),
            suspicion: suspicion.clamp(0, 100) as u8,
        }
    }
}

/// A single entry in the shared transcript.
///
/// Messages are immutable once appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Unique identifier.
    pub id: MessageId,

    /// Chat role. AI output is `assistant`, human stand-in input is `user`.
    pub role: ChatRole,

    /// Visible text.
    pub content: String,

    /// When the message was appended.
    pub timestamp: DateTime<Utc>,

    /// Which seat produced it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent: Option<AgentRole>,

    /// Interrogator side-channel reasoning, when it could be parsed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub internal_thought: Option<String>,

    /// Interrogator side-channel suspicion score, when it could be parsed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suspicion_score: Option<u8>,
}

impl Message {
    /// Creates a message produced by an AI agent.
    pub fn from_agent(agent: AgentRole, content: impl Into<String>) -> Self {
        Self {
            id: MessageId::new(),
            role: ChatRole::Assistant,
            content: content.into(),
            timestamp: Utc::now(),
            agent: Some(agent),
            internal_thought: None,
            suspicion_score: None,
        }
    }

    /// Creates a message typed by a human sitting in `agent`'s seat.
    pub fn from_human(agent: AgentRole, content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            ..Self::from_agent(agent, content)
        }
    }

    /// Attaches the Interrogator's side-channel analysis.
    pub fn with_analysis(mut self, analysis: SuspicionAnalysis) -> Self {
        self.internal_thought = Some(analysis.thought);
        self.suspicion_score = Some(analysis.suspicion);
        self
    }

    /// Returns true if this message came from `role`.
    pub fn is_from(&self, role: AgentRole) -> bool {
        self.agent == Some(role)
    }
}
