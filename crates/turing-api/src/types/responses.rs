//! Response DTOs for the API.
//!
//! Agent memories never leave the server: a conversation is exposed as its
//! transcript, configuration and verdict.

use chrono::{DateTime, Utc};
use serde::Serialize;

use turing_agent::{ModelInfo, Provider};
use turing_models::{
    AgentRole, Conversation, ConversationConfig, ConversationStatus, Message, PersonaPreset,
    Verdict,
};

/// Health check response.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    /// Conversations currently held in memory.
    pub live_conversations: usize,
}

/// Public view of one conversation.
#[derive(Debug, Clone, Serialize)]
pub struct ConversationResponse {
    pub id: String,
    pub status: ConversationStatus,
    pub config: ConversationConfig,
    pub transcript: Vec<Message>,
    pub current_turn: u32,
    pub turn_limit: u32,
    /// Seat expected to speak next. Absent once completed.
    pub next_speaker: Option<AgentRole>,
    /// True when the next move belongs to the human participant.
    pub awaiting_human: bool,
    pub verdict: Option<Verdict>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl From<&Conversation> for ConversationResponse {
    fn from(conversation: &Conversation) -> Self {
        let next_speaker = match conversation.status {
            ConversationStatus::Completed => None,
            _ => Some(conversation.next_speaker()),
        };
        let awaiting_human = conversation.status == ConversationStatus::Active
            && next_speaker.is_some_and(|role| conversation.config.is_human(role));

        Self {
            id: conversation.id.as_str().to_string(),
            status: conversation.status,
            config: conversation.config.clone(),
            transcript: conversation.transcript.clone(),
            current_turn: conversation.current_turn(),
            turn_limit: conversation.config.turn_limit,
            next_speaker,
            awaiting_human,
            verdict: conversation.verdict.clone(),
            created_at: conversation.created_at,
            completed_at: conversation.completed_at,
        }
    }
}

/// Completed conversations, newest first.
#[derive(Debug, Clone, Serialize)]
pub struct HistoryResponse {
    pub conversations: Vec<ConversationResponse>,
    pub total: usize,
}

/// A built-in persona.
#[derive(Debug, Clone, Serialize)]
pub struct PersonaInfo {
    pub id: String,
    pub name: String,
    pub age: u8,
    pub occupation: String,
    pub personality: String,
    pub quirk: String,
}

impl From<&PersonaPreset> for PersonaInfo {
    fn from(preset: &PersonaPreset) -> Self {
        Self {
            id: preset.id.to_string(),
            name: preset.name.to_string(),
            age: preset.age,
            occupation: preset.occupation.to_string(),
            personality: preset.personality.to_string(),
            quirk: preset.quirk.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PersonaListResponse {
    pub personas: Vec<PersonaInfo>,
    pub total: usize,
}

/// A catalog model and whether its provider has a key configured.
#[derive(Debug, Clone, Serialize)]
pub struct ModelSummary {
    pub id: String,
    pub label: String,
    pub provider: Provider,
    pub available: bool,
}

impl ModelSummary {
    pub fn new(info: &ModelInfo, available: bool) -> Self {
        Self {
            id: info.id.to_string(),
            label: info.label.to_string(),
            provider: info.provider,
            available,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ModelListResponse {
    pub models: Vec<ModelSummary>,
    pub total: usize,
}
